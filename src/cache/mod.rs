// 缓存模块
// 包含缓存键和 Redis 操作

pub mod keys;
pub mod operations;

pub use operations::{RedisSessionCache, SessionCache};
