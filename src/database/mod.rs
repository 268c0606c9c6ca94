// 数据库模块
// 用户实体定义和凭据存储

pub mod models;
pub mod repositories;

pub use models::user::{Role, UserEntity};
pub use repositories::user::{PgUserStore, UserStore};
