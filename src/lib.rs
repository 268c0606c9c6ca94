use std::sync::Arc;

use auth::{AuthService, TokenIssuer};
use cache::RedisSessionCache;
use config::Config;
use database::repositories::user::PgUserStore;
use redis::Client as RedisClient;
use sqlx::PgPool;

pub mod auth;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod utils;

#[cfg(test)]
mod test_support;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub redis: Arc<RedisClient>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// 用 PostgreSQL 和 Redis 组装认证服务
    pub fn new(pool: PgPool, config: Config, redis: Arc<RedisClient>) -> Self {
        let auth = AuthService::new(
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(RedisSessionCache::new(redis.clone())),
            TokenIssuer::from_config(&config),
            config.bcrypt_cost,
        );

        Self {
            pool,
            config,
            redis,
            auth: Arc::new(auth),
        }
    }
}
