use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};

use crate::cache::keys::refresh_token_key;
use crate::error::AuthError;

/// 会话缓存：每个邮箱最多一条当前有效的刷新令牌
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// 写入或覆盖，`ttl` 到期后自动失效
    async fn put(
        &self,
        email: &str,
        refresh_token: &str,
        ttl: Duration,
    ) -> Result<(), AuthError>;

    async fn get(&self, email: &str) -> Result<Option<String>, AuthError>;

    /// 删除不存在的键不是错误
    async fn delete(&self, email: &str) -> Result<(), AuthError>;
}

/// Redis 会话缓存
#[derive(Clone)]
pub struct RedisSessionCache {
    redis: Arc<RedisClient>,
}

impl RedisSessionCache {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, AuthError> {
        self.redis
            .get_multiplexed_async_connection()
            .await
            .map_err(cache_error)
    }
}

fn cache_error(e: redis::RedisError) -> AuthError {
    tracing::error!("Session cache error: {}", e);
    AuthError::StoreUnavailable
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn put(
        &self,
        email: &str,
        refresh_token: &str,
        ttl: Duration,
    ) -> Result<(), AuthError> {
        let mut conn = self.connection().await?;

        // SET EX 不接受 0 秒
        let secs = ttl.as_secs().max(1);
        let _: () = conn
            .set_ex(refresh_token_key(email), refresh_token, secs)
            .await
            .map_err(cache_error)?;

        Ok(())
    }

    async fn get(&self, email: &str) -> Result<Option<String>, AuthError> {
        let mut conn = self.connection().await?;

        let result: Option<String> = conn
            .get(refresh_token_key(email))
            .await
            .map_err(cache_error)?;

        Ok(result)
    }

    async fn delete(&self, email: &str) -> Result<(), AuthError> {
        let mut conn = self.connection().await?;

        let _: () = conn
            .del(refresh_token_key(email))
            .await
            .map_err(cache_error)?;

        Ok(())
    }
}
