//! 测试用的内存实现，代替 Redis 和 PostgreSQL

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;

use crate::cache::SessionCache;
use crate::database::models::user::{NewUser, UserChanges, UserEntity};
use crate::database::repositories::user::UserStore;
use crate::error::AuthError;

struct CachedToken {
    token: String,
    ttl: Duration,
    expires_at: Instant,
}

#[derive(Default)]
pub struct MemorySessionCache {
    entries: Mutex<HashMap<String, CachedToken>>,
    offline: AtomicBool,
}

impl MemorySessionCache {
    /// 模拟缓存连接中断
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// 最近一次写入时使用的 TTL
    pub fn ttl_of(&self, email: &str) -> Option<Duration> {
        self.entries.lock().unwrap().get(email).map(|entry| entry.ttl)
    }

    fn check_online(&self) -> Result<(), AuthError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(AuthError::StoreUnavailable)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionCache for MemorySessionCache {
    async fn put(
        &self,
        email: &str,
        refresh_token: &str,
        ttl: Duration,
    ) -> Result<(), AuthError> {
        self.check_online()?;
        self.entries.lock().unwrap().insert(
            email.to_string(),
            CachedToken {
                token: refresh_token.to_string(),
                ttl,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, email: &str) -> Result<Option<String>, AuthError> {
        self.check_online()?;
        let mut entries = self.entries.lock().unwrap();
        match entries.get(email) {
            Some(entry) if entry.expires_at <= Instant::now() => {
                entries.remove(email);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.token.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, email: &str) -> Result<(), AuthError> {
        self.check_online()?;
        self.entries.lock().unwrap().remove(email);
        Ok(())
    }
}

/// 内存用户存储，邮箱唯一性在插入时检查，行为等同数据库唯一约束
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<UserEntity>>,
    /// 为 true 时 `exists` 总是返回 false，用于模拟并发注册绕过预检查
    pub skip_exists_check: AtomicBool,
}

impl MemoryUserStore {
    /// 直接覆盖存储的哈希，模拟数据损坏
    pub fn corrupt_password_hash(&self, email: &str, password_hash: &str) {
        if let Some(user) = self.users.lock().unwrap().iter_mut().find(|u| u.email == email) {
            user.password_hash = password_hash.to_string();
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, AuthError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }

    async fn exists(&self, email: &str) -> Result<bool, AuthError> {
        if self.skip_exists_check.load(Ordering::SeqCst) {
            return Ok(false);
        }
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn insert(&self, user: NewUser) -> Result<UserEntity, AuthError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.email == user.email && u.deleted_at.is_none())
        {
            return Err(AuthError::DuplicateEmail);
        }

        let now = Utc::now();
        let entity = UserEntity {
            id: users.len() as i64 + 1,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            phone_number: user.phone_number,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        users.push(entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<UserEntity>, AuthError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id && u.deleted_at.is_none())
            .cloned())
    }

    async fn update(
        &self,
        user_id: i64,
        changes: UserChanges,
    ) -> Result<Option<UserEntity>, AuthError> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users
            .iter_mut()
            .find(|u| u.id == user_id && u.deleted_at.is_none())
        else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(phone_number) = changes.phone_number {
            user.phone_number = phone_number;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn soft_delete(&self, user_id: i64) -> Result<bool, AuthError> {
        let mut users = self.users.lock().unwrap();
        match users
            .iter_mut()
            .find(|u| u.id == user_id && u.deleted_at.is_none())
        {
            Some(user) => {
                user.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
