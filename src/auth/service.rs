use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::auth::token::{Claims, TokenIssuer};
use crate::cache::SessionCache;
use crate::database::models::user::{NewUser, Role, UserChanges, UserEntity};
use crate::database::repositories::user::UserStore;
use crate::error::AuthError;
use crate::utils::{hash_password, verify_password};

const MIN_PASSWORD_LEN: usize = 6;
// bcrypt 只使用前 72 字节
const MAX_PASSWORD_LEN: usize = 72;
// 邮箱不存在时用来比对的占位密码
const DUMMY_PASSWORD: &str = "coffee_shop_dummy_password";

#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub phone_number: String,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserEntity,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub phone_number: Option<String>,
}

/// 认证服务：注册、登录、刷新、登出
///
/// 不做任何内部重试，所有失败都以 [`AuthError`] 返回给调用方。
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionCache>,
    tokens: TokenIssuer,
    hash_cost: u32,
    // 与真实账户同等 cost 的哈希，首次使用时生成
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionCache>,
        tokens: TokenIssuer,
        hash_cost: u32,
    ) -> Self {
        Self {
            users,
            sessions,
            tokens,
            hash_cost,
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub async fn register(&self, registration: Registration) -> Result<UserEntity, AuthError> {
        let email = normalize_email(&registration.email)?;
        let name = normalize_name(&registration.name)?;
        validate_password(&registration.password)?;

        // 预检查只是优化，唯一约束才是最终保证
        if self.users.exists(&email).await? {
            tracing::info!("Registration rejected, email already in use");
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hash(registration.password).await?;

        let user = self
            .users
            .insert(NewUser {
                name,
                email,
                password_hash,
                role: registration.role,
                phone_number: registration.phone_number.trim().to_string(),
            })
            .await?;

        tracing::info!("User registered: id={}, role={}", user.id, user.role);
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let email = email.trim().to_lowercase();

        // 邮箱不存在与密码错误返回同一种错误，且同样要做一次 bcrypt 比对
        let Some(user) = self.users.find_by_email(&email).await? else {
            let dummy_hash = self
                .dummy_hash
                .get_or_try_init(|| self.hash(DUMMY_PASSWORD.to_string()))
                .await?
                .clone();
            self.check_password(password, dummy_hash, None).await?;
            tracing::info!("Login failed for unknown account");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .check_password(password, user.password_hash.clone(), Some(user.id))
            .await?
        {
            tracing::info!("Login failed for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self
            .tokens
            .issue_access_token(user.id, &user.email, user.role)?;
        let refresh_token = self
            .tokens
            .issue_refresh_token(user.id, &user.email, user.role)?;

        // 覆盖旧会话
        self.sessions
            .put(&user.email, &refresh_token, self.tokens.refresh_ttl())
            .await?;

        tracing::info!("User {} logged in", user.id);
        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }

    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.tokens.verify_refresh(refresh_token)?;

        match self.sessions.get(&claims.email).await? {
            Some(current) if current == refresh_token => {}
            _ => {
                tracing::warn!("Refresh rejected for user {}: session revoked", claims.user_id);
                return Err(AuthError::SessionRevoked);
            }
        }

        self.tokens
            .issue_access_token(claims.user_id, &claims.email, claims.role)
    }

    /// 幂等，重复登出不是错误
    pub async fn logout(&self, email: &str) -> Result<(), AuthError> {
        self.sessions.delete(&email.trim().to_lowercase()).await?;
        tracing::info!("Session cleared");
        Ok(())
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens.verify_access(token)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<UserEntity, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// 更新当前用户资料，成功后使其会话失效
    pub async fn update_user(
        &self,
        actor: &Claims,
        update: ProfileUpdate,
    ) -> Result<UserEntity, AuthError> {
        if let Some(role) = update.role {
            if role != actor.role && !actor.role.is_admin() {
                tracing::warn!("User {} attempted to change role to {}", actor.user_id, role);
                return Err(AuthError::PermissionDenied);
            }
        }

        let name = update.name.as_deref().map(normalize_name).transpose()?;
        let password_hash = match update.password {
            Some(password) => {
                validate_password(&password)?;
                Some(self.hash(password).await?)
            }
            None => None,
        };

        // 先清除会话，缓存不可用时不修改资料
        self.logout(&actor.email).await?;

        let user = self
            .users
            .update(
                actor.user_id,
                UserChanges {
                    name,
                    password_hash,
                    role: update.role,
                    phone_number: update.phone_number.map(|p| p.trim().to_string()),
                },
            )
            .await?
            .ok_or(AuthError::UserNotFound)?;

        tracing::info!("User {} updated profile", user.id);
        Ok(user)
    }

    /// 软删除当前用户并清除会话
    ///
    /// 会话先于账户清除，避免已删除用户仍持有可用的刷新令牌。
    pub async fn delete_user(&self, actor: &Claims) -> Result<(), AuthError> {
        self.logout(&actor.email).await?;

        if !self.users.soft_delete(actor.user_id).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!("User {} deleted", actor.user_id);
        Ok(())
    }

    /// 哈希损坏时记录错误并按密码不匹配处理
    async fn check_password(
        &self,
        password: &str,
        password_hash: String,
        user_id: Option<i64>,
    ) -> Result<bool, AuthError> {
        let password = password.to_string();
        let verified =
            tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
                .await
                .map_err(|_| AuthError::PasswordHash)?;

        Ok(verified.unwrap_or_else(|e| {
            tracing::error!("Stored password hash is unusable (user {:?}): {}", user_id, e);
            false
        }))
    }

    async fn hash(&self, password: String) -> Result<String, AuthError> {
        let cost = self.hash_cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|_| AuthError::PasswordHash)?
            .map_err(|e| {
                tracing::error!("Password hashing failed: {}", e);
                AuthError::PasswordHash
            })
    }
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AuthError::Validation("invalid email address".into())),
    }
}

fn normalize_name(name: &str) -> Result<String, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::Validation("name must not be empty".into()));
    }
    Ok(name.to_string())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LEN || password.len() > MAX_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "password must be between {} and {} bytes",
            MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
        )));
    }
    Ok(())
}
