use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::models::user::{NewUser, UserChanges, UserEntity, UserRow};
use crate::error::AuthError;

/// 用户凭据存储
///
/// 所有查询都忽略已软删除的用户。邮箱唯一性由数据库约束保证，
/// `insert` 在约束冲突时返回 [`AuthError::DuplicateEmail`]。
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, AuthError>;

    async fn exists(&self, email: &str) -> Result<bool, AuthError>;

    async fn insert(&self, user: NewUser) -> Result<UserEntity, AuthError>;

    async fn find_by_id(&self, user_id: i64) -> Result<Option<UserEntity>, AuthError>;

    async fn update(
        &self,
        user_id: i64,
        changes: UserChanges,
    ) -> Result<Option<UserEntity>, AuthError>;

    /// 返回是否有行被标记删除
    async fn soft_delete(&self, user_id: i64) -> Result<bool, AuthError>;
}

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, phone_number, created_at, updated_at, deleted_at";

/// PostgreSQL 用户存储
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_error(e: sqlx::Error) -> AuthError {
    tracing::error!("User store error: {:?}", e);
    AuthError::StoreUnavailable
}

fn into_entity(row: Option<UserRow>) -> Result<Option<UserEntity>, AuthError> {
    row.map(UserEntity::try_from).transpose()
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        into_entity(row)
    }

    async fn exists(&self, email: &str) -> Result<bool, AuthError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE email = $1 AND deleted_at IS NULL",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(count > 0)
    }

    async fn insert(&self, user: NewUser) -> Result<UserEntity, AuthError> {
        let result = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role, phone_number)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.phone_number)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => {
                tracing::info!("Created user: {}", row.id);
                UserEntity::try_from(row)
            }
            // 并发注册时以唯一约束为准
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                tracing::warn!("Unique constraint rejected registration");
                Err(AuthError::DuplicateEmail)
            }
            Err(e) => Err(store_error(e)),
        }
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<UserEntity>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        into_entity(row)
    }

    async fn update(
        &self,
        user_id: i64,
        changes: UserChanges,
    ) -> Result<Option<UserEntity>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($1, name),
                password_hash = COALESCE($2, password_hash),
                role = COALESCE($3, role),
                phone_number = COALESCE($4, phone_number),
                updated_at = NOW()
            WHERE id = $5 AND deleted_at IS NULL
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(changes.name)
        .bind(changes.password_hash)
        .bind(changes.role.map(|r| r.as_str()))
        .bind(changes.phone_number)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        into_entity(row)
    }

    async fn soft_delete(&self, user_id: i64) -> Result<bool, AuthError> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(result.rows_affected() > 0)
    }
}
