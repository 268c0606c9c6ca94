use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::error::AppError;

const MAX_NAME_LEN: usize = 64;

#[derive(Debug, Serialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub categories_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub categories_name: String,
}

impl CategoryRequest {
    pub fn validated_name(&self) -> Result<String, AppError> {
        let name = self.categories_name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(AppError::Validation(format!(
                "category name must be 1 to {} characters",
                MAX_NAME_LEN
            )));
        }
        Ok(name.to_string())
    }
}

impl Category {
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, categories_name, created_at, updated_at
            FROM categories
            WHERE deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, categories_name, created_at, updated_at
            FROM categories
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, categories_name, created_at, updated_at
            FROM categories
            WHERE categories_name = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &PgPool, name: &str) -> Result<Self, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (categories_name)
            VALUES ($1)
            RETURNING id, categories_name, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(pool)
        .await?;

        tracing::info!("Created category: {}", category.id);
        Ok(category)
    }

    pub async fn update(pool: &PgPool, id: i64, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET categories_name = $1, updated_at = NOW()
            WHERE id = $2 AND deleted_at IS NULL
            RETURNING id, categories_name, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn soft_delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE categories SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed() {
        let req = CategoryRequest {
            categories_name: "  Espresso ".into(),
        };
        assert_eq!(req.validated_name().unwrap(), "Espresso");
    }

    #[test]
    fn blank_name_is_rejected() {
        let req = CategoryRequest {
            categories_name: "   ".into(),
        };
        assert!(matches!(req.validated_name(), Err(AppError::Validation(_))));
    }

    #[test]
    fn overlong_name_is_rejected() {
        let req = CategoryRequest {
            categories_name: "x".repeat(MAX_NAME_LEN + 1),
        };
        assert!(req.validated_name().is_err());
    }
}
