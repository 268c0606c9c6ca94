use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Menu {
    pub id: i64,
    pub menu_name: String,
    pub price: f64,
    pub description: String,
    pub image_url: String,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMenuRequest {
    pub menu_name: String,
    pub price: f64,
    pub category_id: i64,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMenuRequest {
    pub menu_name: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MenuFilter {
    pub category_id: Option<i64>,
}

/// 校验后的菜单字段
#[derive(Debug, Clone, PartialEq)]
pub struct MenuDraft {
    pub menu_name: String,
    pub price: f64,
    pub category_id: i64,
    pub description: String,
    pub image_url: String,
}

fn validate_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("menu name must not be empty".into()));
    }
    Ok(name.to_string())
}

fn validate_price(price: f64) -> Result<f64, AppError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::Validation("price must be greater than zero".into()));
    }
    Ok(price)
}

impl CreateMenuRequest {
    pub fn into_draft(self) -> Result<MenuDraft, AppError> {
        Ok(MenuDraft {
            menu_name: validate_name(&self.menu_name)?,
            price: validate_price(self.price)?,
            category_id: self.category_id,
            description: self.description.unwrap_or_default(),
            image_url: self.image_url.unwrap_or_default(),
        })
    }
}

impl UpdateMenuRequest {
    /// 合并到现有菜单上，未提供的字段保持原值
    pub fn apply_to(self, current: &Menu) -> Result<MenuDraft, AppError> {
        Ok(MenuDraft {
            menu_name: match self.menu_name {
                Some(name) => validate_name(&name)?,
                None => current.menu_name.clone(),
            },
            price: match self.price {
                Some(price) => validate_price(price)?,
                None => current.price,
            },
            category_id: self.category_id.unwrap_or(current.category_id),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            image_url: self.image_url.unwrap_or_else(|| current.image_url.clone()),
        })
    }
}

const MENU_COLUMNS: &str =
    "id, menu_name, price, description, image_url, category_id, created_at, updated_at";

impl Menu {
    pub async fn find_all(pool: &PgPool, filter: &MenuFilter) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Menu>(&format!(
            r#"
            SELECT {}
            FROM menu
            WHERE deleted_at IS NULL AND ($1::BIGINT IS NULL OR category_id = $1)
            ORDER BY id
            "#,
            MENU_COLUMNS
        ))
        .bind(filter.category_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Menu>(&format!(
            "SELECT {} FROM menu WHERE id = $1 AND deleted_at IS NULL",
            MENU_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Menu>(&format!(
            "SELECT {} FROM menu WHERE menu_name = $1 AND deleted_at IS NULL",
            MENU_COLUMNS
        ))
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &PgPool, draft: &MenuDraft) -> Result<Self, sqlx::Error> {
        let menu = sqlx::query_as::<_, Menu>(&format!(
            r#"
            INSERT INTO menu (menu_name, price, description, image_url, category_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            MENU_COLUMNS
        ))
        .bind(&draft.menu_name)
        .bind(draft.price)
        .bind(&draft.description)
        .bind(&draft.image_url)
        .bind(draft.category_id)
        .fetch_one(pool)
        .await?;

        tracing::info!("Created menu: {}", menu.id);
        Ok(menu)
    }

    pub async fn update(
        pool: &PgPool,
        id: i64,
        draft: &MenuDraft,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Menu>(&format!(
            r#"
            UPDATE menu
            SET menu_name = $1, price = $2, description = $3, image_url = $4,
                category_id = $5, updated_at = NOW()
            WHERE id = $6 AND deleted_at IS NULL
            RETURNING {}
            "#,
            MENU_COLUMNS
        ))
        .bind(&draft.menu_name)
        .bind(draft.price)
        .bind(&draft.description)
        .bind(&draft.image_url)
        .bind(draft.category_id)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn soft_delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE menu SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
