use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use sqlx::PgPool;

use crate::{
    AppState,
    error::AppError,
    routes::category::Category,
    utils::{ApiResponse, success_to_api_response},
};

use super::model::{CreateMenuRequest, Menu, MenuDraft, MenuFilter, UpdateMenuRequest};

fn duplicate(name: &str) -> AppError {
    AppError::Conflict(format!("menu name already exists: {}", name))
}

/// 菜品名唯一，且分类必须存在
async fn check_draft(
    pool: &PgPool,
    draft: &MenuDraft,
    own_id: Option<i64>,
) -> Result<(), AppError> {
    if let Some(existing) = Menu::find_by_name(pool, &draft.menu_name).await? {
        if Some(existing.id) != own_id {
            return Err(duplicate(&draft.menu_name));
        }
    }

    if Category::find_by_id(pool, draft.category_id).await?.is_none() {
        return Err(AppError::Validation(format!(
            "unknown category: {}",
            draft.category_id
        )));
    }

    Ok(())
}

pub async fn list_menus(
    State(state): State<AppState>,
    Query(filter): Query<MenuFilter>,
) -> Result<Json<ApiResponse<Vec<Menu>>>, AppError> {
    let menus = Menu::find_all(&state.pool, &filter).await?;
    Ok(success_to_api_response(menus))
}

pub async fn get_menu(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Menu>>, AppError> {
    let menu = Menu::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("menu"))?;
    Ok(success_to_api_response(menu))
}

pub async fn create_menu(
    State(state): State<AppState>,
    Json(req): Json<CreateMenuRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Menu>>), AppError> {
    let draft = req.into_draft()?;
    check_draft(&state.pool, &draft, None).await?;

    match Menu::create(&state.pool, &draft).await {
        Ok(menu) => Ok((StatusCode::CREATED, success_to_api_response(menu))),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(duplicate(&draft.menu_name))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn update_menu(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateMenuRequest>,
) -> Result<Json<ApiResponse<Menu>>, AppError> {
    let current = Menu::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("menu"))?;

    let draft = req.apply_to(&current)?;
    check_draft(&state.pool, &draft, Some(id)).await?;

    let menu = Menu::update(&state.pool, id, &draft)
        .await?
        .ok_or(AppError::NotFound("menu"))?;
    Ok(success_to_api_response(menu))
}

pub async fn delete_menu(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if !Menu::soft_delete(&state.pool, id).await? {
        return Err(AppError::NotFound("menu"));
    }

    tracing::info!("Deleted menu: {}", id);
    Ok(success_to_api_response(()))
}
