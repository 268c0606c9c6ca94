use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::AppError,
    utils::{ApiResponse, success_to_api_response},
};

use super::model::{Category, CategoryRequest};

fn duplicate(name: &str) -> AppError {
    AppError::Conflict(format!("category already exists: {}", name))
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Category>>>, AppError> {
    let categories = Category::find_all(&state.pool).await?;
    Ok(success_to_api_response(categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Category>>, AppError> {
    let category = Category::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("category"))?;
    Ok(success_to_api_response(category))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>), AppError> {
    let name = req.validated_name()?;

    if Category::find_by_name(&state.pool, &name).await?.is_some() {
        return Err(duplicate(&name));
    }

    match Category::create(&state.pool, &name).await {
        Ok(category) => Ok((StatusCode::CREATED, success_to_api_response(category))),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(duplicate(&name)),
        Err(e) => Err(e.into()),
    }
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CategoryRequest>,
) -> Result<Json<ApiResponse<Category>>, AppError> {
    let name = req.validated_name()?;

    if Category::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::NotFound("category"));
    }

    if let Some(existing) = Category::find_by_name(&state.pool, &name).await? {
        if existing.id != id {
            return Err(duplicate(&name));
        }
    }

    let category = Category::update(&state.pool, id, &name)
        .await?
        .ok_or(AppError::NotFound("category"))?;
    Ok(success_to_api_response(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if !Category::soft_delete(&state.pool, id).await? {
        return Err(AppError::NotFound("category"));
    }

    tracing::info!("Deleted category: {}", id);
    Ok(success_to_api_response(()))
}
