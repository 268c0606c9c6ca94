use axum::extract::{Json, State};
use serde::Serialize;

use crate::{
    AppState,
    error::{AppError, AuthError},
    utils::{ApiResponse, success_to_api_response},
};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub redis: String,
}

/// 检查 Redis 连通性
pub async fn health(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<HealthResponse>>, AppError> {
    let mut conn = state
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| {
            tracing::error!("Health check cannot reach Redis: {}", e);
            AuthError::StoreUnavailable
        })?;

    let pong: String = redis::cmd("PING")
        .query_async(&mut conn)
        .await
        .map_err(|e| {
            tracing::error!("Redis PING failed: {}", e);
            AuthError::StoreUnavailable
        })?;

    Ok(success_to_api_response(HealthResponse { redis: pong }))
}
