use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
};

use crate::{
    AppState,
    auth::{Claims, ProfileUpdate, Registration},
    error::AppError,
    utils::{ApiResponse, success_to_api_response},
};

use super::model::{
    LoginRequest, LoginResponse, LogoutResponse, RefreshTokenRequest, RefreshTokenResponse,
    RegisterRequest, UpdateUserRequest, UserResponse,
};

type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    let registration = Registration::try_from(req)?;
    let user = state.auth.register(registration).await?;

    Ok((StatusCode::CREATED, success_to_api_response(user.into())))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let outcome = state.auth.login(&req.email, &req.password).await?;
    Ok(success_to_api_response(outcome.into()))
}

#[axum::debug_handler]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> ApiResult<RefreshTokenResponse> {
    let access_token = state.auth.refresh_access_token(&req.refresh_token).await?;
    Ok(success_to_api_response(RefreshTokenResponse { access_token }))
}

#[axum::debug_handler]
pub async fn logout(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> ApiResult<LogoutResponse> {
    state.auth.logout(&claims.email).await?;
    Ok(success_to_api_response(LogoutResponse {}))
}

#[axum::debug_handler]
pub async fn get_user(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> ApiResult<UserResponse> {
    let user = state.auth.get_user(claims.user_id).await?;
    Ok(success_to_api_response(user.into()))
}

#[axum::debug_handler]
pub async fn update_user(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<UserResponse> {
    let update = ProfileUpdate::try_from(req)?;
    let user = state.auth.update_user(&claims, update).await?;
    Ok(success_to_api_response(user.into()))
}

#[axum::debug_handler]
pub async fn delete_user(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> ApiResult<LogoutResponse> {
    state.auth.delete_user(&claims).await?;
    Ok(success_to_api_response(LogoutResponse {}))
}
