use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::utils::{error_codes, error_to_api_response};

/// 认证与会话相关错误
///
/// 错误信息中不得包含密码或令牌原文。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    ExpiredToken,
    #[error("session revoked")]
    SessionRevoked,
    #[error("backing store unavailable")]
    StoreUnavailable,
    #[error("user not found")]
    UserNotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("{0}")]
    Validation(String),
    #[error("failed to sign token")]
    Signing,
    #[error("failed to hash password")]
    PasswordHash,
}

/// 应用层错误，统一转换为 HTTP 响应
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("unauthorized")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, i32) {
        match self {
            AppError::Auth(e) => match e {
                AuthError::DuplicateEmail => (StatusCode::CONFLICT, error_codes::USER_EXISTS),
                AuthError::InvalidCredentials
                | AuthError::InvalidToken
                | AuthError::ExpiredToken
                | AuthError::SessionRevoked => (StatusCode::UNAUTHORIZED, error_codes::AUTH_FAILED),
                AuthError::UserNotFound => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
                AuthError::PermissionDenied => {
                    (StatusCode::FORBIDDEN, error_codes::PERMISSION_DENIED)
                }
                AuthError::Validation(_) => {
                    (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR)
                }
                AuthError::StoreUnavailable => {
                    (StatusCode::SERVICE_UNAVAILABLE, error_codes::INTERNAL_ERROR)
                }
                AuthError::Signing | AuthError::PasswordHash => {
                    (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR)
                }
            },
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, error_codes::AUTH_FAILED),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
            AppError::Conflict(_) => (StatusCode::CONFLICT, error_codes::RESOURCE_EXISTS),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR),
            AppError::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if let AppError::Database(e) = &self {
            tracing::error!("Database error: {:?}", e);
        }

        (status, error_to_api_response::<()>(code, self.to_string())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_failures_share_one_status() {
        let (status, code) = AppError::from(AuthError::InvalidCredentials).status_and_code();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(code, error_codes::AUTH_FAILED);
    }

    #[test]
    fn duplicate_email_maps_to_conflict() {
        let (status, code) = AppError::from(AuthError::DuplicateEmail).status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, error_codes::USER_EXISTS);
    }

    #[test]
    fn store_outage_is_service_unavailable() {
        let (status, _) = AppError::from(AuthError::StoreUnavailable).status_and_code();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
