use axum::Json;
use bcrypt::{hash, verify};
use serde::Serialize;

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

// 统一响应结构
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resp_data: Option<T>,
}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: error_codes::SUCCESS,
        msg: "success".into(),
        resp_data: Some(data),
    })
}

pub fn error_to_api_response<T>(code: i32, msg: String) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code,
        msg,
        resp_data: None,
    })
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const USER_EXISTS: i32 = 1001;
    pub const AUTH_FAILED: i32 = 1002;
    pub const PERMISSION_DENIED: i32 = 1003;
    pub const NOT_FOUND: i32 = 1004;
    pub const RATE_LIMIT: i32 = 1005;
    pub const RESOURCE_EXISTS: i32 = 1006;
    pub const INTERNAL_ERROR: i32 = 5000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies_only_original() {
        let hashed = hash_password("secret123", 4 /* bcrypt minimum cost; bcrypt::MIN_COST is private */).unwrap();
        assert_ne!(hashed, "secret123");
        assert!(verify_password("secret123", &hashed).unwrap());
        assert!(!verify_password("secret124", &hashed).unwrap());
    }

    #[test]
    fn error_response_omits_data() {
        let Json(body) = error_to_api_response::<()>(error_codes::NOT_FOUND, "missing".into());
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["code"], error_codes::NOT_FOUND);
        assert!(value.get("resp_data").is_none());
    }
}
