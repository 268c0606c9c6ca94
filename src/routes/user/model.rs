use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{LoginOutcome, ProfileUpdate, Registration};
use crate::database::{Role, UserEntity};
use crate::error::AuthError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
    pub phone_number: Option<String>,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = AuthError;

    fn try_from(req: RegisterRequest) -> Result<Self, Self::Error> {
        let role = match req.role.as_deref() {
            Some(role) if !role.trim().is_empty() => role.parse()?,
            _ => Role::default(),
        };
        // 公开注册不能直接成为管理员
        if role.is_admin() {
            return Err(AuthError::PermissionDenied);
        }

        Ok(Registration {
            name: req.name,
            email: req.email,
            password: req.password,
            role,
            phone_number: req.phone_number.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub phone_number: Option<String>,
}

impl TryFrom<UpdateUserRequest> for ProfileUpdate {
    type Error = AuthError;

    fn try_from(req: UpdateUserRequest) -> Result<Self, Self::Error> {
        Ok(ProfileUpdate {
            name: req.name,
            password: req.password,
            role: req.role.as_deref().map(str::parse::<Role>).transpose()?,
            phone_number: req.phone_number,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserEntity> for UserResponse {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            phone_number: user.phone_number,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            user: outcome.user.into(),
            access_token: outcome.access_token,
            refresh_token: outcome.refresh_token,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request(role: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            name: "Ana".into(),
            email: "ana@x.com".into(),
            password: "secret123".into(),
            role: role.map(String::from),
            phone_number: None,
        }
    }

    #[test]
    fn missing_role_defaults_to_customer() {
        let registration = Registration::try_from(register_request(None)).unwrap();
        assert_eq!(registration.role, Role::Customer);
        assert_eq!(registration.phone_number, "");
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(matches!(
            Registration::try_from(register_request(Some("owner"))),
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn self_registration_as_admin_is_denied() {
        assert_eq!(
            Registration::try_from(register_request(Some("admin"))).unwrap_err(),
            AuthError::PermissionDenied
        );
        let cashier = Registration::try_from(register_request(Some("cashier"))).unwrap();
        assert_eq!(cashier.role, Role::Cashier);
    }

    #[test]
    fn update_parses_role() {
        let update = ProfileUpdate::try_from(UpdateUserRequest {
            name: None,
            password: None,
            role: Some("Cashier".into()),
            phone_number: None,
        })
        .unwrap();
        assert_eq!(update.role, Some(Role::Cashier));
    }
}
