use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::user::Role;
use crate::error::AuthError;

pub const ISSUER: &str = "coffee_shop_app";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    pub typ: TokenType,
    pub iss: String,
    pub iat: i64, // 签发时间
    pub exp: i64, // 过期时间
    pub jti: String,
}

/// 令牌签发与校验
///
/// 访问令牌和刷新令牌共用一个 HS256 密钥，靠 `typ` 声明区分用途。
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.jwt_secret.as_bytes(),
            config.access_token_expiration(),
            config.refresh_token_expiration(),
        )
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn issue_access_token(
        &self,
        user_id: i64,
        email: &str,
        role: Role,
    ) -> Result<String, AuthError> {
        self.issue(TokenType::Access, user_id, email, role, Utc::now())
    }

    pub fn issue_refresh_token(
        &self,
        user_id: i64,
        email: &str,
        role: Role,
    ) -> Result<String, AuthError> {
        self.issue(TokenType::Refresh, user_id, email, role, Utc::now())
    }

    fn issue(
        &self,
        typ: TokenType,
        user_id: i64,
        email: &str,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let ttl = match typ {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let ttl = chrono::Duration::from_std(ttl).map_err(|_| AuthError::Signing)?;

        let claims = Claims {
            user_id,
            email: email.to_string(),
            role,
            typ,
            iss: ISSUER.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign token: {}", e);
            AuthError::Signing
        })
    }

    /// 校验签名、签发者和过期时间，不区分令牌类型
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_typed(token, TokenType::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_typed(token, TokenType::Refresh)
    }

    fn verify_typed(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let claims = self.verify_token(token)?;
        if claims.typ != expected {
            tracing::warn!("Rejected {:?} token used as {:?}", claims.typ, expected);
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(
            b"test_secret_key_for_testing_purposes_only",
            Duration::from_secs(15 * 60),
            Duration::from_secs(7 * 24 * 3600),
        )
    }

    #[test]
    fn access_token_round_trips_identity() {
        let issuer = issuer();
        let token = issuer
            .issue_access_token(7, "ana@x.com", Role::Customer)
            .unwrap();

        let claims = issuer.verify_token(&token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.email, "ana@x.com");
        assert_eq!(claims.role, Role::Customer);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn refresh_token_outlives_access_token() {
        let issuer = issuer();
        let token = issuer
            .issue_refresh_token(7, "ana@x.com", Role::Admin)
            .unwrap();

        let claims = issuer.verify_refresh(&token).unwrap();
        assert_eq!(claims.typ, TokenType::Refresh);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let issuer = issuer();
        let issued_at = Utc::now() - chrono::Duration::hours(2);
        let token = issuer
            .issue(TokenType::Access, 7, "ana@x.com", Role::Customer, issued_at)
            .unwrap();

        assert_eq!(issuer.verify_token(&token), Err(AuthError::ExpiredToken));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let other = TokenIssuer::new(
            b"another_secret",
            Duration::from_secs(60),
            Duration::from_secs(120),
        );
        let token = other
            .issue_access_token(7, "ana@x.com", Role::Customer)
            .unwrap();

        assert_eq!(issuer().verify_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn expired_token_with_bad_signature_is_invalid() {
        let other = TokenIssuer::new(
            b"another_secret",
            Duration::from_secs(60),
            Duration::from_secs(120),
        );
        let token = other
            .issue(
                TokenType::Access,
                7,
                "ana@x.com",
                Role::Customer,
                Utc::now() - chrono::Duration::hours(2),
            )
            .unwrap();

        assert_eq!(issuer().verify_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(
            issuer().verify_token("invalid.token.string"),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn token_types_are_not_interchangeable() {
        let issuer = issuer();
        let refresh = issuer
            .issue_refresh_token(7, "ana@x.com", Role::Customer)
            .unwrap();
        let access = issuer
            .issue_access_token(7, "ana@x.com", Role::Customer)
            .unwrap();

        assert_eq!(issuer.verify_access(&refresh), Err(AuthError::InvalidToken));
        assert_eq!(issuer.verify_refresh(&access), Err(AuthError::InvalidToken));
    }

    #[test]
    fn tokens_issued_together_are_distinct() {
        let issuer = issuer();
        let a = issuer
            .issue_refresh_token(7, "ana@x.com", Role::Customer)
            .unwrap();
        let b = issuer
            .issue_refresh_token(7, "ana@x.com", Role::Customer)
            .unwrap();
        assert_ne!(a, b);
    }
}
