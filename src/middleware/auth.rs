use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    AppState,
    auth::Claims,
    error::{AppError, AuthError},
};

/// 校验 Bearer 访问令牌，并把 [`Claims`](crate::auth::Claims) 放入请求扩展
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(AppError::Unauthorized);
    };

    let claims = state.auth.verify_access(bearer.token())?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// 仅管理员可以通过，须放在 [`auth_middleware`] 之后
pub async fn require_admin(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let Some(claims) = req.extensions().get::<Claims>() else {
        return Err(AppError::Unauthorized);
    };

    if !claims.role.is_admin() {
        tracing::warn!(
            "User {} ({}) denied admin route {} {}",
            claims.user_id,
            claims.role,
            req.method(),
            req.uri().path()
        );
        return Err(AuthError::PermissionDenied.into());
    }

    Ok(next.run(req).await)
}
