//! Session authentication middleware

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use super::cookie::{read_cookie, SESSION_COOKIE};
use crate::domain::entities::{CurrentUser, Role};
use crate::error::AppError;
use crate::AppState;

/// Extract the session token.
///
/// The Authorization header wins over the cookie. A header that is not a
/// non-empty Bearer token is rejected rather than ignored.
pub fn extract_token(headers: &HeaderMap) -> Result<String, AppError> {
    if let Some(header) = headers.get(AUTHORIZATION) {
        let token = header
            .to_str()
            .ok()
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthorized)?;
        return Ok(token.to_string());
    }

    read_cookie(headers, SESSION_COOKIE).ok_or(AppError::Unauthorized)
}

/// Authentication middleware
///
/// Resolves the session and injects the `CurrentUser` into request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(request.headers())?;

    let user = state.auth_service.authenticate(&token).await?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Fail with 403 unless the user holds one of `roles`
pub fn require_role(user: &CurrentUser, roles: &[Role]) -> Result<(), AppError> {
    if user.has_any_role(roles) {
        Ok(())
    } else {
        tracing::debug!(username = %user.username, role = %user.role, "Role not allowed");
        Err(AppError::Forbidden)
    }
}
