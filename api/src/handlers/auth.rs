//! Session handlers
//!
//! Login, logout and the current user.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{clear_session_cookie, session_cookie};
use crate::domain::entities::CurrentUser;
use crate::error::AppError;
use crate::AppState;

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response body for login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Session token (Authorization: Bearer <token>); also set as a cookie
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: CurrentUser,
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .auth_service
        .login(&request.username, &request.password)
        .await?;

    let cookie = session_cookie(
        &state.config.cookie,
        &user.session_token,
        state.config.session_duration_seconds,
    );

    let response = LoginResponse {
        token: user.session_token.clone(),
        expires_at: user.session_expires_at,
        user,
    };

    Ok(([(SET_COOKIE, cookie)], Json(response)))
}

/// POST /auth/logout
///
/// Ends the current session and clears the cookie.
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    state.auth_service.logout(&user.session_token).await?;
    tracing::info!(username = %user.username, "Logout");

    Ok((
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, clear_session_cookie(&state.config.cookie))],
    ))
}

/// GET /auth/me
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<CurrentUser> {
    Json(user)
}
