//! User management handlers (admin only)

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;

use crate::auth::require_role;
use crate::domain::entities::{CurrentUser, Role, User};
use crate::error::AppError;
use crate::AppState;

/// Request to create a user
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    /// `admin`, `mechanic` or `auditor`
    pub role: String,
}

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<User>>, AppError> {
    require_role(&user, &[Role::Admin])?;
    Ok(Json(state.auth_service.list_users().await?))
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    require_role(&user, &[Role::Admin])?;
    let role: Role = request.role.parse().map_err(AppError::BadRequest)?;

    let created = state
        .auth_service
        .create_user(&request.username, &request.password, role)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}
