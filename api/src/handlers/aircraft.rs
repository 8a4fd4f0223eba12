//! Aircraft handlers
//!
//! Registering aircraft and uploading CSV imports.

use axum::{
    extract::{Multipart, Path, Query, State},
    Extension, Json,
};
use serde::Serialize;

use super::upload::{read_form, PublishQuery};
use crate::auth::require_role;
use crate::domain::entities::{Aircraft, AircraftId, CurrentUser, ImportBatch, ImportSummary, Role};
use crate::error::AppError;
use crate::AppState;

/// Response for a newly registered aircraft
#[derive(Debug, Serialize)]
pub struct CreateAircraftResponse {
    #[serde(flatten)]
    pub aircraft: Aircraft,
    /// Present when a file was uploaded with the form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<ImportSummary>,
}

/// POST /aircraft
///
/// Multipart form with `name`, optional `model` and optional `file`.
pub async fn create_aircraft(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<PublishQuery>,
    multipart: Multipart,
) -> Result<Json<CreateAircraftResponse>, AppError> {
    require_role(&user, &Role::WRITERS)?;
    let mode = query.mode()?;
    let form = read_form(multipart).await?;

    let name = form
        .name
        .ok_or_else(|| AppError::BadRequest("Missing form field 'name'".to_string()))?;

    let (aircraft, import) = state
        .aircraft_service
        .create(&name, form.model.as_deref(), form.file.as_ref(), mode)
        .await?;

    Ok(Json(CreateAircraftResponse { aircraft, import }))
}

/// GET /aircraft
pub async fn list_aircraft(
    State(state): State<AppState>,
) -> Result<Json<Vec<Aircraft>>, AppError> {
    Ok(Json(state.aircraft_service.list().await?))
}

/// GET /aircraft/:aircraft_id
pub async fn get_aircraft(
    State(state): State<AppState>,
    Path(aircraft_id): Path<i64>,
) -> Result<Json<Aircraft>, AppError> {
    Ok(Json(
        state.aircraft_service.get(&AircraftId(aircraft_id)).await?,
    ))
}

/// GET /aircraft/:aircraft_id/imports
///
/// Import batches of the aircraft, newest first.
pub async fn list_imports(
    State(state): State<AppState>,
    Path(aircraft_id): Path<i64>,
) -> Result<Json<Vec<ImportBatch>>, AppError> {
    let batches = state
        .aircraft_service
        .list_imports(&AircraftId(aircraft_id))
        .await?;
    Ok(Json(batches))
}

/// POST /aircraft/:aircraft_id/imports
///
/// Multipart form with a `file` part; `publish_mode` is `quarantine` (default)
/// or `strict`.
pub async fn upload_import(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(aircraft_id): Path<i64>,
    Query(query): Query<PublishQuery>,
    multipart: Multipart,
) -> Result<Json<ImportSummary>, AppError> {
    require_role(&user, &Role::WRITERS)?;
    let mode = query.mode()?;
    let form = read_form(multipart).await?;

    let upload = form
        .file
        .ok_or_else(|| AppError::BadRequest("Missing form field 'file'".to_string()))?;

    let summary = state
        .aircraft_service
        .import(&AircraftId(aircraft_id), &upload, mode)
        .await?;

    Ok(Json(summary))
}
