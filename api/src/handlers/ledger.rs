//! Ledger handlers
//!
//! Read-only views over published items, quarantine and import batches.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::upload::page;
use crate::domain::entities::{
    AircraftId, ImportBatch, ImportBatchId, ImportIssue, ItemFilter, MaintenanceItem,
    QuarantineEntry,
};
use crate::error::AppError;
use crate::AppState;

/// Query parameters for listing items
#[derive(Debug, Default, Deserialize)]
pub struct ItemsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub status: Option<String>,
}

impl ItemsQuery {
    fn filter(&self) -> ItemFilter {
        ItemFilter::new(self.item_type.clone(), self.status.clone())
    }
}

/// Query parameters for quarantine listings
#[derive(Debug, Default, Deserialize)]
pub struct QuarantineQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub batch_id: Option<i64>,
}

/// Query parameters for plain paged listings
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ItemCountResponse {
    pub aircraft_id: AircraftId,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct QuarantineCountResponse {
    pub aircraft_id: AircraftId,
    pub batch_id: Option<ImportBatchId>,
    pub count: u64,
}

/// GET /aircraft/:aircraft_id/items
///
/// Published items (from loaded batches only), ordered by ID.
pub async fn list_items(
    State(state): State<AppState>,
    Path(aircraft_id): Path<i64>,
    Query(query): Query<ItemsQuery>,
) -> Result<Json<Vec<MaintenanceItem>>, AppError> {
    let page = page(query.limit, query.offset)?;
    let items = state
        .ledger_service
        .list_items(&AircraftId(aircraft_id), &query.filter(), page)
        .await?;
    Ok(Json(items))
}

/// GET /aircraft/:aircraft_id/items/count
pub async fn count_items(
    State(state): State<AppState>,
    Path(aircraft_id): Path<i64>,
    Query(query): Query<ItemsQuery>,
) -> Result<Json<ItemCountResponse>, AppError> {
    let aircraft_id = AircraftId(aircraft_id);
    let count = state
        .ledger_service
        .count_items(&aircraft_id, &query.filter())
        .await?;
    Ok(Json(ItemCountResponse { aircraft_id, count }))
}

/// GET /aircraft/:aircraft_id/quarantine
pub async fn list_quarantine(
    State(state): State<AppState>,
    Path(aircraft_id): Path<i64>,
    Query(query): Query<QuarantineQuery>,
) -> Result<Json<Vec<QuarantineEntry>>, AppError> {
    let page = page(query.limit, query.offset)?;
    let batch_id = query.batch_id.map(ImportBatchId);
    let entries = state
        .ledger_service
        .list_quarantine(&AircraftId(aircraft_id), batch_id.as_ref(), page)
        .await?;
    Ok(Json(entries))
}

/// GET /aircraft/:aircraft_id/quarantine/count
pub async fn count_quarantine(
    State(state): State<AppState>,
    Path(aircraft_id): Path<i64>,
    Query(query): Query<QuarantineQuery>,
) -> Result<Json<QuarantineCountResponse>, AppError> {
    let aircraft_id = AircraftId(aircraft_id);
    let batch_id = query.batch_id.map(ImportBatchId);
    let count = state
        .ledger_service
        .count_quarantine(&aircraft_id, batch_id.as_ref())
        .await?;
    Ok(Json(QuarantineCountResponse {
        aircraft_id,
        batch_id,
        count,
    }))
}

/// GET /imports/:batch_id
pub async fn get_import(
    State(state): State<AppState>,
    Path(batch_id): Path<i64>,
) -> Result<Json<ImportBatch>, AppError> {
    Ok(Json(
        state.ledger_service.get_batch(&ImportBatchId(batch_id)).await?,
    ))
}

/// GET /imports/:batch_id/errors
///
/// Row issues of the batch, warnings included, in recorded order.
pub async fn list_import_errors(
    State(state): State<AppState>,
    Path(batch_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<ImportIssue>>, AppError> {
    let page = page(query.limit, query.offset)?;
    let issues = state
        .ledger_service
        .list_batch_errors(&ImportBatchId(batch_id), page)
        .await?;
    Ok(Json(issues))
}
