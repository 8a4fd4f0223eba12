//! SQLite adapter for ImportBatchRepository
//!
//! An import is written in one transaction: the batch row is inserted as
//! `validated`, followed by its issues, items and quarantine rows, and is then
//! finalized with its counters and status.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use super::maintenance_item_repo::item_active_model;
use super::quarantine_repo::quarantine_active_model;
use super::write_error;
use crate::domain::entities::{
    AircraftId, BatchStatus, ImportBatch, ImportBatchId, ImportIssue, NewImport, PageRequest,
    RowIssue,
};
use crate::domain::ports::ImportBatchRepository;
use crate::entity::{import_batch, import_error, maintenance_item, maintenance_item_quarantine};
use crate::error::DomainError;

/// SQLite implementation of ImportBatchRepository
pub struct SqliteImportBatchRepository {
    db: DatabaseConnection,
}

impl SqliteImportBatchRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ImportBatchRepository for SqliteImportBatchRepository {
    async fn find_by_id(&self, id: &ImportBatchId) -> Result<Option<ImportBatch>, DomainError> {
        let result = import_batch::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        result.map(ImportBatch::try_from).transpose()
    }

    async fn find_by_file_hash(
        &self,
        aircraft_id: &AircraftId,
        file_sha256: &str,
    ) -> Result<Option<ImportBatch>, DomainError> {
        let result = import_batch::Entity::find()
            .filter(import_batch::Column::AircraftId.eq(aircraft_id.0))
            .filter(import_batch::Column::FileSha256.eq(file_sha256))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        result.map(ImportBatch::try_from).transpose()
    }

    async fn list_by_aircraft(
        &self,
        aircraft_id: &AircraftId,
    ) -> Result<Vec<ImportBatch>, DomainError> {
        let results = import_batch::Entity::find()
            .filter(import_batch::Column::AircraftId.eq(aircraft_id.0))
            .order_by_desc(import_batch::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        results.into_iter().map(ImportBatch::try_from).collect()
    }

    async fn record(&self, import: &NewImport) -> Result<ImportBatch, DomainError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let batch = import_batch::ActiveModel {
            aircraft_id: Set(import.aircraft_id.0),
            file_name: Set(import.file_name.clone()),
            file_sha256: Set(import.file_sha256.clone()),
            started_at: Set(import.started_at),
            completed_at: Set(None),
            total_rows: Set(import.total_rows),
            inserted_rows: Set(0),
            error_rows: Set(0),
            status: Set(BatchStatus::Validated.to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            write_error(e, || {
                DomainError::Conflict("File already imported for this aircraft".to_string())
            })
        })?;

        let now = Utc::now();

        for issue in &import.issues {
            import_error::Entity::insert(import_error::ActiveModel {
                import_batch_id: Set(batch.id),
                row_index: Set(issue.row_index),
                field: Set(issue.field.clone()),
                message: Set(issue.message.clone()),
                severity: Set(issue.severity.to_string()),
                created_at: Set(now),
                ..Default::default()
            })
            .exec(&txn)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;
        }

        for record in &import.items {
            maintenance_item::Entity::insert(item_active_model(
                record,
                import.aircraft_id.0,
                batch.id,
                now,
            ))
            .exec(&txn)
            .await
            .map_err(|e| {
                write_error(e, || {
                    DomainError::Conflict(format!(
                        "Duplicate fingerprint {} in batch {}",
                        record.fingerprint, batch.id
                    ))
                })
            })?;
        }

        for entry in &import.quarantine {
            maintenance_item_quarantine::Entity::insert(quarantine_active_model(
                entry,
                import.aircraft_id.0,
                batch.id,
                now,
            ))
            .exec(&txn)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;
        }

        let mut finished: import_batch::ActiveModel = batch.into();
        finished.inserted_rows = Set(import.items.len() as i64);
        finished.error_rows = Set(import.issues.len() as i64);
        finished.status = Set(import.status.to_string());
        finished.completed_at = Set(Some(Utc::now()));

        let finished = finished
            .update(&txn)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        ImportBatch::try_from(finished)
    }

    async fn list_issues(
        &self,
        id: &ImportBatchId,
        page: PageRequest,
    ) -> Result<Vec<ImportIssue>, DomainError> {
        let results = import_error::Entity::find()
            .filter(import_error::Column::ImportBatchId.eq(id.0))
            .order_by_asc(import_error::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        results.into_iter().map(ImportIssue::try_from).collect()
    }
}

impl TryFrom<import_batch::Model> for ImportBatch {
    type Error = DomainError;

    fn try_from(model: import_batch::Model) -> Result<Self, Self::Error> {
        Ok(ImportBatch {
            id: ImportBatchId(model.id),
            aircraft_id: AircraftId(model.aircraft_id),
            file_name: model.file_name,
            file_sha256: model.file_sha256,
            started_at: model.started_at,
            completed_at: model.completed_at,
            total_rows: model.total_rows,
            inserted_rows: model.inserted_rows,
            error_rows: model.error_rows,
            status: model.status.parse().map_err(DomainError::Internal)?,
        })
    }
}

impl TryFrom<import_error::Model> for ImportIssue {
    type Error = DomainError;

    fn try_from(model: import_error::Model) -> Result<Self, Self::Error> {
        Ok(ImportIssue {
            issue: RowIssue {
                row_index: model.row_index,
                field: model.field,
                message: model.message,
                severity: model.severity.parse().map_err(DomainError::Internal)?,
            },
            created_at: model.created_at,
        })
    }
}
