//! Import service
//!
//! Loads a CSV upload into the ledger as one import batch.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::csv_import::{file_sha256, parse_csv, sanitize, validate, RawRow};
use crate::domain::entities::{
    AircraftId, BatchStatus, ImportSummary, NewImport, NewQuarantineEntry, PublishMode,
    QuarantineReason, RowIssue, INSERT_FIELD,
};
use crate::domain::ports::{AircraftRepository, ImportBatchRepository};
use crate::error::{AppError, DomainError};

/// File name recorded when the upload does not carry one
pub const DEFAULT_FILE_NAME: &str = "upload.csv";

/// An uploaded file as received
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: Option<String>, content: Vec<u8>) -> Self {
        let file_name = file_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
        Self { file_name, content }
    }
}

/// An upload whose structure has been checked, ready to be committed
#[derive(Debug, Clone)]
pub struct PreparedImport {
    pub file_name: String,
    pub file_sha256: String,
    pub started_at: DateTime<Utc>,
    rows: Vec<RawRow>,
}

impl PreparedImport {
    /// Parse the file and hash its bytes.
    ///
    /// Fails when the file is empty or lacks expected columns.
    pub fn from_upload(upload: &Upload) -> Result<Self, AppError> {
        let started_at = Utc::now();
        let rows = parse_csv(&upload.content)?;

        Ok(Self {
            file_name: upload.file_name.clone(),
            file_sha256: file_sha256(&upload.content),
            started_at,
            rows,
        })
    }
}

/// Service for loading CSV uploads
pub struct ImportService<AR, IR>
where
    AR: AircraftRepository,
    IR: ImportBatchRepository,
{
    aircraft: Arc<AR>,
    imports: Arc<IR>,
}

impl<AR, IR> ImportService<AR, IR>
where
    AR: AircraftRepository,
    IR: ImportBatchRepository,
{
    pub fn new(aircraft: Arc<AR>, imports: Arc<IR>) -> Self {
        Self { aircraft, imports }
    }

    /// Import an upload for an existing aircraft
    pub async fn import_csv(
        &self,
        aircraft_id: &AircraftId,
        upload: &Upload,
        mode: PublishMode,
    ) -> Result<ImportSummary, AppError> {
        self.require_aircraft(aircraft_id).await?;
        let prepared = PreparedImport::from_upload(upload)?;
        self.commit(aircraft_id, prepared, mode).await
    }

    /// Record a prepared upload as a new batch of the aircraft
    pub async fn commit(
        &self,
        aircraft_id: &AircraftId,
        prepared: PreparedImport,
        mode: PublishMode,
    ) -> Result<ImportSummary, AppError> {
        self.require_aircraft(aircraft_id).await?;

        if let Some(existing) = self
            .imports
            .find_by_file_hash(aircraft_id, &prepared.file_sha256)
            .await?
        {
            return Err(DomainError::Conflict(format!(
                "File already imported for this aircraft (batch {})",
                existing.id
            ))
            .into());
        }

        let plan = plan_import(*aircraft_id, prepared, mode);
        let quarantined = plan.quarantine.len() as i64;
        let batch = self.imports.record(&plan).await?;

        tracing::info!(
            aircraft_id = %aircraft_id,
            batch_id = %batch.id,
            total_rows = batch.total_rows,
            inserted_rows = batch.inserted_rows,
            error_rows = batch.error_rows,
            quarantined,
            status = %batch.status,
            mode = %mode,
            "Import recorded"
        );

        Ok(ImportSummary {
            import_batch_id: batch.id,
            inserted_rows: batch.inserted_rows,
            total_rows: batch.total_rows,
            errors: batch.error_rows,
            status: batch.status,
            quarantined,
        })
    }

    async fn require_aircraft(&self, id: &AircraftId) -> Result<(), AppError> {
        match self.aircraft.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("Aircraft {} not found", id))),
        }
    }
}

/// Decide what a prepared upload writes.
///
/// Rows with an error-severity issue are skipped. Among the rest, the first
/// row with a given fingerprint is published and later ones become `INSERT`
/// errors; in quarantine mode those duplicates are also quarantined.
pub fn plan_import(aircraft_id: AircraftId, prepared: PreparedImport, mode: PublishMode) -> NewImport {
    let total_rows = prepared.rows.len() as i64;

    let mut issues: Vec<RowIssue> = Vec::new();
    let mut records = Vec::with_capacity(prepared.rows.len());
    for row in &prepared.rows {
        let sanitized = sanitize(row);
        issues.extend(sanitized.issues);
        issues.extend(validate(sanitized.index, &sanitized.record));
        records.push((sanitized.index, sanitized.record));
    }

    let rejected: HashSet<i64> = issues
        .iter()
        .filter(|i| i.is_error())
        .map(|i| i.row_index)
        .collect();

    let mut first_seen: HashMap<String, usize> = HashMap::new();
    let mut items = Vec::new();
    let mut quarantine = Vec::new();

    for (index, record) in records {
        if rejected.contains(&(index as i64)) {
            continue;
        }

        match first_seen.get(&record.fingerprint) {
            Some(&first) => {
                let message = format!(
                    "Duplicate of row {} in this import (fingerprint {})",
                    first, record.fingerprint
                );
                issues.push(RowIssue::error(index, INSERT_FIELD, message.clone()));

                if mode == PublishMode::Quarantine {
                    quarantine.push(NewQuarantineEntry {
                        source_row_index: index as i64,
                        reason: QuarantineReason::DuplicateInBatch,
                        error_message: Some(message),
                        record,
                    });
                }
            }
            None => {
                first_seen.insert(record.fingerprint.clone(), index);
                items.push(record);
            }
        }
    }

    let status = match mode {
        PublishMode::Quarantine => BatchStatus::Loaded,
        PublishMode::Strict if issues.iter().any(RowIssue::is_error) => BatchStatus::Failed,
        PublishMode::Strict => BatchStatus::Loaded,
    };

    NewImport {
        aircraft_id,
        file_name: prepared.file_name,
        file_sha256: prepared.file_sha256,
        started_at: prepared.started_at,
        total_rows,
        status,
        issues,
        items,
        quarantine,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ItemFilter, PageRequest};
    use crate::domain::ports::{MaintenanceItemRepository, QuarantineRepository};
    use crate::test_utils::{csv_upload, item_row, test_aircraft, InMemoryLedger};

    fn create_service(ledger: &InMemoryLedger) -> ImportService<InMemoryLedger, InMemoryLedger> {
        let repo = Arc::new(ledger.clone());
        ImportService::new(repo.clone(), repo)
    }

    fn upload(rows: &[String]) -> Upload {
        Upload::new(Some("tracker.csv".to_string()), csv_upload(rows))
    }

    #[test]
    fn upload_defaults_file_name() {
        assert_eq!(Upload::new(None, vec![]).file_name, "upload.csv");
        assert_eq!(Upload::new(Some("  ".into()), vec![]).file_name, "upload.csv");
        assert_eq!(Upload::new(Some("a.csv".into()), vec![]).file_name, "a.csv");
    }

    #[test]
    fn plan_skips_invalid_rows_and_flags_duplicates() {
        let prepared = PreparedImport::from_upload(&upload(&[
            item_row("A1", "Inspect gear"),
            item_row("A2", ""),
            item_row("A1", "Inspect gear"),
            item_row("A3", "Replace filter"),
        ]))
        .unwrap();

        let plan = plan_import(AircraftId(1), prepared, PublishMode::Quarantine);

        assert_eq!(plan.total_rows, 4);
        assert_eq!(plan.items.len(), 2);
        assert_eq!(plan.quarantine.len(), 1);
        assert_eq!(plan.quarantine[0].source_row_index, 2);
        assert_eq!(plan.status, BatchStatus::Loaded);

        let duplicate = plan
            .issues
            .iter()
            .find(|i| i.field == INSERT_FIELD)
            .unwrap();
        assert_eq!(duplicate.row_index, 2);
        assert!(duplicate.message.starts_with("Duplicate of row 0"));
        assert!(plan
            .issues
            .iter()
            .any(|i| i.row_index == 1 && i.field == "description"));
    }

    #[test]
    fn strict_plan_fails_on_errors_without_quarantine() {
        let prepared = PreparedImport::from_upload(&upload(&[
            item_row("A1", "Inspect gear"),
            item_row("A1", "Inspect gear"),
        ]))
        .unwrap();

        let plan = plan_import(AircraftId(1), prepared, PublishMode::Strict);

        assert_eq!(plan.status, BatchStatus::Failed);
        assert!(plan.quarantine.is_empty());
        assert_eq!(plan.items.len(), 1);
    }

    #[test]
    fn strict_plan_with_only_warnings_loads() {
        let prepared = PreparedImport::from_upload(&upload(&[item_row("A1", "Inspect gear")
            .replace(",insp,", ",misc,")]))
        .unwrap();

        let plan = plan_import(AircraftId(1), prepared, PublishMode::Strict);

        assert_eq!(plan.status, BatchStatus::Loaded);
        assert_eq!(plan.issues.len(), 1);
        assert!(!plan.issues[0].is_error());
    }

    #[tokio::test]
    async fn import_publishes_and_quarantines() {
        let aircraft = test_aircraft(1);
        let ledger = InMemoryLedger::new().with_aircraft(aircraft.clone());
        let service = create_service(&ledger);

        let summary = service
            .import_csv(
                &aircraft.id,
                &upload(&[
                    item_row("A1", "Inspect gear"),
                    item_row("A1", "Inspect gear"),
                    item_row("A2", "Replace filter"),
                ]),
                PublishMode::Quarantine,
            )
            .await
            .unwrap();

        assert_eq!(summary.inserted_rows, 2);
        assert_eq!(summary.total_rows, 3);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.quarantined, 1);
        assert_eq!(summary.status, BatchStatus::Loaded);

        let published = ledger
            .count_published(&aircraft.id, &ItemFilter::default())
            .await
            .unwrap();
        assert_eq!(published, 2);

        let quarantined = QuarantineRepository::list(&ledger, &aircraft.id, None, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(quarantined.len(), 1);
        assert_eq!(quarantined[0].import_batch_id, summary.import_batch_id);
    }

    #[tokio::test]
    async fn failed_strict_import_publishes_nothing() {
        let aircraft = test_aircraft(1);
        let ledger = InMemoryLedger::new().with_aircraft(aircraft.clone());
        let service = create_service(&ledger);

        let summary = service
            .import_csv(
                &aircraft.id,
                &upload(&[item_row("A1", "Inspect gear"), item_row("A1", "Inspect gear")]),
                PublishMode::Strict,
            )
            .await
            .unwrap();

        assert_eq!(summary.status, BatchStatus::Failed);
        assert_eq!(summary.quarantined, 0);

        let published = ledger
            .count_published(&aircraft.id, &ItemFilter::default())
            .await
            .unwrap();
        assert_eq!(published, 0);
    }

    #[tokio::test]
    async fn same_file_twice_conflicts() {
        let aircraft = test_aircraft(1);
        let ledger = InMemoryLedger::new().with_aircraft(aircraft.clone());
        let service = create_service(&ledger);
        let file = upload(&[item_row("A1", "Inspect gear")]);

        service
            .import_csv(&aircraft.id, &file, PublishMode::Quarantine)
            .await
            .unwrap();
        let result = service
            .import_csv(&aircraft.id, &file, PublishMode::Quarantine)
            .await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::Conflict(_)))
        ));
    }

    #[tokio::test]
    async fn same_file_for_another_aircraft_is_accepted() {
        let ledger = InMemoryLedger::new()
            .with_aircraft(test_aircraft(1))
            .with_aircraft(test_aircraft(2));
        let service = create_service(&ledger);
        let file = upload(&[item_row("A1", "Inspect gear")]);

        service
            .import_csv(&AircraftId(1), &file, PublishMode::Quarantine)
            .await
            .unwrap();
        let second = service
            .import_csv(&AircraftId(2), &file, PublishMode::Quarantine)
            .await;

        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn unknown_aircraft_is_not_found() {
        let ledger = InMemoryLedger::new();
        let service = create_service(&ledger);

        let result = service
            .import_csv(
                &AircraftId(42),
                &upload(&[item_row("A1", "Inspect gear")]),
                PublishMode::Quarantine,
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn missing_columns_are_rejected_before_writing() {
        let aircraft = test_aircraft(1);
        let ledger = InMemoryLedger::new().with_aircraft(aircraft.clone());
        let service = create_service(&ledger);

        let result = service
            .import_csv(
                &aircraft.id,
                &Upload::new(None, b"Item Code,Description\nA1,x\n".to_vec()),
                PublishMode::Quarantine,
            )
            .await;

        assert!(matches!(result, Err(AppError::Csv(_))));
        assert!(ledger.batches().is_empty());
    }
}
