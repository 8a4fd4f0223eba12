//! Ledger query service
//!
//! Read side of the ledger: published items, quarantine and batch issues.

use std::sync::Arc;

use crate::domain::entities::{
    AircraftId, ImportBatch, ImportBatchId, ImportIssue, ItemFilter, MaintenanceItem, PageRequest,
    QuarantineEntry,
};
use crate::domain::ports::{
    AircraftRepository, ImportBatchRepository, MaintenanceItemRepository, QuarantineRepository,
};
use crate::error::AppError;

pub struct LedgerService<AR, IR, MR, QR>
where
    AR: AircraftRepository,
    IR: ImportBatchRepository,
    MR: MaintenanceItemRepository,
    QR: QuarantineRepository,
{
    aircraft: Arc<AR>,
    imports: Arc<IR>,
    items: Arc<MR>,
    quarantine: Arc<QR>,
}

impl<AR, IR, MR, QR> LedgerService<AR, IR, MR, QR>
where
    AR: AircraftRepository,
    IR: ImportBatchRepository,
    MR: MaintenanceItemRepository,
    QR: QuarantineRepository,
{
    pub fn new(aircraft: Arc<AR>, imports: Arc<IR>, items: Arc<MR>, quarantine: Arc<QR>) -> Self {
        Self {
            aircraft,
            imports,
            items,
            quarantine,
        }
    }

    /// Published items of an aircraft, ordered by ID
    pub async fn list_items(
        &self,
        aircraft_id: &AircraftId,
        filter: &ItemFilter,
        page: PageRequest,
    ) -> Result<Vec<MaintenanceItem>, AppError> {
        self.require_aircraft(aircraft_id).await?;
        Ok(self.items.list_published(aircraft_id, filter, page).await?)
    }

    pub async fn count_items(
        &self,
        aircraft_id: &AircraftId,
        filter: &ItemFilter,
    ) -> Result<u64, AppError> {
        self.require_aircraft(aircraft_id).await?;
        Ok(self.items.count_published(aircraft_id, filter).await?)
    }

    pub async fn list_quarantine(
        &self,
        aircraft_id: &AircraftId,
        batch_id: Option<&ImportBatchId>,
        page: PageRequest,
    ) -> Result<Vec<QuarantineEntry>, AppError> {
        self.require_aircraft(aircraft_id).await?;
        Ok(self.quarantine.list(aircraft_id, batch_id, page).await?)
    }

    pub async fn count_quarantine(
        &self,
        aircraft_id: &AircraftId,
        batch_id: Option<&ImportBatchId>,
    ) -> Result<u64, AppError> {
        self.require_aircraft(aircraft_id).await?;
        Ok(self.quarantine.count(aircraft_id, batch_id).await?)
    }

    pub async fn get_batch(&self, id: &ImportBatchId) -> Result<ImportBatch, AppError> {
        self.imports
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Import batch {} not found", id)))
    }

    /// Row issues of a batch in the order they were recorded
    pub async fn list_batch_errors(
        &self,
        id: &ImportBatchId,
        page: PageRequest,
    ) -> Result<Vec<ImportIssue>, AppError> {
        self.get_batch(id).await?;
        Ok(self.imports.list_issues(id, page).await?)
    }

    async fn require_aircraft(&self, id: &AircraftId) -> Result<(), AppError> {
        match self.aircraft.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("Aircraft {} not found", id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::import_service::{ImportService, Upload};
    use crate::domain::entities::import_batch::Severity;
    use crate::domain::entities::PublishMode;
    use crate::test_utils::{csv_upload, item_row, test_aircraft, InMemoryLedger};

    type TestLedgerService =
        LedgerService<InMemoryLedger, InMemoryLedger, InMemoryLedger, InMemoryLedger>;

    fn create_service(ledger: &InMemoryLedger) -> TestLedgerService {
        let repo = Arc::new(ledger.clone());
        LedgerService::new(repo.clone(), repo.clone(), repo.clone(), repo)
    }

    async fn import(ledger: &InMemoryLedger, aircraft: i64, rows: &[String], mode: PublishMode) -> ImportBatchId {
        let repo = Arc::new(ledger.clone());
        let importer = ImportService::new(repo.clone(), repo);
        importer
            .import_csv(&AircraftId(aircraft), &Upload::new(None, csv_upload(rows)), mode)
            .await
            .unwrap()
            .import_batch_id
    }

    #[tokio::test]
    async fn items_are_filtered_and_paged() {
        let ledger = InMemoryLedger::new().with_aircraft(test_aircraft(1));
        let ad_row = item_row("A3", "Airworthiness directive").replace(",insp,", ",ad,");
        import(
            &ledger,
            1,
            &[item_row("A1", "Inspect gear"), item_row("A2", "Inspect door"), ad_row],
            PublishMode::Quarantine,
        )
        .await;
        let service = create_service(&ledger);
        let id = AircraftId(1);

        let all = service
            .list_items(&id, &ItemFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].id.0 < w[1].id.0));

        let insp = ItemFilter::new(Some("INSP".to_string()), None);
        assert_eq!(service.count_items(&id, &insp).await.unwrap(), 2);

        let page = PageRequest { limit: 1, offset: 1 };
        let second = service
            .list_items(&id, &ItemFilter::default(), page)
            .await
            .unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].record.item_code.as_deref(), Some("A2"));
    }

    #[tokio::test]
    async fn quarantine_can_be_scoped_to_a_batch() {
        let ledger = InMemoryLedger::new().with_aircraft(test_aircraft(1));
        let dup = [item_row("A1", "Inspect gear"), item_row("A1", "Inspect gear")];
        let first = import(&ledger, 1, &dup, PublishMode::Quarantine).await;
        let mut second_rows = dup.to_vec();
        second_rows.push(item_row("A9", "Other"));
        let second = import(&ledger, 1, &second_rows, PublishMode::Quarantine).await;
        let service = create_service(&ledger);
        let id = AircraftId(1);

        assert_eq!(service.count_quarantine(&id, None).await.unwrap(), 2);
        assert_eq!(service.count_quarantine(&id, Some(&first)).await.unwrap(), 1);

        let scoped = service
            .list_quarantine(&id, Some(&second), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].import_batch_id, second);
    }

    #[tokio::test]
    async fn batch_errors_are_listed() {
        let ledger = InMemoryLedger::new().with_aircraft(test_aircraft(1));
        let batch = import(
            &ledger,
            1,
            &[item_row("A1", ""), item_row("A2", "Inspect gear")],
            PublishMode::Quarantine,
        )
        .await;
        let service = create_service(&ledger);

        let errors = service
            .list_batch_errors(&batch, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].issue.row_index, 0);
        assert_eq!(errors[0].issue.severity, Severity::Error);

        let loaded = service.get_batch(&batch).await.unwrap();
        assert_eq!(loaded.inserted_rows, 1);
        assert_eq!(loaded.error_rows, 1);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let service = create_service(&InMemoryLedger::new());
        let id = AircraftId(7);

        assert!(matches!(
            service.count_items(&id, &ItemFilter::default()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.list_quarantine(&id, None, PageRequest::default()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service
                .list_batch_errors(&ImportBatchId(3), PageRequest::default())
                .await,
            Err(AppError::NotFound(_))
        ));
    }
}
