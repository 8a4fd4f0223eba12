//! SQLite adapter for QuarantineRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};

use crate::domain::entities::{
    AircraftId, ImportBatchId, ItemRecord, NewQuarantineEntry, PageRequest, QuarantineEntry,
    QuarantineEntryId,
};
use crate::domain::ports::QuarantineRepository;
use crate::entity::maintenance_item_quarantine as quarantine;
use crate::error::DomainError;

/// SQLite implementation of QuarantineRepository
pub struct SqliteQuarantineRepository {
    db: DatabaseConnection,
}

impl SqliteQuarantineRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn scoped(aircraft_id: &AircraftId, batch_id: Option<&ImportBatchId>) -> Select<quarantine::Entity> {
        let query = quarantine::Entity::find()
            .filter(quarantine::Column::AircraftId.eq(aircraft_id.0));

        match batch_id {
            Some(batch_id) => query.filter(quarantine::Column::ImportBatchId.eq(batch_id.0)),
            None => query,
        }
    }
}

#[async_trait]
impl QuarantineRepository for SqliteQuarantineRepository {
    async fn list(
        &self,
        aircraft_id: &AircraftId,
        batch_id: Option<&ImportBatchId>,
        page: PageRequest,
    ) -> Result<Vec<QuarantineEntry>, DomainError> {
        let results = Self::scoped(aircraft_id, batch_id)
            .order_by_asc(quarantine::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        results.into_iter().map(QuarantineEntry::try_from).collect()
    }

    async fn count(
        &self,
        aircraft_id: &AircraftId,
        batch_id: Option<&ImportBatchId>,
    ) -> Result<u64, DomainError> {
        Self::scoped(aircraft_id, batch_id)
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

/// Row to insert for a quarantined duplicate
pub(super) fn quarantine_active_model(
    entry: &NewQuarantineEntry,
    aircraft_id: i64,
    import_batch_id: i64,
    quarantined_at: DateTime<Utc>,
) -> quarantine::ActiveModel {
    let r = entry.record.clone();
    quarantine::ActiveModel {
        aircraft_id: Set(aircraft_id),
        import_batch_id: Set(import_batch_id),
        source_row_index: Set(entry.source_row_index),
        reason: Set(entry.reason.to_string()),
        error_message: Set(entry.error_message.clone()),
        item_code: Set(r.item_code),
        position: Set(r.position),
        description: Set(r.description),
        item_type: Set(r.item_type),
        interval_months: Set(r.interval_months),
        interval_hours: Set(r.interval_hours),
        interval_landings: Set(r.interval_landings),
        adjusted_value: Set(r.adjusted_value),
        adjusted_unit: Set(r.adjusted_unit.map(|u| u.to_string())),
        adjusted_delta: Set(r.adjusted_delta),
        part_number: Set(r.part_number),
        part_serial: Set(r.part_serial),
        last_completed_date: Set(r.last_completed_date),
        last_completed_hours: Set(r.last_completed_hours),
        last_completed_landings: Set(r.last_completed_landings),
        last_completed_city: Set(r.last_completed_city),
        due_next_date: Set(r.due_next_date),
        due_next_hours: Set(r.due_next_hours),
        due_next_landings: Set(r.due_next_landings),
        time_remaining_text: Set(r.time_remaining_text),
        months_remaining: Set(r.months_remaining),
        days_remaining: Set(r.days_remaining),
        is_overdue_time: Set(r.is_overdue_time),
        hours_remaining: Set(r.hours_remaining),
        landings_remaining: Set(r.landings_remaining),
        status: Set(r.status),
        status_note: Set(r.status_note),
        fingerprint: Set(Some(r.fingerprint)),
        quarantined_at: Set(quarantined_at),
        ..Default::default()
    }
}

impl TryFrom<quarantine::Model> for QuarantineEntry {
    type Error = DomainError;

    fn try_from(model: quarantine::Model) -> Result<Self, Self::Error> {
        Ok(QuarantineEntry {
            id: QuarantineEntryId(model.id),
            aircraft_id: AircraftId(model.aircraft_id),
            import_batch_id: ImportBatchId(model.import_batch_id),
            source_row_index: model.source_row_index,
            reason: model.reason.parse().map_err(DomainError::Internal)?,
            error_message: model.error_message,
            record: ItemRecord {
                item_code: model.item_code,
                position: model.position,
                description: model.description,
                item_type: model.item_type,
                interval_months: model.interval_months,
                interval_hours: model.interval_hours,
                interval_landings: model.interval_landings,
                adjusted_value: model.adjusted_value,
                adjusted_unit: model.adjusted_unit.and_then(|u| u.parse().ok()),
                adjusted_delta: model.adjusted_delta,
                part_number: model.part_number,
                part_serial: model.part_serial,
                last_completed_date: model.last_completed_date,
                last_completed_hours: model.last_completed_hours,
                last_completed_landings: model.last_completed_landings,
                last_completed_city: model.last_completed_city,
                due_next_date: model.due_next_date,
                due_next_hours: model.due_next_hours,
                due_next_landings: model.due_next_landings,
                time_remaining_text: model.time_remaining_text,
                months_remaining: model.months_remaining,
                days_remaining: model.days_remaining,
                is_overdue_time: model.is_overdue_time,
                hours_remaining: model.hours_remaining,
                landings_remaining: model.landings_remaining,
                status: model.status,
                status_note: model.status_note,
                fingerprint: model.fingerprint.unwrap_or_default(),
            },
            quarantined_at: model.quarantined_at,
        })
    }
}
