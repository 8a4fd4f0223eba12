//! SQLite adapter for MaintenanceItemRepository
//!
//! Published items are those whose batch is `loaded`, the same rows the
//! `v_items_loaded` view exposes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select, Set,
};

use crate::domain::entities::{
    AircraftId, BatchStatus, ImportBatchId, ItemFilter, ItemRecord, MaintenanceItem,
    MaintenanceItemId, PageRequest,
};
use crate::domain::ports::MaintenanceItemRepository;
use crate::entity::{import_batch, maintenance_item};
use crate::error::DomainError;

/// SQLite implementation of MaintenanceItemRepository
pub struct SqliteMaintenanceItemRepository {
    db: DatabaseConnection,
}

impl SqliteMaintenanceItemRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn published(aircraft_id: &AircraftId, filter: &ItemFilter) -> Select<maintenance_item::Entity> {
        let mut query = maintenance_item::Entity::find()
            .join(JoinType::InnerJoin, maintenance_item::Relation::ImportBatch.def())
            .filter(maintenance_item::Column::AircraftId.eq(aircraft_id.0))
            .filter(import_batch::Column::Status.eq(BatchStatus::Loaded.to_string()));

        if let Some(item_type) = &filter.item_type {
            query = query.filter(maintenance_item::Column::ItemType.eq(item_type.as_str()));
        }
        if let Some(status) = &filter.status {
            query = query.filter(maintenance_item::Column::Status.eq(status.as_str()));
        }

        query
    }
}

#[async_trait]
impl MaintenanceItemRepository for SqliteMaintenanceItemRepository {
    async fn list_published(
        &self,
        aircraft_id: &AircraftId,
        filter: &ItemFilter,
        page: PageRequest,
    ) -> Result<Vec<MaintenanceItem>, DomainError> {
        let results = Self::published(aircraft_id, filter)
            .order_by_asc(maintenance_item::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn count_published(
        &self,
        aircraft_id: &AircraftId,
        filter: &ItemFilter,
    ) -> Result<u64, DomainError> {
        Self::published(aircraft_id, filter)
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

/// Row to insert for a published item
pub(super) fn item_active_model(
    record: &ItemRecord,
    aircraft_id: i64,
    import_batch_id: i64,
    created_at: DateTime<Utc>,
) -> maintenance_item::ActiveModel {
    let r = record.clone();
    maintenance_item::ActiveModel {
        aircraft_id: Set(aircraft_id),
        import_batch_id: Set(import_batch_id),
        item_code: Set(r.item_code),
        position: Set(r.position),
        description: Set(r.description.unwrap_or_default()),
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
        fingerprint: Set(r.fingerprint),
        created_at: Set(created_at),
        ..Default::default()
    }
}

/// Convert SeaORM model to domain entity
impl From<maintenance_item::Model> for MaintenanceItem {
    fn from(model: maintenance_item::Model) -> Self {
        MaintenanceItem {
            id: MaintenanceItemId(model.id),
            aircraft_id: AircraftId(model.aircraft_id),
            import_batch_id: ImportBatchId(model.import_batch_id),
            record: ItemRecord {
                item_code: model.item_code,
                position: model.position,
                description: Some(model.description),
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
                fingerprint: model.fingerprint,
            },
            created_at: model.created_at,
        }
    }
}
