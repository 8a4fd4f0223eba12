use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "maintenance_item_quarantine")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub aircraft_id: i64,
    pub import_batch_id: i64,
    pub source_row_index: i64,
    pub reason: String,
    pub error_message: Option<String>,
    pub item_code: Option<String>,
    pub position: Option<String>,
    pub description: Option<String>,
    #[sea_orm(column_name = "type")]
    pub item_type: Option<String>,
    pub interval_months: Option<i64>,
    pub interval_hours: Option<i64>,
    pub interval_landings: Option<i64>,
    pub adjusted_value: Option<i64>,
    pub adjusted_unit: Option<String>,
    pub adjusted_delta: Option<i64>,
    pub part_number: Option<String>,
    pub part_serial: Option<String>,
    pub last_completed_date: Option<Date>,
    pub last_completed_hours: Option<i64>,
    pub last_completed_landings: Option<i64>,
    pub last_completed_city: Option<String>,
    pub due_next_date: Option<Date>,
    pub due_next_hours: Option<i64>,
    pub due_next_landings: Option<i64>,
    pub time_remaining_text: Option<String>,
    pub months_remaining: Option<i64>,
    pub days_remaining: Option<i64>,
    pub is_overdue_time: Option<bool>,
    pub hours_remaining: Option<i64>,
    pub landings_remaining: Option<i64>,
    pub status: Option<String>,
    pub status_note: Option<String>,
    pub fingerprint: Option<String>,
    pub quarantined_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::import_batch::Entity",
        from = "Column::ImportBatchId",
        to = "super::import_batch::Column::Id"
    )]
    ImportBatch,
}

impl Related<super::import_batch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ImportBatch.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
