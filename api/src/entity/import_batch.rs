use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "import_batch")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub aircraft_id: i64,
    pub file_name: String,
    pub file_sha256: String,
    pub started_at: DateTimeUtc,
    pub completed_at: Option<DateTimeUtc>,
    pub total_rows: i64,
    pub inserted_rows: i64,
    pub error_rows: i64,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::aircraft::Entity",
        from = "Column::AircraftId",
        to = "super::aircraft::Column::Id"
    )]
    Aircraft,
    #[sea_orm(has_many = "super::maintenance_item::Entity")]
    MaintenanceItem,
    #[sea_orm(has_many = "super::import_error::Entity")]
    ImportError,
}

impl Related<super::aircraft::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Aircraft.def()
    }
}

impl Related<super::maintenance_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenanceItem.def()
    }
}

impl Related<super::import_error::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ImportError.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
