use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "import_error")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub import_batch_id: i64,
    pub row_index: i64,
    pub field: String,
    pub message: String,
    pub severity: String,
    pub created_at: DateTimeUtc,
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
