//! SeaORM entity definitions, one module per table

pub mod aircraft;
pub mod import_batch;
pub mod import_error;
pub mod maintenance_item;
pub mod maintenance_item_quarantine;
pub mod user_session;
pub mod users;
