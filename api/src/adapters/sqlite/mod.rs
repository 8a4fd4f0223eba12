//! SQLite adapters
//!
//! Implementations of repository traits using SeaORM over a single SQLite file.

pub mod aircraft_repo;
pub mod import_batch_repo;
pub mod maintenance_item_repo;
pub mod quarantine_repo;
pub mod schema;
pub mod session_repo;
pub mod user_repo;


use std::path::Path;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};

use crate::error::DomainError;

pub use aircraft_repo::SqliteAircraftRepository;
pub use import_batch_repo::SqliteImportBatchRepository;
pub use maintenance_item_repo::SqliteMaintenanceItemRepository;
pub use quarantine_repo::SqliteQuarantineRepository;
pub use session_repo::SqliteSessionRepository;
pub use user_repo::SqliteUserRepository;

/// Open (creating if needed) the database file and apply the schema
pub async fn connect(path: &Path) -> Result<DatabaseConnection, DbErr> {
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let mut options = ConnectOptions::new(url);
    options.sqlx_logging(false);

    let db = Database::connect(options).await?;
    schema::initialize_schema(&db).await?;
    Ok(db)
}

/// Map a write error, reporting unique constraint violations as `on_duplicate`
fn write_error(e: DbErr, on_duplicate: impl FnOnce() -> DomainError) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => on_duplicate(),
        _ => DomainError::Database(e.to_string()),
    }
}
