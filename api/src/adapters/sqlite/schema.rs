//! SQLite schema bootstrap
//!
//! Every statement is idempotent, so the schema is applied on each start.
//! The version stored in `schema_meta` tells later releases what to migrate.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr, Statement};

/// The current schema version.
pub const CURRENT_VERSION: i64 = 1;

const VERSION_KEY: &str = "schema_version";

pub(super) const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS schema_meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS aircraft (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        model TEXT NOT NULL DEFAULT 'N/A',
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    )",
    "CREATE TABLE IF NOT EXISTS import_batch (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        aircraft_id INTEGER NOT NULL REFERENCES aircraft(id),
        file_name TEXT NOT NULL,
        file_sha256 TEXT NOT NULL,
        started_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        completed_at TEXT,
        total_rows INTEGER NOT NULL,
        inserted_rows INTEGER NOT NULL DEFAULT 0,
        error_rows INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL CHECK (status IN ('uploaded', 'validated', 'loaded', 'failed')),
        UNIQUE (file_sha256, aircraft_id)
    )",
    "CREATE TABLE IF NOT EXISTS maintenance_item (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        aircraft_id INTEGER NOT NULL REFERENCES aircraft(id),
        import_batch_id INTEGER NOT NULL REFERENCES import_batch(id),
        item_code TEXT,
        position TEXT,
        description TEXT NOT NULL,
        type TEXT,
        interval_months INTEGER CHECK (interval_months IS NULL OR interval_months >= 0),
        interval_hours INTEGER CHECK (interval_hours IS NULL OR interval_hours >= 0),
        interval_landings INTEGER CHECK (interval_landings IS NULL OR interval_landings >= 0),
        adjusted_value INTEGER CHECK (adjusted_value IS NULL OR adjusted_value >= 0),
        adjusted_unit TEXT CHECK (adjusted_unit IS NULL OR adjusted_unit IN ('hrs', 'ldgs')),
        adjusted_delta INTEGER,
        part_number TEXT,
        part_serial TEXT,
        last_completed_date TEXT,
        last_completed_hours INTEGER CHECK (last_completed_hours IS NULL OR last_completed_hours >= 0),
        last_completed_landings INTEGER CHECK (last_completed_landings IS NULL OR last_completed_landings >= 0),
        last_completed_city TEXT,
        due_next_date TEXT,
        due_next_hours INTEGER CHECK (due_next_hours IS NULL OR due_next_hours >= 0),
        due_next_landings INTEGER CHECK (due_next_landings IS NULL OR due_next_landings >= 0),
        time_remaining_text TEXT,
        months_remaining INTEGER,
        days_remaining INTEGER,
        is_overdue_time INTEGER CHECK (is_overdue_time IS NULL OR is_overdue_time IN (0, 1)),
        hours_remaining INTEGER CHECK (hours_remaining IS NULL OR hours_remaining >= 0),
        landings_remaining INTEGER CHECK (landings_remaining IS NULL OR landings_remaining >= 0),
        status TEXT,
        status_note TEXT,
        fingerprint TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        UNIQUE (import_batch_id, fingerprint)
    )",
    "CREATE TABLE IF NOT EXISTS import_error (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        import_batch_id INTEGER NOT NULL REFERENCES import_batch(id),
        row_index INTEGER NOT NULL,
        field TEXT NOT NULL,
        message TEXT NOT NULL,
        severity TEXT NOT NULL CHECK (severity IN ('error', 'warning')),
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    )",
    "CREATE TABLE IF NOT EXISTS maintenance_item_quarantine (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        aircraft_id INTEGER NOT NULL REFERENCES aircraft(id),
        import_batch_id INTEGER NOT NULL REFERENCES import_batch(id),
        source_row_index INTEGER NOT NULL,
        reason TEXT NOT NULL,
        error_message TEXT,
        item_code TEXT,
        position TEXT,
        description TEXT,
        type TEXT,
        interval_months INTEGER,
        interval_hours INTEGER,
        interval_landings INTEGER,
        adjusted_value INTEGER,
        adjusted_unit TEXT,
        adjusted_delta INTEGER,
        part_number TEXT,
        part_serial TEXT,
        last_completed_date TEXT,
        last_completed_hours INTEGER,
        last_completed_landings INTEGER,
        last_completed_city TEXT,
        due_next_date TEXT,
        due_next_hours INTEGER,
        due_next_landings INTEGER,
        time_remaining_text TEXT,
        months_remaining INTEGER,
        days_remaining INTEGER,
        is_overdue_time INTEGER,
        hours_remaining INTEGER,
        landings_remaining INTEGER,
        status TEXT,
        status_note TEXT,
        fingerprint TEXT,
        quarantined_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        UNIQUE (import_batch_id, source_row_index)
    )",
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        password_salt TEXT NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('admin', 'mechanic', 'auditor')),
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    )",
    "CREATE TABLE IF NOT EXISTS user_session (
        token TEXT PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users(id),
        expires_at TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    )",
    "CREATE INDEX IF NOT EXISTS idx_item_aircraft ON maintenance_item(aircraft_id)",
    "CREATE INDEX IF NOT EXISTS idx_item_batch ON maintenance_item(import_batch_id)",
    "CREATE INDEX IF NOT EXISTS idx_item_status ON maintenance_item(status)",
    "CREATE INDEX IF NOT EXISTS idx_item_type ON maintenance_item(type)",
    "CREATE INDEX IF NOT EXISTS idx_item_due_hours ON maintenance_item(due_next_hours)",
    "CREATE INDEX IF NOT EXISTS idx_item_due_landings ON maintenance_item(due_next_landings)",
    "CREATE INDEX IF NOT EXISTS idx_item_due_date ON maintenance_item(due_next_date)",
    "CREATE INDEX IF NOT EXISTS idx_error_batch ON import_error(import_batch_id)",
    "CREATE INDEX IF NOT EXISTS idx_q_aircraft ON maintenance_item_quarantine(aircraft_id)",
    "CREATE INDEX IF NOT EXISTS idx_q_batch ON maintenance_item_quarantine(import_batch_id)",
    "CREATE INDEX IF NOT EXISTS idx_q_fp ON maintenance_item_quarantine(fingerprint)",
    "CREATE INDEX IF NOT EXISTS idx_session_user ON user_session(user_id)",
    "CREATE TRIGGER IF NOT EXISTS forbid_delete_aircraft
     BEFORE DELETE ON aircraft
     BEGIN
         SELECT RAISE(ABORT, 'DELETE prohibited: append-only (aircraft)');
     END",
    "CREATE TRIGGER IF NOT EXISTS forbid_delete_import_batch
     BEFORE DELETE ON import_batch
     BEGIN
         SELECT RAISE(ABORT, 'DELETE prohibited: append-only (import_batch)');
     END",
    "CREATE TRIGGER IF NOT EXISTS forbid_delete_maintenance_item
     BEFORE DELETE ON maintenance_item
     BEGIN
         SELECT RAISE(ABORT, 'DELETE prohibited: append-only (maintenance_item)');
     END",
    "CREATE VIEW IF NOT EXISTS v_items_loaded AS
     SELECT mi.*
     FROM maintenance_item mi
     JOIN import_batch b ON b.id = mi.import_batch_id
     WHERE b.status = 'loaded'",
];

/// Create all tables, indexes, triggers and views if they don't exist, then
/// record the schema version.
pub async fn initialize_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    for statement in SCHEMA_STATEMENTS {
        db.execute_unprepared(statement).await?;
    }

    let version = schema_version(db).await?;
    if version > CURRENT_VERSION {
        return Err(DbErr::Custom(format!(
            "database schema version {} is newer than supported version {}",
            version, CURRENT_VERSION
        )));
    }
    if version < CURRENT_VERSION {
        tracing::info!(from = version, to = CURRENT_VERSION, "Updating schema version");
        set_schema_version(db, CURRENT_VERSION).await?;
    }

    Ok(())
}

/// Returns 0 on a fresh database
pub async fn schema_version(db: &DatabaseConnection) -> Result<i64, DbErr> {
    let row = db
        .query_one(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            "SELECT value FROM schema_meta WHERE key = ?",
            [VERSION_KEY.into()],
        ))
        .await?;

    match row {
        Some(row) => {
            let value: String = row.try_get("", "value")?;
            value
                .parse()
                .map_err(|_| DbErr::Custom(format!("invalid schema version: {value}")))
        }
        None => Ok(0),
    }
}

async fn set_schema_version(db: &DatabaseConnection, version: i64) -> Result<(), DbErr> {
    db.execute(Statement::from_sql_and_values(
        DbBackend::Sqlite,
        "INSERT OR REPLACE INTO schema_meta (key, value) VALUES (?, ?)",
        [VERSION_KEY.into(), version.to_string().into()],
    ))
    .await?;
    Ok(())
}
