//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod aircraft;
pub mod auth;
pub mod ledger;
pub mod upload;
pub mod users;

pub use aircraft::{create_aircraft, get_aircraft, list_aircraft, list_imports, upload_import};
pub use auth::{login, logout, me};
pub use ledger::{
    count_items, count_quarantine, get_import, list_import_errors, list_items, list_quarantine,
};
pub use users::{create_user, list_users};
