//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities and ports.

pub mod aircraft_service;
pub mod auth_service;
pub mod csv_import;
pub mod import_service;
pub mod ledger_service;

pub use aircraft_service::AircraftService;
pub use auth_service::AuthService;
pub use import_service::Upload;
pub use ledger_service::LedgerService;
