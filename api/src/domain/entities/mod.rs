//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod aircraft;
pub mod import_batch;
pub mod maintenance_item;
pub mod page;
pub mod quarantine;
pub mod user;

pub use aircraft::{Aircraft, AircraftId, NewAircraft, MAX_NAME_LEN};
pub use import_batch::{
    BatchStatus, ImportBatch, ImportBatchId, ImportIssue, ImportSummary, NewImport, PublishMode,
    RowIssue, INSERT_FIELD,
};
pub use maintenance_item::{
    AdjustedUnit, ItemFilter, ItemRecord, MaintenanceItem, MaintenanceItemId, KNOWN_ITEM_TYPES,
};
pub use page::PageRequest;
pub use quarantine::{NewQuarantineEntry, QuarantineEntry, QuarantineEntryId, QuarantineReason};
pub use user::{CurrentUser, NewUser, Role, Session, User, UserId};
