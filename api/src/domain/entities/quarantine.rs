//! Quarantine domain entity
//!
//! Rows of an upload that could not be published are kept here, with the
//! reason and the error that diverted them, for later review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::aircraft::AircraftId;
use super::import_batch::ImportBatchId;
use super::maintenance_item::ItemRecord;

/// Unique identifier for a quarantine entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuarantineEntryId(pub i64);

/// Why a row was quarantined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarantineReason {
    /// Another row of the same upload has the same fingerprint
    DuplicateInBatch,
}

impl std::fmt::Display for QuarantineReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuarantineReason::DuplicateInBatch => write!(f, "duplicate_in_batch"),
        }
    }
}

impl std::str::FromStr for QuarantineReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "duplicate_in_batch" => Ok(QuarantineReason::DuplicateInBatch),
            _ => Err(format!("Unknown quarantine reason: {}", s)),
        }
    }
}

/// A stored quarantine entry
#[derive(Debug, Clone, Serialize)]
pub struct QuarantineEntry {
    pub id: QuarantineEntryId,
    pub aircraft_id: AircraftId,
    pub import_batch_id: ImportBatchId,
    pub source_row_index: i64,
    pub reason: QuarantineReason,
    pub error_message: Option<String>,
    #[serde(flatten)]
    pub record: ItemRecord,
    pub quarantined_at: DateTime<Utc>,
}

/// A row about to be quarantined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuarantineEntry {
    pub source_row_index: i64,
    pub reason: QuarantineReason,
    pub error_message: Option<String>,
    pub record: ItemRecord,
}
