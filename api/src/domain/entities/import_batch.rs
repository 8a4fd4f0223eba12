//! Import batch domain entity
//!
//! Every CSV upload becomes one import batch. The batch carries counters, a
//! lifecycle status and the per-row issues found while loading the file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::aircraft::AircraftId;
use super::maintenance_item::ItemRecord;
use super::quarantine::NewQuarantineEntry;

/// Unique identifier for an import batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportBatchId(pub i64);

impl From<i64> for ImportBatchId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ImportBatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of an import batch.
///
/// Only items of `Loaded` batches are published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Uploaded,
    Validated,
    Loaded,
    Failed,
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchStatus::Uploaded => write!(f, "uploaded"),
            BatchStatus::Validated => write!(f, "validated"),
            BatchStatus::Loaded => write!(f, "loaded"),
            BatchStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for BatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uploaded" => Ok(BatchStatus::Uploaded),
            "validated" => Ok(BatchStatus::Validated),
            "loaded" => Ok(BatchStatus::Loaded),
            "failed" => Ok(BatchStatus::Failed),
            _ => Err(format!("Unknown batch status: {}", s)),
        }
    }
}

/// How duplicate rows of an upload are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    /// Duplicates go to quarantine and the batch is published
    #[default]
    Quarantine,
    /// Any error-severity issue fails the whole batch
    Strict,
}

impl std::fmt::Display for PublishMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishMode::Quarantine => write!(f, "quarantine"),
            PublishMode::Strict => write!(f, "strict"),
        }
    }
}

impl std::str::FromStr for PublishMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quarantine" => Ok(PublishMode::Quarantine),
            "strict" => Ok(PublishMode::Strict),
            _ => Err(format!(
                "Unknown publish mode '{}' (expected quarantine or strict)",
                s
            )),
        }
    }
}

/// Severity of a row issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The row is not published
    Error,
    /// The row is published as-is
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// Field name used for issues raised while storing a row
pub const INSERT_FIELD: &str = "INSERT";

/// A problem found in one CSV row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    /// 0-based index of the data row
    pub row_index: i64,
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

impl RowIssue {
    pub fn error(row_index: usize, field: &str, message: impl Into<String>) -> Self {
        Self::new(row_index, field, message, Severity::Error)
    }

    pub fn warning(row_index: usize, field: &str, message: impl Into<String>) -> Self {
        Self::new(row_index, field, message, Severity::Warning)
    }

    fn new(row_index: usize, field: &str, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            row_index: row_index as i64,
            field: field.to_string(),
            message: message.into(),
            severity,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// A stored row issue
#[derive(Debug, Clone, Serialize)]
pub struct ImportIssue {
    #[serde(flatten)]
    pub issue: RowIssue,
    pub created_at: DateTime<Utc>,
}

/// An import batch as stored
#[derive(Debug, Clone, Serialize)]
pub struct ImportBatch {
    pub id: ImportBatchId,
    pub aircraft_id: AircraftId,
    pub file_name: String,
    pub file_sha256: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_rows: i64,
    pub inserted_rows: i64,
    pub error_rows: i64,
    pub status: BatchStatus,
}

/// Everything needed to record one upload in a single write.
///
/// The import service decides which rows are published, which are
/// quarantined and the final status; repositories only persist the result.
#[derive(Debug, Clone)]
pub struct NewImport {
    pub aircraft_id: AircraftId,
    pub file_name: String,
    pub file_sha256: String,
    pub started_at: DateTime<Utc>,
    pub total_rows: i64,
    pub status: BatchStatus,
    pub issues: Vec<RowIssue>,
    pub items: Vec<ItemRecord>,
    pub quarantine: Vec<NewQuarantineEntry>,
}

/// Outcome of an import, as returned to the uploader
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub import_batch_id: ImportBatchId,
    pub inserted_rows: i64,
    pub total_rows: i64,
    pub errors: i64,
    pub status: BatchStatus,
    pub quarantined: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_status_round_trips_through_strings() {
        for status in [
            BatchStatus::Uploaded,
            BatchStatus::Validated,
            BatchStatus::Loaded,
            BatchStatus::Failed,
        ] {
            assert_eq!(status.to_string().parse::<BatchStatus>().unwrap(), status);
        }
        assert!("published".parse::<BatchStatus>().is_err());
    }

    #[test]
    fn publish_mode_parsing() {
        assert_eq!(PublishMode::default(), PublishMode::Quarantine);
        assert_eq!(
            " Strict ".parse::<PublishMode>().unwrap(),
            PublishMode::Strict
        );
        let err = "reject".parse::<PublishMode>().unwrap_err();
        assert!(err.contains("reject"));
    }

    #[test]
    fn row_issue_constructors() {
        let issue = RowIssue::error(3, "description", "Description is required");
        assert_eq!(issue.row_index, 3);
        assert!(issue.is_error());

        let issue = RowIssue::warning(0, "type", "odd");
        assert!(!issue.is_error());
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["severity"], "warning");
    }
}
