//! Maintenance item domain entity
//!
//! A maintenance item is one ledger entry: a normalized CSV row stored against
//! the import batch that brought it in. Items are never updated or deleted; a
//! newer import of the same aircraft records a fresh snapshot instead.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::aircraft::AircraftId;
use super::import_batch::ImportBatchId;

/// Item types the maintenance tracker is known to produce
pub const KNOWN_ITEM_TYPES: [&str; 4] = ["sbsl", "comp", "ad", "insp"];

/// Unit of an adjusted interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustedUnit {
    /// Flight hours
    Hrs,
    /// Landings (cycles)
    Ldgs,
}

impl std::fmt::Display for AdjustedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdjustedUnit::Hrs => write!(f, "hrs"),
            AdjustedUnit::Ldgs => write!(f, "ldgs"),
        }
    }
}

impl std::str::FromStr for AdjustedUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hr" | "hrs" => Ok(AdjustedUnit::Hrs),
            "ldg" | "ldgs" | "c" => Ok(AdjustedUnit::Ldgs),
            _ => Err(format!("Unknown adjusted interval unit: {}", s)),
        }
    }
}

/// The normalized content of one maintenance row.
///
/// Shared by published items and quarantine entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemRecord {
    pub item_code: Option<String>,
    pub position: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub interval_months: Option<i64>,
    pub interval_hours: Option<i64>,
    pub interval_landings: Option<i64>,
    pub adjusted_value: Option<i64>,
    pub adjusted_unit: Option<AdjustedUnit>,
    pub adjusted_delta: Option<i64>,
    pub part_number: Option<String>,
    pub part_serial: Option<String>,
    pub last_completed_date: Option<NaiveDate>,
    pub last_completed_hours: Option<i64>,
    pub last_completed_landings: Option<i64>,
    pub last_completed_city: Option<String>,
    pub due_next_date: Option<NaiveDate>,
    pub due_next_hours: Option<i64>,
    pub due_next_landings: Option<i64>,
    pub time_remaining_text: Option<String>,
    pub months_remaining: Option<i64>,
    pub days_remaining: Option<i64>,
    pub is_overdue_time: Option<bool>,
    pub hours_remaining: Option<i64>,
    pub landings_remaining: Option<i64>,
    pub status: Option<String>,
    pub status_note: Option<String>,
    /// Hash of the identifying fields, unique within a batch
    pub fingerprint: String,
}

impl ItemRecord {
    /// Numeric fields that must never be negative, by column name
    pub fn non_negative_fields(&self) -> [(&'static str, Option<i64>); 10] {
        [
            ("interval_months", self.interval_months),
            ("interval_hours", self.interval_hours),
            ("interval_landings", self.interval_landings),
            ("last_completed_hours", self.last_completed_hours),
            ("last_completed_landings", self.last_completed_landings),
            ("due_next_hours", self.due_next_hours),
            ("due_next_landings", self.due_next_landings),
            ("hours_remaining", self.hours_remaining),
            ("landings_remaining", self.landings_remaining),
            ("adjusted_value", self.adjusted_value),
        ]
    }
}

/// Unique identifier for a maintenance item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaintenanceItemId(pub i64);

impl std::fmt::Display for MaintenanceItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored ledger entry
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceItem {
    pub id: MaintenanceItemId,
    pub aircraft_id: AircraftId,
    pub import_batch_id: ImportBatchId,
    #[serde(flatten)]
    pub record: ItemRecord,
    pub created_at: DateTime<Utc>,
}

/// Optional filters on the published item listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub item_type: Option<String>,
    pub status: Option<String>,
}

impl ItemFilter {
    /// Types are stored lowercased, so the filter is too
    pub fn new(item_type: Option<String>, status: Option<String>) -> Self {
        Self {
            item_type: item_type
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty()),
            status: status.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        }
    }

    pub fn matches(&self, record: &ItemRecord) -> bool {
        let type_ok = match &self.item_type {
            Some(t) => record.item_type.as_deref() == Some(t.as_str()),
            None => true,
        };
        let status_ok = match &self.status {
            Some(s) => record.status.as_deref() == Some(s.as_str()),
            None => true,
        };
        type_ok && status_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjusted_unit_aliases() {
        assert_eq!("hr".parse::<AdjustedUnit>().unwrap(), AdjustedUnit::Hrs);
        assert_eq!("HRS".parse::<AdjustedUnit>().unwrap(), AdjustedUnit::Hrs);
        assert_eq!("ldg".parse::<AdjustedUnit>().unwrap(), AdjustedUnit::Ldgs);
        assert_eq!("c".parse::<AdjustedUnit>().unwrap(), AdjustedUnit::Ldgs);
        assert!("days".parse::<AdjustedUnit>().is_err());
        assert_eq!(AdjustedUnit::Ldgs.to_string(), "ldgs");
    }

    #[test]
    fn record_serializes_type_field_name() {
        let record = ItemRecord {
            item_type: Some("insp".to_string()),
            last_completed_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            fingerprint: "abc".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "insp");
        assert_eq!(json["last_completed_date"], "2024-01-15");
        assert!(json.get("item_type").is_none());
    }

    #[test]
    fn filter_normalizes_and_matches() {
        let filter = ItemFilter::new(Some(" INSP ".to_string()), Some("".to_string()));
        assert_eq!(filter.item_type.as_deref(), Some("insp"));
        assert!(filter.status.is_none());

        let record = ItemRecord {
            item_type: Some("insp".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&record));

        let other = ItemRecord {
            item_type: Some("ad".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&other));
    }
}
