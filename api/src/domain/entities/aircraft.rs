//! Aircraft domain entity
//!
//! An aircraft is the owner of every import batch and maintenance item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Model recorded when none is supplied
pub const DEFAULT_MODEL: &str = "N/A";

/// Longest accepted aircraft name
pub const MAX_NAME_LEN: usize = 120;

/// Unique identifier for an aircraft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AircraftId(pub i64);

impl From<i64> for AircraftId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AircraftId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered aircraft
#[derive(Debug, Clone, Serialize)]
pub struct Aircraft {
    pub id: AircraftId,
    pub name: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

/// Data needed to register an aircraft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAircraft {
    pub name: String,
    pub model: String,
}

impl NewAircraft {
    /// Normalize raw form input.
    ///
    /// Both values are trimmed; an empty model becomes [`DEFAULT_MODEL`].
    /// Returns `None` when the name is empty or too long.
    pub fn normalized(name: &str, model: Option<&str>) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return None;
        }

        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL);

        Some(Self {
            name: name.to_string(),
            model: model.to_string(),
        })
    }
}
