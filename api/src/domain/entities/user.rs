//! User and session domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Access role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including user management
    Admin,
    /// Registers aircraft and uploads imports
    Mechanic,
    /// Read-only
    Auditor,
}

impl Role {
    /// Roles allowed to write to the ledger
    pub const WRITERS: [Role; 2] = [Role::Admin, Role::Mechanic];
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Mechanic => write!(f, "mechanic"),
            Role::Auditor => write!(f, "auditor"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "mechanic" => Ok(Role::Mechanic),
            "auditor" => Ok(Role::Auditor),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// A user account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub password_salt: String,
}

/// Data needed to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub password_salt: String,
    pub role: Role,
}

/// A login session
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// The authenticated caller of a request
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub session_token: String,
    pub session_expires_at: DateTime<Utc>,
}

impl CurrentUser {
    pub fn from_session(user: User, session: Session) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            session_token: session.token,
            session_expires_at: session.expires_at,
        }
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}
