//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., SQLite).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{
    Aircraft, AircraftId, ImportBatch, ImportBatchId, ImportIssue, ItemFilter,
    MaintenanceItem, NewAircraft, NewImport, NewUser, PageRequest, QuarantineEntry, Session, User,
};
use crate::error::DomainError;

/// Repository for Aircraft entities
#[async_trait]
pub trait AircraftRepository: Send + Sync {
    /// Find an aircraft by ID
    async fn find_by_id(&self, id: &AircraftId) -> Result<Option<Aircraft>, DomainError>;

    /// List all aircraft, newest first
    async fn list(&self) -> Result<Vec<Aircraft>, DomainError>;

    /// Register a new aircraft
    async fn create(&self, aircraft: &NewAircraft) -> Result<Aircraft, DomainError>;
}

/// Repository for import batches and their row issues
#[async_trait]
pub trait ImportBatchRepository: Send + Sync {
    /// Find a batch by ID
    async fn find_by_id(&self, id: &ImportBatchId) -> Result<Option<ImportBatch>, DomainError>;

    /// Find the batch that already loaded this file for this aircraft
    async fn find_by_file_hash(
        &self,
        aircraft_id: &AircraftId,
        file_sha256: &str,
    ) -> Result<Option<ImportBatch>, DomainError>;

    /// List batches of an aircraft, newest first
    async fn list_by_aircraft(
        &self,
        aircraft_id: &AircraftId,
    ) -> Result<Vec<ImportBatch>, DomainError>;

    /// Persist a whole import atomically: the batch, its issues, its items
    /// and its quarantine entries.
    ///
    /// Fails with `DomainError::Conflict` when the file was already imported
    /// for the aircraft.
    async fn record(&self, import: &NewImport) -> Result<ImportBatch, DomainError>;

    /// List the issues of a batch in insertion order
    async fn list_issues(
        &self,
        id: &ImportBatchId,
        page: PageRequest,
    ) -> Result<Vec<ImportIssue>, DomainError>;
}

/// Read access to published maintenance items
#[async_trait]
pub trait MaintenanceItemRepository: Send + Sync {
    /// List items of loaded batches, ordered by ID
    async fn list_published(
        &self,
        aircraft_id: &AircraftId,
        filter: &ItemFilter,
        page: PageRequest,
    ) -> Result<Vec<MaintenanceItem>, DomainError>;

    /// Count items of loaded batches
    async fn count_published(
        &self,
        aircraft_id: &AircraftId,
        filter: &ItemFilter,
    ) -> Result<u64, DomainError>;
}

/// Read access to quarantined rows
#[async_trait]
pub trait QuarantineRepository: Send + Sync {
    /// List entries of an aircraft, optionally limited to one batch
    async fn list(
        &self,
        aircraft_id: &AircraftId,
        batch_id: Option<&ImportBatchId>,
        page: PageRequest,
    ) -> Result<Vec<QuarantineEntry>, DomainError>;

    /// Count entries of an aircraft, optionally limited to one batch
    async fn count(
        &self,
        aircraft_id: &AircraftId,
        batch_id: Option<&ImportBatchId>,
    ) -> Result<u64, DomainError>;
}

/// Repository for User entities
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by normalized username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// List all users
    async fn list(&self) -> Result<Vec<User>, DomainError>;

    /// Count users
    async fn count(&self) -> Result<u64, DomainError>;

    /// Create a user
    ///
    /// Fails with `DomainError::AlreadyExists` when the username is taken.
    async fn create(&self, user: &NewUser) -> Result<User, DomainError>;
}

/// Repository for login sessions
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a new session
    async fn create(&self, session: &Session) -> Result<(), DomainError>;

    /// Resolve a token to its session and user
    async fn find_with_user(&self, token: &str) -> Result<Option<(Session, User)>, DomainError>;

    /// Remove a session; removing an unknown token is not an error
    async fn delete(&self, token: &str) -> Result<(), DomainError>;

    /// Remove every session that expired before `now`, returning how many
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;
}

