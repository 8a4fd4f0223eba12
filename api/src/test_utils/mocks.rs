//! In-memory implementations of port traits
//!
//! They keep data behind a shared lock so a test can hand clones to a
//! service and inspect the same state afterwards.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::entities::{
    Aircraft, AircraftId, BatchStatus, ImportBatch, ImportBatchId, ImportIssue, ItemFilter,
    MaintenanceItem, MaintenanceItemId, NewAircraft, NewImport, NewUser, PageRequest,
    QuarantineEntry, QuarantineEntryId, Session, User, UserId,
};
use crate::domain::ports::{
    AircraftRepository, ImportBatchRepository, MaintenanceItemRepository, QuarantineRepository,
    SessionRepository, UserRepository,
};
use crate::error::DomainError;

// ============================================================================
// In-Memory Ledger (aircraft, batches, items, quarantine)
// ============================================================================

#[derive(Default)]
struct LedgerState {
    aircraft: Vec<Aircraft>,
    batches: Vec<ImportBatch>,
    issues: Vec<(ImportBatchId, ImportIssue)>,
    items: Vec<MaintenanceItem>,
    quarantine: Vec<QuarantineEntry>,
}

#[derive(Default, Clone)]
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with an aircraft for testing
    pub fn with_aircraft(self, aircraft: Aircraft) -> Self {
        self.state.write().unwrap().aircraft.push(aircraft);
        self
    }

    pub fn batches(&self) -> Vec<ImportBatch> {
        self.state.read().unwrap().batches.clone()
    }

    fn is_published(state: &LedgerState, item: &MaintenanceItem) -> bool {
        state
            .batches
            .iter()
            .any(|b| b.id == item.import_batch_id && b.status == BatchStatus::Loaded)
    }
}

#[async_trait]
impl AircraftRepository for InMemoryLedger {
    async fn find_by_id(&self, id: &AircraftId) -> Result<Option<Aircraft>, DomainError> {
        let state = self.state.read().unwrap();
        Ok(state.aircraft.iter().find(|a| a.id == *id).cloned())
    }

    async fn list(&self) -> Result<Vec<Aircraft>, DomainError> {
        let state = self.state.read().unwrap();
        let mut aircraft = state.aircraft.clone();
        aircraft.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.0.cmp(&a.id.0)));
        Ok(aircraft)
    }

    async fn create(&self, new_aircraft: &NewAircraft) -> Result<Aircraft, DomainError> {
        let mut state = self.state.write().unwrap();
        let next_id = state.aircraft.iter().map(|a| a.id.0).max().unwrap_or(0) + 1;
        let aircraft = Aircraft {
            id: AircraftId(next_id),
            name: new_aircraft.name.clone(),
            model: new_aircraft.model.clone(),
            created_at: Utc::now(),
        };
        state.aircraft.push(aircraft.clone());
        Ok(aircraft)
    }
}

#[async_trait]
impl ImportBatchRepository for InMemoryLedger {
    async fn find_by_id(&self, id: &ImportBatchId) -> Result<Option<ImportBatch>, DomainError> {
        let state = self.state.read().unwrap();
        Ok(state.batches.iter().find(|b| b.id == *id).cloned())
    }

    async fn find_by_file_hash(
        &self,
        aircraft_id: &AircraftId,
        file_sha256: &str,
    ) -> Result<Option<ImportBatch>, DomainError> {
        let state = self.state.read().unwrap();
        Ok(state
            .batches
            .iter()
            .find(|b| b.aircraft_id == *aircraft_id && b.file_sha256 == file_sha256)
            .cloned())
    }

    async fn list_by_aircraft(
        &self,
        aircraft_id: &AircraftId,
    ) -> Result<Vec<ImportBatch>, DomainError> {
        let state = self.state.read().unwrap();
        let mut batches: Vec<ImportBatch> = state
            .batches
            .iter()
            .filter(|b| b.aircraft_id == *aircraft_id)
            .cloned()
            .collect();
        batches.sort_by(|a, b| b.id.0.cmp(&a.id.0));
        Ok(batches)
    }

    async fn record(&self, import: &NewImport) -> Result<ImportBatch, DomainError> {
        let mut state = self.state.write().unwrap();

        if state
            .batches
            .iter()
            .any(|b| b.aircraft_id == import.aircraft_id && b.file_sha256 == import.file_sha256)
        {
            return Err(DomainError::Conflict(
                "File already imported for this aircraft".to_string(),
            ));
        }

        let now = Utc::now();
        let batch = ImportBatch {
            id: ImportBatchId(state.batches.len() as i64 + 1),
            aircraft_id: import.aircraft_id,
            file_name: import.file_name.clone(),
            file_sha256: import.file_sha256.clone(),
            started_at: import.started_at,
            completed_at: Some(now),
            total_rows: import.total_rows,
            inserted_rows: import.items.len() as i64,
            error_rows: import.issues.len() as i64,
            status: import.status,
        };

        for issue in &import.issues {
            state.issues.push((
                batch.id,
                ImportIssue {
                    issue: issue.clone(),
                    created_at: now,
                },
            ));
        }

        for record in &import.items {
            let id = MaintenanceItemId(state.items.len() as i64 + 1);
            state.items.push(MaintenanceItem {
                id,
                aircraft_id: import.aircraft_id,
                import_batch_id: batch.id,
                record: record.clone(),
                created_at: now,
            });
        }

        for entry in &import.quarantine {
            let id = QuarantineEntryId(state.quarantine.len() as i64 + 1);
            state.quarantine.push(QuarantineEntry {
                id,
                aircraft_id: import.aircraft_id,
                import_batch_id: batch.id,
                source_row_index: entry.source_row_index,
                reason: entry.reason,
                error_message: entry.error_message.clone(),
                record: entry.record.clone(),
                quarantined_at: now,
            });
        }

        state.batches.push(batch.clone());
        Ok(batch)
    }

    async fn list_issues(
        &self,
        id: &ImportBatchId,
        page: PageRequest,
    ) -> Result<Vec<ImportIssue>, DomainError> {
        let state = self.state.read().unwrap();
        Ok(page.apply(
            state
                .issues
                .iter()
                .filter(|(batch_id, _)| batch_id == id)
                .map(|(_, issue)| issue.clone()),
        ))
    }
}

#[async_trait]
impl MaintenanceItemRepository for InMemoryLedger {
    async fn list_published(
        &self,
        aircraft_id: &AircraftId,
        filter: &ItemFilter,
        page: PageRequest,
    ) -> Result<Vec<MaintenanceItem>, DomainError> {
        let state = self.state.read().unwrap();
        Ok(page.apply(
            state
                .items
                .iter()
                .filter(|i| i.aircraft_id == *aircraft_id)
                .filter(|i| filter.matches(&i.record))
                .filter(|i| Self::is_published(&state, i))
                .cloned(),
        ))
    }

    async fn count_published(
        &self,
        aircraft_id: &AircraftId,
        filter: &ItemFilter,
    ) -> Result<u64, DomainError> {
        let state = self.state.read().unwrap();
        Ok(state
            .items
            .iter()
            .filter(|i| i.aircraft_id == *aircraft_id)
            .filter(|i| filter.matches(&i.record))
            .filter(|i| Self::is_published(&state, i))
            .count() as u64)
    }
}

#[async_trait]
impl QuarantineRepository for InMemoryLedger {
    async fn list(
        &self,
        aircraft_id: &AircraftId,
        batch_id: Option<&ImportBatchId>,
        page: PageRequest,
    ) -> Result<Vec<QuarantineEntry>, DomainError> {
        let state = self.state.read().unwrap();
        Ok(page.apply(
            state
                .quarantine
                .iter()
                .filter(|q| q.aircraft_id == *aircraft_id)
                .filter(|q| batch_id.map_or(true, |b| q.import_batch_id == *b))
                .cloned(),
        ))
    }

    async fn count(
        &self,
        aircraft_id: &AircraftId,
        batch_id: Option<&ImportBatchId>,
    ) -> Result<u64, DomainError> {
        let state = self.state.read().unwrap();
        Ok(state
            .quarantine
            .iter()
            .filter(|q| q.aircraft_id == *aircraft_id)
            .filter(|q| batch_id.map_or(true, |b| q.import_batch_id == *b))
            .count() as u64)
    }
}

// ============================================================================
// In-Memory Users and Sessions
// ============================================================================

#[derive(Default)]
struct UserState {
    users: Vec<User>,
    sessions: HashMap<String, Session>,
}

#[derive(Default, Clone)]
pub struct InMemoryUsers {
    state: Arc<RwLock<UserState>>,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a user for testing
    pub fn with_user(self, user: User) -> Self {
        self.state.write().unwrap().users.push(user);
        self
    }

    /// Pre-populate with a session for testing
    pub fn with_session(self, session: Session) -> Self {
        self.state
            .write()
            .unwrap()
            .sessions
            .insert(session.token.clone(), session);
        self
    }

    pub fn session_count(&self) -> usize {
        self.state.read().unwrap().sessions.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let state = self.state.read().unwrap();
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let state = self.state.read().unwrap();
        let mut users = state.users.clone();
        users.sort_by_key(|u| u.id.0);
        Ok(users)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.state.read().unwrap().users.len() as u64)
    }

    async fn create(&self, new_user: &NewUser) -> Result<User, DomainError> {
        let mut state = self.state.write().unwrap();
        if state.users.iter().any(|u| u.username == new_user.username) {
            return Err(DomainError::AlreadyExists(format!(
                "User '{}' already exists",
                new_user.username
            )));
        }

        let next_id = state.users.iter().map(|u| u.id.0).max().unwrap_or(0) + 1;
        let user = User {
            id: UserId(next_id),
            username: new_user.username.clone(),
            role: new_user.role,
            created_at: Utc::now(),
            password_hash: new_user.password_hash.clone(),
            password_salt: new_user.password_salt.clone(),
        };
        state.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl SessionRepository for InMemoryUsers {
    async fn create(&self, session: &Session) -> Result<(), DomainError> {
        self.state
            .write()
            .unwrap()
            .sessions
            .insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn find_with_user(&self, token: &str) -> Result<Option<(Session, User)>, DomainError> {
        let state = self.state.read().unwrap();
        let Some(session) = state.sessions.get(token) else {
            return Ok(None);
        };
        Ok(state
            .users
            .iter()
            .find(|u| u.id == session.user_id)
            .map(|u| (session.clone(), u.clone())))
    }

    async fn delete(&self, token: &str) -> Result<(), DomainError> {
        self.state.write().unwrap().sessions.remove(token);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut state = self.state.write().unwrap();
        let before = state.sessions.len();
        state.sessions.retain(|_, s| !s.is_expired(now));
        Ok((before - state.sessions.len()) as u64)
    }
}
