//! Auth service
//!
//! Password hashing, login sessions and user management.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::config::DefaultPasswords;
use crate::domain::entities::{CurrentUser, NewUser, Role, Session, User};
use crate::domain::ports::{SessionRepository, UserRepository};
use crate::error::{AppError, DomainError};

/// Shortest password accepted for new accounts
pub const MIN_PASSWORD_LEN: usize = 8;

/// Longest accepted username
pub const MAX_USERNAME_LEN: usize = 64;

/// Service for users and their sessions
pub struct AuthService<UR, SR>
where
    UR: UserRepository,
    SR: SessionRepository,
{
    users: Arc<UR>,
    sessions: Arc<SR>,
    session_duration: Duration,
}

impl<UR, SR> AuthService<UR, SR>
where
    UR: UserRepository,
    SR: SessionRepository,
{
    pub fn new(users: Arc<UR>, sessions: Arc<SR>, session_duration_seconds: i64) -> Self {
        Self {
            users,
            sessions,
            session_duration: Duration::try_seconds(session_duration_seconds)
                .unwrap_or(Duration::MAX),
        }
    }

    /// Seed the admin, mechanic and auditor accounts on an empty user table.
    ///
    /// Returns how many accounts were created.
    pub async fn ensure_default_users(
        &self,
        passwords: &DefaultPasswords,
    ) -> Result<usize, AppError> {
        if self.users.count().await? > 0 {
            return Ok(0);
        }

        if passwords.uses_builtin() {
            tracing::warn!(
                "Seeding default accounts with built-in passwords; set ADMIN_DEFAULT_PASSWORD, \
                 MECHANIC_DEFAULT_PASSWORD and AUDITOR_DEFAULT_PASSWORD"
            );
        }

        let defaults = [
            ("admin", passwords.admin.as_str(), Role::Admin),
            ("mechanic", passwords.mechanic.as_str(), Role::Mechanic),
            ("auditor", passwords.auditor.as_str(), Role::Auditor),
        ];
        for (username, password, role) in defaults {
            self.store_user(username, password, role).await?;
        }

        tracing::info!(count = defaults.len(), "Default accounts created");
        Ok(defaults.len())
    }

    /// Create an account
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AppError> {
        let username = normalize_username(username);
        if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
            return Err(AppError::BadRequest(format!(
                "Username must be between 1 and {} characters",
                MAX_USERNAME_LEN
            )));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let user = self.store_user(&username, password, role).await?;
        tracing::info!(username = %user.username, role = %user.role, "User created");
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.list().await?)
    }

    /// Check credentials and open a session
    pub async fn login(&self, username: &str, password: &str) -> Result<CurrentUser, AppError> {
        let username = normalize_username(username);
        let user = match self.users.find_by_username(&username).await? {
            Some(user) if verify_password(&user, password) => user,
            _ => {
                tracing::warn!(username = %username, "Failed login");
                return Err(
                    DomainError::Unauthorized("Invalid username or password".to_string()).into(),
                );
            }
        };

        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.session_duration)
            .ok_or_else(|| AppError::Internal("Session expiry out of range".to_string()))?;

        let purged = self.sessions.delete_expired(now).await?;
        if purged > 0 {
            tracing::debug!(purged, "Expired sessions removed");
        }

        let session = Session {
            token: generate_token(),
            user_id: user.id,
            expires_at,
        };
        self.sessions.create(&session).await?;

        tracing::info!(username = %user.username, role = %user.role, "Login");
        Ok(CurrentUser::from_session(user, session))
    }

    /// End a session
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        self.sessions.delete(token).await?;
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Expired sessions are removed.
    pub async fn authenticate(&self, token: &str) -> Result<CurrentUser, AppError> {
        let (session, user) = self
            .sessions
            .find_with_user(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if session.is_expired(Utc::now()) {
            self.sessions.delete(&session.token).await?;
            return Err(AppError::Unauthorized);
        }

        Ok(CurrentUser::from_session(user, session))
    }

    async fn store_user(&self, username: &str, password: &str, role: Role) -> Result<User, AppError> {
        let salt = generate_salt();
        let new_user = NewUser {
            username: username.to_string(),
            password_hash: hash_password(&salt, password),
            password_salt: salt,
            role,
        };
        Ok(self.users.create(&new_user).await?)
    }
}

/// Usernames are compared trimmed and lowercased
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// SHA-256 of salt followed by password, hex encoded
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn verify_password(user: &User, password: &str) -> bool {
    hash_password(&user.password_salt, password) == user.password_hash
}

fn generate_salt() -> String {
    random_hex(16)
}

fn generate_token() -> String {
    random_hex(32)
}

fn random_hex(len: usize) -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
    hex::encode(bytes)
}
