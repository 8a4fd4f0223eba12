//! SQLite adapter for SessionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::domain::entities::{Session, User, UserId};
use crate::domain::ports::SessionRepository;
use crate::entity::{user_session, users};
use crate::error::DomainError;

/// SQLite implementation of SessionRepository
pub struct SqliteSessionRepository {
    db: DatabaseConnection,
}

impl SqliteSessionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn create(&self, session: &Session) -> Result<(), DomainError> {
        let model = user_session::ActiveModel {
            token: Set(session.token.clone()),
            user_id: Set(session.user_id.0),
            expires_at: Set(session.expires_at),
            created_at: Set(Utc::now()),
        };

        user_session::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }

    async fn find_with_user(&self, token: &str) -> Result<Option<(Session, User)>, DomainError> {
        let result = user_session::Entity::find_by_id(token.to_string())
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        match result {
            Some((session, Some(user))) => Ok(Some((session.into(), User::try_from(user)?))),
            _ => Ok(None),
        }
    }

    async fn delete(&self, token: &str) -> Result<(), DomainError> {
        user_session::Entity::delete_by_id(token.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = user_session::Entity::delete_many()
            .filter(user_session::Column::ExpiresAt.lt(now))
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

/// Convert SeaORM model to domain entity
impl From<user_session::Model> for Session {
    fn from(model: user_session::Model) -> Self {
        Session {
            token: model.token,
            user_id: UserId(model.user_id),
            expires_at: model.expires_at,
        }
    }
}
