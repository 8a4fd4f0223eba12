//! SQLite adapter for UserRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::write_error;
use crate::domain::entities::{NewUser, User, UserId};
use crate::domain::ports::UserRepository;
use crate::entity::users;
use crate::error::DomainError;

/// SQLite implementation of UserRepository
pub struct SqliteUserRepository {
    db: DatabaseConnection,
}

impl SqliteUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let result = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        result.map(User::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let results = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        results.into_iter().map(User::try_from).collect()
    }

    async fn count(&self) -> Result<u64, DomainError> {
        users::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }

    async fn create(&self, user: &NewUser) -> Result<User, DomainError> {
        let model = users::ActiveModel {
            username: Set(user.username.clone()),
            password_hash: Set(user.password_hash.clone()),
            password_salt: Set(user.password_salt.clone()),
            role: Set(user.role.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            write_error(e, || {
                DomainError::AlreadyExists(format!("User '{}' already exists", user.username))
            })
        })?;

        User::try_from(result)
    }
}

impl TryFrom<users::Model> for User {
    type Error = DomainError;

    fn try_from(model: users::Model) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(model.id),
            username: model.username,
            role: model.role.parse().map_err(DomainError::Internal)?,
            created_at: model.created_at,
            password_hash: model.password_hash,
            password_salt: model.password_salt,
        })
    }
}
