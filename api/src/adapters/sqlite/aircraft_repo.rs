//! SQLite adapter for AircraftRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::domain::entities::{Aircraft, AircraftId, NewAircraft};
use crate::domain::ports::AircraftRepository;
use crate::entity::aircraft;
use crate::error::DomainError;

/// SQLite implementation of AircraftRepository
pub struct SqliteAircraftRepository {
    db: DatabaseConnection,
}

impl SqliteAircraftRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AircraftRepository for SqliteAircraftRepository {
    async fn find_by_id(&self, id: &AircraftId) -> Result<Option<Aircraft>, DomainError> {
        let result = aircraft::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn list(&self) -> Result<Vec<Aircraft>, DomainError> {
        let results = aircraft::Entity::find()
            .order_by_desc(aircraft::Column::CreatedAt)
            .order_by_desc(aircraft::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create(&self, new_aircraft: &NewAircraft) -> Result<Aircraft, DomainError> {
        let model = aircraft::ActiveModel {
            name: Set(new_aircraft.name.clone()),
            model: Set(new_aircraft.model.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }
}

/// Convert SeaORM model to domain entity
impl From<aircraft::Model> for Aircraft {
    fn from(model: aircraft::Model) -> Self {
        Aircraft {
            id: AircraftId(model.id),
            name: model.name,
            model: model.model,
            created_at: model.created_at,
        }
    }
}
