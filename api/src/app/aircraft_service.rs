//! Aircraft service
//!
//! Registers aircraft, optionally loading a first CSV upload right away.

use std::sync::Arc;

use super::import_service::{ImportService, PreparedImport, Upload};
use crate::domain::entities::{
    Aircraft, AircraftId, ImportBatch, ImportSummary, NewAircraft, PublishMode, MAX_NAME_LEN,
};
use crate::domain::ports::{AircraftRepository, ImportBatchRepository};
use crate::error::AppError;

/// Service for managing aircraft
pub struct AircraftService<AR, IR>
where
    AR: AircraftRepository,
    IR: ImportBatchRepository,
{
    aircraft: Arc<AR>,
    imports: Arc<IR>,
    importer: ImportService<AR, IR>,
}

impl<AR, IR> AircraftService<AR, IR>
where
    AR: AircraftRepository,
    IR: ImportBatchRepository,
{
    pub fn new(aircraft: Arc<AR>, imports: Arc<IR>) -> Self {
        let importer = ImportService::new(aircraft.clone(), imports.clone());
        Self {
            aircraft,
            imports,
            importer,
        }
    }

    /// Register an aircraft.
    ///
    /// An attached file is checked before the aircraft is stored, so a
    /// malformed upload leaves nothing behind.
    pub async fn create(
        &self,
        name: &str,
        model: Option<&str>,
        upload: Option<&Upload>,
        mode: PublishMode,
    ) -> Result<(Aircraft, Option<ImportSummary>), AppError> {
        let new_aircraft = NewAircraft::normalized(name, model).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Name must be between 1 and {} characters",
                MAX_NAME_LEN
            ))
        })?;

        let prepared = upload.map(PreparedImport::from_upload).transpose()?;

        let aircraft = self.aircraft.create(&new_aircraft).await?;
        tracing::info!(aircraft_id = %aircraft.id, name = %aircraft.name, "Aircraft registered");

        let summary = match prepared {
            Some(prepared) => Some(self.importer.commit(&aircraft.id, prepared, mode).await?),
            None => None,
        };

        Ok((aircraft, summary))
    }

    /// List all aircraft, newest first
    pub async fn list(&self) -> Result<Vec<Aircraft>, AppError> {
        Ok(self.aircraft.list().await?)
    }

    /// Get one aircraft
    pub async fn get(&self, id: &AircraftId) -> Result<Aircraft, AppError> {
        self.aircraft
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Aircraft {} not found", id)))
    }

    /// Import batches of an aircraft, newest first
    pub async fn list_imports(&self, id: &AircraftId) -> Result<Vec<ImportBatch>, AppError> {
        self.get(id).await?;
        Ok(self.imports.list_by_aircraft(id).await?)
    }

    /// Import an upload for an existing aircraft
    pub async fn import(
        &self,
        id: &AircraftId,
        upload: &Upload,
        mode: PublishMode,
    ) -> Result<ImportSummary, AppError> {
        self.importer.import_csv(id, upload, mode).await
    }
}
