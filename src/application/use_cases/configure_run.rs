use std::sync::Arc;

use crate::domain::entities::run::RunUpdate;
use crate::domain::repositories::{RunRepository, run_repository::RunRepositoryError};
use crate::domain::value_objects::ProjectRef;

#[derive(Debug)]
pub enum ConfigureRunError {
    NotFound(i32),
    ValidationError(String),
    RepositoryError(String),
}

impl std::fmt::Display for ConfigureRunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigureRunError::NotFound(id) => write!(f, "Run not found: {}", id),
            ConfigureRunError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ConfigureRunError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigureRunError {}

impl From<RunRepositoryError> for ConfigureRunError {
    fn from(error: RunRepositoryError) -> Self {
        match error {
            RunRepositoryError::NotFound(id) => ConfigureRunError::NotFound(id),
            RunRepositoryError::ValidationError(msg) => ConfigureRunError::ValidationError(msg),
            RunRepositoryError::DatabaseError(msg) => ConfigureRunError::RepositoryError(msg),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigureRunRequest {
    pub project: ProjectRef,
    pub run_id: i32,
    pub update: RunUpdate,
}

#[derive(Debug, Clone)]
pub struct ConfigureRunResponse {
    pub run_id: i32,
    pub fields_updated: usize,
}

pub struct ConfigureRunUseCase {
    run_repository: Arc<dyn RunRepository>,
}

impl ConfigureRunUseCase {
    pub fn new(run_repository: Arc<dyn RunRepository>) -> Self {
        Self { run_repository }
    }

    pub async fn execute(
        &self,
        request: ConfigureRunRequest,
    ) -> Result<ConfigureRunResponse, ConfigureRunError> {
        let mut run = self
            .run_repository
            .find_for_project(&request.project, request.run_id)
            .await?
            .ok_or(ConfigureRunError::NotFound(request.run_id))?;

        let fields_updated = run
            .apply_update(request.update)
            .map_err(ConfigureRunError::ValidationError)?;

        self.run_repository.update_configuration(&run).await?;

        Ok(ConfigureRunResponse {
            run_id: run.id(),
            fields_updated,
        })
    }
}
