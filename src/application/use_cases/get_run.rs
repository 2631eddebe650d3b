use std::sync::Arc;

use crate::domain::entities::Run;
use crate::domain::repositories::{RunRepository, run_repository::RunRepositoryError};
use crate::domain::value_objects::ProjectRef;

#[derive(Debug)]
pub enum GetRunError {
    NotFound(i32),
    RepositoryError(String),
}

impl std::fmt::Display for GetRunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GetRunError::NotFound(id) => write!(f, "Run not found: {}", id),
            GetRunError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for GetRunError {}

impl From<RunRepositoryError> for GetRunError {
    fn from(error: RunRepositoryError) -> Self {
        match error {
            RunRepositoryError::NotFound(id) => GetRunError::NotFound(id),
            other => GetRunError::RepositoryError(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GetRunRequest {
    pub project: ProjectRef,
    pub run_id: i32,
}

#[derive(Debug, Clone)]
pub struct GetRunResponse {
    pub run: Run,
}

pub struct GetRunUseCase {
    run_repository: Arc<dyn RunRepository>,
}

impl GetRunUseCase {
    pub fn new(run_repository: Arc<dyn RunRepository>) -> Self {
        Self { run_repository }
    }

    pub async fn execute(&self, request: GetRunRequest) -> Result<GetRunResponse, GetRunError> {
        let run = self
            .run_repository
            .find_for_project(&request.project, request.run_id)
            .await?
            .ok_or(GetRunError::NotFound(request.run_id))?;
        Ok(GetRunResponse { run })
    }
}
