use std::sync::Arc;

use crate::domain::entities::run::{ProgressUpdate, TaskProgress};
use crate::domain::repositories::{RunRepository, run_repository::RunRepositoryError};
use crate::domain::value_objects::ProjectRef;

#[derive(Debug)]
pub enum ReportProgressError {
    NotFound(i32),
    ValidationError(String),
    RepositoryError(String),
}

impl std::fmt::Display for ReportProgressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportProgressError::NotFound(id) => write!(f, "Run not found: {}", id),
            ReportProgressError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ReportProgressError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for ReportProgressError {}

impl From<RunRepositoryError> for ReportProgressError {
    fn from(error: RunRepositoryError) -> Self {
        match error {
            RunRepositoryError::NotFound(id) => ReportProgressError::NotFound(id),
            RunRepositoryError::ValidationError(msg) => ReportProgressError::ValidationError(msg),
            RunRepositoryError::DatabaseError(msg) => ReportProgressError::RepositoryError(msg),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportProgressRequest {
    pub project: ProjectRef,
    pub run_id: i32,
    pub update: ProgressUpdate,
}

#[derive(Debug, Clone)]
pub struct ReportProgressResponse {
    pub run_id: i32,
    pub fields_updated: usize,
    pub progress: TaskProgress,
}

/// Stores progress percentages computed by the external programs.
pub struct ReportProgressUseCase {
    run_repository: Arc<dyn RunRepository>,
}

impl ReportProgressUseCase {
    pub fn new(run_repository: Arc<dyn RunRepository>) -> Self {
        Self { run_repository }
    }

    pub async fn execute(
        &self,
        request: ReportProgressRequest,
    ) -> Result<ReportProgressResponse, ReportProgressError> {
        let mut run = self
            .run_repository
            .find_for_project(&request.project, request.run_id)
            .await?
            .ok_or(ReportProgressError::NotFound(request.run_id))?;

        let fields_updated = run
            .record_progress(request.update)
            .map_err(ReportProgressError::ValidationError)?;
        self.run_repository.update_progress(&run).await?;

        Ok(ReportProgressResponse {
            run_id: run.id(),
            fields_updated,
            progress: *run.progress(),
        })
    }
}
