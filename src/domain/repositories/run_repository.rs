use async_trait::async_trait;

use crate::domain::entities::Run;
use crate::domain::value_objects::ProjectRef;

#[derive(Debug)]
pub enum RunRepositoryError {
    NotFound(i32),
    DatabaseError(String),
    ValidationError(String),
}

impl std::fmt::Display for RunRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunRepositoryError::NotFound(id) => write!(f, "Run not found: {}", id),
            RunRepositoryError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            RunRepositoryError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for RunRepositoryError {}

#[async_trait]
pub trait RunRepository: Send + Sync {
    /// Inserts a blank Run for the project and returns it with its new id.
    async fn create(&self, project: &ProjectRef) -> Result<Run, RunRepositoryError>;
    async fn find_by_id(&self, run_id: i32) -> Result<Option<Run>, RunRepositoryError>;
    /// Persists task toggles and tuning parameters. Never touches `is_executed`.
    async fn update_configuration(&self, run: &Run) -> Result<(), RunRepositoryError>;
    async fn update_progress(&self, run: &Run) -> Result<(), RunRepositoryError>;
    /// Sets `is_executed = true`. Never cleared.
    async fn mark_executed(&self, run_id: i32) -> Result<(), RunRepositoryError>;

    async fn find_for_project(
        &self,
        project: &ProjectRef,
        run_id: i32,
    ) -> Result<Option<Run>, RunRepositoryError> {
        Ok(self
            .find_by_id(run_id)
            .await?
            .filter(|run| run.belongs_to(project)))
    }
}
