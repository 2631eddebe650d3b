use std::sync::Arc;

use crate::domain::repositories::{RunRepository, run_repository::RunRepositoryError};
use crate::domain::value_objects::ProjectRef;

#[derive(Debug)]
pub enum CreateRunError {
    RepositoryError(String),
}

impl std::fmt::Display for CreateRunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreateRunError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for CreateRunError {}

impl From<RunRepositoryError> for CreateRunError {
    fn from(error: RunRepositoryError) -> Self {
        CreateRunError::RepositoryError(error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateRunRequest {
    pub project: ProjectRef,
}

#[derive(Debug, Clone)]
pub struct CreateRunResponse {
    pub run_id: i32,
}

pub struct CreateRunUseCase {
    run_repository: Arc<dyn RunRepository>,
}

impl CreateRunUseCase {
    pub fn new(run_repository: Arc<dyn RunRepository>) -> Self {
        Self { run_repository }
    }

    pub async fn execute(
        &self,
        request: CreateRunRequest,
    ) -> Result<CreateRunResponse, CreateRunError> {
        let run = self.run_repository.create(&request.project).await?;
        tracing::info!("Created run {} for project {}", run.id(), request.project);
        Ok(CreateRunResponse { run_id: run.id() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryRunRepository;

    #[tokio::test]
    async fn test_new_run_is_blank() {
        let runs = Arc::new(InMemoryRunRepository::default());
        let use_case = CreateRunUseCase::new(runs.clone());
        let project = ProjectRef::new(1, "papers");

        let response = use_case
            .execute(CreateRunRequest {
                project: project.clone(),
            })
            .await
            .unwrap();

        let run = runs.find_by_id(response.run_id).await.unwrap().unwrap();
        assert!(run.belongs_to(&project));
        assert!(!run.is_executed());
        assert!(run.tasks().is_empty());
    }
}
