use std::sync::Arc;

use crate::application::services::ExecutionGuard;
use crate::application::services::PipelineOrchestrator;
use crate::application::services::pipeline_orchestrator::{ExecutionRequest, PipelineReport};
use crate::domain::repositories::{RunRepository, run_repository::RunRepositoryError};
use crate::domain::value_objects::{ProjectRef, TaskSelection};

#[derive(Debug)]
pub enum ExecuteRunError {
    NotFound(i32),
    ValidationError(String),
    Conflict(String),
    RepositoryError(String),
    /// The background execution task panicked or was cancelled.
    TaskError(String),
}

impl std::fmt::Display for ExecuteRunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecuteRunError::NotFound(id) => write!(f, "Run not found: {}", id),
            ExecuteRunError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ExecuteRunError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ExecuteRunError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
            ExecuteRunError::TaskError(msg) => write!(f, "Execution task error: {}", msg),
        }
    }
}

impl std::error::Error for ExecuteRunError {}

impl From<RunRepositoryError> for ExecuteRunError {
    fn from(error: RunRepositoryError) -> Self {
        ExecuteRunError::RepositoryError(error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ExecuteRunRequest {
    pub project: ProjectRef,
    pub run_id: i32,
    /// Task names overriding the Run's toggles.
    pub tasks: Option<Vec<String>>,
    pub skip_pipeline: bool,
}

/// Admits at most one execution per Run and hands it to the orchestrator.
/// A failed pipeline is still `Ok`: the report carries the failure.
///
/// The pipeline runs on its own task holding the Run's permit. Dropping the
/// caller's future does not release the Run or stop the pipeline.
pub struct ExecuteRunUseCase {
    run_repository: Arc<dyn RunRepository>,
    orchestrator: Arc<PipelineOrchestrator>,
    execution_guard: ExecutionGuard,
}

impl ExecuteRunUseCase {
    pub fn new(
        run_repository: Arc<dyn RunRepository>,
        orchestrator: Arc<PipelineOrchestrator>,
        execution_guard: ExecutionGuard,
    ) -> Self {
        Self {
            run_repository,
            orchestrator,
            execution_guard,
        }
    }

    pub async fn execute(
        &self,
        request: ExecuteRunRequest,
    ) -> Result<PipelineReport, ExecuteRunError> {
        let override_tasks = request
            .tasks
            .as_deref()
            .map(TaskSelection::from_names)
            .transpose()
            .map_err(ExecuteRunError::ValidationError)?;

        let permit = self
            .execution_guard
            .try_acquire(request.run_id)
            .ok_or_else(|| {
                ExecuteRunError::Conflict(format!(
                    "Run {} is already being executed",
                    request.run_id
                ))
            })?;

        let run = self
            .run_repository
            .find_for_project(&request.project, request.run_id)
            .await?
            .ok_or(ExecuteRunError::NotFound(request.run_id))?;

        if run.is_executed() {
            return Err(ExecuteRunError::Conflict(format!(
                "Run {} has already been executed",
                run.id()
            )));
        }

        let tasks = override_tasks.unwrap_or(*run.tasks());
        if tasks.is_empty() {
            return Err(ExecuteRunError::ValidationError(
                "At least one task must be selected".to_string(),
            ));
        }

        let orchestrator = self.orchestrator.clone();
        let execution = ExecutionRequest {
            project: request.project,
            run_id: run.id(),
            tasks: Some(tasks),
            skip_pipeline: request.skip_pipeline,
        };

        tokio::spawn(async move {
            let _permit = permit;
            orchestrator.execute(execution).await
        })
        .await
        .map_err(|e| ExecuteRunError::TaskError(format!("Task join error: {}", e)))
    }
}
