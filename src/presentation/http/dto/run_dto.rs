use serde::{Deserialize, Serialize};

use crate::application::use_cases::configure_run::ConfigureRunResponse;
use crate::application::use_cases::report_progress::ReportProgressResponse;
use crate::domain::entities::Run;
use crate::domain::entities::run::{FigureTuning, GraphTuning, TaskProgress};
use crate::domain::value_objects::{ProjectRef, TaskSelection};

#[derive(Debug, Deserialize)]
pub struct ProjectPathDto {
    pub user_id: i32,
    pub project_name: String,
}

impl ProjectPathDto {
    pub fn project(self) -> ProjectRef {
        ProjectRef::new(self.user_id, self.project_name)
    }
}

#[derive(Debug, Deserialize)]
pub struct RunPathDto {
    pub user_id: i32,
    pub project_name: String,
    pub run_id: i32,
}

impl RunPathDto {
    pub fn into_parts(self) -> (ProjectRef, i32) {
        (ProjectRef::new(self.user_id, self.project_name), self.run_id)
    }
}

#[derive(Debug, Serialize)]
pub struct RunResponseDto {
    pub id: i32,
    pub user_id: i32,
    pub project_name: String,
    pub tasks: TaskSelection,
    pub figure_tuning: FigureTuning,
    pub graph_tuning: GraphTuning,
    pub is_executed: bool,
    pub progress: TaskProgress,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Run> for RunResponseDto {
    fn from(run: Run) -> Self {
        Self {
            id: run.id(),
            user_id: run.project().user_id,
            project_name: run.project().project_name.clone(),
            tasks: *run.tasks(),
            figure_tuning: run.figure_tuning().clone(),
            graph_tuning: run.graph_tuning().clone(),
            is_executed: run.is_executed(),
            progress: *run.progress(),
            created_at: run.created_at().to_rfc3339(),
            updated_at: run.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateRunResponseDto {
    pub run_id: i32,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ConfigureRunResponseDto {
    pub run_id: i32,
    pub fields_updated: usize,
    pub message: String,
}

impl From<ConfigureRunResponse> for ConfigureRunResponseDto {
    fn from(response: ConfigureRunResponse) -> Self {
        Self {
            run_id: response.run_id,
            fields_updated: response.fields_updated,
            message: format!("Updated {} field(s)", response.fields_updated),
        }
    }
}

/// Body of an execute request. Both fields are optional and the body
/// itself may be omitted.
#[derive(Debug, Default, Deserialize)]
pub struct ExecuteRunRequestDto {
    pub tasks: Option<Vec<String>>,
    #[serde(default)]
    pub skip_pipeline: bool,
}

#[derive(Debug, Serialize)]
pub struct ReportProgressResponseDto {
    pub run_id: i32,
    pub fields_updated: usize,
    pub progress: TaskProgress,
}

impl From<ReportProgressResponse> for ReportProgressResponseDto {
    fn from(response: ReportProgressResponse) -> Self {
        Self {
            run_id: response.run_id,
            fields_updated: response.fields_updated,
            progress: response.progress,
        }
    }
}
