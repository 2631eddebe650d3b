use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::application::services::pipeline_orchestrator::{
    PipelineFailure, PipelineOutcome, PipelineReport,
};
use crate::application::services::verification_reconciler::VerificationReport;
use crate::application::use_cases::{
    ConfigureRunUseCase, CreateRunUseCase, ExecuteRunUseCase, GetRunUseCase,
    ListRunDocumentsUseCase, ReportProgressUseCase, VerifyRunUseCase,
    configure_run::{ConfigureRunError, ConfigureRunRequest},
    create_run::CreateRunRequest,
    execute_run::{ExecuteRunError, ExecuteRunRequest},
    get_run::{GetRunError, GetRunRequest},
    list_run_documents::{ListRunDocumentsError, ListRunDocumentsRequest},
    report_progress::{ReportProgressError, ReportProgressRequest},
    verify_run::{VerifyRunError, VerifyRunRequest},
};
use crate::domain::entities::run::{ProgressUpdate, RunUpdate};
use crate::presentation::http::dto::{
    ApiResponse, ConfigureRunResponseDto, CreateRunResponseDto, ExecuteRunRequestDto,
    ProjectPathDto, ReportProgressResponseDto, RunDocumentsResponseDto, RunPathDto,
    RunResponseDto,
};

pub struct RunHandler {
    create_run_use_case: Arc<CreateRunUseCase>,
    get_run_use_case: Arc<GetRunUseCase>,
    configure_run_use_case: Arc<ConfigureRunUseCase>,
    list_run_documents_use_case: Arc<ListRunDocumentsUseCase>,
    execute_run_use_case: Arc<ExecuteRunUseCase>,
    verify_run_use_case: Arc<VerifyRunUseCase>,
    report_progress_use_case: Arc<ReportProgressUseCase>,
}

impl RunHandler {
    pub fn new(
        create_run_use_case: Arc<CreateRunUseCase>,
        get_run_use_case: Arc<GetRunUseCase>,
        configure_run_use_case: Arc<ConfigureRunUseCase>,
        list_run_documents_use_case: Arc<ListRunDocumentsUseCase>,
        execute_run_use_case: Arc<ExecuteRunUseCase>,
        verify_run_use_case: Arc<VerifyRunUseCase>,
        report_progress_use_case: Arc<ReportProgressUseCase>,
    ) -> Self {
        Self {
            create_run_use_case,
            get_run_use_case,
            configure_run_use_case,
            list_run_documents_use_case,
            execute_run_use_case,
            verify_run_use_case,
            report_progress_use_case,
        }
    }

    pub async fn create_run(
        State(handler): State<Arc<RunHandler>>,
        Path(path): Path<ProjectPathDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let request = CreateRunRequest {
            project: path.project(),
        };

        match handler.create_run_use_case.execute(request).await {
            Ok(response) => {
                let dto = CreateRunResponseDto {
                    run_id: response.run_id,
                    message: "Run created".to_string(),
                };
                Ok((StatusCode::CREATED, Json(ApiResponse::success(dto))))
            }
            Err(e) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<CreateRunResponseDto>::error(
                    "REPOSITORY_ERROR".to_string(),
                    e.to_string(),
                    None,
                )),
            )),
        }
    }

    pub async fn get_run(
        State(handler): State<Arc<RunHandler>>,
        Path(path): Path<RunPathDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let (project, run_id) = path.into_parts();

        match handler
            .get_run_use_case
            .execute(GetRunRequest { project, run_id })
            .await
        {
            Ok(response) => {
                let dto = RunResponseDto::from(response.run);
                Ok((StatusCode::OK, Json(ApiResponse::success(dto))))
            }
            Err(e) => {
                let (status, code) = match e {
                    GetRunError::NotFound(_) => (StatusCode::NOT_FOUND, "RUN_NOT_FOUND"),
                    GetRunError::RepositoryError(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR")
                    }
                };
                Ok((
                    status,
                    Json(ApiResponse::<RunResponseDto>::error(
                        code.to_string(),
                        e.to_string(),
                        None,
                    )),
                ))
            }
        }
    }

    pub async fn configure_run(
        State(handler): State<Arc<RunHandler>>,
        Path(path): Path<RunPathDto>,
        Json(update): Json<RunUpdate>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let (project, run_id) = path.into_parts();
        let request = ConfigureRunRequest {
            project,
            run_id,
            update,
        };

        match handler.configure_run_use_case.execute(request).await {
            Ok(response) => {
                let dto = ConfigureRunResponseDto::from(response);
                Ok((StatusCode::OK, Json(ApiResponse::success(dto))))
            }
            Err(e) => {
                let (status, code) = match e {
                    ConfigureRunError::NotFound(_) => (StatusCode::NOT_FOUND, "RUN_NOT_FOUND"),
                    ConfigureRunError::ValidationError(_) => {
                        (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
                    }
                    ConfigureRunError::RepositoryError(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR")
                    }
                };
                Ok((
                    status,
                    Json(ApiResponse::<ConfigureRunResponseDto>::error(
                        code.to_string(),
                        e.to_string(),
                        None,
                    )),
                ))
            }
        }
    }

    pub async fn list_documents(
        State(handler): State<Arc<RunHandler>>,
        Path(path): Path<RunPathDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let (project, run_id) = path.into_parts();

        match handler
            .list_run_documents_use_case
            .execute(ListRunDocumentsRequest { project, run_id })
            .await
        {
            Ok(response) => {
                let dto = RunDocumentsResponseDto::from(response);
                Ok((StatusCode::OK, Json(ApiResponse::success(dto))))
            }
            Err(e) => {
                let (status, code) = match e {
                    ListRunDocumentsError::NotFound(_) => {
                        (StatusCode::NOT_FOUND, "RUN_NOT_FOUND")
                    }
                    ListRunDocumentsError::RepositoryError(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR")
                    }
                };
                Ok((
                    status,
                    Json(ApiResponse::<RunDocumentsResponseDto>::error(
                        code.to_string(),
                        e.to_string(),
                        None,
                    )),
                ))
            }
        }
    }

    pub async fn execute_run(
        State(handler): State<Arc<RunHandler>>,
        Path(path): Path<RunPathDto>,
        body: Option<Json<ExecuteRunRequestDto>>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let (project, run_id) = path.into_parts();
        let body = body.map(|Json(body)| body).unwrap_or_default();
        let request = ExecuteRunRequest {
            project,
            run_id,
            tasks: body.tasks,
            skip_pipeline: body.skip_pipeline,
        };

        match handler.execute_run_use_case.execute(request).await {
            Ok(report) if report.succeeded() => {
                Ok((StatusCode::OK, Json(ApiResponse::success(report))))
            }
            Ok(report) => {
                let (status, code, message) = pipeline_failure_status(&report);
                Ok((
                    status,
                    Json(ApiResponse::<PipelineReport>::error(
                        code.to_string(),
                        message,
                        serde_json::to_value(&report).ok(),
                    )),
                ))
            }
            Err(e) => {
                let (status, code) = execute_error_status(&e);
                Ok((
                    status,
                    Json(ApiResponse::<PipelineReport>::error(
                        code.to_string(),
                        e.to_string(),
                        None,
                    )),
                ))
            }
        }
    }

    pub async fn verify_run(
        State(handler): State<Arc<RunHandler>>,
        Path(path): Path<RunPathDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let (project, run_id) = path.into_parts();

        match handler
            .verify_run_use_case
            .execute(VerifyRunRequest { project, run_id })
            .await
        {
            Ok(report) => Ok((StatusCode::OK, Json(ApiResponse::success(report)))),
            Err(e) => {
                let (status, code) = match e {
                    VerifyRunError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                    VerifyRunError::RepositoryError(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR")
                    }
                };
                Ok((
                    status,
                    Json(ApiResponse::<VerificationReport>::error(
                        code.to_string(),
                        e.to_string(),
                        None,
                    )),
                ))
            }
        }
    }

    pub async fn report_progress(
        State(handler): State<Arc<RunHandler>>,
        Path(path): Path<RunPathDto>,
        Json(update): Json<ProgressUpdate>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let (project, run_id) = path.into_parts();
        let request = ReportProgressRequest {
            project,
            run_id,
            update,
        };

        match handler.report_progress_use_case.execute(request).await {
            Ok(response) => {
                let dto = ReportProgressResponseDto::from(response);
                Ok((StatusCode::OK, Json(ApiResponse::success(dto))))
            }
            Err(e) => {
                let (status, code) = match e {
                    ReportProgressError::NotFound(_) => (StatusCode::NOT_FOUND, "RUN_NOT_FOUND"),
                    ReportProgressError::ValidationError(_) => {
                        (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
                    }
                    ReportProgressError::RepositoryError(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR")
                    }
                };
                Ok((
                    status,
                    Json(ApiResponse::<ReportProgressResponseDto>::error(
                        code.to_string(),
                        e.to_string(),
                        None,
                    )),
                ))
            }
        }
    }
}

fn execute_error_status(error: &ExecuteRunError) -> (StatusCode, &'static str) {
    match error {
        ExecuteRunError::NotFound(_) => (StatusCode::NOT_FOUND, "RUN_NOT_FOUND"),
        ExecuteRunError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ExecuteRunError::Conflict(_) => (StatusCode::CONFLICT, "RUN_CONFLICT"),
        ExecuteRunError::RepositoryError(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR")
        }
        ExecuteRunError::TaskError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "EXECUTION_ABORTED"),
    }
}

/// Status for a report whose outcome is a failure. External program
/// failures surface as 502.
fn pipeline_failure_status(report: &PipelineReport) -> (StatusCode, &'static str, String) {
    match &report.outcome {
        PipelineOutcome::Succeeded => (StatusCode::OK, "OK", "Run executed".to_string()),
        PipelineOutcome::Failed { failure, .. } => {
            let (status, code) = match failure {
                PipelineFailure::MissingConfiguration { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "MISSING_CONFIGURATION")
                }
                PipelineFailure::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                PipelineFailure::Repository { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR")
                }
                PipelineFailure::ProcessLaunch { .. } => {
                    (StatusCode::BAD_GATEWAY, "PROCESS_LAUNCH_FAILED")
                }
                PipelineFailure::ProcessOutput { .. } | PipelineFailure::ProcessFailure { .. } => {
                    (StatusCode::BAD_GATEWAY, "PIPELINE_FAILED")
                }
            };
            (status, code, failure.to_string())
        }
    }
}
