use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::application::use_cases::{
    UploadDocumentsUseCase,
    upload_documents::{UploadDocumentsError, UploadDocumentsRequest, UploadedFile},
};
use crate::presentation::http::dto::{ApiResponse, ProjectPathDto, UploadDocumentsResponseDto};

pub struct DocumentHandler {
    upload_documents_use_case: Arc<UploadDocumentsUseCase>,
}

impl DocumentHandler {
    pub fn new(upload_documents_use_case: Arc<UploadDocumentsUseCase>) -> Self {
        Self {
            upload_documents_use_case,
        }
    }

    /// Every multipart field carrying a file name is one document; other
    /// fields are ignored.
    pub async fn upload_documents(
        State(handler): State<Arc<DocumentHandler>>,
        Path(path): Path<ProjectPathDto>,
        mut multipart: Multipart,
    ) -> Result<impl IntoResponse, StatusCode> {
        let mut files = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?
        {
            let Some(file_name) = field.file_name().map(|name| name.to_string()) else {
                continue;
            };

            let data = field
                .bytes()
                .await
                .map_err(|_| StatusCode::BAD_REQUEST)?
                .to_vec();

            files.push(UploadedFile { file_name, data });
        }

        let request = UploadDocumentsRequest {
            project: path.project(),
            files,
        };

        match handler.upload_documents_use_case.execute(request).await {
            Ok(response) => {
                let dto = UploadDocumentsResponseDto::from(response);
                Ok((StatusCode::CREATED, Json(ApiResponse::success(dto))))
            }
            Err(e) => {
                let (status, code, details) = upload_error_status(&e);
                Ok((
                    status,
                    Json(ApiResponse::<UploadDocumentsResponseDto>::error(
                        code.to_string(),
                        e.to_string(),
                        details,
                    )),
                ))
            }
        }
    }
}

fn upload_error_status(
    error: &UploadDocumentsError,
) -> (StatusCode, &'static str, Option<serde_json::Value>) {
    match error {
        UploadDocumentsError::NotFound(_) => (StatusCode::NOT_FOUND, "PROJECT_NOT_FOUND", None),
        UploadDocumentsError::MissingConfiguration(fields) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "MISSING_CONFIGURATION",
            Some(serde_json::json!({ "fields": fields })),
        ),
        UploadDocumentsError::ValidationError(_) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", None)
        }
        UploadDocumentsError::NameConflict(names) => (
            StatusCode::CONFLICT,
            "NAME_CONFLICT",
            Some(serde_json::json!({ "document_names": names })),
        ),
        UploadDocumentsError::StorageError(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", None)
        }
        UploadDocumentsError::RepositoryError(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR", None)
        }
    }
}
