use std::sync::Arc;

use crate::application::services::VerificationReconciler;
use crate::application::services::verification_reconciler::{
    VerificationError, VerificationReport,
};
use crate::domain::value_objects::ProjectRef;

#[derive(Debug)]
pub enum VerifyRunError {
    NotFound(String),
    RepositoryError(String),
}

impl std::fmt::Display for VerifyRunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyRunError::NotFound(msg) => write!(f, "Not found: {}", msg),
            VerifyRunError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for VerifyRunError {}

impl From<VerificationError> for VerifyRunError {
    fn from(error: VerificationError) -> Self {
        let message = error.to_string();
        match error {
            VerificationError::RunNotFound(_) | VerificationError::ProjectNotConfigured(_) => {
                VerifyRunError::NotFound(message)
            }
            VerificationError::RepositoryError(detail) => VerifyRunError::RepositoryError(detail),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VerifyRunRequest {
    pub project: ProjectRef,
    pub run_id: i32,
}

pub struct VerifyRunUseCase {
    reconciler: Arc<VerificationReconciler>,
}

impl VerifyRunUseCase {
    pub fn new(reconciler: Arc<VerificationReconciler>) -> Self {
        Self { reconciler }
    }

    pub async fn execute(
        &self,
        request: VerifyRunRequest,
    ) -> Result<VerificationReport, VerifyRunError> {
        Ok(self
            .reconciler
            .verify(&request.project, request.run_id)
            .await?)
    }
}
