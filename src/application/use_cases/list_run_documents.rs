use std::sync::Arc;

use crate::domain::entities::Document;
use crate::domain::repositories::{
    DocumentRepository, RunRepository, document_repository::DocumentRepositoryError,
    run_repository::RunRepositoryError,
};
use crate::domain::value_objects::ProjectRef;

#[derive(Debug)]
pub enum ListRunDocumentsError {
    NotFound(i32),
    RepositoryError(String),
}

impl std::fmt::Display for ListRunDocumentsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListRunDocumentsError::NotFound(id) => write!(f, "Run not found: {}", id),
            ListRunDocumentsError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for ListRunDocumentsError {}

impl From<RunRepositoryError> for ListRunDocumentsError {
    fn from(error: RunRepositoryError) -> Self {
        ListRunDocumentsError::RepositoryError(error.to_string())
    }
}

impl From<DocumentRepositoryError> for ListRunDocumentsError {
    fn from(error: DocumentRepositoryError) -> Self {
        ListRunDocumentsError::RepositoryError(error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ListRunDocumentsRequest {
    pub project: ProjectRef,
    pub run_id: i32,
}

#[derive(Debug, Clone)]
pub struct ListRunDocumentsResponse {
    pub run_id: i32,
    /// Ordered by document name.
    pub documents: Vec<Document>,
}

pub struct ListRunDocumentsUseCase {
    run_repository: Arc<dyn RunRepository>,
    document_repository: Arc<dyn DocumentRepository>,
}

impl ListRunDocumentsUseCase {
    pub fn new(
        run_repository: Arc<dyn RunRepository>,
        document_repository: Arc<dyn DocumentRepository>,
    ) -> Self {
        Self {
            run_repository,
            document_repository,
        }
    }

    pub async fn execute(
        &self,
        request: ListRunDocumentsRequest,
    ) -> Result<ListRunDocumentsResponse, ListRunDocumentsError> {
        self.run_repository
            .find_for_project(&request.project, request.run_id)
            .await?
            .ok_or(ListRunDocumentsError::NotFound(request.run_id))?;

        let documents = self.document_repository.find_by_run(request.run_id).await?;
        Ok(ListRunDocumentsResponse {
            run_id: request.run_id,
            documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Run;
    use crate::test_support::{InMemoryDocumentRepository, InMemoryRunRepository};

    #[tokio::test]
    async fn test_documents_come_back_in_name_order() {
        let project = ProjectRef::new(1, "papers");
        let runs = Arc::new(InMemoryRunRepository::default());
        let documents = Arc::new(InMemoryDocumentRepository::default());
        runs.insert(Run::new(7, project.clone()));
        documents.add(&project, "zeta.pdf", Some(7));
        documents.add(&project, "alpha.pdf", Some(7));
        documents.add(&project, "other-run.pdf", Some(8));

        let use_case = ListRunDocumentsUseCase::new(runs, documents);
        let response = use_case
            .execute(ListRunDocumentsRequest {
                project,
                run_id: 7,
            })
            .await
            .unwrap();

        let names: Vec<&str> = response
            .documents
            .iter()
            .map(|d| d.document_name())
            .collect();
        assert_eq!(names, vec!["alpha.pdf", "zeta.pdf"]);
    }
}
