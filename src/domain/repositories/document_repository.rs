use async_trait::async_trait;

use crate::domain::entities::{Document, NewDocument};
use crate::domain::value_objects::{ContentHash, ExtractionFlags, ProjectRef};

#[derive(Debug)]
pub enum DocumentRepositoryError {
    NotFound(i32),
    DatabaseError(String),
    ValidationError(String),
    DuplicateError(String),
    /// Another Document of the project already holds this name.
    NameConflict(String),
}

impl std::fmt::Display for DocumentRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentRepositoryError::NotFound(id) => write!(f, "Document not found: {}", id),
            DocumentRepositoryError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            DocumentRepositoryError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            DocumentRepositoryError::DuplicateError(msg) => write!(f, "Duplicate error: {}", msg),
            DocumentRepositoryError::NameConflict(name) => {
                write!(f, "Document name already in use: {}", name)
            }
        }
    }
}

impl std::error::Error for DocumentRepositoryError {}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn insert(&self, document: NewDocument) -> Result<Document, DocumentRepositoryError>;
    async fn find_by_key(
        &self,
        hash: &ContentHash,
        project: &ProjectRef,
    ) -> Result<Option<Document>, DocumentRepositoryError>;
    async fn find_by_name(
        &self,
        project: &ProjectRef,
        document_name: &str,
    ) -> Result<Option<Document>, DocumentRepositoryError>;
    /// Every Document associated with the Run, ordered by document name.
    async fn find_by_run(&self, run_id: i32) -> Result<Vec<Document>, DocumentRepositoryError>;
    /// Overwrites all five extraction flags. Reserved for verification.
    async fn update_extraction_flags(
        &self,
        document_id: i32,
        flags: ExtractionFlags,
    ) -> Result<(), DocumentRepositoryError>;
    async fn delete(&self, document_id: i32) -> Result<(), DocumentRepositoryError>;
}
