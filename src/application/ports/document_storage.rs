use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum DocumentStorageError {
    PermissionDenied(String),
    IoError(String),
    InvalidPath(String),
    AlreadyExists(String),
}

impl std::fmt::Display for DocumentStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentStorageError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            DocumentStorageError::IoError(msg) => write!(f, "IO error: {}", msg),
            DocumentStorageError::InvalidPath(path) => write!(f, "Invalid path: {}", path),
            DocumentStorageError::AlreadyExists(path) => write!(f, "File already exists: {}", path),
        }
    }
}

impl std::error::Error for DocumentStorageError {}

#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Writes an uploaded document into the project's raw-document directory
    /// under its own file name and returns the full path. Never replaces an
    /// existing file.
    async fn store_document(
        &self,
        directory: &Path,
        file_name: &str,
        data: &[u8],
    ) -> Result<PathBuf, DocumentStorageError>;
}
