use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::application::ports::document_storage::{DocumentStorage, DocumentStorageError};

/// Writes uploads straight into the project's raw-document directory, where
/// the extraction program picks them up.
#[derive(Debug, Clone, Default)]
pub struct LocalDocumentStorage;

impl LocalDocumentStorage {
    pub fn new() -> Self {
        Self
    }

    async fn ensure_directory_exists(directory: &Path) -> Result<(), DocumentStorageError> {
        fs::create_dir_all(directory)
            .await
            .map_err(|e| map_io_error(directory, e))
    }
}

fn map_io_error(path: &Path, error: std::io::Error) -> DocumentStorageError {
    match error.kind() {
        ErrorKind::PermissionDenied => {
            DocumentStorageError::PermissionDenied(path.display().to_string())
        }
        ErrorKind::AlreadyExists => DocumentStorageError::AlreadyExists(path.display().to_string()),
        _ => DocumentStorageError::IoError(format!("{}: {}", path.display(), error)),
    }
}

#[async_trait]
impl DocumentStorage for LocalDocumentStorage {
    async fn store_document(
        &self,
        directory: &Path,
        file_name: &str,
        data: &[u8],
    ) -> Result<PathBuf, DocumentStorageError> {
        let bare = Path::new(file_name)
            .file_name()
            .filter(|name| *name == std::ffi::OsStr::new(file_name))
            .ok_or_else(|| DocumentStorageError::InvalidPath(file_name.to_string()))?;

        Self::ensure_directory_exists(directory).await?;

        let path = directory.join(bare);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| map_io_error(&path, e))?;
        file.write_all(data)
            .await
            .map_err(|e| map_io_error(&path, e))?;
        file.flush().await.map_err(|e| map_io_error(&path, e))?;

        tracing::debug!("Stored {} bytes at {}", data.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_creates_directory_and_writes_bytes() {
        let root = tempfile::tempdir().unwrap();
        let raw = root.path().join("raw");

        let path = LocalDocumentStorage::new()
            .store_document(&raw, "paper.pdf", b"%PDF-1.7")
            .await
            .unwrap();

        assert_eq!(path, raw.join("paper.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
    }

    #[tokio::test]
    async fn test_store_rejects_names_with_directories() {
        let root = tempfile::tempdir().unwrap();

        for name in ["../escape.pdf", "nested/paper.pdf", ".."] {
            let result = LocalDocumentStorage::new()
                .store_document(root.path(), name, b"data")
                .await;
            assert!(
                matches!(result, Err(DocumentStorageError::InvalidPath(_))),
                "{} should be rejected",
                name
            );
        }
    }

    #[tokio::test]
    async fn test_store_never_replaces_an_existing_file() {
        let root = tempfile::tempdir().unwrap();
        let storage = LocalDocumentStorage::new();
        storage
            .store_document(root.path(), "a.pdf", b"first")
            .await
            .unwrap();

        let result = storage.store_document(root.path(), "a.pdf", b"second").await;

        assert!(matches!(result, Err(DocumentStorageError::AlreadyExists(_))));
        assert_eq!(std::fs::read(root.path().join("a.pdf")).unwrap(), b"first");
    }
}
