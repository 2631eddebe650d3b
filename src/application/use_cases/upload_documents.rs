use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::application::ports::DocumentStorage;
use crate::application::ports::document_storage::DocumentStorageError;
use crate::application::services::ConfigurationResolver;
use crate::application::services::configuration_resolver::ConfigurationError;
use crate::domain::entities::NewDocument;
use crate::domain::repositories::{
    DocumentRepository, RunRepository, document_repository::DocumentRepositoryError,
    run_repository::RunRepositoryError,
};
use crate::domain::value_objects::{ArtifactKind, ContentHash, ProjectRef};

#[derive(Debug)]
pub enum UploadDocumentsError {
    NotFound(String),
    MissingConfiguration(Vec<String>),
    ValidationError(String),
    /// Names already held by other content in the project.
    NameConflict(Vec<String>),
    StorageError(String),
    RepositoryError(String),
}

impl std::fmt::Display for UploadDocumentsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadDocumentsError::NotFound(msg) => write!(f, "Not found: {}", msg),
            UploadDocumentsError::MissingConfiguration(fields) => {
                write!(f, "Missing configuration: {}", fields.join(", "))
            }
            UploadDocumentsError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            UploadDocumentsError::NameConflict(names) => {
                write!(f, "Document name already in use: {}", names.join(", "))
            }
            UploadDocumentsError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            UploadDocumentsError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for UploadDocumentsError {}

impl From<ConfigurationError> for UploadDocumentsError {
    fn from(error: ConfigurationError) -> Self {
        let message = error.to_string();
        match error {
            ConfigurationError::MissingConfiguration { fields } => {
                UploadDocumentsError::MissingConfiguration(fields)
            }
            ConfigurationError::ProjectNotConfigured(_) | ConfigurationError::RunNotFound(_) => {
                UploadDocumentsError::NotFound(message)
            }
            ConfigurationError::RepositoryError(_) => {
                UploadDocumentsError::RepositoryError(message)
            }
        }
    }
}

impl From<RunRepositoryError> for UploadDocumentsError {
    fn from(error: RunRepositoryError) -> Self {
        UploadDocumentsError::RepositoryError(error.to_string())
    }
}

impl From<DocumentRepositoryError> for UploadDocumentsError {
    fn from(error: DocumentRepositoryError) -> Self {
        match error {
            DocumentRepositoryError::NameConflict(name) => {
                UploadDocumentsError::NameConflict(vec![name])
            }
            other => UploadDocumentsError::RepositoryError(other.to_string()),
        }
    }
}

impl From<DocumentStorageError> for UploadDocumentsError {
    fn from(error: DocumentStorageError) -> Self {
        UploadDocumentsError::StorageError(error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct UploadDocumentsRequest {
    pub project: ProjectRef,
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedDocument {
    pub document_id: i32,
    pub document_name: String,
    pub content_hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedDocument {
    pub document_name: String,
    pub content_hash: String,
}

#[derive(Debug, Clone)]
pub struct UploadDocumentsResponse {
    pub run_id: i32,
    pub uploaded: Vec<UploadedDocument>,
    pub skipped: Vec<SkippedDocument>,
}

struct PlannedUpload {
    document_name: String,
    hash: ContentHash,
    data: Vec<u8>,
}

/// Accepts a batch of files into a new Run, skipping content the project
/// already holds. A name held by different content rejects the whole batch
/// before the Run is created.
///
/// Each Document row is inserted before its bytes are written and removed
/// again if the write fails. Documents stored earlier in the batch stay
/// attached to the Run.
pub struct UploadDocumentsUseCase {
    configuration_resolver: Arc<ConfigurationResolver>,
    run_repository: Arc<dyn RunRepository>,
    document_repository: Arc<dyn DocumentRepository>,
    document_storage: Arc<dyn DocumentStorage>,
}

impl UploadDocumentsUseCase {
    pub fn new(
        configuration_resolver: Arc<ConfigurationResolver>,
        run_repository: Arc<dyn RunRepository>,
        document_repository: Arc<dyn DocumentRepository>,
        document_storage: Arc<dyn DocumentStorage>,
    ) -> Self {
        Self {
            configuration_resolver,
            run_repository,
            document_repository,
            document_storage,
        }
    }

    fn validate(files: &[UploadedFile]) -> Result<(), UploadDocumentsError> {
        if files.is_empty() {
            return Err(UploadDocumentsError::ValidationError(
                "No files provided".to_string(),
            ));
        }

        for file in files {
            let name = file.file_name.trim();
            if name.is_empty() {
                return Err(UploadDocumentsError::ValidationError(
                    "File name cannot be empty".to_string(),
                ));
            }
            let bare = Path::new(name).file_name().and_then(|n| n.to_str());
            if bare != Some(name) {
                return Err(UploadDocumentsError::ValidationError(format!(
                    "File name must not contain a path: {}",
                    name
                )));
            }
            if file.data.is_empty() {
                return Err(UploadDocumentsError::ValidationError(format!(
                    "File {} is empty",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Splits the batch into new documents and skipped duplicates, and
    /// collects names that would collide with different content.
    async fn plan(
        &self,
        project: &ProjectRef,
        files: Vec<UploadedFile>,
    ) -> Result<(Vec<PlannedUpload>, Vec<SkippedDocument>), UploadDocumentsError> {
        let mut planned = Vec::new();
        let mut skipped = Vec::new();
        let mut conflicts = Vec::new();
        let mut batch_hashes = HashSet::new();
        let mut batch_names = HashSet::new();

        for file in files {
            let document_name = file.file_name.trim().to_string();
            let hash = ContentHash::from_bytes(&file.data);

            let known = batch_hashes.contains(&hash)
                || self
                    .document_repository
                    .find_by_key(&hash, project)
                    .await?
                    .is_some();
            if known {
                tracing::info!("Skipping {}: content already uploaded", document_name);
                skipped.push(SkippedDocument {
                    document_name,
                    content_hash: hash.to_string(),
                });
                continue;
            }

            let name_taken = !batch_names.insert(document_name.clone())
                || self
                    .document_repository
                    .find_by_name(project, &document_name)
                    .await?
                    .is_some();
            if name_taken {
                conflicts.push(document_name);
                continue;
            }

            batch_hashes.insert(hash.clone());
            planned.push(PlannedUpload {
                document_name,
                hash,
                data: file.data,
            });
        }

        if !conflicts.is_empty() {
            return Err(UploadDocumentsError::NameConflict(conflicts));
        }
        Ok((planned, skipped))
    }

    pub async fn execute(
        &self,
        request: UploadDocumentsRequest,
    ) -> Result<UploadDocumentsResponse, UploadDocumentsError> {
        Self::validate(&request.files)?;

        let layout = self
            .configuration_resolver
            .resolve_storage(&request.project)
            .await?;
        let raw_directory = layout
            .directory(ArtifactKind::Raw)
            .ok_or_else(|| {
                UploadDocumentsError::MissingConfiguration(vec![
                    ArtifactKind::Raw.path_setting().to_string(),
                ])
            })?
            .to_path_buf();

        let (planned, mut skipped) = self.plan(&request.project, request.files).await?;

        let run = self.run_repository.create(&request.project).await?;
        let mut uploaded = Vec::new();

        for upload in planned {
            let inserted = self
                .document_repository
                .insert(NewDocument {
                    content_hash: upload.hash.clone(),
                    project: request.project.clone(),
                    document_name: upload.document_name.clone(),
                    run_id: Some(run.id()),
                })
                .await;

            let document = match inserted {
                Ok(document) => document,
                Err(DocumentRepositoryError::DuplicateError(_)) => {
                    skipped.push(SkippedDocument {
                        document_name: upload.document_name,
                        content_hash: upload.hash.to_string(),
                    });
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let stored = self
                .document_storage
                .store_document(&raw_directory, &upload.document_name, &upload.data)
                .await;

            if let Err(e) = stored {
                if let Err(cleanup) = self.document_repository.delete(document.id()).await {
                    tracing::error!(
                        "Could not remove document {} after failed write: {}",
                        document.id(),
                        cleanup
                    );
                }
                return Err(match e {
                    DocumentStorageError::AlreadyExists(_) => {
                        UploadDocumentsError::NameConflict(vec![upload.document_name])
                    }
                    other => other.into(),
                });
            }

            uploaded.push(UploadedDocument {
                document_id: document.id(),
                document_name: upload.document_name,
                content_hash: upload.hash.to_string(),
            });
        }

        tracing::info!(
            "Run {} created for {}: {} uploaded, {} skipped",
            run.id(),
            request.project,
            uploaded.len(),
            skipped.len()
        );

        Ok(UploadDocumentsResponse {
            run_id: run.id(),
            uploaded,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        InMemoryDocumentRepository, InMemoryDocumentStorage, InMemoryRunRepository,
        InMemorySettingRepository, complete_setting,
    };
    use std::path::PathBuf;

    struct Fixture {
        runs: Arc<InMemoryRunRepository>,
        documents: Arc<InMemoryDocumentRepository>,
        settings: Arc<InMemorySettingRepository>,
        storage: Arc<InMemoryDocumentStorage>,
        use_case: UploadDocumentsUseCase,
    }

    fn project() -> ProjectRef {
        ProjectRef::new(1, "papers")
    }

    fn fixture() -> Fixture {
        let runs = Arc::new(InMemoryRunRepository::default());
        let documents = Arc::new(InMemoryDocumentRepository::default());
        let settings = Arc::new(InMemorySettingRepository::default());
        let storage = Arc::new(InMemoryDocumentStorage::default());
        settings.insert(complete_setting(project(), Path::new("/data")));

        let resolver = Arc::new(ConfigurationResolver::new(settings.clone(), runs.clone()));
        let use_case = UploadDocumentsUseCase::new(
            resolver,
            runs.clone(),
            documents.clone(),
            storage.clone(),
        );
        Fixture {
            runs,
            documents,
            settings,
            storage,
            use_case,
        }
    }

    fn file(name: &str, data: &[u8]) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            data: data.to_vec(),
        }
    }

    fn request(files: Vec<UploadedFile>) -> UploadDocumentsRequest {
        UploadDocumentsRequest {
            project: project(),
            files,
        }
    }

    #[tokio::test]
    async fn test_identical_content_is_skipped() {
        let f = fixture();

        let first = f
            .use_case
            .execute(request(vec![file("a.pdf", b"alpha")]))
            .await
            .unwrap();
        let second = f
            .use_case
            .execute(request(vec![file("copy-of-a.pdf", b"alpha"), file("b.pdf", b"beta")]))
            .await
            .unwrap();

        assert_eq!(first.uploaded.len(), 1);
        assert_eq!(second.uploaded.len(), 1);
        assert_eq!(second.uploaded[0].document_name, "b.pdf");
        assert_eq!(
            second.skipped,
            vec![SkippedDocument {
                document_name: "copy-of-a.pdf".to_string(),
                content_hash: first.uploaded[0].content_hash.clone(),
            }]
        );
        assert_ne!(first.run_id, second.run_id);
        assert_eq!(f.documents.len(), 2);
        assert_eq!(
            f.storage.stored_paths(),
            vec![PathBuf::from("/data/raw/a.pdf"), PathBuf::from("/data/raw/b.pdf")]
        );
    }

    #[tokio::test]
    async fn test_duplicate_within_one_batch_is_skipped() {
        let f = fixture();
        let response = f
            .use_case
            .execute(request(vec![file("a.pdf", b"same"), file("b.pdf", b"same")]))
            .await
            .unwrap();
        assert_eq!(response.uploaded.len(), 1);
        assert_eq!(response.skipped.len(), 1);
    }

    #[tokio::test]
    async fn test_same_content_in_another_project_is_uploaded() {
        let f = fixture();
        let other = ProjectRef::new(1, "theses");
        f.settings
            .insert(complete_setting(other.clone(), Path::new("/other")));

        f.use_case
            .execute(request(vec![file("a.pdf", b"alpha")]))
            .await
            .unwrap();
        let response = f
            .use_case
            .execute(UploadDocumentsRequest {
                project: other,
                files: vec![file("a.pdf", b"alpha")],
            })
            .await
            .unwrap();

        assert_eq!(response.uploaded.len(), 1);
        assert!(response.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_files_are_rejected() {
        let f = fixture();
        for files in [
            vec![],
            vec![file("  ", b"x")],
            vec![file("a.pdf", b"")],
            vec![file("../etc/passwd", b"x")],
        ] {
            let result = f.use_case.execute(request(files)).await;
            assert!(matches!(result, Err(UploadDocumentsError::ValidationError(_))));
        }
        assert_eq!(f.documents.len(), 0);
    }

    #[tokio::test]
    async fn test_unset_raw_path_is_missing_configuration() {
        let f = fixture();
        let mut setting = complete_setting(project(), Path::new("/data"));
        setting.raw_doc_path = None;
        f.settings.insert(setting);

        let result = f.use_case.execute(request(vec![file("a.pdf", b"x")])).await;

        match result {
            Err(UploadDocumentsError::MissingConfiguration(fields)) => {
                assert_eq!(fields, vec!["raw_doc_path"])
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_project_is_not_found() {
        let f = fixture();
        let result = f
            .use_case
            .execute(UploadDocumentsRequest {
                project: ProjectRef::new(5, "nowhere"),
                files: vec![file("a.pdf", b"x")],
            })
            .await;
        assert!(matches!(result, Err(UploadDocumentsError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_name_held_by_other_content_rejects_batch() {
        let f = fixture();
        let first = f
            .use_case
            .execute(request(vec![file("a.pdf", b"first")]))
            .await
            .unwrap();

        let result = f
            .use_case
            .execute(request(vec![file("b.pdf", b"beta"), file("a.pdf", b"second")]))
            .await;

        match result {
            Err(UploadDocumentsError::NameConflict(names)) => assert_eq!(names, vec!["a.pdf"]),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(f.documents.len(), 1);
        assert_eq!(
            f.storage.contents(Path::new("/data/raw/a.pdf")),
            Some(b"first".to_vec())
        );
        assert!(f.runs.find_by_id(first.run_id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_same_name_twice_in_one_batch_is_rejected() {
        let f = fixture();
        let result = f
            .use_case
            .execute(request(vec![file("a.pdf", b"one"), file("a.pdf", b"two")]))
            .await;
        assert!(matches!(result, Err(UploadDocumentsError::NameConflict(_))));
        assert_eq!(f.documents.len(), 0);
    }

    #[tokio::test]
    async fn test_failed_write_removes_its_document_row() {
        let f = fixture();
        f.storage.fail_writes(true);

        let result = f.use_case.execute(request(vec![file("a.pdf", b"x")])).await;

        assert!(matches!(result, Err(UploadDocumentsError::StorageError(_))));
        assert_eq!(f.documents.len(), 0);
        assert!(f.storage.stored_paths().is_empty());
    }
}
