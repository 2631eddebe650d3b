use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::services::configuration_resolver::{
    ConfigurationError, ConfigurationResolver, StorageLayout,
};
use crate::domain::repositories::{DocumentRepository, RunRepository};
use crate::domain::value_objects::{ArtifactKind, ExtractionFlags, ProjectRef};

pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tiff", "gif"];

#[derive(Debug)]
pub enum VerificationError {
    RunNotFound(i32),
    ProjectNotConfigured(ProjectRef),
    RepositoryError(String),
}

impl std::fmt::Display for VerificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationError::RunNotFound(id) => write!(f, "Run not found: {}", id),
            VerificationError::ProjectNotConfigured(project) => {
                write!(f, "Project has no settings: {}", project)
            }
            VerificationError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for VerificationError {}

impl From<ConfigurationError> for VerificationError {
    fn from(error: ConfigurationError) -> Self {
        match error {
            ConfigurationError::RunNotFound(id) => VerificationError::RunNotFound(id),
            ConfigurationError::ProjectNotConfigured(project) => {
                VerificationError::ProjectNotConfigured(project)
            }
            other => VerificationError::RepositoryError(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentVerification {
    pub document_id: i32,
    pub document_name: String,
    pub flags: ExtractionFlags,
    pub updated: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    pub run_id: i32,
    pub documents: Vec<DocumentVerification>,
    /// Documents whose row was rewritten successfully.
    pub verified_count: usize,
    pub total: usize,
}

async fn is_file(path: Option<PathBuf>) -> bool {
    match path {
        Some(path) => tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false),
        None => false,
    }
}

fn has_image_extension(name: &Path) -> bool {
    name.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|image| ext.eq_ignore_ascii_case(image))
        })
        .unwrap_or(false)
}

/// Whether the directory exists and holds at least one entry accepted by
/// `accept`, which sees the entry path and whether it is a regular file.
/// Unreadable directories count as absent.
async fn directory_contains<F>(path: Option<PathBuf>, accept: F) -> bool
where
    F: Fn(&Path, bool) -> bool,
{
    let Some(path) = path else {
        return false;
    };
    let Ok(mut entries) = tokio::fs::read_dir(&path).await else {
        return false;
    };

    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let is_file = entry
                    .file_type()
                    .await
                    .map(|t| t.is_file())
                    .unwrap_or(false);
                if accept(&entry.path(), is_file) {
                    return true;
                }
            }
            Ok(None) => return false,
            Err(e) => {
                tracing::debug!("Stopped reading {}: {}", path.display(), e);
                return false;
            }
        }
    }
}

/// Observes which artifacts exist on storage for one document.
pub async fn probe_artifacts(layout: &StorageLayout, base_name: &str) -> ExtractionFlags {
    let locate = |kind, extension| layout.locate(kind, base_name, extension);

    ExtractionFlags {
        text: is_file(locate(ArtifactKind::Text, ".txt")).await,
        metadata: is_file(locate(ArtifactKind::Metadata, ".json")).await,
        figures: directory_contains(locate(ArtifactKind::Figures, ""), |path, is_file| {
            is_file && has_image_extension(path)
        })
        .await,
        // Any content counts for tables and formulas.
        tables: directory_contains(locate(ArtifactKind::Hierarchy, ""), |_, _| true).await,
        formulas: directory_contains(locate(ArtifactKind::Formulas, ""), |_, _| true).await,
    }
}

/// Rewrites every Document's extraction flags from what storage holds.
pub struct VerificationReconciler {
    configuration_resolver: Arc<ConfigurationResolver>,
    run_repository: Arc<dyn RunRepository>,
    document_repository: Arc<dyn DocumentRepository>,
}

impl VerificationReconciler {
    pub fn new(
        configuration_resolver: Arc<ConfigurationResolver>,
        run_repository: Arc<dyn RunRepository>,
        document_repository: Arc<dyn DocumentRepository>,
    ) -> Self {
        Self {
            configuration_resolver,
            run_repository,
            document_repository,
        }
    }

    pub async fn verify(
        &self,
        project: &ProjectRef,
        run_id: i32,
    ) -> Result<VerificationReport, VerificationError> {
        self.run_repository
            .find_for_project(project, run_id)
            .await
            .map_err(|e| VerificationError::RepositoryError(e.to_string()))?
            .ok_or(VerificationError::RunNotFound(run_id))?;

        let layout = self.configuration_resolver.resolve_storage(project).await?;
        let documents = self
            .document_repository
            .find_by_run(run_id)
            .await
            .map_err(|e| VerificationError::RepositoryError(e.to_string()))?;

        let total = documents.len();
        let mut results = Vec::with_capacity(total);
        let mut verified_count = 0;

        for document in documents {
            let flags = probe_artifacts(&layout, &document.base_name()).await;
            let write = self
                .document_repository
                .update_extraction_flags(document.id(), flags)
                .await;

            let error = match write {
                Ok(()) => {
                    verified_count += 1;
                    None
                }
                Err(e) => {
                    tracing::warn!(
                        "Could not save verification of {} (run {}): {}",
                        document.document_name(),
                        run_id,
                        e
                    );
                    Some(e.to_string())
                }
            };

            results.push(DocumentVerification {
                document_id: document.id(),
                document_name: document.document_name().to_string(),
                flags,
                updated: error.is_none(),
                error,
            });
        }

        tracing::info!(
            "Verified run {}: {}/{} documents updated",
            run_id,
            verified_count,
            total
        );

        Ok(VerificationReport {
            run_id,
            documents: results,
            verified_count,
            total,
        })
    }
}
