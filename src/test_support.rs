//! In-memory stand-ins for the repositories and the process invoker.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use tokio::sync::Notify;

use crate::application::ports::process_invoker::{
    ProcessInvocation, ProcessInvoker, ProcessInvokerError, ProcessOutcome,
};
use crate::application::ports::document_storage::{DocumentStorage, DocumentStorageError};
use crate::domain::entities::{Document, NewDocument, Run, Setting};
use crate::domain::repositories::document_repository::{
    DocumentRepository, DocumentRepositoryError,
};
use crate::domain::repositories::run_repository::{RunRepository, RunRepositoryError};
use crate::domain::repositories::setting_repository::{SettingRepository, SettingRepositoryError};
use crate::domain::value_objects::{
    ArtifactKind, ContentHash, ExtractionFlags, ProjectRef,
};

/// A settings row with every directory at `{root}/{kind}`, default prefixes
/// and every model and connection setting filled in.
pub fn complete_setting(project: ProjectRef, root: &Path) -> Setting {
    let dir = |kind: ArtifactKind| Some(root.join(kind.as_str()).to_string_lossy().into_owned());
    Setting {
        raw_doc_path: dir(ArtifactKind::Raw),
        metadata_doc_path: dir(ArtifactKind::Metadata),
        text_doc_path: dir(ArtifactKind::Text),
        figures_doc_path: dir(ArtifactKind::Figures),
        formulas_doc_path: dir(ArtifactKind::Formulas),
        tables_doc_path: dir(ArtifactKind::Tables),
        hierarchy_doc_path: dir(ArtifactKind::Hierarchy),
        shrinks_doc_path: dir(ArtifactKind::Shrinks),
        llm_provider: Some("ollama".to_string()),
        llm: Some("llama3".to_string()),
        embedding_provider: Some("ollama".to_string()),
        embedding_model: Some("nomic-embed-text".to_string()),
        dimensions: Some(768),
        similarity_metric: Some("cosine".to_string()),
        llm_graph_builder_url: Some("http://localhost:8000".to_string()),
        neo4j_uri: Some("neo4j://localhost:7687".to_string()),
        neo4j_username: Some("neo4j".to_string()),
        neo4j_password: Some("password".to_string()),
        neo4j_database: Some("neo4j".to_string()),
        ..Setting::new(project)
    }
}

#[derive(Default)]
pub struct InMemoryRunRepository {
    runs: Mutex<HashMap<i32, Run>>,
    last_id: AtomicI32,
    fail_mark_executed: AtomicBool,
}

impl InMemoryRunRepository {
    pub fn insert(&self, run: Run) {
        self.last_id.fetch_max(run.id(), Ordering::SeqCst);
        self.runs.lock().unwrap().insert(run.id(), run);
    }

    pub fn fail_mark_executed(&self, fail: bool) {
        self.fail_mark_executed.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RunRepository for InMemoryRunRepository {
    async fn create(&self, project: &ProjectRef) -> Result<Run, RunRepositoryError> {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let run = Run::new(id, project.clone());
        self.runs.lock().unwrap().insert(id, run.clone());
        Ok(run)
    }

    async fn find_by_id(&self, run_id: i32) -> Result<Option<Run>, RunRepositoryError> {
        Ok(self.runs.lock().unwrap().get(&run_id).cloned())
    }

    async fn update_configuration(&self, run: &Run) -> Result<(), RunRepositoryError> {
        let mut runs = self.runs.lock().unwrap();
        let stored = runs
            .get_mut(&run.id())
            .ok_or(RunRepositoryError::NotFound(run.id()))?;
        let executed = stored.is_executed();
        *stored = run.clone();
        if executed {
            stored.mark_executed();
        }
        Ok(())
    }

    async fn update_progress(&self, run: &Run) -> Result<(), RunRepositoryError> {
        self.update_configuration(run).await
    }

    async fn mark_executed(&self, run_id: i32) -> Result<(), RunRepositoryError> {
        if self.fail_mark_executed.load(Ordering::SeqCst) {
            return Err(RunRepositoryError::DatabaseError(
                "connection reset".to_string(),
            ));
        }
        let mut runs = self.runs.lock().unwrap();
        let run = runs
            .get_mut(&run_id)
            .ok_or(RunRepositoryError::NotFound(run_id))?;
        run.mark_executed();
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryDocumentRepository {
    documents: Mutex<Vec<Document>>,
    failing_updates: Mutex<HashSet<String>>,
}

impl InMemoryDocumentRepository {
    /// Inserts a document whose content hash is derived from its name.
    pub fn add(&self, project: &ProjectRef, name: &str, run_id: Option<i32>) -> Document {
        let mut documents = self.documents.lock().unwrap();
        let next_id = documents.iter().map(|d| d.id()).max().unwrap_or(0) + 1;
        let document = Document::from_new(
            next_id,
            NewDocument {
                content_hash: ContentHash::from_bytes(name.as_bytes()),
                project: project.clone(),
                document_name: name.to_string(),
                run_id,
            },
        );
        documents.push(document.clone());
        document
    }

    pub fn fail_updates_for(&self, name: &str) {
        self.failing_updates
            .lock()
            .unwrap()
            .insert(name.to_string());
    }

    pub fn flags_of(&self, name: &str) -> Option<ExtractionFlags> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.document_name() == name)
            .map(|d| *d.flags())
    }

    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn insert(&self, document: NewDocument) -> Result<Document, DocumentRepositoryError> {
        let mut documents = self.documents.lock().unwrap();
        if documents.iter().any(|d| {
            d.content_hash() == &document.content_hash && d.project() == &document.project
        }) {
            return Err(DocumentRepositoryError::DuplicateError(
                document.content_hash.to_string(),
            ));
        }
        if documents.iter().any(|d| {
            d.document_name() == document.document_name && d.project() == &document.project
        }) {
            return Err(DocumentRepositoryError::NameConflict(document.document_name));
        }
        let next_id = documents.iter().map(|d| d.id()).max().unwrap_or(0) + 1;
        let stored = Document::from_new(next_id, document);
        documents.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_name(
        &self,
        project: &ProjectRef,
        document_name: &str,
    ) -> Result<Option<Document>, DocumentRepositoryError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.document_name() == document_name && d.project() == project)
            .cloned())
    }

    async fn delete(&self, document_id: i32) -> Result<(), DocumentRepositoryError> {
        let mut documents = self.documents.lock().unwrap();
        let before = documents.len();
        documents.retain(|d| d.id() != document_id);
        if documents.len() == before {
            return Err(DocumentRepositoryError::NotFound(document_id));
        }
        Ok(())
    }


    async fn find_by_key(
        &self,
        hash: &ContentHash,
        project: &ProjectRef,
    ) -> Result<Option<Document>, DocumentRepositoryError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.content_hash() == hash && d.project() == project)
            .cloned())
    }

    async fn find_by_run(&self, run_id: i32) -> Result<Vec<Document>, DocumentRepositoryError> {
        let mut found: Vec<Document> = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.run_id() == Some(run_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.document_name().cmp(b.document_name()));
        Ok(found)
    }

    async fn update_extraction_flags(
        &self,
        document_id: i32,
        flags: ExtractionFlags,
    ) -> Result<(), DocumentRepositoryError> {
        let failing = self.failing_updates.lock().unwrap().clone();
        let mut documents = self.documents.lock().unwrap();
        let document = documents
            .iter_mut()
            .find(|d| d.id() == document_id)
            .ok_or(DocumentRepositoryError::NotFound(document_id))?;
        if failing.contains(document.document_name()) {
            return Err(DocumentRepositoryError::DatabaseError(
                "write rejected".to_string(),
            ));
        }
        document.apply_verification(flags);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySettingRepository {
    settings: Mutex<HashMap<ProjectRef, Setting>>,
}

impl InMemorySettingRepository {
    /// Inserts or replaces the project's settings row.
    pub fn insert(&self, setting: Setting) {
        self.settings
            .lock()
            .unwrap()
            .insert(setting.project.clone(), setting);
    }
}

#[async_trait]
impl SettingRepository for InMemorySettingRepository {
    async fn find_by_project(
        &self,
        project: &ProjectRef,
    ) -> Result<Option<Setting>, SettingRepositoryError> {
        Ok(self.settings.lock().unwrap().get(project).cloned())
    }
}

/// Returns queued outcomes in order, then exit code 0 once the queue is
/// drained. Every invocation is recorded.
#[derive(Default)]
pub struct ScriptedProcessInvoker {
    script: Mutex<VecDeque<Result<ProcessOutcome, ProcessInvokerError>>>,
    invocations: Mutex<Vec<ProcessInvocation>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedProcessInvoker {
    pub fn push_exit(&self, code: i32) {
        let stderr = if code == 0 {
            String::new()
        } else {
            "scripted failure".to_string()
        };
        self.script.lock().unwrap().push_back(Ok(ProcessOutcome {
            exit_code: Some(code),
            pid: Some(4242),
            stdout: String::new(),
            stderr,
        }));
    }

    pub fn push_launch_failure(&self) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(ProcessInvokerError::LaunchFailed {
                program: "missing".to_string(),
                message: "No such file or directory".to_string(),
            }));
    }

    /// Makes the next invocation block until the returned handle is notified.
    pub fn hold_next(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn invocations(&self) -> Vec<ProcessInvocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessInvoker for ScriptedProcessInvoker {
    async fn invoke(
        &self,
        invocation: ProcessInvocation,
    ) -> Result<ProcessOutcome, ProcessInvokerError> {
        self.invocations.lock().unwrap().push(invocation);
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.script.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(ProcessOutcome {
                exit_code: Some(0),
                pid: Some(4242),
                ..Default::default()
            })
        })
    }
}

/// Keeps stored documents in memory, keyed by full path.
#[derive(Default)]
pub struct InMemoryDocumentStorage {
    files: Mutex<HashMap<std::path::PathBuf, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl InMemoryDocumentStorage {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn stored_paths(&self) -> Vec<std::path::PathBuf> {
        let mut paths: Vec<_> = self.files.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl DocumentStorage for InMemoryDocumentStorage {
    async fn store_document(
        &self,
        directory: &Path,
        file_name: &str,
        data: &[u8],
    ) -> Result<std::path::PathBuf, DocumentStorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DocumentStorageError::IoError("disk full".to_string()));
        }
        let path = directory.join(file_name);
        let mut files = self.files.lock().unwrap();
        if files.contains_key(&path) {
            return Err(DocumentStorageError::AlreadyExists(
                path.display().to_string(),
            ));
        }
        files.insert(path.clone(), data.to_vec());
        Ok(path)
    }
}
