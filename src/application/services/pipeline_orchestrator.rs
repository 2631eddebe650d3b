use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::application::ports::ProcessInvoker;
use crate::application::ports::process_invoker::{
    ProcessInvocation, ProcessInvokerError, ProcessOutcome,
};
use crate::application::services::configuration_resolver::{
    ConfigurationError, ConfigurationResolver, PipelineConfiguration,
};
use crate::application::services::pipeline_commands::{
    CommandSpec, extraction_invocation, graph_invocation,
};
use crate::domain::repositories::{DocumentRepository, RunRepository};
use crate::domain::value_objects::{ProjectRef, TaskSelection};

const STDERR_TAIL_LINES: usize = 20;

/// Stages a failure can be attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Configuring,
    Extracting,
    GeneratingGraph,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStage::Configuring => write!(f, "configuring"),
            PipelineStage::Extracting => write!(f, "extracting"),
            PipelineStage::GeneratingGraph => write!(f, "generating_graph"),
        }
    }
}

/// Created, Configuring, Extracting, one GeneratingGraph per document, then
/// Executed. Failed is reachable from any working state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    Created,
    Configuring,
    Extracting,
    GeneratingGraph {
        document: String,
        position: usize,
        total: usize,
    },
    Executed,
    Failed {
        stage: PipelineStage,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineFailure {
    MissingConfiguration {
        fields: Vec<String>,
    },
    NotFound {
        message: String,
    },
    ProcessLaunch {
        program: String,
        message: String,
        document: Option<String>,
    },
    /// The child started but its output could not be collected.
    ProcessOutput {
        message: String,
        document: Option<String>,
    },
    ProcessFailure {
        exit_code: Option<i32>,
        document: Option<String>,
        stderr_tail: String,
    },
    Repository {
        message: String,
    },
}

impl PipelineFailure {
    fn from_invoker(error: ProcessInvokerError, document: Option<String>) -> Self {
        match error {
            ProcessInvokerError::LaunchFailed { program, message } => {
                PipelineFailure::ProcessLaunch {
                    program,
                    message,
                    document,
                }
            }
            ProcessInvokerError::IoError(message) => {
                PipelineFailure::ProcessOutput { message, document }
            }
        }
    }

    fn from_exit(outcome: &ProcessOutcome, document: Option<String>) -> Self {
        PipelineFailure::ProcessFailure {
            exit_code: outcome.exit_code,
            document,
            stderr_tail: outcome.stderr_tail(STDERR_TAIL_LINES),
        }
    }
}

impl From<ConfigurationError> for PipelineFailure {
    fn from(error: ConfigurationError) -> Self {
        let message = error.to_string();
        match error {
            ConfigurationError::MissingConfiguration { fields } => {
                PipelineFailure::MissingConfiguration { fields }
            }
            ConfigurationError::RunNotFound(_) | ConfigurationError::ProjectNotConfigured(_) => {
                PipelineFailure::NotFound { message }
            }
            ConfigurationError::RepositoryError(detail) => {
                PipelineFailure::Repository { message: detail }
            }
        }
    }
}

impl std::fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineFailure::MissingConfiguration { fields } => {
                write!(f, "Missing configuration: {}", fields.join(", "))
            }
            PipelineFailure::NotFound { message } => write!(f, "{}", message),
            PipelineFailure::ProcessLaunch {
                program, message, ..
            } => write!(f, "Failed to launch {}: {}", program, message),
            PipelineFailure::ProcessOutput { message, .. } => {
                write!(f, "Failed to collect process output: {}", message)
            }
            PipelineFailure::ProcessFailure {
                exit_code,
                document,
                ..
            } => {
                let code = exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                match document {
                    Some(name) => write!(f, "Graph generation for {} exited with {}", name, code),
                    None => write!(f, "Extraction exited with {}", code),
                }
            }
            PipelineFailure::Repository { message } => write!(f, "Repository error: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Succeeded,
    Failed {
        stage: PipelineStage,
        failure: PipelineFailure,
    },
}

/// Typed result of one execution, including partial progress on failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub run_id: i32,
    pub execution_id: Uuid,
    pub outcome: PipelineOutcome,
    pub documents_processed: usize,
    pub documents_total: usize,
    /// Whether `is_executed` was saved. Always false for a failed outcome.
    pub executed_flag_persisted: bool,
    pub history: Vec<PipelineState>,
}

impl PipelineReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, PipelineOutcome::Succeeded)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineCommands {
    pub extraction: CommandSpec,
    pub graph: CommandSpec,
    /// Back-reference URL handed to the extraction program.
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub project: ProjectRef,
    pub run_id: i32,
    /// Replaces the Run's own toggles when present.
    pub tasks: Option<TaskSelection>,
    pub skip_pipeline: bool,
}

struct ExecutionTrace {
    run_id: i32,
    execution_id: Uuid,
    history: Vec<PipelineState>,
    documents_processed: usize,
    documents_total: usize,
}

impl ExecutionTrace {
    fn new(run_id: i32) -> Self {
        Self {
            run_id,
            execution_id: Uuid::new_v4(),
            history: vec![PipelineState::Created],
            documents_processed: 0,
            documents_total: 0,
        }
    }

    fn enter(&mut self, state: PipelineState) {
        tracing::debug!(
            "Run {} [{}] entering {:?}",
            self.run_id,
            self.execution_id,
            state
        );
        self.history.push(state);
    }

    fn fail(mut self, stage: PipelineStage, failure: PipelineFailure) -> PipelineReport {
        tracing::error!(
            "Run {} [{}] failed while {}: {} ({}/{} documents completed)",
            self.run_id,
            self.execution_id,
            stage,
            failure,
            self.documents_processed,
            self.documents_total
        );
        self.history.push(PipelineState::Failed { stage });
        self.finish(PipelineOutcome::Failed { stage, failure }, false)
    }

    fn finish(self, outcome: PipelineOutcome, executed_flag_persisted: bool) -> PipelineReport {
        PipelineReport {
            run_id: self.run_id,
            execution_id: self.execution_id,
            outcome,
            documents_processed: self.documents_processed,
            documents_total: self.documents_total,
            executed_flag_persisted,
            history: self.history,
        }
    }
}

/// Drives one Run through extraction and per-document graph generation,
/// one external process at a time, stopping at the first failure.
pub struct PipelineOrchestrator {
    configuration_resolver: Arc<ConfigurationResolver>,
    run_repository: Arc<dyn RunRepository>,
    document_repository: Arc<dyn DocumentRepository>,
    process_invoker: Arc<dyn ProcessInvoker>,
    commands: PipelineCommands,
}

impl PipelineOrchestrator {
    pub fn new(
        configuration_resolver: Arc<ConfigurationResolver>,
        run_repository: Arc<dyn RunRepository>,
        document_repository: Arc<dyn DocumentRepository>,
        process_invoker: Arc<dyn ProcessInvoker>,
        commands: PipelineCommands,
    ) -> Self {
        Self {
            configuration_resolver,
            run_repository,
            document_repository,
            process_invoker,
            commands,
        }
    }

    pub async fn execute(&self, request: ExecutionRequest) -> PipelineReport {
        let mut trace = ExecutionTrace::new(request.run_id);
        tracing::info!(
            "Starting execution {} of run {} for project {}",
            trace.execution_id,
            request.run_id,
            request.project
        );

        trace.enter(PipelineState::Configuring);
        let config = match self
            .configuration_resolver
            .resolve(&request.project, request.run_id)
            .await
        {
            Ok(config) => config,
            Err(e) => return trace.fail(PipelineStage::Configuring, e.into()),
        };

        trace.enter(PipelineState::Extracting);
        let tasks = request.tasks.unwrap_or(config.tasks).selected();
        let invocation = extraction_invocation(
            &self.commands.extraction,
            &config,
            &tasks,
            request.skip_pipeline,
            &self.commands.api_url,
        );
        if let Err(failure) = self.run_stage(invocation, None).await {
            return trace.fail(PipelineStage::Extracting, failure);
        }

        if let Err((stage, failure)) = self.generate_graphs(&config, &mut trace).await {
            return trace.fail(stage, failure);
        }

        let executed_flag_persisted = match self.run_repository.mark_executed(request.run_id).await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    "Run {} completed but is_executed could not be saved: {}",
                    request.run_id,
                    e
                );
                false
            }
        };

        trace.enter(PipelineState::Executed);
        tracing::info!(
            "Run {} [{}] executed: {} documents processed",
            request.run_id,
            trace.execution_id,
            trace.documents_processed
        );
        trace.finish(PipelineOutcome::Succeeded, executed_flag_persisted)
    }

    async fn generate_graphs(
        &self,
        config: &PipelineConfiguration,
        trace: &mut ExecutionTrace,
    ) -> Result<(), (PipelineStage, PipelineFailure)> {
        let documents = self
            .document_repository
            .find_by_run(config.run_id)
            .await
            .map_err(|e| {
                (
                    PipelineStage::GeneratingGraph,
                    PipelineFailure::Repository {
                        message: e.to_string(),
                    },
                )
            })?;

        trace.documents_total = documents.len();
        for (index, document) in documents.iter().enumerate() {
            let name = document.document_name().to_string();
            trace.enter(PipelineState::GeneratingGraph {
                document: name.clone(),
                position: index + 1,
                total: documents.len(),
            });

            let invocation =
                graph_invocation(&self.commands.graph, config, &document.base_name());
            self.run_stage(invocation, Some(name))
                .await
                .map_err(|failure| (PipelineStage::GeneratingGraph, failure))?;
            trace.documents_processed += 1;
        }
        Ok(())
    }

    async fn run_stage(
        &self,
        invocation: ProcessInvocation,
        document: Option<String>,
    ) -> Result<(), PipelineFailure> {
        let program = invocation.program.clone();
        let started = Instant::now();

        let outcome = self
            .process_invoker
            .invoke(invocation)
            .await
            .map_err(|e| PipelineFailure::from_invoker(e, document.clone()))?;

        tracing::info!(
            "{} (pid {:?}) for {} exited with {:?} after {} ms",
            program,
            outcome.pid,
            document.as_deref().unwrap_or("batch"),
            outcome.exit_code,
            started.elapsed().as_millis()
        );

        if outcome.success() {
            Ok(())
        } else {
            Err(PipelineFailure::from_exit(&outcome, document))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Run;
    use crate::domain::entities::run::RunUpdate;
    use crate::test_support::{
        InMemoryDocumentRepository, InMemoryRunRepository, InMemorySettingRepository,
        ScriptedProcessInvoker, complete_setting,
    };
    use std::path::Path;

    struct Fixture {
        runs: Arc<InMemoryRunRepository>,
        documents: Arc<InMemoryDocumentRepository>,
        settings: Arc<InMemorySettingRepository>,
        invoker: Arc<ScriptedProcessInvoker>,
        orchestrator: PipelineOrchestrator,
    }

    fn project() -> ProjectRef {
        ProjectRef::new(1, "papers")
    }

    fn fixture() -> Fixture {
        let runs = Arc::new(InMemoryRunRepository::default());
        let documents = Arc::new(InMemoryDocumentRepository::default());
        let settings = Arc::new(InMemorySettingRepository::default());
        let invoker = Arc::new(ScriptedProcessInvoker::default());

        settings.insert(complete_setting(project(), Path::new("/data")));

        let mut run = Run::new(7, project());
        run.apply_update(RunUpdate {
            text: Some(true),
            figures: Some(true),
            ..Default::default()
        })
        .unwrap();
        runs.insert(run);

        documents.add(&project(), "b.pdf", Some(7));
        documents.add(&project(), "a.pdf", Some(7));

        let resolver = Arc::new(ConfigurationResolver::new(settings.clone(), runs.clone()));
        let orchestrator = PipelineOrchestrator::new(
            resolver,
            runs.clone(),
            documents.clone(),
            invoker.clone(),
            PipelineCommands {
                extraction: CommandSpec::parse("python3 extract.py").unwrap(),
                graph: CommandSpec::parse("python3 graph.py").unwrap(),
                api_url: "http://localhost:3000".to_string(),
            },
        );

        Fixture {
            runs,
            documents,
            settings,
            invoker,
            orchestrator,
        }
    }

    fn request() -> ExecutionRequest {
        ExecutionRequest {
            project: project(),
            run_id: 7,
            tasks: None,
            skip_pipeline: false,
        }
    }

    async fn is_executed(runs: &InMemoryRunRepository) -> bool {
        runs.find_by_id(7).await.unwrap().unwrap().is_executed()
    }

    #[tokio::test]
    async fn test_successful_execution_marks_run_executed() {
        let f = fixture();
        let report = f.orchestrator.execute(request()).await;

        assert!(report.succeeded());
        assert_eq!(report.documents_processed, 2);
        assert_eq!(report.documents_total, 2);
        assert!(report.executed_flag_persisted);
        assert!(is_executed(&f.runs).await);
        assert_eq!(report.history.first(), Some(&PipelineState::Created));
        assert_eq!(report.history.last(), Some(&PipelineState::Executed));

        let invocations = f.invoker.invocations();
        assert_eq!(invocations.len(), 3);
        assert_eq!(invocations[0].args[0], "extract.py");
        assert_eq!(
            invocations[1].value_of("--hierarchy-path"),
            Some("/data/hierarchy/hierarchy_raw_a")
        );
        assert_eq!(
            invocations[2].value_of("--hierarchy-path"),
            Some("/data/hierarchy/hierarchy_raw_b")
        );
    }

    #[tokio::test]
    async fn test_failed_extraction_starts_no_graph_generation() {
        let f = fixture();
        f.invoker.push_exit(2);

        let report = f.orchestrator.execute(request()).await;

        assert_eq!(f.invoker.invocations().len(), 1);
        assert_eq!(report.documents_processed, 0);
        assert!(!is_executed(&f.runs).await);
        match report.outcome {
            PipelineOutcome::Failed {
                stage: PipelineStage::Extracting,
                failure:
                    PipelineFailure::ProcessFailure {
                        exit_code,
                        document,
                        ..
                    },
            } => {
                assert_eq!(exit_code, Some(2));
                assert_eq!(document, None);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_graph_failure_stops_remaining_documents() {
        let f = fixture();
        f.documents.add(&project(), "c.pdf", Some(7));
        f.invoker.push_exit(0);
        f.invoker.push_exit(0);
        f.invoker.push_exit(1);

        let report = f.orchestrator.execute(request()).await;

        assert_eq!(f.invoker.invocations().len(), 3);
        assert_eq!(report.documents_processed, 1);
        assert_eq!(report.documents_total, 3);
        assert!(!report.executed_flag_persisted);
        assert!(!is_executed(&f.runs).await);
        assert_eq!(
            report.outcome,
            PipelineOutcome::Failed {
                stage: PipelineStage::GeneratingGraph,
                failure: PipelineFailure::ProcessFailure {
                    exit_code: Some(1),
                    document: Some("b.pdf".to_string()),
                    stderr_tail: "scripted failure".to_string(),
                },
            }
        );
        assert_eq!(
            report.history.last(),
            Some(&PipelineState::Failed {
                stage: PipelineStage::GeneratingGraph
            })
        );
    }

    #[tokio::test]
    async fn test_missing_configuration_starts_no_process() {
        let f = fixture();
        let mut setting = complete_setting(project(), Path::new("/data"));
        setting.hierarchy_doc_path = None;
        setting.metadata_doc_path = None;
        f.settings.insert(setting);

        let report = f.orchestrator.execute(request()).await;

        assert!(f.invoker.invocations().is_empty());
        assert_eq!(
            report.outcome,
            PipelineOutcome::Failed {
                stage: PipelineStage::Configuring,
                failure: PipelineFailure::MissingConfiguration {
                    fields: vec![
                        "metadata_doc_path".to_string(),
                        "hierarchy_doc_path".to_string()
                    ],
                },
            }
        );
    }

    #[tokio::test]
    async fn test_unset_graph_setting_fails_before_extraction() {
        let f = fixture();
        let mut setting = complete_setting(project(), Path::new("/data"));
        setting.neo4j_uri = None;
        f.settings.insert(setting);

        let report = f.orchestrator.execute(request()).await;

        assert!(f.invoker.invocations().is_empty());
        assert_eq!(
            report.outcome,
            PipelineOutcome::Failed {
                stage: PipelineStage::Configuring,
                failure: PipelineFailure::MissingConfiguration {
                    fields: vec!["neo4j_uri".to_string()],
                },
            }
        );
    }

    #[tokio::test]
    async fn test_launch_failure_is_distinct_from_exit_failure() {
        let f = fixture();
        f.invoker.push_launch_failure();

        let report = f.orchestrator.execute(request()).await;

        assert!(matches!(
            report.outcome,
            PipelineOutcome::Failed {
                stage: PipelineStage::Extracting,
                failure: PipelineFailure::ProcessLaunch { .. },
            }
        ));
        assert!(!is_executed(&f.runs).await);
    }

    #[tokio::test]
    async fn test_task_override_replaces_run_toggles() {
        let f = fixture();
        let mut req = request();
        req.tasks = Some(TaskSelection::from_names(&["formulas", "metadata"]).unwrap());
        req.skip_pipeline = true;

        f.orchestrator.execute(req).await;

        let extraction = &f.invoker.invocations()[0];
        let start = extraction
            .args
            .iter()
            .position(|a| a == "--valid-tasks")
            .unwrap();
        assert_eq!(extraction.args[start + 1], "metadata");
        assert_eq!(extraction.args[start + 2], "formulas");
        assert!(extraction.args.contains(&"--no-pipeline".to_string()));
    }

    #[tokio::test]
    async fn test_unsaved_executed_flag_keeps_success() {
        let f = fixture();
        f.runs.fail_mark_executed(true);

        let report = f.orchestrator.execute(request()).await;

        assert!(report.succeeded());
        assert!(!report.executed_flag_persisted);
        assert_eq!(report.documents_processed, 2);
    }
}
