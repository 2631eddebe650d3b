use std::path::Path;

use crate::application::ports::process_invoker::ProcessInvocation;
use crate::application::services::configuration_resolver::PipelineConfiguration;
use crate::domain::value_objects::{ArtifactKind, TaskKind};

pub const ENV_FIGURE_SCORE_THRESHOLD: &str = "DOCSTOKG_FIGURE_SCORE_THRESHOLD";
pub const ENV_FIGURE_CLASSIFICATION_THRESHOLD: &str = "DOCSTOKG_FIGURE_CLASSIFICATION_THRESHOLD";
pub const ENV_FIGURE_CANDIDATE_LABELS: &str = "DOCSTOKG_FIGURE_CANDIDATE_LABELS";
pub const ENV_FIGURE_ACCEPTED_LABELS: &str = "DOCSTOKG_FIGURE_ACCEPTED_LABELS";
pub const ENV_RETRY_CONDITION: &str = "DOCSTOKG_RETRY_CONDITION";

/// A program plus the arguments that always precede the generated ones,
/// e.g. `python3 core/scripts/extract_data.py`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub leading_args: Vec<String>,
}

impl CommandSpec {
    pub fn parse(command: &str) -> Result<Self, String> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| "Command cannot be empty".to_string())?;
        Ok(Self {
            program,
            leading_args: parts.collect(),
        })
    }

    pub fn invocation(&self) -> ProcessInvocation {
        ProcessInvocation::new(self.program.clone()).args(self.leading_args.iter().cloned())
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn json_list(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

/// One invocation of the extraction program for the whole batch.
pub fn extraction_invocation(
    command: &CommandSpec,
    config: &PipelineConfiguration,
    tasks: &[TaskKind],
    skip_pipeline: bool,
    api_url: &str,
) -> ProcessInvocation {
    let storage = &config.storage;
    let figure = &config.figure;

    command
        .invocation()
        .option("--folder-path", path_arg(storage.directory(ArtifactKind::Raw)))
        .option("--metadata-path", path_arg(storage.directory(ArtifactKind::Metadata)))
        .option("--text-path", path_arg(storage.directory(ArtifactKind::Text)))
        .option("--formulas-path", path_arg(storage.directory(ArtifactKind::Formulas)))
        .option("--figures-path", path_arg(storage.directory(ArtifactKind::Figures)))
        .option("--hierarchy-path", path_arg(storage.directory(ArtifactKind::Hierarchy)))
        .option("--shrinks-path", path_arg(storage.directory(ArtifactKind::Shrinks)))
        .option_list(
            "--valid-tasks",
            tasks.iter().map(TaskKind::as_str).collect::<Vec<_>>(),
        )
        .switch("--no-pipeline", skip_pipeline)
        .option("--run-id", config.run_id.to_string())
        .option("--project-name", config.project.project_name.clone())
        .option("--api-url", api_url)
        .optional("--max-retries", config.extraction_max_retries.map(|n| n.to_string()))
        .option("--model-provider", config.model.llm_provider.clone())
        .option("--model-name", config.model.llm_model.clone())
        .env(ENV_FIGURE_SCORE_THRESHOLD, figure.score_threshold.to_string())
        .env(
            ENV_FIGURE_CLASSIFICATION_THRESHOLD,
            figure.classification_threshold.to_string(),
        )
        .env(ENV_FIGURE_CANDIDATE_LABELS, json_list(&figure.candidate_labels))
        .env(ENV_FIGURE_ACCEPTED_LABELS, json_list(&figure.accepted_labels))
        .env(
            ENV_RETRY_CONDITION,
            config.graph.retry_condition.clone().unwrap_or_default(),
        )
}

/// One invocation of the graph-generation program for a single document.
pub fn graph_invocation(
    command: &CommandSpec,
    config: &PipelineConfiguration,
    document_base_name: &str,
) -> ProcessInvocation {
    let storage = &config.storage;
    let connection = &config.connection;
    let model = &config.model;
    let graph = &config.graph;

    let hierarchy_path = storage.artifact_path(ArtifactKind::Hierarchy, document_base_name);
    let shrinks_path = storage.artifact_path(ArtifactKind::Shrinks, document_base_name);

    command
        .invocation()
        .option("--uri", connection.uri.clone())
        .option("--username", connection.username.clone())
        .option("--password", connection.password.clone())
        .option("--database", connection.database.clone())
        .switch("--aura-ds", connection.aura_ds)
        .option("--hierarchy-path", path_arg(&hierarchy_path))
        .option("--shrinks-path", path_arg(&shrinks_path))
        .option("--embedding-provider", model.embedding_provider.clone())
        .option("--embedding-model", model.embedding_model.clone())
        .option("--llm-provider", model.llm_provider.clone())
        .option("--llm-model", model.llm_model.clone())
        .option("--similarity-metric", model.similarity_metric.clone())
        .option("--separator", graph.chunk_separator.clone())
        .option("--chunk-size", graph.chunk_size.to_string())
        .option("--chunk-overlap", graph.chunk_overlap.to_string())
        .option("--vector-dim", model.vector_dimension.to_string())
        .option_list("--level-labels", graph.level_labels.as_slice().to_vec())
        .optional("--lexical-meta-label", graph.lexical_meta_label.clone())
        .optional("--domain-meta-label", graph.domain_meta_label.clone())
        .option("--llmgb-url", graph.llm_graph_builder_url.clone())
        .option_list("--allowed-nodes", graph.allowed_nodes.clone())
        .option_list("--allowed-relationships", graph.allowed_relationships.clone())
        .optional("--additional-instructions", graph.additional_instructions.clone())
}
