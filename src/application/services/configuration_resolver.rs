use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::entities::run::FigureTuning;
use crate::domain::entities::{Run, Setting};
use crate::domain::repositories::{
    RunRepository, SettingRepository, run_repository::RunRepositoryError,
    setting_repository::SettingRepositoryError,
};
use crate::domain::value_objects::artifact_kind::artifact_name;
use crate::domain::value_objects::level_labels::split_comma_list;
use crate::domain::value_objects::{ArtifactKind, LevelLabels, ProjectRef, TaskSelection};

/// Every storage location the extraction program writes to or reads from.
pub const REQUIRED_LOCATIONS: [ArtifactKind; 8] = [
    ArtifactKind::Raw,
    ArtifactKind::Metadata,
    ArtifactKind::Text,
    ArtifactKind::Figures,
    ArtifactKind::Formulas,
    ArtifactKind::Tables,
    ArtifactKind::Hierarchy,
    ArtifactKind::Shrinks,
];

pub const DEFAULT_RAW_PREFIX: &str = "raw";

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Names every unset settings column, in a stable order.
    MissingConfiguration { fields: Vec<String> },
    ProjectNotConfigured(ProjectRef),
    RunNotFound(i32),
    RepositoryError(String),
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurationError::MissingConfiguration { fields } => {
                write!(f, "Missing configuration: {}", fields.join(", "))
            }
            ConfigurationError::ProjectNotConfigured(project) => {
                write!(f, "Project has no settings: {}", project)
            }
            ConfigurationError::RunNotFound(id) => write!(f, "Run not found: {}", id),
            ConfigurationError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigurationError {}

impl From<SettingRepositoryError> for ConfigurationError {
    fn from(error: SettingRepositoryError) -> Self {
        ConfigurationError::RepositoryError(error.to_string())
    }
}

impl From<RunRepositoryError> for ConfigurationError {
    fn from(error: RunRepositoryError) -> Self {
        match error {
            RunRepositoryError::NotFound(id) => ConfigurationError::RunNotFound(id),
            other => ConfigurationError::RepositoryError(other.to_string()),
        }
    }
}

/// Expands a leading `~` to the invoking user's home directory.
pub fn expand_user_path(raw: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (raw, home) {
        ("~", Some(home)) => home,
        (path, Some(home)) if path.starts_with("~/") => home.join(&path[2..]),
        (path, _) => PathBuf::from(path),
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ArtifactSlot {
    directory: Option<PathBuf>,
    prefix: String,
}

/// Directories and filename prefixes for each artifact kind, as far as the
/// project has configured them.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageLayout {
    slots: BTreeMap<ArtifactKind, ArtifactSlot>,
}

impl StorageLayout {
    pub fn from_setting(setting: &Setting) -> Self {
        let slots = REQUIRED_LOCATIONS
            .into_iter()
            .map(|kind| {
                let default_prefix = match kind {
                    ArtifactKind::Raw => DEFAULT_RAW_PREFIX,
                    other => other.as_str(),
                };
                let slot = ArtifactSlot {
                    directory: setting.path_for(kind).map(expand_user_path),
                    prefix: setting.prefix_for(kind).unwrap_or(default_prefix).to_string(),
                };
                (kind, slot)
            })
            .collect();
        Self { slots }
    }

    pub fn directory(&self, kind: ArtifactKind) -> Option<&Path> {
        self.slots
            .get(&kind)
            .and_then(|slot| slot.directory.as_deref())
    }

    pub fn prefix(&self, kind: ArtifactKind) -> &str {
        self.slots
            .get(&kind)
            .map(|slot| slot.prefix.as_str())
            .unwrap_or(kind.as_str())
    }

    /// `{kind_prefix}_{raw_prefix}_{base_name}`
    pub fn artifact_name(&self, kind: ArtifactKind, base_name: &str) -> String {
        artifact_name(self.prefix(kind), self.prefix(ArtifactKind::Raw), base_name)
    }

    /// Where a document's artifact of this kind lives, when the kind's
    /// directory is configured. `extension` includes its leading dot.
    pub fn locate(&self, kind: ArtifactKind, base_name: &str, extension: &str) -> Option<PathBuf> {
        self.directory(kind).map(|dir| {
            dir.join(format!("{}{}", self.artifact_name(kind, base_name), extension))
        })
    }

    pub fn missing(&self, required: &[ArtifactKind]) -> Vec<String> {
        required
            .iter()
            .filter(|kind| self.directory(**kind).is_none())
            .map(|kind| kind.path_setting().to_string())
            .collect()
    }

    /// Promotes the layout once every required directory is known.
    pub fn require_all(self) -> Result<ResolvedStorage, ConfigurationError> {
        let missing = self.missing(&REQUIRED_LOCATIONS);
        if !missing.is_empty() {
            return Err(ConfigurationError::MissingConfiguration { fields: missing });
        }

        let dir = |kind: ArtifactKind| -> PathBuf {
            self.directory(kind).map(Path::to_path_buf).unwrap_or_default()
        };

        Ok(ResolvedStorage {
            raw: dir(ArtifactKind::Raw),
            metadata: dir(ArtifactKind::Metadata),
            text: dir(ArtifactKind::Text),
            figures: dir(ArtifactKind::Figures),
            formulas: dir(ArtifactKind::Formulas),
            tables: dir(ArtifactKind::Tables),
            hierarchy: dir(ArtifactKind::Hierarchy),
            shrinks: dir(ArtifactKind::Shrinks),
            layout: self,
        })
    }
}

/// A storage layout with every directory known.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStorage {
    raw: PathBuf,
    metadata: PathBuf,
    text: PathBuf,
    figures: PathBuf,
    formulas: PathBuf,
    tables: PathBuf,
    hierarchy: PathBuf,
    shrinks: PathBuf,
    layout: StorageLayout,
}

impl ResolvedStorage {
    pub fn directory(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Raw => &self.raw,
            ArtifactKind::Metadata => &self.metadata,
            ArtifactKind::Text => &self.text,
            ArtifactKind::Figures => &self.figures,
            ArtifactKind::Formulas => &self.formulas,
            ArtifactKind::Tables => &self.tables,
            ArtifactKind::Hierarchy => &self.hierarchy,
            ArtifactKind::Shrinks => &self.shrinks,
        }
    }

    pub fn artifact_path(&self, kind: ArtifactKind, base_name: &str) -> PathBuf {
        self.directory(kind)
            .join(self.layout.artifact_name(kind, base_name))
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }
}

/// Model parameters. All of them are required by the graph-generation
/// program; the extraction program receives the LLM pair too.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelSettings {
    pub llm_provider: String,
    pub llm_model: String,
    pub embedding_provider: String,
    pub embedding_model: String,
    pub vector_dimension: i32,
    pub similarity_metric: String,
}

#[derive(Clone, Default, PartialEq)]
pub struct ConnectionSettings {
    pub uri: String,
    pub username: String,
    pub password: String,
    pub database: String,
    pub aura_ds: bool,
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .field("aura_ds", &self.aura_ds)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphGeneration {
    pub chunk_separator: String,
    pub chunk_size: i32,
    pub chunk_overlap: i32,
    pub level_labels: LevelLabels,
    pub allowed_nodes: Vec<String>,
    pub allowed_relationships: Vec<String>,
    pub retry_condition: Option<String>,
    pub additional_instructions: Option<String>,
    pub lexical_meta_label: Option<String>,
    pub domain_meta_label: Option<String>,
    pub llm_graph_builder_url: String,
}

/// Everything the pipeline needs to invoke both external stages for a Run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfiguration {
    pub run_id: i32,
    pub project: ProjectRef,
    pub storage: ResolvedStorage,
    pub tasks: TaskSelection,
    pub figure: FigureTuning,
    pub graph: GraphGeneration,
    pub model: ModelSettings,
    pub connection: ConnectionSettings,
    pub extraction_max_retries: Option<i32>,
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Collects the names of unset settings columns while reading required ones.
#[derive(Default)]
struct RequiredSettings {
    missing: Vec<String>,
}

impl RequiredSettings {
    fn text(&mut self, value: &Option<String>, column: &str) -> String {
        trimmed(value).unwrap_or_else(|| {
            self.missing.push(column.to_string());
            String::new()
        })
    }

    fn secret(&mut self, value: &Option<String>, column: &str) -> String {
        match value.as_deref().filter(|v| !v.is_empty()) {
            Some(v) => v.to_string(),
            None => {
                self.missing.push(column.to_string());
                String::new()
            }
        }
    }

    fn positive(&mut self, value: Option<i32>, column: &str) -> i32 {
        value.filter(|n| *n > 0).unwrap_or_else(|| {
            self.missing.push(column.to_string());
            0
        })
    }
}

/// Assembles the configuration bundle from the project's settings row and
/// the Run. Fails before anything runs if a storage location or a setting
/// the graph-generation program requires is unset, naming all of them.
pub fn assemble(setting: &Setting, run: &Run) -> Result<PipelineConfiguration, ConfigurationError> {
    let layout = StorageLayout::from_setting(setting);
    let mut required = RequiredSettings {
        missing: layout.missing(&REQUIRED_LOCATIONS),
    };

    let model = ModelSettings {
        llm_provider: required.text(&setting.llm_provider, "llm_provider"),
        llm_model: required.text(&setting.llm, "llm"),
        embedding_provider: required.text(&setting.embedding_provider, "embedding_provider"),
        embedding_model: required.text(&setting.embedding_model, "embedding_model"),
        vector_dimension: required.positive(setting.dimensions, "dimensions"),
        similarity_metric: required.text(&setting.similarity_metric, "similarity_metric"),
    };
    let connection = ConnectionSettings {
        uri: required.text(&setting.neo4j_uri, "neo4j_uri"),
        username: required.text(&setting.neo4j_username, "neo4j_username"),
        password: required.secret(&setting.neo4j_password, "neo4j_password"),
        database: required.text(&setting.neo4j_database, "neo4j_database"),
        aura_ds: setting.neo4j_auradb,
    };
    let llm_graph_builder_url =
        required.text(&setting.llm_graph_builder_url, "llm_graph_builder_url");

    if !required.missing.is_empty() {
        return Err(ConfigurationError::MissingConfiguration {
            fields: required.missing,
        });
    }
    let storage = layout.require_all()?;
    let tuning = run.graph_tuning();

    let graph = GraphGeneration {
        chunk_separator: tuning.chunk_separator.clone(),
        chunk_size: tuning.chunk_size,
        chunk_overlap: tuning.chunk_overlap,
        level_labels: setting
            .hierarchy_level
            .as_ref()
            .map(LevelLabels::from_json)
            .unwrap_or_default(),
        allowed_nodes: tuning
            .allowed_nodes
            .as_deref()
            .map(split_comma_list)
            .unwrap_or_default(),
        allowed_relationships: tuning
            .allowed_relationships
            .as_deref()
            .map(split_comma_list)
            .unwrap_or_default(),
        retry_condition: trimmed(&tuning.retry_condition),
        additional_instructions: trimmed(&tuning.additional_instructions),
        lexical_meta_label: trimmed(&setting.lexical_graph_meta_label),
        domain_meta_label: trimmed(&setting.domain_graph_meta_label),
        llm_graph_builder_url,
    };

    Ok(PipelineConfiguration {
        run_id: run.id(),
        project: run.project().clone(),
        storage,
        tasks: *run.tasks(),
        figure: run.figure_tuning().clone(),
        graph,
        model,
        connection,
        extraction_max_retries: setting.extraction_max_retries.filter(|n| *n > 0),
    })
}

pub struct ConfigurationResolver {
    setting_repository: Arc<dyn SettingRepository>,
    run_repository: Arc<dyn RunRepository>,
}

impl ConfigurationResolver {
    pub fn new(
        setting_repository: Arc<dyn SettingRepository>,
        run_repository: Arc<dyn RunRepository>,
    ) -> Self {
        Self {
            setting_repository,
            run_repository,
        }
    }

    pub async fn load_setting(&self, project: &ProjectRef) -> Result<Setting, ConfigurationError> {
        self.setting_repository
            .find_by_project(project)
            .await?
            .ok_or_else(|| ConfigurationError::ProjectNotConfigured(project.clone()))
    }

    /// Storage portion only; never fails on unset directories.
    pub async fn resolve_storage(
        &self,
        project: &ProjectRef,
    ) -> Result<StorageLayout, ConfigurationError> {
        let setting = self.load_setting(project).await?;
        Ok(StorageLayout::from_setting(&setting))
    }

    pub async fn resolve(
        &self,
        project: &ProjectRef,
        run_id: i32,
    ) -> Result<PipelineConfiguration, ConfigurationError> {
        let run = self
            .run_repository
            .find_for_project(project, run_id)
            .await?
            .ok_or(ConfigurationError::RunNotFound(run_id))?;
        let setting = self.load_setting(project).await?;
        assemble(&setting, &run)
    }
}
