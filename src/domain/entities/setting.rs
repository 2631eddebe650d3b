use serde_json::Value;

use crate::domain::value_objects::{ArtifactKind, ProjectRef};

/// Per-project storage layout and connection parameters. Owned by the
/// settings forms; the pipeline only reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Setting {
    pub project: ProjectRef,

    pub raw_doc_path: Option<String>,
    pub raw_doc_prefix: Option<String>,
    pub metadata_doc_path: Option<String>,
    pub metadata_doc_prefix: Option<String>,
    pub text_doc_path: Option<String>,
    pub text_doc_prefix: Option<String>,
    pub figures_doc_path: Option<String>,
    pub figures_doc_prefix: Option<String>,
    pub formulas_doc_path: Option<String>,
    pub formulas_doc_prefix: Option<String>,
    pub tables_doc_path: Option<String>,
    pub tables_doc_prefix: Option<String>,
    pub hierarchy_doc_path: Option<String>,
    pub hierarchy_doc_prefix: Option<String>,
    pub shrinks_doc_path: Option<String>,
    pub shrinks_doc_prefix: Option<String>,

    pub llm_provider: Option<String>,
    pub llm: Option<String>,
    pub embedding_provider: Option<String>,
    pub embedding_model: Option<String>,
    pub dimensions: Option<i32>,
    pub similarity_metric: Option<String>,
    pub extraction_max_retries: Option<i32>,

    pub lexical_graph_meta_label: Option<String>,
    pub domain_graph_meta_label: Option<String>,
    /// JSON array, JSON-array-shaped string or comma-separated string.
    pub hierarchy_level: Option<Value>,
    pub llm_graph_builder_url: Option<String>,

    pub neo4j_uri: Option<String>,
    pub neo4j_username: Option<String>,
    pub neo4j_password: Option<String>,
    pub neo4j_database: Option<String>,
    pub neo4j_auradb: bool,
}

impl Setting {
    pub fn new(project: ProjectRef) -> Self {
        Self {
            project,
            ..Default::default()
        }
    }

    pub fn path_for(&self, kind: ArtifactKind) -> Option<&str> {
        let value = match kind {
            ArtifactKind::Raw => &self.raw_doc_path,
            ArtifactKind::Metadata => &self.metadata_doc_path,
            ArtifactKind::Text => &self.text_doc_path,
            ArtifactKind::Figures => &self.figures_doc_path,
            ArtifactKind::Formulas => &self.formulas_doc_path,
            ArtifactKind::Tables => &self.tables_doc_path,
            ArtifactKind::Hierarchy => &self.hierarchy_doc_path,
            ArtifactKind::Shrinks => &self.shrinks_doc_path,
        };
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn prefix_for(&self, kind: ArtifactKind) -> Option<&str> {
        let value = match kind {
            ArtifactKind::Raw => &self.raw_doc_prefix,
            ArtifactKind::Metadata => &self.metadata_doc_prefix,
            ArtifactKind::Text => &self.text_doc_prefix,
            ArtifactKind::Figures => &self.figures_doc_prefix,
            ArtifactKind::Formulas => &self.formulas_doc_prefix,
            ArtifactKind::Tables => &self.tables_doc_prefix,
            ArtifactKind::Hierarchy => &self.hierarchy_doc_prefix,
            ArtifactKind::Shrinks => &self.shrinks_doc_prefix,
        };
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}
