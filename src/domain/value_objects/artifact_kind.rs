use std::path::Path;

/// Kinds of storage location a project configures, each with a directory
/// and a filename prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Raw,
    Metadata,
    Text,
    Figures,
    Formulas,
    Tables,
    Hierarchy,
    Shrinks,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Raw => "raw",
            ArtifactKind::Metadata => "metadata",
            ArtifactKind::Text => "text",
            ArtifactKind::Figures => "figures",
            ArtifactKind::Formulas => "formulas",
            ArtifactKind::Tables => "tables",
            ArtifactKind::Hierarchy => "hierarchy",
            ArtifactKind::Shrinks => "shrinks",
        }
    }

    /// Name of the settings column holding this kind's directory.
    pub fn path_setting(&self) -> &'static str {
        match self {
            ArtifactKind::Raw => "raw_doc_path",
            ArtifactKind::Metadata => "metadata_doc_path",
            ArtifactKind::Text => "text_doc_path",
            ArtifactKind::Figures => "figures_doc_path",
            ArtifactKind::Formulas => "formulas_doc_path",
            ArtifactKind::Tables => "tables_doc_path",
            ArtifactKind::Hierarchy => "hierarchy_doc_path",
            ArtifactKind::Shrinks => "shrinks_doc_path",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `{artifact_prefix}_{raw_prefix}_{base_name}`: the storage name the
/// extraction program gives each per-document artifact.
pub fn artifact_name(artifact_prefix: &str, raw_prefix: &str, base_name: &str) -> String {
    format!("{}_{}_{}", artifact_prefix, raw_prefix, base_name)
}

/// File name without its final extension.
pub fn document_base_name(document_name: &str) -> String {
    Path::new(document_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| document_name.to_string())
}
