pub mod artifact_kind;
pub mod content_hash;
pub mod extraction_flags;
pub mod level_labels;
pub mod project_ref;
pub mod task_kind;

pub use artifact_kind::ArtifactKind;
pub use content_hash::ContentHash;
pub use extraction_flags::ExtractionFlags;
pub use level_labels::LevelLabels;
pub use project_ref::ProjectRef;
pub use task_kind::{TaskKind, TaskSelection};
