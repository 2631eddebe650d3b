use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ContentHash, ExtractionFlags, ProjectRef};
use crate::domain::value_objects::artifact_kind::document_base_name;

/// A Document about to be inserted; the database assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub content_hash: ContentHash,
    pub project: ProjectRef,
    pub document_name: String,
    pub run_id: Option<i32>,
}

/// One uploaded file, deduplicated on `(content_hash, user, project)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: i32,
    content_hash: ContentHash,
    project: ProjectRef,
    document_name: String,
    run_id: Option<i32>,
    flags: ExtractionFlags,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Document {
    pub fn from_new(id: i32, new: NewDocument) -> Self {
        let now = Utc::now();
        Self {
            id,
            content_hash: new.content_hash,
            project: new.project,
            document_name: new.document_name,
            run_id: new.run_id,
            flags: ExtractionFlags::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn from_database(
        id: i32,
        content_hash: ContentHash,
        project: ProjectRef,
        document_name: String,
        run_id: Option<i32>,
        flags: ExtractionFlags,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            content_hash,
            project,
            document_name,
            run_id,
            flags,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn content_hash(&self) -> &ContentHash {
        &self.content_hash
    }

    pub fn project(&self) -> &ProjectRef {
        &self.project
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    pub fn base_name(&self) -> String {
        document_base_name(&self.document_name)
    }

    pub fn run_id(&self) -> Option<i32> {
        self.run_id
    }

    pub fn flags(&self) -> &ExtractionFlags {
        &self.flags
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Overwrites all five flags with what verification observed on storage.
    pub fn apply_verification(&mut self, observed: ExtractionFlags) {
        self.flags = observed;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(name: &str) -> Document {
        Document::from_new(
            1,
            NewDocument {
                content_hash: ContentHash::from_bytes(name.as_bytes()),
                project: ProjectRef::new(1, "papers"),
                document_name: name.to_string(),
                run_id: Some(7),
            },
        )
    }

    #[test]
    fn test_new_document_has_no_flags() {
        let doc = document("a.pdf");
        assert_eq!(doc.flags(), &ExtractionFlags::default());
        assert_eq!(doc.base_name(), "a");
        assert_eq!(doc.run_id(), Some(7));
    }

    #[test]
    fn test_apply_verification_overwrites_every_flag() {
        let mut doc = document("a.pdf");
        doc.apply_verification(ExtractionFlags {
            text: true,
            figures: true,
            ..Default::default()
        });
        doc.apply_verification(ExtractionFlags {
            metadata: true,
            ..Default::default()
        });

        assert_eq!(
            doc.flags(),
            &ExtractionFlags {
                metadata: true,
                ..Default::default()
            }
        );
    }
}
