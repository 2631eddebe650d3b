use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::entities::{Document, NewDocument};
use crate::domain::value_objects::{ContentHash, ExtractionFlags, ProjectRef};
use crate::infrastructure::database::schema::documents;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentModel {
    pub id: i32,
    pub content_hash: String,
    pub user_id: i32,
    pub project_name: String,
    pub document_name: String,
    pub run_id: Option<i32>,
    pub text_extracted: bool,
    pub figures_extracted: bool,
    pub metadata_extracted: bool,
    pub tables_extracted: bool,
    pub formulas_extracted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
pub struct NewDocumentModel {
    pub content_hash: String,
    pub user_id: i32,
    pub project_name: String,
    pub document_name: String,
    pub run_id: Option<i32>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = documents)]
pub struct ExtractionFlagsChangeset {
    pub text_extracted: bool,
    pub figures_extracted: bool,
    pub metadata_extracted: bool,
    pub tables_extracted: bool,
    pub formulas_extracted: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<NewDocument> for NewDocumentModel {
    fn from(document: NewDocument) -> Self {
        Self {
            content_hash: document.content_hash.into(),
            user_id: document.project.user_id,
            project_name: document.project.project_name,
            document_name: document.document_name,
            run_id: document.run_id,
        }
    }
}

impl From<ExtractionFlags> for ExtractionFlagsChangeset {
    fn from(flags: ExtractionFlags) -> Self {
        Self {
            text_extracted: flags.text,
            figures_extracted: flags.figures,
            metadata_extracted: flags.metadata,
            tables_extracted: flags.tables,
            formulas_extracted: flags.formulas,
            updated_at: Utc::now(),
        }
    }
}

impl TryFrom<DocumentModel> for Document {
    type Error = String;

    fn try_from(model: DocumentModel) -> Result<Self, Self::Error> {
        let content_hash = ContentHash::new(model.content_hash)
            .map_err(|e| format!("Invalid content hash: {}", e))?;

        Ok(Document::from_database(
            model.id,
            content_hash,
            ProjectRef::new(model.user_id, model.project_name),
            model.document_name,
            model.run_id,
            ExtractionFlags {
                text: model.text_extracted,
                figures: model.figures_extracted,
                metadata: model.metadata_extracted,
                tables: model.tables_extracted,
                formulas: model.formulas_extracted,
            },
            model.created_at,
            model.updated_at,
        ))
    }
}
