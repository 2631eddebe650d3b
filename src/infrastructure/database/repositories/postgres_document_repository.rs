use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::entities::{Document, NewDocument};
use crate::domain::repositories::{
    DocumentRepository, document_repository::DocumentRepositoryError,
};
use crate::domain::value_objects::{ContentHash, ExtractionFlags, ProjectRef};
use crate::infrastructure::database::models::{
    DocumentModel, ExtractionFlagsChangeset, NewDocumentModel,
};
use crate::infrastructure::database::schema::documents;

const NAME_CONSTRAINT: &str = "uq_documents_name";

pub struct PostgresDocumentRepository {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl PostgresDocumentRepository {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    fn get_connection(
        &self,
    ) -> Result<
        diesel::r2d2::PooledConnection<ConnectionManager<PgConnection>>,
        DocumentRepositoryError,
    > {
        self.pool.get().map_err(|e| {
            DocumentRepositoryError::DatabaseError(format!(
                "Failed to get database connection: {}",
                e
            ))
        })
    }
}

fn to_domain(model: DocumentModel) -> Result<Document, DocumentRepositoryError> {
    Document::try_from(model).map_err(|e| {
        DocumentRepositoryError::DatabaseError(format!("Failed to convert document model: {}", e))
    })
}

#[async_trait]
impl DocumentRepository for PostgresDocumentRepository {
    async fn insert(&self, document: NewDocument) -> Result<Document, DocumentRepositoryError> {
        let hash = document.content_hash.to_string();
        let name = document.document_name.clone();
        let new_document = NewDocumentModel::from(document);
        let mut conn = self.get_connection()?;

        let model = tokio::task::spawn_blocking(move || {
            diesel::insert_into(documents::table)
                .values(&new_document)
                .returning(DocumentModel::as_returning())
                .get_result(&mut conn)
                .map_err(|e| match e {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                        if info.constraint_name() == Some(NAME_CONSTRAINT) {
                            DocumentRepositoryError::NameConflict(name)
                        } else {
                            DocumentRepositoryError::DuplicateError(hash)
                        }
                    }
                    other => DocumentRepositoryError::DatabaseError(format!(
                        "Failed to save document: {}",
                        other
                    )),
                })
        })
        .await
        .map_err(|e| DocumentRepositoryError::DatabaseError(format!("Task join error: {}", e)))??;

        to_domain(model)
    }

    async fn find_by_key(
        &self,
        hash: &ContentHash,
        project: &ProjectRef,
    ) -> Result<Option<Document>, DocumentRepositoryError> {
        let hash = hash.to_string();
        let user_id = project.user_id;
        let project_name = project.project_name.clone();
        let mut conn = self.get_connection()?;

        let result = tokio::task::spawn_blocking(move || {
            documents::table
                .filter(documents::content_hash.eq(hash))
                .filter(documents::user_id.eq(user_id))
                .filter(documents::project_name.eq(project_name))
                .select(DocumentModel::as_select())
                .first(&mut conn)
                .optional()
                .map_err(|e| {
                    DocumentRepositoryError::DatabaseError(format!(
                        "Failed to find document: {}",
                        e
                    ))
                })
        })
        .await
        .map_err(|e| DocumentRepositoryError::DatabaseError(format!("Task join error: {}", e)))??;

        result.map(to_domain).transpose()
    }

    async fn find_by_name(
        &self,
        project: &ProjectRef,
        document_name: &str,
    ) -> Result<Option<Document>, DocumentRepositoryError> {
        let user_id = project.user_id;
        let project_name = project.project_name.clone();
        let document_name = document_name.to_string();
        let mut conn = self.get_connection()?;

        let result = tokio::task::spawn_blocking(move || {
            documents::table
                .filter(documents::user_id.eq(user_id))
                .filter(documents::project_name.eq(project_name))
                .filter(documents::document_name.eq(document_name))
                .select(DocumentModel::as_select())
                .first(&mut conn)
                .optional()
                .map_err(|e| {
                    DocumentRepositoryError::DatabaseError(format!(
                        "Failed to find document by name: {}",
                        e
                    ))
                })
        })
        .await
        .map_err(|e| DocumentRepositoryError::DatabaseError(format!("Task join error: {}", e)))??;

        result.map(to_domain).transpose()
    }

    async fn find_by_run(&self, run_id: i32) -> Result<Vec<Document>, DocumentRepositoryError> {
        let mut conn = self.get_connection()?;

        let models = tokio::task::spawn_blocking(move || {
            documents::table
                .filter(documents::run_id.eq(run_id))
                .order((documents::document_name.asc(), documents::id.asc()))
                .select(DocumentModel::as_select())
                .load(&mut conn)
                .map_err(|e| {
                    DocumentRepositoryError::DatabaseError(format!(
                        "Failed to find documents by run: {}",
                        e
                    ))
                })
        })
        .await
        .map_err(|e| DocumentRepositoryError::DatabaseError(format!("Task join error: {}", e)))??;

        models.into_iter().map(to_domain).collect()
    }

    async fn update_extraction_flags(
        &self,
        document_id: i32,
        flags: ExtractionFlags,
    ) -> Result<(), DocumentRepositoryError> {
        let changeset = ExtractionFlagsChangeset::from(flags);
        let mut conn = self.get_connection()?;

        let updated = tokio::task::spawn_blocking(move || {
            diesel::update(documents::table.filter(documents::id.eq(document_id)))
                .set(&changeset)
                .execute(&mut conn)
                .map_err(|e| {
                    DocumentRepositoryError::DatabaseError(format!(
                        "Failed to update extraction flags: {}",
                        e
                    ))
                })
        })
        .await
        .map_err(|e| DocumentRepositoryError::DatabaseError(format!("Task join error: {}", e)))??;

        if updated == 0 {
            return Err(DocumentRepositoryError::NotFound(document_id));
        }
        Ok(())
    }

    async fn delete(&self, document_id: i32) -> Result<(), DocumentRepositoryError> {
        let mut conn = self.get_connection()?;

        let deleted = tokio::task::spawn_blocking(move || {
            diesel::delete(documents::table.filter(documents::id.eq(document_id)))
                .execute(&mut conn)
                .map_err(|e| {
                    DocumentRepositoryError::DatabaseError(format!(
                        "Failed to delete document: {}",
                        e
                    ))
                })
        })
        .await
        .map_err(|e| DocumentRepositoryError::DatabaseError(format!("Task join error: {}", e)))??;

        if deleted == 0 {
            return Err(DocumentRepositoryError::NotFound(document_id));
        }
        Ok(())
    }
}
