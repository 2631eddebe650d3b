use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

use crate::domain::entities::Run;
use crate::domain::repositories::{RunRepository, run_repository::RunRepositoryError};
use crate::domain::value_objects::ProjectRef;
use crate::infrastructure::database::models::{
    NewRunModel, RunConfigurationChangeset, RunModel, RunProgressChangeset,
};
use crate::infrastructure::database::schema::runs;

pub struct PostgresRunRepository {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl PostgresRunRepository {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    fn get_connection(
        &self,
    ) -> Result<diesel::r2d2::PooledConnection<ConnectionManager<PgConnection>>, RunRepositoryError>
    {
        self.pool.get().map_err(|e| {
            RunRepositoryError::DatabaseError(format!("Failed to get database connection: {}", e))
        })
    }
}

#[async_trait]
impl RunRepository for PostgresRunRepository {
    async fn create(&self, project: &ProjectRef) -> Result<Run, RunRepositoryError> {
        let new_run = NewRunModel::from(project);
        let mut conn = self.get_connection()?;

        let model = tokio::task::spawn_blocking(move || {
            diesel::insert_into(runs::table)
                .values(&new_run)
                .returning(RunModel::as_returning())
                .get_result(&mut conn)
                .map_err(|e| {
                    RunRepositoryError::DatabaseError(format!("Failed to create run: {}", e))
                })
        })
        .await
        .map_err(|e| RunRepositoryError::DatabaseError(format!("Task join error: {}", e)))??;

        Ok(Run::from(model))
    }

    async fn find_by_id(&self, run_id: i32) -> Result<Option<Run>, RunRepositoryError> {
        let mut conn = self.get_connection()?;

        let result = tokio::task::spawn_blocking(move || {
            runs::table
                .filter(runs::id.eq(run_id))
                .select(RunModel::as_select())
                .first(&mut conn)
                .optional()
                .map_err(|e| {
                    RunRepositoryError::DatabaseError(format!("Failed to find run: {}", e))
                })
        })
        .await
        .map_err(|e| RunRepositoryError::DatabaseError(format!("Task join error: {}", e)))??;

        Ok(result.map(Run::from))
    }

    async fn update_configuration(&self, run: &Run) -> Result<(), RunRepositoryError> {
        let changeset = RunConfigurationChangeset::from(run);
        let run_id = run.id();
        let mut conn = self.get_connection()?;

        let updated = tokio::task::spawn_blocking(move || {
            diesel::update(runs::table.filter(runs::id.eq(run_id)))
                .set(&changeset)
                .execute(&mut conn)
                .map_err(|e| {
                    RunRepositoryError::DatabaseError(format!("Failed to update run: {}", e))
                })
        })
        .await
        .map_err(|e| RunRepositoryError::DatabaseError(format!("Task join error: {}", e)))??;

        if updated == 0 {
            return Err(RunRepositoryError::NotFound(run_id));
        }
        Ok(())
    }

    async fn update_progress(&self, run: &Run) -> Result<(), RunRepositoryError> {
        let changeset = RunProgressChangeset::from(run);
        let run_id = run.id();
        let mut conn = self.get_connection()?;

        let updated = tokio::task::spawn_blocking(move || {
            diesel::update(runs::table.filter(runs::id.eq(run_id)))
                .set(&changeset)
                .execute(&mut conn)
                .map_err(|e| {
                    RunRepositoryError::DatabaseError(format!(
                        "Failed to update run progress: {}",
                        e
                    ))
                })
        })
        .await
        .map_err(|e| RunRepositoryError::DatabaseError(format!("Task join error: {}", e)))??;

        if updated == 0 {
            return Err(RunRepositoryError::NotFound(run_id));
        }
        Ok(())
    }

    async fn mark_executed(&self, run_id: i32) -> Result<(), RunRepositoryError> {
        let mut conn = self.get_connection()?;

        let updated = tokio::task::spawn_blocking(move || {
            diesel::update(runs::table.filter(runs::id.eq(run_id)))
                .set((runs::is_executed.eq(true), runs::updated_at.eq(Utc::now())))
                .execute(&mut conn)
                .map_err(|e| {
                    RunRepositoryError::DatabaseError(format!("Failed to mark run executed: {}", e))
                })
        })
        .await
        .map_err(|e| RunRepositoryError::DatabaseError(format!("Task join error: {}", e)))??;

        if updated == 0 {
            return Err(RunRepositoryError::NotFound(run_id));
        }
        Ok(())
    }
}
