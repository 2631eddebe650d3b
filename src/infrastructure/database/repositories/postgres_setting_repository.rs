use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

use crate::domain::entities::Setting;
use crate::domain::repositories::{SettingRepository, setting_repository::SettingRepositoryError};
use crate::domain::value_objects::ProjectRef;
use crate::infrastructure::database::models::SettingModel;
use crate::infrastructure::database::schema::settings;

/// Read-only; the settings rows are written by the project settings forms.
pub struct PostgresSettingRepository {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl PostgresSettingRepository {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingRepository for PostgresSettingRepository {
    async fn find_by_project(
        &self,
        project: &ProjectRef,
    ) -> Result<Option<Setting>, SettingRepositoryError> {
        let user_id = project.user_id;
        let project_name = project.project_name.clone();
        let mut conn = self.pool.get().map_err(|e| {
            SettingRepositoryError::DatabaseError(format!(
                "Failed to get database connection: {}",
                e
            ))
        })?;

        let result = tokio::task::spawn_blocking(move || {
            settings::table
                .filter(settings::user_id.eq(user_id))
                .filter(settings::project_name.eq(project_name))
                .select(SettingModel::as_select())
                .first(&mut conn)
                .optional()
                .map_err(|e| {
                    SettingRepositoryError::DatabaseError(format!("Failed to load settings: {}", e))
                })
        })
        .await
        .map_err(|e| SettingRepositoryError::DatabaseError(format!("Task join error: {}", e)))??;

        Ok(result.map(Setting::from))
    }
}
