use async_trait::async_trait;

use crate::domain::entities::Setting;
use crate::domain::value_objects::ProjectRef;

#[derive(Debug)]
pub enum SettingRepositoryError {
    DatabaseError(String),
    ValidationError(String),
}

impl std::fmt::Display for SettingRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingRepositoryError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            SettingRepositoryError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for SettingRepositoryError {}

#[async_trait]
pub trait SettingRepository: Send + Sync {
    async fn find_by_project(
        &self,
        project: &ProjectRef,
    ) -> Result<Option<Setting>, SettingRepositoryError>;
}
