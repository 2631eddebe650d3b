pub mod postgres_document_repository;
pub mod postgres_run_repository;
pub mod postgres_setting_repository;

pub use postgres_document_repository::PostgresDocumentRepository;
pub use postgres_run_repository::PostgresRunRepository;
pub use postgres_setting_repository::PostgresSettingRepository;
