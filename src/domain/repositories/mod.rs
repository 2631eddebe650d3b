pub mod document_repository;
pub mod run_repository;
pub mod setting_repository;

pub use document_repository::DocumentRepository;
pub use run_repository::RunRepository;
pub use setting_repository::SettingRepository;
