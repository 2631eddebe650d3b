pub mod document_handler;
pub mod run_handler;

pub use document_handler::DocumentHandler;
pub use run_handler::RunHandler;
