pub mod document_model;
pub mod run_model;
pub mod setting_model;

pub use document_model::*;
pub use run_model::*;
pub use setting_model::*;
