pub mod document_storage;
pub mod process_invoker;

pub use document_storage::DocumentStorage;
pub use process_invoker::ProcessInvoker;
