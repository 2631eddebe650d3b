pub mod local_document_storage;

pub use local_document_storage::LocalDocumentStorage;
