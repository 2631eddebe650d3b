pub mod tokio_process_invoker;

pub use tokio_process_invoker::TokioProcessInvoker;
