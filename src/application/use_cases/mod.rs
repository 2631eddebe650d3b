pub mod configure_run;
pub mod create_run;
pub mod execute_run;
pub mod get_run;
pub mod list_run_documents;
pub mod report_progress;
pub mod upload_documents;
pub mod verify_run;

pub use configure_run::ConfigureRunUseCase;
pub use create_run::CreateRunUseCase;
pub use execute_run::ExecuteRunUseCase;
pub use get_run::GetRunUseCase;
pub use list_run_documents::ListRunDocumentsUseCase;
pub use report_progress::ReportProgressUseCase;
pub use upload_documents::UploadDocumentsUseCase;
pub use verify_run::VerifyRunUseCase;
