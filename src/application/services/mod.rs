pub mod configuration_resolver;
pub mod execution_guard;
pub mod pipeline_commands;
pub mod pipeline_orchestrator;
pub mod verification_reconciler;

pub use configuration_resolver::ConfigurationResolver;
pub use execution_guard::ExecutionGuard;
pub use pipeline_orchestrator::PipelineOrchestrator;
pub use verification_reconciler::VerificationReconciler;
