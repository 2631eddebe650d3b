use std::sync::Arc;

use crate::{
    application::{
        ports::{DocumentStorage, ProcessInvoker},
        services::{
            ConfigurationResolver, ExecutionGuard, PipelineOrchestrator, VerificationReconciler,
            pipeline_orchestrator::PipelineCommands,
        },
        use_cases::{
            ConfigureRunUseCase, CreateRunUseCase, ExecuteRunUseCase, GetRunUseCase,
            ListRunDocumentsUseCase, ReportProgressUseCase, UploadDocumentsUseCase,
            VerifyRunUseCase,
        },
    },
    domain::repositories::{DocumentRepository, RunRepository, SettingRepository},
    infrastructure::{
        config::AppConfig,
        database::{
            create_connection_pool,
            repositories::{
                PostgresDocumentRepository, PostgresRunRepository, PostgresSettingRepository,
            },
            run_migrations,
        },
        file_system::LocalDocumentStorage,
        process::TokioProcessInvoker,
    },
    presentation::http::handlers::{DocumentHandler, RunHandler},
};

/// The external collaborators every other component is built from.
pub struct Components {
    pub run_repository: Arc<dyn RunRepository>,
    pub document_repository: Arc<dyn DocumentRepository>,
    pub setting_repository: Arc<dyn SettingRepository>,
    pub process_invoker: Arc<dyn ProcessInvoker>,
    pub document_storage: Arc<dyn DocumentStorage>,
}

pub struct AppContainer {
    pub run_handler: Arc<RunHandler>,
    pub document_handler: Arc<DocumentHandler>,
}

impl AppContainer {
    pub async fn new(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db_pool = create_connection_pool(&config.database_url, config.database_pool_size)?;
        let applied = run_migrations(&db_pool)
            .map_err(|e| format!("Failed to run database migrations: {}", e))?;
        tracing::info!("Database ready ({} migration(s) applied)", applied);

        let components = Components {
            run_repository: Arc::new(PostgresRunRepository::new(db_pool.clone())),
            document_repository: Arc::new(PostgresDocumentRepository::new(db_pool.clone())),
            setting_repository: Arc::new(PostgresSettingRepository::new(db_pool)),
            process_invoker: Arc::new(TokioProcessInvoker::new()),
            document_storage: Arc::new(LocalDocumentStorage::new()),
        };

        Ok(Self::from_components(components, config.pipeline_commands()))
    }

    pub fn from_components(components: Components, commands: PipelineCommands) -> Self {
        let Components {
            run_repository,
            document_repository,
            setting_repository,
            process_invoker,
            document_storage,
        } = components;

        let configuration_resolver = Arc::new(ConfigurationResolver::new(
            setting_repository,
            run_repository.clone(),
        ));

        let pipeline_orchestrator = Arc::new(PipelineOrchestrator::new(
            configuration_resolver.clone(),
            run_repository.clone(),
            document_repository.clone(),
            process_invoker,
            commands,
        ));

        let verification_reconciler = Arc::new(VerificationReconciler::new(
            configuration_resolver.clone(),
            run_repository.clone(),
            document_repository.clone(),
        ));

        // Use cases
        let create_run_use_case = Arc::new(CreateRunUseCase::new(run_repository.clone()));
        let get_run_use_case = Arc::new(GetRunUseCase::new(run_repository.clone()));
        let configure_run_use_case = Arc::new(ConfigureRunUseCase::new(run_repository.clone()));
        let list_run_documents_use_case = Arc::new(ListRunDocumentsUseCase::new(
            run_repository.clone(),
            document_repository.clone(),
        ));
        let execute_run_use_case = Arc::new(ExecuteRunUseCase::new(
            run_repository.clone(),
            pipeline_orchestrator,
            ExecutionGuard::new(),
        ));
        let verify_run_use_case = Arc::new(VerifyRunUseCase::new(verification_reconciler));
        let report_progress_use_case =
            Arc::new(ReportProgressUseCase::new(run_repository.clone()));
        let upload_documents_use_case = Arc::new(UploadDocumentsUseCase::new(
            configuration_resolver.clone(),
            run_repository,
            document_repository,
            document_storage,
        ));

        // HTTP handlers
        let run_handler = Arc::new(RunHandler::new(
            create_run_use_case,
            get_run_use_case,
            configure_run_use_case,
            list_run_documents_use_case,
            execute_run_use_case,
            verify_run_use_case,
            report_progress_use_case,
        ));
        let document_handler = Arc::new(DocumentHandler::new(upload_documents_use_case));

        Self {
            run_handler,
            document_handler,
        }
    }
}
