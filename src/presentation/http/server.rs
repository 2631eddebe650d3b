use axum::Router;
use axum::extract::DefaultBodyLimit;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::presentation::http::{
    handlers::{DocumentHandler, RunHandler},
    routes::{document_routes, health_routes, run_routes},
};

pub struct HttpServer {
    run_handler: Arc<RunHandler>,
    document_handler: Arc<DocumentHandler>,
    port: u16,
    body_limit_bytes: usize,
}

impl HttpServer {
    pub fn new(
        run_handler: Arc<RunHandler>,
        document_handler: Arc<DocumentHandler>,
        port: Option<u16>,
        body_limit_bytes: usize,
    ) -> Self {
        Self {
            run_handler,
            document_handler,
            port: port.unwrap_or(3000),
            body_limit_bytes,
        }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .merge(health_routes())
            .merge(run_routes(self.run_handler.clone()))
            .merge(document_routes(self.document_handler.clone()))
            .layer(cors)
            // Multipart has its own 2 MB default; the layer below is the only cap.
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(self.body_limit_bytes))
            .layer(
                TraceLayer::new_for_http()
                    .on_request(
                        |request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                            tracing::info!(
                                "Received request: {} {}",
                                request.method(),
                                request.uri()
                            );
                        },
                    )
                    .on_response(
                        |response: &axum::http::Response<axum::body::Body>,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::info!(
                                "Response: {} (took {} ms)",
                                response.status(),
                                latency.as_millis()
                            );
                        },
                    )
                    .on_failure(
                        |error: ServerErrorsFailureClass,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::error!(
                                "Request failed: {:?} (took {} ms)",
                                error,
                                latency.as_millis()
                            );
                        },
                    ),
            )
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::application::services::pipeline_commands::CommandSpec;
    use crate::application::services::pipeline_orchestrator::PipelineCommands;
    use crate::domain::value_objects::ProjectRef;
    use crate::infrastructure::container::{AppContainer, Components};
    use crate::test_support::{
        InMemoryDocumentRepository, InMemoryDocumentStorage, InMemoryRunRepository,
        InMemorySettingRepository, ScriptedProcessInvoker, complete_setting,
    };

    struct Fixture {
        router: Router,
        invoker: Arc<ScriptedProcessInvoker>,
        storage: Arc<InMemoryDocumentStorage>,
        _root: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let settings = Arc::new(InMemorySettingRepository::default());
        settings.insert(complete_setting(ProjectRef::new(1, "papers"), root.path()));
        let invoker = Arc::new(ScriptedProcessInvoker::default());
        let storage = Arc::new(InMemoryDocumentStorage::default());

        let container = AppContainer::from_components(
            Components {
                run_repository: Arc::new(InMemoryRunRepository::default()),
                document_repository: Arc::new(InMemoryDocumentRepository::default()),
                setting_repository: settings,
                process_invoker: invoker.clone(),
                document_storage: storage.clone(),
            },
            PipelineCommands {
                extraction: CommandSpec::parse("python3 extract.py").unwrap(),
                graph: CommandSpec::parse("python3 graph.py").unwrap(),
                api_url: "http://localhost:3000".to_string(),
            },
        );
        let server = HttpServer::new(
            container.run_handler,
            container.document_handler,
            None,
            1024 * 1024,
        );

        Fixture {
            router: server.router(),
            invoker,
            storage,
            _root: root,
        }
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_run_lifecycle_over_http() {
        let fixture = fixture();
        let base = "/users/1/projects/papers/runs";

        let (status, body) = send(&fixture.router, Method::POST, base, None).await;
        assert_eq!(status, StatusCode::CREATED);
        let run_id = body["data"]["run_id"].as_i64().unwrap();
        let run_uri = format!("{}/{}", base, run_id);

        let (status, body) = send(
            &fixture.router,
            Method::PATCH,
            &run_uri,
            Some(serde_json::json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send(
            &fixture.router,
            Method::PATCH,
            &run_uri,
            Some(serde_json::json!({ "text": true, "chunk_size": 800 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["fields_updated"], 2);

        let execute_uri = format!("{}/execute", run_uri);
        let (status, body) = send(&fixture.router, Method::POST, &execute_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["outcome"]["status"], "succeeded");
        assert_eq!(fixture.invoker.invocations().len(), 1);

        let (status, body) = send(&fixture.router, Method::GET, &run_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["is_executed"], true);

        let (status, body) = send(&fixture.router, Method::POST, &execute_uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "RUN_CONFLICT");
    }

    #[tokio::test]
    async fn test_failed_extraction_returns_report() {
        let fixture = fixture();
        let base = "/users/1/projects/papers/runs";
        let (_, body) = send(&fixture.router, Method::POST, base, None).await;
        let run_uri = format!("{}/{}", base, body["data"]["run_id"]);
        fixture.invoker.push_exit(2);

        let (status, body) = send(
            &fixture.router,
            Method::POST,
            &format!("{}/execute", run_uri),
            Some(serde_json::json!({ "tasks": ["metadata"] })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "PIPELINE_FAILED");
        assert_eq!(body["error"]["details"]["outcome"]["stage"], "extracting");
        assert_eq!(body["error"]["details"]["executed_flag_persisted"], false);
    }

    #[tokio::test]
    async fn test_foreign_project_cannot_see_run() {
        let fixture = fixture();
        let base = "/users/1/projects/papers/runs";
        let (_, body) = send(&fixture.router, Method::POST, base, None).await;
        let run_id = body["data"]["run_id"].clone();

        let (status, body) = send(
            &fixture.router,
            Method::GET,
            &format!("/users/2/projects/papers/runs/{}", run_id),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "RUN_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_multipart_upload_creates_run() {
        let fixture = fixture();
        let boundary = "docgraph-boundary";
        let payload = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"a.pdf\"\r\nContent-Type: application/pdf\r\n\r\nfirst\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"b.pdf\"\r\nContent-Type: application/pdf\r\n\r\nfirst\r\n\
             --{b}--\r\n",
            b = boundary
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/users/1/projects/papers/documents")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(payload))
            .unwrap();

        let response = fixture.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["data"]["uploaded"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["skipped"][0]["document_name"], "b.pdf");
        assert_eq!(fixture.storage.stored_paths().len(), 1);
    }
}
