use axum::{Router, routing::post};
use std::sync::Arc;

use crate::presentation::http::handlers::DocumentHandler;

pub fn document_routes(document_handler: Arc<DocumentHandler>) -> Router {
    Router::new()
        .route(
            "/users/{user_id}/projects/{project_name}/documents",
            post(DocumentHandler::upload_documents),
        )
        .with_state(document_handler)
}
