use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::presentation::http::handlers::RunHandler;

pub fn run_routes(run_handler: Arc<RunHandler>) -> Router {
    Router::new()
        .route(
            "/users/{user_id}/projects/{project_name}/runs",
            post(RunHandler::create_run),
        )
        .route(
            "/users/{user_id}/projects/{project_name}/runs/{run_id}",
            get(RunHandler::get_run).patch(RunHandler::configure_run),
        )
        .route(
            "/users/{user_id}/projects/{project_name}/runs/{run_id}/documents",
            get(RunHandler::list_documents),
        )
        .route(
            "/users/{user_id}/projects/{project_name}/runs/{run_id}/execute",
            post(RunHandler::execute_run),
        )
        .route(
            "/users/{user_id}/projects/{project_name}/runs/{run_id}/verify",
            post(RunHandler::verify_run),
        )
        .route(
            "/users/{user_id}/projects/{project_name}/runs/{run_id}/progress",
            put(RunHandler::report_progress),
        )
        .with_state(run_handler)
}
