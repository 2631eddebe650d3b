mod application;
mod domain;
mod infrastructure;
mod presentation;
#[cfg(test)]
mod test_support;

use infrastructure::{AppConfig, AppContainer};
use presentation::http::server::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        "Starting docgraph on port {} (extraction: {}, graph: {})",
        config.port,
        config.extraction_command.program,
        config.graph_command.program
    );

    let container = AppContainer::new(&config).await?;

    let server = HttpServer::new(
        container.run_handler,
        container.document_handler,
        Some(config.port),
        config.upload_body_limit_bytes(),
    );
    server.run().await
}
