use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use bookstore::bookstore_config::ServerConfig;
use bookstore::logging::init_tracing;
use bookstore::metrics::init_metrics;
use bookstore::router::init_router;
use bookstore::state::init_app_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = ServerConfig::from_env();
    init_tracing(&config.log_level).context("Failed to initialise logging")?;

    let metrics = init_metrics(config.metrics_enabled).context("Failed to install metrics recorder")?;
    let state = init_app_state(&config, metrics).await?;
    let app = init_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!(%address, backend = %config.store_backend, "Server listening");
    info!("Swagger UI available at http://{address}/swagger-ui");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
