use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use users_api::config::Config;
use users_api::db::{self, ConnectionFactory, DatabaseInitializer, SqliteConnectionFactory};
use users_api::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let providers = telemetry::init_telemetry(config.otlp_endpoint.as_deref())?;

    let pool = db::create_pool(&config.database_url, config.max_connections).await?;
    let connections: Arc<dyn ConnectionFactory> = Arc::new(SqliteConnectionFactory::new(pool));

    DatabaseInitializer::new(connections.clone())
        .initialize()
        .await
        .context("Failed to initialize users table")?;

    tracing::info!("Connected to database and users table ready");

    let app = users_api::app(connections, config.store_timeout);
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(providers) = providers {
        providers.shutdown();
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install CTRL+C signal handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, flushing telemetry...");
}
