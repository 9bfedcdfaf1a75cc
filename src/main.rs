use anyhow::Context;
use tracing_subscriber::EnvFilter;

use complaint_desk::app::{router, AppState};
use complaint_desk::config::AppConfig;
use complaint_desk::database::{schema::init_schema, DatabaseManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("complaint_desk=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env().validate().context("invalid configuration")?;
    tracing::info!("Starting Complaint Desk in {:?} mode", config.environment);

    let database = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    init_schema(database.pool(), false)
        .await
        .context("failed to initialise schema")?;

    let port = config.api.port;
    let state = AppState::build(config, &database)?;

    match state.config.bootstrap.superadmin() {
        Some((username, password)) => {
            state
                .directory
                .ensure_superadmin(username, password)
                .await
                .context("failed to seed superadmin")?;
        }
        None => tracing::warn!("SUPERADMIN_USERNAME/SUPERADMIN_PASSWORD not set; skipping superadmin seed"),
    }

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Complaint Desk listening on http://{}", bind_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    database.close().await;
    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
