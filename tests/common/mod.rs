use std::sync::OnceLock;

use anyhow::{Context, Result};
use tokio::sync::{Mutex, MutexGuard};

use complaint_desk::config::DatabaseConfig;
use complaint_desk::database::schema::init_schema;
use complaint_desk::database::DatabaseManager;

// Every test resets the schema, so they take turns
static SCHEMA_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub struct TestDatabase {
    pub manager: DatabaseManager,
    _guard: MutexGuard<'static, ()>,
}

/// Connects to DATABASE_URL (a disposable database: its tables are dropped
/// and recreated) or returns `None` when the variable is unset.
pub async fn fresh_database() -> Result<Option<TestDatabase>> {
    dotenvy::dotenv().ok();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres test");
        return Ok(None);
    };

    let guard = SCHEMA_LOCK.get_or_init(|| Mutex::new(())).lock().await;

    let config = DatabaseConfig {
        url: Some(url),
        max_connections: 2,
        connection_timeout: 10,
    };
    let manager = DatabaseManager::connect(&config)
        .await
        .context("failed to connect to DATABASE_URL")?;
    init_schema(manager.pool(), true).await.context("failed to reset schema")?;

    Ok(Some(TestDatabase { manager, _guard: guard }))
}
