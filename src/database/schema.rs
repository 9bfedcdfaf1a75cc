use sqlx::PgPool;
use tracing::info;

use super::DatabaseError;

const DROP_TABLES: &str = "DROP TABLE IF EXISTS complaints, users, enterprises CASCADE";

const CREATE_ENTERPRISES: &str = r#"
    CREATE TABLE IF NOT EXISTS enterprises (
        id SERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL
    )
"#;

// enterprise_id stays nullable for a superadmin seeded without an enterprise
const CREATE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        enterprise_id INTEGER REFERENCES enterprises(id) ON DELETE CASCADE,
        username VARCHAR(255) UNIQUE NOT NULL,
        password_hash VARCHAR(255) NOT NULL,
        role VARCHAR(50) NOT NULL DEFAULT 'admin'
            CHECK (role IN ('admin', 'superadmin'))
    )
"#;

const CREATE_COMPLAINTS: &str = r#"
    CREATE TABLE IF NOT EXISTS complaints (
        id SERIAL PRIMARY KEY,
        enterprise_id INTEGER NOT NULL REFERENCES enterprises(id) ON DELETE CASCADE,
        complaint TEXT,
        type VARCHAR(50) NOT NULL CHECK (type IN ('text', 'voice')),
        status VARCHAR(50) NOT NULL DEFAULT 'open' CHECK (status IN ('open', 'resolved')),
        timestamp VARCHAR(255) NOT NULL,
        filepath VARCHAR(1024),
        blob_ref VARCHAR(1024),
        CHECK (
            (type = 'text' AND complaint IS NOT NULL AND filepath IS NULL)
            OR (type = 'voice' AND complaint IS NULL AND filepath IS NOT NULL)
        )
    )
"#;

// Tables created before voice cleanup existed lack this column
const ADD_COMPLAINTS_BLOB_REF: &str = "ALTER TABLE complaints ADD COLUMN IF NOT EXISTS blob_ref VARCHAR(1024)";

const CREATE_COMPLAINTS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS complaints_enterprise_id_idx ON complaints (enterprise_id, id DESC)";

/// Create the three tables (idempotent). With `reset`, drop them first.
pub async fn init_schema(pool: &PgPool, reset: bool) -> Result<(), DatabaseError> {
    let mut tx = pool.begin().await?;

    if reset {
        info!("Dropping existing tables");
        sqlx::query(DROP_TABLES).execute(&mut *tx).await?;
    }

    for statement in [
        CREATE_ENTERPRISES,
        CREATE_USERS,
        CREATE_COMPLAINTS,
        ADD_COMPLAINTS_BLOB_REF,
        CREATE_COMPLAINTS_INDEX,
    ] {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    info!(reset, "Database schema ready");
    Ok(())
}
