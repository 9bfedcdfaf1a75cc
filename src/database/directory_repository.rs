use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{Enterprise, NewUser, User, UserCredentials, UserRow};
use super::DatabaseError;

/// Enterprises and their member users.
///
/// Deleting an enterprise relies on `ON DELETE CASCADE` for its users and
/// complaints; implementations must not fan out deletes themselves.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    /// Alphabetical by name
    async fn list_enterprises(&self) -> Result<Vec<Enterprise>, DatabaseError>;

    async fn find_enterprise(&self, id: i32) -> Result<Option<Enterprise>, DatabaseError>;

    async fn insert_enterprise(&self, name: &str) -> Result<Enterprise, DatabaseError>;

    /// Existing enterprise with exactly this name, or a fresh one
    async fn find_or_insert_enterprise(&self, name: &str) -> Result<Enterprise, DatabaseError>;

    /// Deletes the enterprise and returns the blob references of the voice
    /// complaints that went with it, or `None` when no such enterprise exists.
    /// The refs are read under a row lock on the enterprise, so no complaint
    /// can be inserted between collecting them and the delete.
    async fn delete_enterprise(&self, id: i32) -> Result<Option<Vec<String>>, DatabaseError>;

    /// Alphabetical by username
    async fn list_users(&self, enterprise_id: i32) -> Result<Vec<User>, DatabaseError>;

    async fn find_credentials(&self, username: &str) -> Result<Option<UserCredentials>, DatabaseError>;

    /// Fails with `UniqueViolation` on a taken username
    async fn insert_user(&self, user: &NewUser) -> Result<User, DatabaseError>;

    /// `None` when the username already exists
    async fn insert_user_if_absent(&self, user: &NewUser) -> Result<Option<User>, DatabaseError>;

    async fn delete_user(&self, id: i32) -> Result<bool, DatabaseError>;
}

pub struct PgDirectoryRepository {
    pool: PgPool,
}

impl PgDirectoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryRepository for PgDirectoryRepository {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_enterprises(&self) -> Result<Vec<Enterprise>, DatabaseError> {
        let enterprises = sqlx::query_as::<_, Enterprise>("SELECT id, name FROM enterprises ORDER BY name ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(enterprises)
    }

    async fn find_enterprise(&self, id: i32) -> Result<Option<Enterprise>, DatabaseError> {
        let enterprise = sqlx::query_as::<_, Enterprise>("SELECT id, name FROM enterprises WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(enterprise)
    }

    async fn insert_enterprise(&self, name: &str) -> Result<Enterprise, DatabaseError> {
        let enterprise = sqlx::query_as::<_, Enterprise>("INSERT INTO enterprises (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(enterprise)
    }

    async fn find_or_insert_enterprise(&self, name: &str) -> Result<Enterprise, DatabaseError> {
        let existing = sqlx::query_as::<_, Enterprise>(
            "SELECT id, name FROM enterprises WHERE name = $1 ORDER BY id ASC LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        match existing {
            Some(enterprise) => Ok(enterprise),
            None => self.insert_enterprise(name).await,
        }
    }

    async fn delete_enterprise(&self, id: i32) -> Result<Option<Vec<String>>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Complaint inserts take a key-share lock on the enterprise row and wait here
        let locked: Option<(i32,)> = sqlx::query_as("SELECT id FROM enterprises WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let refs: Vec<(String,)> = sqlx::query_as(
            "SELECT blob_ref FROM complaints WHERE enterprise_id = $1 AND type = 'voice' AND blob_ref IS NOT NULL",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM enterprises WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(refs.into_iter().map(|(blob_ref,)| blob_ref).collect()))
    }

    async fn list_users(&self, enterprise_id: i32) -> Result<Vec<User>, DatabaseError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, enterprise_id, username, password_hash, role
            FROM users
            WHERE enterprise_id = $1
            ORDER BY username ASC
            "#,
        )
        .bind(enterprise_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn find_credentials(&self, username: &str) -> Result<Option<UserCredentials>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, enterprise_id, username, password_hash, role FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserCredentials::try_from).transpose()
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (enterprise_id, username, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, enterprise_id, username, password_hash, role
            "#,
        )
        .bind(user.enterprise_id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        User::try_from(row)
    }

    async fn insert_user_if_absent(&self, user: &NewUser) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (enterprise_id, username, password_hash, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (username) DO NOTHING
            RETURNING id, enterprise_id, username, password_hash, role
            "#,
        )
        .bind(user.enterprise_id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn delete_user(&self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
