use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::DatabaseError;
use crate::types::Role;

/// Raw `users` row as stored
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i32,
    pub enterprise_id: Option<i32>,
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

/// Directory view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub enterprise_id: Option<i32>,
    pub username: String,
    pub role: Role,
}

/// User plus the stored hash, only handed to the credential verifier
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Insert payload; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub enterprise_id: Option<i32>,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

impl TryFrom<UserRow> for UserCredentials {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| DatabaseError::Corrupt(format!("user {}: {}", row.id, e)))?;

        Ok(UserCredentials {
            user: User {
                id: row.id,
                enterprise_id: row.enterprise_id,
                username: row.username,
                role,
            },
            password_hash: row.password_hash,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        UserCredentials::try_from(row).map(|credentials| credentials.user)
    }
}
