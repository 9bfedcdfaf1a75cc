use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Tenant boundary. Owns users and complaints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Enterprise {
    pub id: i32,
    pub name: String,
}
