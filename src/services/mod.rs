pub mod auth_service;
pub mod complaint_service;
pub mod directory_service;

use thiserror::Error;

use crate::auth::PasswordError;
use crate::database::DatabaseError;

pub use auth_service::{AuthService, LoginResponse};
pub use complaint_service::{format_timestamp, ComplaintService, VoiceReceipt};
pub use directory_service::{CreateUser, DirectoryService, SUPERADMIN_ENTERPRISE_NAME};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    SelfDeletionForbidden(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl ServiceError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field,
            message: message.into(),
        }
    }
}
