pub mod credentials;
pub mod password;
pub mod policy;
pub mod session;

use thiserror::Error;

use crate::database::DatabaseError;

pub use credentials::CredentialVerifier;
pub use password::{PasswordError, PasswordService};
pub use policy::{authorize, session_tenant, Policy};
pub use session::{SessionClaims, SessionError, SessionIssuer, SESSION_TTL_HOURS};

#[derive(Debug, Error)]
pub enum AuthError {
    /// Deliberately generic: covers unknown username and wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Session(#[from] SessionError),
}
