use std::sync::Arc;
use tracing::debug;

use super::password::PasswordService;
use super::AuthError;
use crate::database::models::User;
use crate::database::DirectoryRepository;

/// Checks a username/password pair against the stored hash.
///
/// An unknown username and a wrong password are indistinguishable to the
/// caller: same error, and a bcrypt verification runs in both cases.
#[derive(Clone)]
pub struct CredentialVerifier {
    directory: Arc<dyn DirectoryRepository>,
    passwords: PasswordService,
}

impl CredentialVerifier {
    pub fn new(directory: Arc<dyn DirectoryRepository>, passwords: PasswordService) -> Self {
        Self { directory, passwords }
    }

    pub async fn verify(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Some(credentials) = self.directory.find_credentials(username).await? else {
            self.passwords.verify_dummy(password).await?;
            debug!(username, "Login rejected: unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.passwords.verify(password, &credentials.password_hash).await? {
            debug!(username, "Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(credentials.user)
    }
}
