//! Password hashing with bcrypt

use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Hash error: {0}")]
    HashError(#[from] bcrypt::BcryptError),
    #[error("Hashing task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// One-way password hashing. bcrypt is CPU bound, so every call runs on the
/// blocking pool instead of the request task.
#[derive(Clone)]
pub struct PasswordService {
    cost: u32,
    /// Verified against when a username does not exist
    dummy_hash: Arc<str>,
}

impl PasswordService {
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        let dummy_hash = bcrypt::hash("complaint-desk-dummy-password", cost)?;
        Ok(Self {
            cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let password = password.to_string();
        let cost = self.cost;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        Ok(hash)
    }

    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let password = password.to_string();
        let hash = hash.to_string();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
        Ok(matches)
    }

    /// Burn the same amount of work as a real verification; always false
    pub async fn verify_dummy(&self, password: &str) -> Result<bool, PasswordError> {
        let dummy = self.dummy_hash.clone();
        self.verify(password, &dummy).await.map(|_| false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let passwords = PasswordService::new(4).unwrap();
        let hash = passwords.hash("pw1").await.unwrap();

        assert_ne!(hash, "pw1");
        assert!(passwords.verify("pw1", &hash).await.unwrap());
        assert!(!passwords.verify("pw2", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn dummy_never_matches() {
        let passwords = PasswordService::new(4).unwrap();
        assert!(!passwords.verify_dummy("complaint-desk-dummy-password").await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        let passwords = PasswordService::new(4).unwrap();
        assert!(passwords.verify("pw1", "not-a-bcrypt-hash").await.is_err());
    }
}
