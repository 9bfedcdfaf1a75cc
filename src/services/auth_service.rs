use serde::Serialize;
use tracing::{info, warn};

use crate::auth::{AuthError, CredentialVerifier, SessionIssuer, SESSION_TTL_HOURS};

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// Seconds until the token expires
    #[serde(rename = "expiresIn")]
    pub expires_in: i64,
}

/// Credential check plus session issuance
#[derive(Clone)]
pub struct AuthService {
    verifier: CredentialVerifier,
    sessions: SessionIssuer,
}

impl AuthService {
    pub fn new(verifier: CredentialVerifier, sessions: SessionIssuer) -> Self {
        Self { verifier, sessions }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let user = match self.verifier.verify(username, password).await {
            Ok(user) => user,
            Err(AuthError::InvalidCredentials) => {
                warn!(username, "Failed login attempt");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        let access_token = self.sessions.issue(&user)?;
        info!(user_id = user.id, role = %user.role, "User logged in");

        Ok(LoginResponse {
            access_token,
            expires_in: SESSION_TTL_HOURS * 3600,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PasswordService;
    use crate::testing::MemoryStore;
    use crate::types::Role;
    use std::sync::Arc;

    async fn service() -> (AuthService, SessionIssuer) {
        let store = Arc::new(MemoryStore::default());
        let passwords = PasswordService::new(4).unwrap();
        let acme = store.seed_enterprise("Acme");
        store.seed_user("bob", &passwords.hash("pw1").await.unwrap(), Some(acme.id), Role::Admin);

        let sessions = SessionIssuer::new("test-secret");
        let service = AuthService::new(CredentialVerifier::new(store, passwords), sessions.clone());
        (service, sessions)
    }

    #[tokio::test]
    async fn login_issues_verifiable_session() {
        let (service, sessions) = service().await;

        let response = service.login("bob", "pw1").await.unwrap();
        assert_eq!(response.expires_in, 24 * 3600);

        let claims = sessions.verify(&response.access_token).unwrap();
        assert_eq!(claims.username, "bob");
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.enterprise_id.is_some());
    }

    #[tokio::test]
    async fn bad_credentials_issue_nothing() {
        let (service, _) = service().await;
        assert!(matches!(
            service.login("bob", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login("nobody", "pw1").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn response_uses_camel_case_keys() {
        let json = serde_json::to_value(LoginResponse {
            access_token: "t".to_string(),
            expires_in: 60,
        })
        .unwrap();
        assert_eq!(json["accessToken"], "t");
        assert_eq!(json["expiresIn"], 60);
    }
}
