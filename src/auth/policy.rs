use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::types::{Role, TenantContext};

/// Access rules a route can demand on top of a valid session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Any verified session
    Authenticated,
    /// Cross-tenant directory management
    SuperAdmin,
}

/// The single place role requirements are evaluated
pub fn authorize(user: &AuthUser, policy: Policy) -> Result<(), ApiError> {
    match policy {
        Policy::Authenticated => Ok(()),
        Policy::SuperAdmin if user.role == Role::SuperAdmin => Ok(()),
        Policy::SuperAdmin => {
            tracing::warn!(user_id = user.id, role = %user.role, "Superadmin route refused");
            Err(ApiError::forbidden("Superadmin access required"))
        }
    }
}

/// Tenant scope of an authenticated caller, taken from verified claims only
pub fn session_tenant(user: &AuthUser) -> Result<TenantContext, ApiError> {
    user.enterprise_id
        .map(TenantContext::from_session)
        .ok_or_else(|| ApiError::forbidden("Session is not bound to an enterprise"))
}
