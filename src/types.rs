/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role carried by every user and every session token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::SuperAdmin => "superadmin",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::SuperAdmin),
            other => Err(ParseEnumError::new("role", other)),
        }
    }
}

/// Payload shape of a complaint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintKind {
    Text,
    Voice,
}

impl ComplaintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintKind::Text => "text",
            ComplaintKind::Voice => "voice",
        }
    }
}

impl FromStr for ComplaintKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ComplaintKind::Text),
            "voice" => Ok(ComplaintKind::Voice),
            other => Err(ParseEnumError::new("type", other)),
        }
    }
}

/// Complaint lifecycle state. Only these two exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintStatus {
    Open,
    Resolved,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Open => "open",
            ComplaintStatus::Resolved => "resolved",
        }
    }
}

impl Default for ComplaintStatus {
    fn default() -> Self {
        ComplaintStatus::Open
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ComplaintStatus::Open),
            "resolved" => Ok(ComplaintStatus::Resolved),
            other => Err(ParseEnumError::new("status", other)),
        }
    }
}

/// Rejected string value for one of the enums above
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field} '{value}'")]
pub struct ParseEnumError {
    pub field: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

/// Where the tenant id of a request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantSource {
    /// Public intake route, taken from the URL path
    Path,
    /// Authenticated route, taken from verified session claims
    Session,
}

/// Enterprise scope threaded into every complaint store call.
///
/// Built once per request from exactly one source and never from a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    enterprise_id: i32,
    source: TenantSource,
}

impl TenantContext {
    pub fn from_path(enterprise_id: i32) -> Self {
        Self {
            enterprise_id,
            source: TenantSource::Path,
        }
    }

    pub fn from_session(enterprise_id: i32) -> Self {
        Self {
            enterprise_id,
            source: TenantSource::Session,
        }
    }

    pub fn enterprise_id(&self) -> i32 {
        self.enterprise_id
    }

    pub fn source(&self) -> TenantSource {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_only_known_states() {
        assert_eq!("open".parse::<ComplaintStatus>(), Ok(ComplaintStatus::Open));
        assert_eq!("resolved".parse::<ComplaintStatus>(), Ok(ComplaintStatus::Resolved));

        let err = "archived".parse::<ComplaintStatus>().unwrap_err();
        assert_eq!(err.field, "status");
        assert_eq!(err.value, "archived");
        assert!("Open".parse::<ComplaintStatus>().is_err());
    }

    #[test]
    fn role_round_trips_through_serde() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"superadmin\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn tenant_context_remembers_source() {
        let intake = TenantContext::from_path(7);
        let session = TenantContext::from_session(7);
        assert_eq!(intake.enterprise_id(), session.enterprise_id());
        assert_eq!(intake.source(), TenantSource::Path);
        assert_eq!(session.source(), TenantSource::Session);
    }
}
