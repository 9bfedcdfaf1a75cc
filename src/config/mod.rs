use serde::{Deserialize, Serialize};
use std::env;

/// Secret used when running in development without JWT_SECRET set
const DEVELOPMENT_JWT_SECRET: &str = "complaint-desk-development-secret";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub blob: BlobConfig,
    pub bootstrap: BootstrapConfig,
    pub intake: IntakeConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

/// Cloudinary-compatible object store credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobConfig {
    pub cloud_name: String,
    pub api_key: String,
    #[serde(skip_serializing)]
    pub api_secret: String,
    pub folder: String,
    pub api_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub superadmin_username: Option<String>,
    #[serde(skip_serializing)]
    pub superadmin_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Fixed offset used when stamping complaint timestamps
    pub utc_offset_minutes: i32,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set outside development")]
    MissingJwtSecret,

    #[error("bcrypt cost {0} is outside 4..=31")]
    InvalidBcryptCost(u32),

    #[error("utc offset {0} minutes is out of range")]
    InvalidUtcOffset(i32),
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("PORT") {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Blob store overrides
        if let Ok(v) = env::var("CLOUDINARY_CLOUD_NAME") {
            self.blob.cloud_name = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_API_KEY") {
            self.blob.api_key = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_API_SECRET") {
            self.blob.api_secret = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_FOLDER") {
            self.blob.folder = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_API_BASE_URL") {
            self.blob.api_base_url = v;
        }

        // Bootstrap superadmin
        if let Ok(v) = env::var("SUPERADMIN_USERNAME") {
            self.bootstrap.superadmin_username = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("SUPERADMIN_PASSWORD") {
            self.bootstrap.superadmin_password = Some(v).filter(|s| !s.is_empty());
        }

        if let Ok(v) = env::var("COMPLAINT_UTC_OFFSET_MINUTES") {
            self.intake.utc_offset_minutes = v.parse().unwrap_or(self.intake.utc_offset_minutes);
        }

        self
    }

    /// Check the combination of settings before anything is started.
    /// A development profile without JWT_SECRET falls back to a fixed local secret.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self.security.jwt_secret.is_empty() {
            if self.environment != Environment::Development {
                return Err(ConfigError::MissingJwtSecret);
            }
            tracing::warn!("JWT_SECRET not set, using development secret");
            self.security.jwt_secret = DEVELOPMENT_JWT_SECRET.to_string();
        }

        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::InvalidBcryptCost(self.security.bcrypt_cost));
        }

        // chrono::FixedOffset accepts strictly less than one day
        if self.intake.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::InvalidUtcOffset(self.intake.utc_offset_minutes));
        }

        Ok(self)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                bcrypt_cost: 10,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            blob: BlobConfig::default(),
            bootstrap: BootstrapConfig::default(),
            intake: IntakeConfig { utc_offset_minutes: 0 },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                bcrypt_cost: 10,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            blob: BlobConfig::default(),
            bootstrap: BootstrapConfig::default(),
            intake: IntakeConfig { utc_offset_minutes: 0 },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: false,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                bcrypt_cost: 12,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            blob: BlobConfig::default(),
            bootstrap: BootstrapConfig::default(),
            intake: IntakeConfig { utc_offset_minutes: 0 },
        }
    }
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: "complaints".to_string(),
            api_base_url: "https://api.cloudinary.com/v1_1".to_string(),
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            superadmin_username: None,
            superadmin_password: None,
        }
    }
}

impl BootstrapConfig {
    /// Both halves of the superadmin credentials, if configured
    pub fn superadmin(&self) -> Option<(&str, &str)> {
        match (&self.superadmin_username, &self.superadmin_password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
impl AppConfig {
    /// Development profile with a fixed secret and the cheapest bcrypt cost
    pub fn for_tests() -> Self {
        let mut config = Self::development();
        config.security.jwt_secret = "test-secret".to_string();
        config.security.bcrypt_cost = 4;
        config.api.enable_request_logging = false;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.security.bcrypt_cost, 10);
        assert_eq!(config.api.port, 3000);
        assert!(config.api.enable_request_logging);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.api.enable_request_logging);
        assert_eq!(config.api.max_request_size_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn development_falls_back_to_local_secret() {
        let config = AppConfig::development().validate().unwrap();
        assert_eq!(config.security.jwt_secret, DEVELOPMENT_JWT_SECRET);
    }

    #[test]
    fn production_requires_jwt_secret() {
        let err = AppConfig::production().validate().unwrap_err();
        assert_eq!(err, ConfigError::MissingJwtSecret);

        let mut config = AppConfig::production();
        config.security.jwt_secret = "s3cret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_bcrypt_cost_and_offset() {
        let mut config = AppConfig::for_tests();
        config.security.bcrypt_cost = 2;
        assert_eq!(config.validate().unwrap_err(), ConfigError::InvalidBcryptCost(2));

        let mut config = AppConfig::for_tests();
        config.intake.utc_offset_minutes = 24 * 60;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUtcOffset(_))));
    }

    #[test]
    fn superadmin_requires_both_halves() {
        let mut bootstrap = BootstrapConfig::default();
        assert!(bootstrap.superadmin().is_none());
        bootstrap.superadmin_username = Some("root".to_string());
        assert!(bootstrap.superadmin().is_none());
        bootstrap.superadmin_password = Some("pw".to_string());
        assert_eq!(bootstrap.superadmin(), Some(("root", "pw")));
    }
}
