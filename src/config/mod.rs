use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub approval: ApprovalConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    /// Externally reachable base URL used when building action links.
    /// When unset, links fall back to the inbound request's host.
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Optional outside production; without it the server runs on the
    /// in-memory store (development convenience only).
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalConfig {
    /// Keyed-hash secret for approve/reject action links. Required in
    /// every environment; there is deliberately no built-in fallback.
    pub signing_secret: String,
    pub approver_email: String,
    pub link_lifetime_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub from_address: String,
    /// When false, outbound mail is logged instead of sent (local dev).
    pub enabled: bool,
}

/// Errors raised while assembling configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?;

        // Secrets carry no defaults in any environment. The original
        // deployment fell back through weaker secret sources when unset;
        // here startup fails instead.
        config.approval.signing_secret = require_var("EVENTIFY_APPROVAL_SECRET")?;
        config.security.jwt_secret = require_var("EVENTIFY_JWT_SECRET")?;
        config.approval.approver_email = require_var("EVENTIFY_APPROVER_EMAIL")?;

        if config.environment == Environment::Production && config.database.url.is_none() {
            return Err(ConfigError::MissingVar("DATABASE_URL"));
        }

        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Ok(v) = env::var("EVENTIFY_API_PORT").or_else(|_| env::var("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("EVENTIFY_PUBLIC_URL") {
            url::Url::parse(&v).map_err(|e| ConfigError::InvalidVar {
                var: "EVENTIFY_PUBLIC_URL",
                reason: e.to_string(),
            })?;
            self.server.public_url = Some(v.trim_end_matches('/').to_string());
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }

        // Security overrides
        if let Ok(v) = env::var("EVENTIFY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        // Approval link overrides
        if let Ok(v) = env::var("EVENTIFY_LINK_LIFETIME_HOURS") {
            self.approval.link_lifetime_hours =
                v.parse().map_err(|_| ConfigError::InvalidVar {
                    var: "EVENTIFY_LINK_LIFETIME_HOURS",
                    reason: format!("expected hours as an integer, got {:?}", v),
                })?;
        }

        // Email overrides
        if let Ok(v) = env::var("EVENTIFY_EMAIL_FROM") {
            self.email.from_address = v;
        }
        if let Ok(v) = env::var("EVENTIFY_EMAIL_ENABLED") {
            self.email.enabled = v.parse().unwrap_or(self.email.enabled);
        }

        Ok(self)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                public_url: None,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            approval: ApprovalConfig {
                signing_secret: String::new(),
                approver_email: String::new(),
                link_lifetime_hours: 24,
            },
            email: EmailConfig {
                from_address: "noreply@eventify.local".to_string(),
                enabled: false,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 3000,
                public_url: None,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
            approval: ApprovalConfig {
                signing_secret: String::new(),
                approver_email: String::new(),
                link_lifetime_hours: 24,
            },
            email: EmailConfig {
                from_address: "noreply@eventify.edu".to_string(),
                enabled: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 3000,
                public_url: None,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
            },
            approval: ApprovalConfig {
                signing_secret: String::new(),
                approver_email: String::new(),
                link_lifetime_hours: 24,
            },
            email: EmailConfig {
                from_address: "noreply@eventify.edu".to_string(),
                enabled: true,
            },
        }
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.approval.link_lifetime_hours, 24);
        assert!(!config.email.enabled);
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.security.jwt_expiry_hours, 4);
        assert!(config.email.enabled);
    }

    #[test]
    fn test_secrets_have_no_baked_in_default() {
        // The per-environment defaults never carry a usable secret; only
        // the environment can supply one.
        for config in [
            AppConfig::development(),
            AppConfig::staging(),
            AppConfig::production(),
        ] {
            assert!(config.approval.signing_secret.is_empty());
            assert!(config.security.jwt_secret.is_empty());
        }
    }
}
