//! Server configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. Secrets have NO defaults: a missing `JWT_SECRET` or remote
//! datastore token is a startup error, never a compiled-in value.

use std::env;

/// Which datastore backend to run against.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// Embedded SQLite at the given path.
    Local { database_path: String },
    /// Managed HTTP store. Both values come from the environment.
    Remote { url: String, auth_token: String },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub port: u16,

    /// Datastore backend selection
    pub backend: BackendConfig,

    /// JWT signing secret (required)
    pub jwt_secret: String,

    /// JWT token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Credentials for the admin account seeded on first run
    pub seed_admin_username: String,
    pub seed_admin_password: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Backend selection: `REMOTE_DB_URL` set → remote (requires
    /// `REMOTE_DB_TOKEN`); otherwise local SQLite at `DATABASE_PATH`.
    pub fn load() -> Result<Self, ConfigError> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?;

        let backend = match env::var("REMOTE_DB_URL") {
            Ok(url) => {
                let auth_token = env::var("REMOTE_DB_TOKEN")
                    .map_err(|_| ConfigError::MissingRequired("REMOTE_DB_TOKEN".to_string()))?;
                BackendConfig::Remote { url, auth_token }
            }
            Err(_) => BackendConfig::Local {
                database_path: env::var("DATABASE_PATH")
                    .unwrap_or_else(|_| "pos.db".to_string()),
            },
        };

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| ConfigError::MissingRequired("JWT_SECRET".to_string()))?;
        if jwt_secret.len() < 16 {
            return Err(ConfigError::InvalidValue(
                "JWT_SECRET (must be at least 16 bytes)".to_string(),
            ));
        }

        let jwt_lifetime_secs = env::var("JWT_LIFETIME_SECS")
            .unwrap_or_else(|_| "86400".to_string()) // 24 hours
            .parse()
            .map_err(|_| ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()))?;

        Ok(ServerConfig {
            port,
            backend,
            jwt_secret,
            jwt_lifetime_secs,
            seed_admin_username: env::var("SEED_ADMIN_USERNAME")
                .unwrap_or_else(|_| "admin".to_string()),
            seed_admin_password: env::var("SEED_ADMIN_PASSWORD").ok(),
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
