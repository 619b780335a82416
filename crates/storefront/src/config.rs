//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MYSHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `MYSHOP_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `MYSHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `MYSHOP_PORT` - Listen port (default: 8000)
//! - `MYSHOP_DEBUG` - Debug mode, serves uploaded media directly (default: false)
//! - `CART_SESSION_ID` - Session key holding the cart (default: cart)
//! - `MEDIA_URL` - URL prefix for uploaded media (default: /media/)
//! - `MEDIA_ROOT` - Directory holding uploaded media (default: media)
//! - `STATIC_ROOT` - Directory holding static assets (default: crates/storefront/static)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Default session key for the cart.
pub const DEFAULT_CART_SESSION_ID: &str = "cart";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Debug mode: uploaded media is served by this process
    pub debug: bool,
    /// Session key the cart is stored under
    pub cart_session_key: String,
    /// URL prefix for uploaded media, e.g. `/media/`
    pub media_url: String,
    /// Directory uploaded media is served from in debug mode
    pub media_root: PathBuf,
    /// Directory static assets are served from
    pub static_root: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("MYSHOP_DATABASE_URL")?;
        let host = get_env_or_default("MYSHOP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("MYSHOP_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("MYSHOP_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("MYSHOP_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("MYSHOP_BASE_URL")?;
        let debug = parse_bool("MYSHOP_DEBUG", &get_env_or_default("MYSHOP_DEBUG", "false"))?;

        let cart_session_key = get_env_or_default("CART_SESSION_ID", DEFAULT_CART_SESSION_ID);
        if cart_session_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_SESSION_ID".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let media_url = normalize_url_prefix("MEDIA_URL", &get_env_or_default("MEDIA_URL", "/media/"))?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            debug,
            cart_session_key,
            media_url,
            media_root: PathBuf::from(get_env_or_default("MEDIA_ROOT", "media")),
            static_root: PathBuf::from(get_env_or_default(
                "STATIC_ROOT",
                "crates/storefront/static",
            )),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`).
fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got {other:?}"),
        )),
    }
}

/// Ensure a URL prefix is absolute and ends with a slash (`media` -> `/media/`).
fn normalize_url_prefix(key: &str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not be the site root".to_string(),
        ));
    }
    Ok(format!("/{trimmed}/"))
}
