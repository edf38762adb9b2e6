//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `LINDO_API_BASE_URL` - Backend REST API (default: <https://lindo-project.onrender.com>)
//! - `LINDO_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `LINDO_CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `LINDO_DATA_DIR` - Directory holding the local store file (default: .lindo)
//! - `LINDO_ADMIN_USERNAME` / `LINDO_ADMIN_PASSWORD` - Admin dashboard gate
//!   (disabled unless both are set)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Default backend the storefront talks to.
pub const DEFAULT_API_BASE_URL: &str = "https://lindo-project.onrender.com";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CATALOG_TTL_SECS: u64 = 300;
const MIN_ADMIN_PASSWORD_LENGTH: usize = 12;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "changeme",
    "replace",
    "placeholder",
    "password",
    "admin123",
    "xxx",
    "todo",
    "your-",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend REST API settings
    pub api: ApiConfig,
    /// Directory for the file-backed local store
    pub data_dir: PathBuf,
    /// Admin dashboard gate credentials, when configured
    pub admin: Option<AdminConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Backend REST API settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are joined onto it
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long catalog responses stay cached
    pub catalog_cache_ttl: Duration,
}

impl ApiConfig {
    /// Settings for a base URL with default timeout and cache lifetime.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_TTL_SECS),
        }
    }
}

/// Admin gate credentials.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct AdminConfig {
    /// Expected username
    pub username: String,
    /// Expected password
    pub password: SecretString,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if only
    /// half of the admin credentials are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("LINDO_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("LINDO_API_BASE_URL".to_string(), e.to_string())
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "LINDO_API_BASE_URL".to_string(),
                "must be an absolute http(s) URL".to_string(),
            ));
        }

        let timeout = parse_secs(&lookup, "LINDO_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let catalog_cache_ttl = parse_secs(
            &lookup,
            "LINDO_CATALOG_CACHE_TTL_SECS",
            DEFAULT_CATALOG_TTL_SECS,
        )?;

        let data_dir = PathBuf::from(lookup("LINDO_DATA_DIR").unwrap_or_else(|| ".lindo".into()));

        let admin = match (
            lookup("LINDO_ADMIN_USERNAME"),
            lookup("LINDO_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => {
                let password = SecretString::from(password);
                validate_admin_password(&password, "LINDO_ADMIN_PASSWORD")?;
                Some(AdminConfig { username, password })
            }
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::MissingEnvVar("LINDO_ADMIN_PASSWORD".to_string()));
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingEnvVar("LINDO_ADMIN_USERNAME".to_string()));
            }
        };

        Ok(Self {
            api: ApiConfig {
                base_url,
                timeout,
                catalog_cache_ttl,
            },
            data_dir,
            admin,
            sentry_dsn: lookup("SENTRY_DSN"),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Path of the file-backed local store.
    #[must_use]
    pub fn local_store_path(&self) -> PathBuf {
        self.data_dir.join("local_storage.json")
    }

    /// Path of the file-backed session store (admin flag).
    #[must_use]
    pub fn session_store_path(&self) -> PathBuf {
        self.data_dir.join("session_storage.json")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a whole number of seconds, falling back to a default when unset.
fn parse_secs<F>(lookup: &F, key: &str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(Duration::from_secs(default));
    };
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Reject placeholder and short admin passwords.
fn validate_admin_password(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_ADMIN_PASSWORD_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_ADMIN_PASSWORD_LENGTH,
                value.len()
            ),
        ));
    }

    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}
