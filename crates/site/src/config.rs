//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `UCPL_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_PASSWORD` - Shared secret for the admin area
//! - `SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `UCPL_HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 5000)
//! - `UCPL_BASE_URL` - Public URL (default: <http://localhost:5000>)
//! - `SESSION_MAX_AGE_SECS` - Admin session lifetime (default: 7200)
//! - `MAIL_HOST`, `MAIL_USER`, `MAIL_TO` - Enable inquiry notifications when all set
//! - `MAIL_PORT` (default: 587), `MAIL_SECURE` (default: false), `MAIL_PASS`,
//!   `MAIL_FROM` (default: `MAIL_USER`), `MAIL_TIMEOUT_SECS` (default: 10)
//! - `GALLERY_DIR` - Gallery upload directory (default: public/assets/gallery)
//! - `STATIC_DIR` - Static assets directory (default: crates/site/static)
//! - `PROGRAMS_PATH` - Programs JSON file (default: crates/site/data/programs.json)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT` - Sentry error tracking

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Gallery directory used when `GALLERY_DIR` is unset or empty.
pub const DEFAULT_GALLERY_DIR: &str = "public/assets/gallery";

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
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

/// Site application configuration.
///
/// Built once at startup and shared read-only through `AppState`.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Shared admin password
    pub admin_password: SecretString,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Lifetime of an admin session, fixed from login
    pub session_max_age: Duration,
    /// Outbound notification mail, if fully configured
    pub mail: Option<MailConfig>,
    /// Gallery upload directory
    pub gallery_dir: PathBuf,
    /// Static asset directory
    pub static_dir: PathBuf,
    /// Programs listing JSON file
    pub programs_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// SMTP configuration for inquiry notifications.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct MailConfig {
    /// SMTP relay host
    pub host: String,
    /// SMTP port
    pub port: u16,
    /// Use implicit TLS (`true`) instead of STARTTLS
    pub secure: bool,
    /// SMTP username
    pub username: String,
    /// SMTP password
    pub password: SecretString,
    /// Sender address
    pub from_address: String,
    /// Staff recipient of notifications
    pub recipient: String,
    /// Upper bound on one notification attempt
    pub timeout: Duration,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .field("recipient", &self.recipient)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the session secret fails validation (length, placeholder, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("UCPL_DATABASE_URL")?;
        let host = parse_env("UCPL_HOST", "127.0.0.1")?;
        let port = parse_env("PORT", "5000")?;
        let base_url = get_env_or_default("UCPL_BASE_URL", "http://localhost:5000");

        let admin_password = get_required_env("ADMIN_PASSWORD")?;
        if admin_password.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "ADMIN_PASSWORD".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let session_secret = get_validated_secret("SESSION_SECRET")?;
        validate_session_secret(&session_secret, "SESSION_SECRET")?;
        let session_max_age = Duration::from_secs(parse_env("SESSION_MAX_AGE_SECS", "7200")?);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            admin_password: SecretString::from(admin_password),
            session_secret,
            session_max_age,
            mail: MailConfig::from_env()?,
            gallery_dir: gallery_dir_from_env(),
            static_dir: get_env_or_default("STATIC_DIR", "crates/site/static").into(),
            programs_path: get_env_or_default("PROGRAMS_PATH", "crates/site/data/programs.json")
                .into(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS (controls the `Secure` cookie flag).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl MailConfig {
    /// Load mail configuration.
    ///
    /// Returns `Ok(None)` unless host, user, and recipient are all present.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let (Some(host), Some(username), Some(recipient)) = (
            get_optional_env("MAIL_HOST"),
            get_optional_env("MAIL_USER"),
            get_optional_env("MAIL_TO"),
        ) else {
            return Ok(None);
        };

        let secure = parse_env::<bool>("MAIL_SECURE", "false")?;
        let port = parse_env("MAIL_PORT", if secure { "465" } else { "587" })?;
        let timeout = Duration::from_secs(parse_env("MAIL_TIMEOUT_SECS", "10")?);

        Ok(Some(Self {
            host,
            port,
            secure,
            from_address: get_optional_env("MAIL_FROM").unwrap_or_else(|| username.clone()),
            username,
            password: SecretString::from(get_env_or_default("MAIL_PASS", "")),
            recipient,
            timeout,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Read the database URL from `UCPL_DATABASE_URL`, falling back to
/// `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if neither variable is set.
pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
    get_database_url("UCPL_DATABASE_URL")
}

/// Read the gallery directory from `GALLERY_DIR`.
#[must_use]
pub fn gallery_dir_from_env() -> PathBuf {
    gallery_dir_or_default(get_optional_env("GALLERY_DIR"))
}

fn gallery_dir_or_default(value: Option<String>) -> PathBuf {
    value.map_or_else(|| PathBuf::from(DEFAULT_GALLERY_DIR), PathBuf::from)
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional, non-empty environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
