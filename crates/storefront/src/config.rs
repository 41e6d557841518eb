//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy;
//!   `SECRET_KEY` is accepted as a fallback name)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL used in emails (default: `http://localhost:3000`)
//! - `UPLOAD_FOLDER` - Where product images are written (default: `static/images/products`)
//! - `MAX_CONTENT_LENGTH` - Request body limit in bytes (default: 16 MiB)
//! - `ALLOWED_EXTENSIONS` - Comma-separated image extensions (default: `png,jpg,jpeg,gif,webp`)
//! - `SMTP_HOST`, `SMTP_PORT` (587), `SMTP_USER`, `SMTP_PASSWORD`,
//!   `SMTP_USE_TLS` (true = STARTTLS, false = implicit TLS), `SMTP_FROM` (defaults to `SMTP_USER`).
//!   Order emails are disabled when `SMTP_HOST` or `SMTP_USER` is empty.
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;
const DEFAULT_ALLOWED_EXTENSIONS: &str = "png,jpg,jpeg,gif,webp";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "change-this",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, used for links in order emails
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Product image uploads
    pub uploads: UploadConfig,
    /// Outbound mail relay; `None` disables order emails
    pub email: Option<EmailConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Product image upload settings.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory uploaded images are written to
    pub folder: PathBuf,
    /// Maximum request body size in bytes
    pub max_content_length: usize,
    /// Lower-case extensions accepted for upload
    pub allowed_extensions: Vec<String>,
}

impl UploadConfig {
    /// Whether `filename` has an allowed extension (case-insensitive).
    #[must_use]
    pub fn is_allowed(&self, filename: &str) -> bool {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.allowed_extensions.iter().any(|allowed| *allowed == ext)
            })
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("static/images/products"),
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            allowed_extensions: parse_extensions(DEFAULT_ALLOWED_EXTENSIONS),
        }
    }
}

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpEncryption {
    /// Plain connection upgraded with STARTTLS (usually port 587)
    StartTls,
    /// TLS from the first byte (usually port 465)
    Implicit,
}

/// SMTP relay configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP authentication username
    pub smtp_username: String,
    /// SMTP authentication password
    pub smtp_password: SecretString,
    /// Connection security
    pub encryption: SmtpEncryption,
    /// Email sender address (From header)
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("encryption", &self.encryption)
            .field("from_address", &self.from_address)
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
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the session secret fails validation (placeholder, entropy, length).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let session_secret = get_session_secret()?;
        let uploads = UploadConfig::from_env()?;
        let email = EmailConfig::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            uploads,
            email,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Base URL with a trailing slash, as linked from emails.
    #[must_use]
    pub fn site_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }
}

impl UploadConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let folder = get_optional_env("UPLOAD_FOLDER").map_or(defaults.folder, PathBuf::from);
        let max_content_length = match get_optional_env("MAX_CONTENT_LENGTH") {
            Some(raw) => raw.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnvVar("MAX_CONTENT_LENGTH".to_string(), e.to_string())
            })?,
            None => defaults.max_content_length,
        };
        let allowed_extensions = get_optional_env("ALLOWED_EXTENSIONS")
            .map_or(defaults.allowed_extensions, |raw| parse_extensions(&raw));

        Ok(Self {
            folder,
            max_content_length,
            allowed_extensions,
        })
    }
}

impl EmailConfig {
    /// Returns `Ok(None)` when the relay is not configured.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let smtp_host = get_env_or_default("SMTP_HOST", "");
        let smtp_username = get_env_or_default("SMTP_USER", "");
        if smtp_host.trim().is_empty() || smtp_username.trim().is_empty() {
            return Ok(None);
        }

        let smtp_port = parse_env("SMTP_PORT", "587")?;
        let use_tls = get_env_or_default("SMTP_USE_TLS", "true").eq_ignore_ascii_case("true");
        let from_address = get_optional_env("SMTP_FROM")
            .filter(|from| !from.trim().is_empty())
            .unwrap_or_else(|| smtp_username.clone());

        Ok(Some(Self {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password: SecretString::from(get_env_or_default("SMTP_PASSWORD", "")),
            encryption: if use_tls {
                SmtpEncryption::StartTls
            } else {
                SmtpEncryption::Implicit
            },
            from_address,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
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

/// Load the session secret under its primary or legacy name and validate it.
fn get_session_secret() -> Result<SecretString, ConfigError> {
    let (key, value) = match std::env::var("STOREFRONT_SESSION_SECRET") {
        Ok(value) => ("STOREFRONT_SESSION_SECRET", value),
        Err(_) => match std::env::var("SECRET_KEY") {
            Ok(value) => ("SECRET_KEY", value),
            Err(_) => {
                return Err(ConfigError::MissingEnvVar(
                    "STOREFRONT_SESSION_SECRET".to_string(),
                ));
            }
        },
    };
    validate_secret_strength(&value, key)?;
    let secret = SecretString::from(value);
    validate_session_secret(&secret, key)?;
    Ok(secret)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
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
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_bounds() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("zzzzzz") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_legacy_default_secret_is_rejected() {
        let result = validate_secret_strength(
            "your-super-secret-key-change-this-in-production",
            "SECRET_KEY",
        );
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_random_secret_is_accepted() {
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_short_session_secret_is_rejected() {
        let secret = SecretString::from("aB3$xY9!");
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_err());
    }

    #[test]
    fn test_parse_extensions_normalizes() {
        assert_eq!(
            parse_extensions(" PNG, .jpg,,webp "),
            vec!["png".to_string(), "jpg".to_string(), "webp".to_string()]
        );
    }

    #[test]
    fn test_upload_extension_check() {
        let uploads = UploadConfig::default();
        assert!(uploads.is_allowed("kurta-front.JPG"));
        assert!(uploads.is_allowed("tee.webp"));
        assert!(!uploads.is_allowed("notes.txt"));
        assert!(!uploads.is_allowed("no_extension"));
    }

    #[test]
    fn test_email_config_debug_redacts_password() {
        let config = EmailConfig {
            smtp_host: "smtp.mailhost.in".to_string(),
            smtp_port: 587,
            smtp_username: "orders@fashionstore.com".to_string(),
            smtp_password: SecretString::from("hunter2-smtp-password"),
            encryption: SmtpEncryption::StartTls,
            from_address: "orders@fashionstore.com".to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("smtp.mailhost.in"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2-smtp-password"));
    }

    #[test]
    fn test_site_url_has_single_trailing_slash() {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/fashion_store"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "https://shop.example.in/".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            uploads: UploadConfig::default(),
            email: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        };

        assert_eq!(config.site_url(), "https://shop.example.in/");
        assert_eq!(config.socket_addr().port(), 3000);
    }
}
