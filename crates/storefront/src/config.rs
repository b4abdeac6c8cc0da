//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `MARKETSTALL_API_URL` - API base URL (default: `http://localhost:8080/api`)
//! - `MARKETSTALL_API_TIMEOUT_SECS` - request timeout (default: 10)
//! - `MARKETSTALL_UPLOAD_TIMEOUT_SECS` - multipart upload timeout (default: 60)
//! - `MARKETSTALL_STATE_DIR` - directory for durable client state (default: `.marketstall`)
//! - `MARKETSTALL_SESSION_TTL_DAYS` - session lifetime (default: 7)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 60;
const DEFAULT_STATE_DIR: &str = ".marketstall";
const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash
    pub api_url: Url,
    /// Timeout for ordinary requests
    pub timeout: Duration,
    /// Timeout for multipart uploads
    pub upload_timeout: Duration,
    /// Where durable state (cart, session) is written
    pub state_dir: PathBuf,
    /// How long a stored session stays valid
    pub session_ttl: chrono::Duration,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Sentry configuration.
#[derive(Clone, Default)]
pub struct SentryConfig {
    /// DSN (contains the project key)
    pub dsn: Option<String>,
    /// Environment tag (e.g. "production")
    pub environment: Option<String>,
}

impl std::fmt::Debug for SentryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentryConfig")
            .field("dsn", &self.dsn.as_ref().map(|_| "[REDACTED]"))
            .field("environment", &self.environment)
            .finish()
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url.as_str())
            .field("timeout", &self.timeout)
            .field("upload_timeout", &self.upload_timeout)
            .field("state_dir", &self.state_dir)
            .field("session_ttl_days", &self.session_ttl.num_days())
            .field("sentry", &self.sentry)
            .finish()
    }
}

impl ClientConfig {
    /// Configuration pointing at `api_url` with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url("MARKETSTALL_API_URL", api_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            session_ttl: chrono::Duration::days(DEFAULT_SESSION_TTL_DAYS),
            sentry: SentryConfig::default(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(
            "MARKETSTALL_API_URL",
            &get_env_or_default("MARKETSTALL_API_URL", DEFAULT_API_URL),
        )?;
        let timeout = Duration::from_secs(get_parsed_env(
            "MARKETSTALL_API_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?);
        let upload_timeout = Duration::from_secs(get_parsed_env(
            "MARKETSTALL_UPLOAD_TIMEOUT_SECS",
            DEFAULT_UPLOAD_TIMEOUT_SECS,
        )?);
        let state_dir = PathBuf::from(get_env_or_default("MARKETSTALL_STATE_DIR", DEFAULT_STATE_DIR));
        let ttl_days: i64 = get_parsed_env("MARKETSTALL_SESSION_TTL_DAYS", DEFAULT_SESSION_TTL_DAYS)?;
        if ttl_days <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "MARKETSTALL_SESSION_TTL_DAYS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let sentry = SentryConfig {
            dsn: get_optional_env("SENTRY_DSN"),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
        };

        Ok(Self {
            api_url,
            timeout,
            upload_timeout,
            state_dir,
            session_ttl: chrono::Duration::days(ttl_days),
            sentry,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn get_parsed_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse and normalize the API base URL. Only http(s) is accepted.
fn parse_api_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim().trim_end_matches('/'))
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = ClientConfig::new("http://localhost:8080/api/").unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:8080/api");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.upload_timeout, Duration::from_secs(60));
        assert_eq!(config.session_ttl.num_days(), 7);
    }

    #[test]
    fn test_parse_api_url_rejects_other_schemes() {
        let err = parse_api_url("MARKETSTALL_API_URL", "ftp://example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
        assert!(parse_api_url("MARKETSTALL_API_URL", "not a url").is_err());
    }

    #[test]
    fn test_debug_redacts_dsn() {
        let mut config = ClientConfig::new("https://api.example.com").unwrap();
        config.sentry.dsn = Some("https://key@o0.ingest.sentry.io/1".to_string());
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("key@"));
    }
}
