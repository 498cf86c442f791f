//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Identity (required for sign-in, sign-up and session commands)
//! - `STOREFRONT_IDENTITY_URL` - Base URL of the identity backend
//! - `STOREFRONT_IDENTITY_ANON_KEY` - Public (anon) API key; required once the URL is set
//!
//! ## Optional
//! - `STOREFRONT_EMAIL_REDIRECT_URL` - Where sign-up confirmation emails link to
//! - `STOREFRONT_LOCAL_STORAGE_PATH` - Local key-value file (default: .luxe/local-storage.json)
//! - `STOREFRONT_RECENT_SEARCHES_LIMIT` - Recent searches kept (default: 5)
//! - `STOREFRONT_PAGE_SIZE` - Products per search page (default: 12)
//! - `STOREFRONT_COUNTDOWN_TICK_MS` - Countdown recompute delay (default: 1000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_LOCAL_STORAGE_PATH: &str = ".luxe/local-storage.json";
const DEFAULT_RECENT_SEARCHES_LIMIT: usize = 5;
const DEFAULT_PAGE_SIZE: usize = 12;
const DEFAULT_COUNTDOWN_TICK_MS: u64 = 1000;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
    "add-your",
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
    /// Identity backend connection, if configured
    pub identity: Option<IdentityConfig>,
    /// File backing local key-value storage
    pub local_storage_path: PathBuf,
    /// Maximum number of recent searches kept
    pub recent_searches_limit: usize,
    /// Products per search results page
    pub page_size: usize,
    /// Delay between countdown recomputations
    pub countdown_tick: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Identity backend configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Base URL (e.g., `https://project.supabase.co`)
    pub url: Url,
    /// Public anon key sent with every request
    pub anon_key: SecretString,
    /// Link target for sign-up confirmation emails
    pub email_redirect_to: Option<String>,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .field("email_redirect_to", &self.email_redirect_to)
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
    /// if the API key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let identity = IdentityConfig::from_env()?;
        let local_storage_path = PathBuf::from(get_env_or_default(
            "STOREFRONT_LOCAL_STORAGE_PATH",
            DEFAULT_LOCAL_STORAGE_PATH,
        ));
        let recent_searches_limit = get_parsed_or_default(
            "STOREFRONT_RECENT_SEARCHES_LIMIT",
            DEFAULT_RECENT_SEARCHES_LIMIT,
        )?;
        let page_size = get_parsed_or_default("STOREFRONT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_PAGE_SIZE".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let tick_ms =
            get_parsed_or_default("STOREFRONT_COUNTDOWN_TICK_MS", DEFAULT_COUNTDOWN_TICK_MS)?;

        Ok(Self {
            identity,
            local_storage_path,
            recent_searches_limit,
            page_size,
            countdown_tick: Duration::from_millis(tick_ms),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// The identity backend configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no identity backend is configured.
    pub fn identity(&self) -> Result<&IdentityConfig, ConfigError> {
        self.identity
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("STOREFRONT_IDENTITY_URL".to_string()))
    }
}

impl IdentityConfig {
    /// Load identity settings. Absent when `STOREFRONT_IDENTITY_URL` is unset.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(raw_url) = get_optional_env("STOREFRONT_IDENTITY_URL") else {
            return Ok(None);
        };
        let url = parse_base_url(&raw_url, "STOREFRONT_IDENTITY_URL")?;

        Ok(Some(Self {
            url,
            anon_key: get_validated_secret("STOREFRONT_IDENTITY_ANON_KEY")?,
            email_redirect_to: get_optional_env("STOREFRONT_EMAIL_REDIRECT_URL"),
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

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an optional environment variable, falling back to `default` when unset.
fn get_parsed_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
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

/// Parse a base URL, requiring an http(s) scheme and a host.
fn parse_base_url(raw: &str, var_name: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must have a host".to_string(),
        ));
    }

    Ok(url)
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
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    let lower = value.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Copy the key from the identity project settings."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let secret = SecretString::from(get_required_env(key)?);
    validate_secret_strength(&secret, key)?;
    Ok(secret)
}
