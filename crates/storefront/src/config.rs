//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `RECORD_STORE_URL` - Record store base URL, or `memory:` for the in-memory store
//! - `RECORD_STORE_API_KEY` - Record store API key (required unless `memory:`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STORE_NAME` - Display name (default: Toyshop)
//! - `RECORD_STORE_SEED` - JSON seed file for the in-memory store
//! - `RECORD_STORE_CACHE_TTL_SECS` - Read cache TTL (default: 300)
//! - `RECORD_STORE_TIMEOUT_SECS` - Request timeout (default: 10)
//! - `PAYMENT_KEY_ID` - Payment provider key id; checkout is disabled without it
//! - `PAYMENT_KEY_SECRET` - Provider secret; enables order pre-creation and
//!   signature checks (outcomes are client-reported without it)
//! - `PAYMENT_API_URL` - Provider API base (default: https://api.razorpay.com)
//! - `PAYMENT_CURRENCY` - ISO currency code (default: INR)
//! - `PAYMENT_CHECKOUT_SCRIPT` - Provider checkout script URL
//! - `CONTENT_DIR` - Markdown content root (default: crates/storefront/content)
//! - `STATIC_DIR` - Static assets (default: crates/storefront/static)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_TRACES_SAMPLE_RATE` - Fraction of requests traced (default: 0.1)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use toyshop_core::CurrencyCode;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const MEMORY_STORE_URL: &str = "memory:";
const DEFAULT_CHECKOUT_SCRIPT: &str = "https://checkout.razorpay.com/v1/checkout.js";
const DEFAULT_PAYMENT_API_URL: &str = "https://api.razorpay.com";

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
    "enter-",
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Store display name used in titles and the header
    pub store_name: String,
    /// Currency for prices and payments
    pub currency: CurrencyCode,
    pub record_store: RecordStoreConfig,
    /// Card checkout; `None` leaves WhatsApp as the only way to order
    pub payment: Option<PaymentConfig>,
    pub content_dir: PathBuf,
    pub static_dir: PathBuf,
    pub sentry: SentryConfig,
}

/// Which record store backs the catalog.
#[derive(Debug, Clone)]
pub enum RecordStoreConfig {
    Http(HttpStoreConfig),
    Memory { seed: Option<PathBuf> },
}

/// Remote record store settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct HttpStoreConfig {
    pub base_url: Url,
    pub api_key: SecretString,
    pub cache_ttl: Duration,
    pub timeout: Duration,
}

impl std::fmt::Debug for HttpStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStoreConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("cache_ttl", &self.cache_ttl)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Payment provider settings.
///
/// Implements `Debug` manually to redact the key secret.
#[derive(Clone)]
pub struct PaymentConfig {
    /// Publishable key id handed to the browser checkout script
    pub key_id: String,
    /// Server-side secret for the orders API and signature checks
    pub key_secret: Option<SecretString>,
    pub api_base: Url,
    pub checkout_script: String,
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &self.key_secret.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base.as_str())
            .field("checkout_script", &self.checkout_script)
            .finish()
    }
}

/// Sentry error tracking settings.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = parse_env(env, "STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env(env, "STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env(env, "STOREFRONT_BASE_URL")?;
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let currency_code = get_env_or_default(env, "PAYMENT_CURRENCY", "INR");
        let currency = CurrencyCode::parse(&currency_code).ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "PAYMENT_CURRENCY".to_string(),
                format!("unsupported currency '{currency_code}'"),
            )
        })?;

        Ok(Self {
            host,
            port,
            base_url: base_url.trim_end_matches('/').to_string(),
            store_name: get_env_or_default(env, "STORE_NAME", "Toyshop"),
            currency,
            record_store: RecordStoreConfig::from_lookup(env)?,
            payment: PaymentConfig::from_lookup(env)?,
            content_dir: get_env_or_default(env, "CONTENT_DIR", "crates/storefront/content").into(),
            static_dir: get_env_or_default(env, "STATIC_DIR", "crates/storefront/static").into(),
            sentry: SentryConfig::from_lookup(env)?,
        })
    }

    /// Local configuration backed by an empty in-memory store.
    #[must_use]
    pub fn development(base_url: &str) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: base_url.trim_end_matches('/').to_string(),
            store_name: "Toyshop".to_string(),
            currency: CurrencyCode::INR,
            record_store: RecordStoreConfig::Memory { seed: None },
            payment: None,
            content_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/content")),
            static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
            sentry: SentryConfig::default(),
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl RecordStoreConfig {
    /// Load only the record store settings (used by the CLI).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a missing or invalid URL or API key.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    fn from_lookup(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = get_required_env(env, "RECORD_STORE_URL")?;
        if url.trim() == MEMORY_STORE_URL {
            return Ok(Self::Memory {
                seed: get_optional_env(env, "RECORD_STORE_SEED").map(PathBuf::from),
            });
        }

        let base_url = Url::parse(&url).map_err(|e| {
            ConfigError::InvalidEnvVar("RECORD_STORE_URL".to_string(), e.to_string())
        })?;
        let cache_ttl: u64 = parse_env(env, "RECORD_STORE_CACHE_TTL_SECS", "300")?;
        let timeout: u64 = parse_env(env, "RECORD_STORE_TIMEOUT_SECS", "10")?;

        Ok(Self::Http(HttpStoreConfig {
            base_url,
            api_key: get_validated_secret(env, "RECORD_STORE_API_KEY")?,
            cache_ttl: Duration::from_secs(cache_ttl),
            timeout: Duration::from_secs(timeout),
        }))
    }
}

impl PaymentConfig {
    fn from_lookup(env: &dyn Fn(&str) -> Option<String>) -> Result<Option<Self>, ConfigError> {
        let Some(key_id) = get_optional_env(env, "PAYMENT_KEY_ID") else {
            return Ok(None);
        };

        let key_secret = match get_optional_env(env, "PAYMENT_KEY_SECRET") {
            Some(_) => Some(get_validated_secret(env, "PAYMENT_KEY_SECRET")?),
            None => None,
        };
        let api_url = get_env_or_default(env, "PAYMENT_API_URL", DEFAULT_PAYMENT_API_URL);
        let api_base = Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("PAYMENT_API_URL".to_string(), e.to_string()))?;

        Ok(Some(Self {
            key_id,
            key_secret,
            api_base,
            checkout_script: get_env_or_default(env, "PAYMENT_CHECKOUT_SCRIPT", DEFAULT_CHECKOUT_SCRIPT),
        }))
    }
}

impl SentryConfig {
    fn from_lookup(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: get_optional_env(env, "SENTRY_DSN"),
            environment: get_optional_env(env, "SENTRY_ENVIRONMENT"),
            traces_sample_rate: parse_env(env, "SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    get_optional_env(env, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key).filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(env: &dyn Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_optional_env(env, key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(env: &dyn Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(env, key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
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
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated key."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret.
fn get_validated_secret(
    env: &dyn Fn(&str) -> Option<String>,
    key: &str,
) -> Result<SecretString, ConfigError> {
    let value = get_required_env(env, key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
