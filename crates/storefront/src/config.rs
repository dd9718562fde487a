//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (canonical/OpenGraph URLs)
//! - `MEDUSA_BACKEND_URL` - Medusa backend URL (e.g., <http://localhost:9000>)
//! - `MEDUSA_PUBLISHABLE_KEY` - Store API publishable key (`pk_...`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 8000)
//! - `STOREFRONT_ENV` - `production` or `development` (default: production)
//! - `STORE_NAME` - Store name used in page titles (default: Medusa Store)
//! - `DEFAULT_REGION` - Country code used when none is given (default: us)
//! - `MEDUSA_REQUEST_TIMEOUT_SECS` - Store API request timeout (default: 10)
//! - `FLUIDPAY_PUBLIC_KEY` - FluidPay tokenizer public key
//! - `FLUIDPAY_TOKENIZER_URL` - Tokenizer script URL (default: FluidPay sandbox)
//! - `STRIPE_PUBLISHABLE_KEY` - Stripe publishable key for the card element
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;
use url::Url;

/// Default FluidPay tokenizer script (sandbox).
pub const DEFAULT_TOKENIZER_URL: &str = "https://sandbox.fluidpay.com/tokenizer/tokenizer.js";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
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
    #[error("Placeholder value in {0}: {1}")]
    Placeholder(String, String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    /// Whether development-only UI (e.g., the manual payment test badge) is shown.
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("expected 'development' or 'production', got '{other}'")),
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Deployment environment
    pub environment: Environment,
    /// Store name shown in page titles
    pub store_name: String,
    /// Country code used for links when none is in the path
    pub default_region: String,
    /// Medusa Store API configuration
    pub medusa: MedusaConfig,
    /// Payment provider UI configuration
    pub payments: PaymentsConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Medusa Store API configuration.
#[derive(Debug, Clone)]
pub struct MedusaConfig {
    /// Backend base URL
    pub backend_url: Url,
    /// Publishable API key sent as `x-publishable-api-key`
    pub publishable_key: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Payment provider UI configuration.
///
/// Every key here is a public, browser-visible key.
#[derive(Debug, Clone)]
pub struct PaymentsConfig {
    /// FluidPay tokenizer public key; `None` leaves the tokenizer unconfigured
    pub fluidpay_public_key: Option<String>,
    /// URL of the remote tokenizer script injected into every page
    pub tokenizer_script_url: Url,
    /// Stripe publishable key; `None` renders the card skeleton
    pub stripe_publishable_key: Option<String>,
}

impl PaymentsConfig {
    /// Origin of the tokenizer script, for the content security policy.
    #[must_use]
    pub fn tokenizer_origin(&self) -> String {
        self.tokenizer_script_url.origin().ascii_serialization()
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
    /// hold placeholder values.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(&EnvSource::new(|key| std::env::var(key).ok()))
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_source(env: &EnvSource<'_>) -> Result<Self, ConfigError> {
        let host = env.parse_or("STOREFRONT_HOST", "127.0.0.1")?;
        let port = env.parse_or("STOREFRONT_PORT", "8000")?;
        let base_url = env.required_url("STOREFRONT_BASE_URL")?;
        let environment = env.parse_or("STOREFRONT_ENV", "production")?;
        let store_name = env.or_default("STORE_NAME", "Medusa Store");
        let default_region = env.or_default("DEFAULT_REGION", "us").to_ascii_lowercase();

        let medusa = MedusaConfig::from_source(env)?;
        let payments = PaymentsConfig::from_source(env)?;

        Ok(Self {
            host,
            port,
            base_url,
            environment,
            store_name,
            default_region,
            medusa,
            payments,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Absolute URL for a storefront path, for canonical and OpenGraph tags.
    ///
    /// `path` is resolved below the base URL's own path, so a storefront
    /// mounted at `https://host/store/` keeps its `/store` prefix.
    #[must_use]
    pub fn absolute_url(&self, path: &str) -> String {
        let relative = path.trim_start_matches('/');
        self.base_url
            .join(relative)
            .map_or_else(|_| format!("{}{relative}", self.base_url), String::from)
    }
}

impl MedusaConfig {
    fn from_source(env: &EnvSource<'_>) -> Result<Self, ConfigError> {
        let publishable_key = env.required("MEDUSA_PUBLISHABLE_KEY")?;
        validate_public_key(&publishable_key, "MEDUSA_PUBLISHABLE_KEY")?;

        Ok(Self {
            backend_url: env.required_url("MEDUSA_BACKEND_URL")?,
            publishable_key,
            timeout_secs: env.parse_or("MEDUSA_REQUEST_TIMEOUT_SECS", "10")?,
        })
    }
}

impl PaymentsConfig {
    fn from_source(env: &EnvSource<'_>) -> Result<Self, ConfigError> {
        let tokenizer_script_url = Url::parse(&env.or_default(
            "FLUIDPAY_TOKENIZER_URL",
            DEFAULT_TOKENIZER_URL,
        ))
        .map_err(|e| ConfigError::InvalidEnvVar("FLUIDPAY_TOKENIZER_URL".to_string(), e.to_string()))?;

        Ok(Self {
            fluidpay_public_key: optional_public_key(env, "FLUIDPAY_PUBLIC_KEY"),
            tokenizer_script_url,
            stripe_publishable_key: optional_public_key(env, "STRIPE_PUBLISHABLE_KEY"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Key/value lookup used to read configuration.
///
/// Production reads the process environment; tests pass a map.
pub struct EnvSource<'a> {
    lookup: Box<dyn Fn(&str) -> Option<String> + 'a>,
}

impl<'a> EnvSource<'a> {
    /// Wrap a lookup function.
    pub fn new(lookup: impl Fn(&str) -> Option<String> + 'a) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Get an optional variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a required absolute base URL, normalized to end in `/` so
    /// relative joins append to its path instead of replacing the last segment.
    fn required_url(&self, key: &str) -> Result<Url, ConfigError> {
        let value = self.required(key)?;
        let mut url = Url::parse(&value)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
        ensure_trailing_slash(&mut url);
        Ok(url)
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

/// Append `/` to a base URL's path if missing.
pub(crate) fn ensure_trailing_slash(url: &mut Url) {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
}

/// Reject keys that were copied from a template without being filled in.
fn validate_public_key(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = value.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::Placeholder(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Load an optional public key, treating placeholders as unset.
fn optional_public_key(env: &EnvSource<'_>, key: &str) -> Option<String> {
    let value = env.optional(key)?;
    match validate_public_key(&value, key) {
        Ok(()) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring placeholder payment key");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn source(vars: &[(&str, &str)]) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = [
            ("STOREFRONT_BASE_URL", "https://shop.example.test"),
            ("MEDUSA_BACKEND_URL", "http://localhost:9000"),
            ("MEDUSA_PUBLISHABLE_KEY", "pk_01J7Q8ZK3M4N5P6R7S8T9V0W1X"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in vars {
            map.insert((*k).to_string(), (*v).to_string());
        }
        map
    }

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map = source(vars);
        StorefrontConfig::from_source(&EnvSource::new(|key| map.get(key).cloned()))
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8000");
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.store_name, "Medusa Store");
        assert_eq!(config.default_region, "us");
        assert_eq!(config.medusa.timeout_secs, 10);
        assert_eq!(
            config.payments.tokenizer_script_url.as_str(),
            DEFAULT_TOKENIZER_URL
        );
        assert!(config.payments.fluidpay_public_key.is_none());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_required_variable() {
        let map: HashMap<String, String> = HashMap::new();
        let err = StorefrontConfig::from_source(&EnvSource::new(|key| map.get(key).cloned()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "STOREFRONT_BASE_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("STOREFRONT_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_invalid_environment() {
        let err = load(&[("STOREFRONT_ENV", "staging")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_ENV"));
    }

    #[test]
    fn test_development_environment() {
        let config = load(&[("STOREFRONT_ENV", "Development")]).unwrap();
        assert!(config.environment.is_development());
    }

    #[test]
    fn test_placeholder_publishable_key_rejected() {
        let err = load(&[("MEDUSA_PUBLISHABLE_KEY", "your-publishable-key")]).unwrap_err();
        assert!(matches!(err, ConfigError::Placeholder(_, _)));
    }

    #[test]
    fn test_placeholder_fluidpay_key_treated_as_unset() {
        let config = load(&[("FLUIDPAY_PUBLIC_KEY", "pub_XXXXXXXX")]).unwrap();
        assert!(config.payments.fluidpay_public_key.is_none());

        let config = load(&[("FLUIDPAY_PUBLIC_KEY", "pub_2HT7dVd9W1XyZ")]).unwrap();
        assert_eq!(
            config.payments.fluidpay_public_key.as_deref(),
            Some("pub_2HT7dVd9W1XyZ")
        );
    }

    #[test]
    fn test_blank_optional_is_unset() {
        let config = load(&[("STRIPE_PUBLISHABLE_KEY", "  ")]).unwrap();
        assert!(config.payments.stripe_publishable_key.is_none());
    }

    #[test]
    fn test_tokenizer_origin() {
        let config = load(&[(
            "FLUIDPAY_TOKENIZER_URL",
            "https://app.fluidpay.com/tokenizer/tokenizer.js",
        )])
        .unwrap();
        assert_eq!(config.payments.tokenizer_origin(), "https://app.fluidpay.com");
    }

    #[test]
    fn test_absolute_url() {
        let config = load(&[]).unwrap();
        assert_eq!(
            config.absolute_url("/us/products/shirt"),
            "https://shop.example.test/us/products/shirt"
        );
    }

    #[test]
    fn test_base_urls_keep_their_path_prefix() {
        let config = load(&[
            ("STOREFRONT_BASE_URL", "https://shop.example.test/store"),
            ("MEDUSA_BACKEND_URL", "http://localhost:9000/medusa"),
        ])
        .unwrap();

        assert_eq!(
            config.absolute_url("/us/checkout/payment"),
            "https://shop.example.test/store/us/checkout/payment"
        );
        assert_eq!(config.medusa.backend_url.as_str(), "http://localhost:9000/medusa/");
        assert_eq!(
            config.medusa.backend_url.join("store/regions").unwrap().as_str(),
            "http://localhost:9000/medusa/store/regions"
        );
    }

    #[test]
    fn test_trailing_slash_is_not_doubled() {
        let config = load(&[("MEDUSA_BACKEND_URL", "http://localhost:9000/medusa/")]).unwrap();
        assert_eq!(config.medusa.backend_url.as_str(), "http://localhost:9000/medusa/");
    }
}
