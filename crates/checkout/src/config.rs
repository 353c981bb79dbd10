//! Checkout configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ORDER_API_BASE_URL` - Base URL of the remote order API
//! - `ORDER_API_TOKEN` - Bearer token for the order API
//! - `SERVICE_AREA_TOKEN` - Token matched against address text for
//!   delivery-area eligibility (e.g. a city name)
//!
//! ## Optional
//! - `ORDER_API_TIMEOUT_MS` - Order API request timeout (default: 10000)
//! - `GEOCODER_BASE_URL` - Reverse geocoder base URL (default: OSM Nominatim)
//! - `GEOCODER_TIMEOUT_MS` - Geocoder request timeout (default: 10000)
//! - `SERVICE_AREA_SECONDARY_TOKEN` - Adjacent-zone token used for delivery
//!   ETA tiering
//! - `LOCATION_TIMEOUT_MS` - Device location fix timeout (default: 15000)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Default reverse geocoder endpoint.
const DEFAULT_GEOCODER_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Checkout subsystem configuration.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Remote order API configuration
    pub order_api: OrderApiConfig,
    /// Reverse geocoder configuration
    pub geocoder: GeocoderConfig,
    /// Delivery-area eligibility configuration
    pub service_area: ServiceAreaConfig,
    /// Timeout handed to the device location provider
    pub location_timeout: Duration,
}

/// Remote order API configuration.
///
/// Implements `Debug` manually to redact the bearer token.
#[derive(Clone)]
pub struct OrderApiConfig {
    /// Base URL (e.g., <https://api.example.com/api/v1>)
    pub base_url: String,
    /// Bearer token presented on every request
    pub auth_token: SecretString,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for OrderApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderApiConfig")
            .field("base_url", &self.base_url)
            .field("auth_token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Reverse geocoder configuration.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Base URL of the reverse geocoding endpoint
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Delivery-area eligibility configuration.
#[derive(Debug, Clone)]
pub struct ServiceAreaConfig {
    /// Token matched case-insensitively against formatted address text
    pub token: String,
    /// Adjacent zone token, used only for ETA tiering
    pub secondary_token: Option<String>,
}

impl CheckoutConfig {
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

        Ok(Self {
            order_api: OrderApiConfig::from_env()?,
            geocoder: GeocoderConfig::from_env()?,
            service_area: ServiceAreaConfig::from_env()?,
            location_timeout: get_timeout_ms("LOCATION_TIMEOUT_MS", 15_000)?,
        })
    }
}

impl OrderApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: validate_base_url("ORDER_API_BASE_URL", get_required_env("ORDER_API_BASE_URL")?)?,
            auth_token: SecretString::from(get_required_env("ORDER_API_TOKEN")?),
            timeout: get_timeout_ms("ORDER_API_TIMEOUT_MS", 10_000)?,
        })
    }
}

impl GeocoderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: validate_base_url(
                "GEOCODER_BASE_URL",
                get_env_or_default("GEOCODER_BASE_URL", DEFAULT_GEOCODER_BASE_URL),
            )?,
            timeout: get_timeout_ms("GEOCODER_TIMEOUT_MS", 10_000)?,
        })
    }
}

impl ServiceAreaConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            token: get_required_env("SERVICE_AREA_TOKEN")?,
            secondary_token: get_optional_env("SERVICE_AREA_SECONDARY_TOKEN"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Reject base URLs that do not parse; a typo here would otherwise surface
/// only as a confusing network error at the first request.
fn validate_base_url(key: &str, raw: String) -> Result<String, ConfigError> {
    url::Url::parse(&raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(raw)
}

/// Parse a millisecond duration from the environment.
fn get_timeout_ms(key: &str, default_ms: u64) -> Result<Duration, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(Duration::from_millis(default_ms)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_default_applies() {
        let timeout = get_timeout_ms("SWIFTCART_TEST_UNSET_TIMEOUT", 1234).expect("default");
        assert_eq!(timeout, Duration::from_millis(1234));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = validate_base_url("ORDER_API_BASE_URL", "not a url".into())
            .expect_err("invalid");
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let ok = validate_base_url("ORDER_API_BASE_URL", "https://api.example.com/api/v1".into())
            .expect("valid");
        assert_eq!(ok, "https://api.example.com/api/v1");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = OrderApiConfig {
            base_url: "https://api.example.com".into(),
            auth_token: SecretString::from("super-secret-token-value"),
            timeout: Duration::from_secs(10),
        };
        let rendered = format!("{config:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("super-secret-token-value"));
    }
}
