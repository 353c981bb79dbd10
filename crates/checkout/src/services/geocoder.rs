//! Reverse geocoding contract and the OSM Nominatim implementation.

use async_trait::async_trait;
use mockall::automock;
use serde::Deserialize;
use thiserror::Error;

use crate::config::GeocoderConfig;
use crate::models::Coordinates;

/// Failures from the reverse geocoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The provider could not be reached or returned an unusable response.
    #[error("geocoder unavailable: {0}")]
    Unavailable(String),
}

/// Turns coordinates into a formatted address string.
#[automock]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Reverse-geocode a coordinate pair into display text.
    async fn reverse(&self, coordinates: Coordinates) -> Result<String, GeocodeError>;
}

/// Reverse geocoder backed by the OSM Nominatim HTTP API.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

/// Response shape of Nominatim's `/reverse` endpoint (the one field we use).
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

impl NominatimGeocoder {
    /// Create a new geocoder client.
    ///
    /// # Errors
    ///
    /// Returns `GeocodeError::Unavailable` if the HTTP client fails to build.
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            // Nominatim's usage policy requires an identifying user agent.
            .user_agent(concat!("swiftcart-checkout/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeocodeError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[tracing::instrument(skip(self))]
    async fn reverse(&self, coordinates: Coordinates) -> Result<String, GeocodeError> {
        let url = format!(
            "{}/reverse?format=json&lat={}&lon={}",
            self.base_url, coordinates.latitude, coordinates.longitude
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GeocodeError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Unavailable(format!(
                "reverse lookup returned {status}"
            )));
        }

        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::Unavailable(e.to_string()))?;

        body.display_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| GeocodeError::Unavailable("no display name in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_response_parses_display_name() {
        let body = r#"{"display_name":"Bhiwandi, Thane, Maharashtra, India","place_id":42}"#;
        let parsed: ReverseResponse = serde_json::from_str(body).expect("parse");
        assert_eq!(
            parsed.display_name.as_deref(),
            Some("Bhiwandi, Thane, Maharashtra, India")
        );
    }

    #[test]
    fn test_reverse_response_tolerates_missing_name() {
        let parsed: ReverseResponse = serde_json::from_str("{}").expect("parse");
        assert_eq!(parsed.display_name, None);
    }
}
