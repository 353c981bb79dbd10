//! Delivery addresses.

use serde::{Deserialize, Serialize};

/// A geographic coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Sentinel used for manually typed addresses that were never geocoded.
    pub const UNGEOCODED: Self = Self {
        latitude: 0.0,
        longitude: 0.0,
    };
}

/// Structured door-level details captured on the address form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A delivery address.
///
/// `formatted_text` is the display string and also the dedup key within the
/// saved list. Addresses typed by hand carry the
/// [`Coordinates::UNGEOCODED`] sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub coordinates: Coordinates,
    pub formatted_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<StructuredDetails>,
}

impl Address {
    /// An address resolved from device coordinates.
    #[must_use]
    pub fn geocoded(coordinates: Coordinates, formatted_text: impl Into<String>) -> Self {
        Self {
            coordinates,
            formatted_text: formatted_text.into(),
            label: None,
            details: None,
        }
    }

    /// An address built from free-text input, never geocoded.
    #[must_use]
    pub fn manual_entry(formatted_text: impl Into<String>) -> Self {
        Self {
            coordinates: Coordinates::UNGEOCODED,
            formatted_text: formatted_text.into(),
            label: None,
            details: None,
        }
    }

    /// Attach door-level details.
    #[must_use]
    pub fn with_details(mut self, details: StructuredDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach a short label ("Home", "Work").
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether the address carries real coordinates.
    #[must_use]
    pub fn is_geocoded(&self) -> bool {
        self.coordinates != Coordinates::UNGEOCODED
    }
}
