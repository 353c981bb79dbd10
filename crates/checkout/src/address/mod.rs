//! The address book: saved delivery addresses plus the confirmed target.
//!
//! One store owns both the saved list and the single confirmed address, and
//! both persist together as one snapshot. (The legacy app kept two separately
//! persisted blobs that could drift apart; they are unified here on purpose.)
//!
//! An address only ever becomes confirmed after passing the eligibility
//! policy, including previously saved addresses, since service-area
//! boundaries are not guaranteed stable between sessions.

pub mod eligibility;

pub use eligibility::{Eligibility, ServiceAreaPolicy, TokenPolicy};

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::{Address, StructuredDetails};
use crate::services::{GeocodeError, Geocoder, LocateError, LocationProvider};
use crate::storage::{self, KvStore};

/// Storage key for the persisted address book snapshot.
const ADDRESS_BOOK_KEY: &str = "address_book";

/// Failures an address flow can surface.
///
/// Four separately reportable kinds: callers can tell "couldn't get a
/// location" apart from "got a location but it's out of area".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The user denied the location permission.
    #[error("location permission denied")]
    PermissionDenied,

    /// The device location fix timed out.
    #[error("location request timed out")]
    LocationTimeout,

    /// Reverse geocoding failed.
    #[error("geocoder unavailable: {0}")]
    GeocodeUnavailable(String),

    /// The address is outside the serviceable delivery area.
    #[error("address outside the service area")]
    OutOfServiceArea,
}

impl From<LocateError> for AddressError {
    fn from(err: LocateError) -> Self {
        match err {
            LocateError::PermissionDenied => Self::PermissionDenied,
            LocateError::Timeout => Self::LocationTimeout,
        }
    }
}

impl From<GeocodeError> for AddressError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::Unavailable(message) => Self::GeocodeUnavailable(message),
        }
    }
}

/// Persisted shape: the confirmed pointer plus the saved list, one blob.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct AddressBookSnapshot {
    confirmed: Option<Address>,
    saved: Vec<Address>,
}

/// Owns saved delivery addresses and the currently confirmed target.
pub struct AddressBook {
    state: Mutex<AddressBookSnapshot>,
    store: Arc<dyn KvStore>,
    location: Arc<dyn LocationProvider>,
    geocoder: Arc<dyn Geocoder>,
    policy: Arc<dyn ServiceAreaPolicy>,
    location_timeout: Duration,
}

impl AddressBook {
    /// Create an empty address book. Call [`AddressBook::load`] afterwards to
    /// rehydrate a previous session's snapshot.
    #[must_use]
    pub fn new(
        store: Arc<dyn KvStore>,
        location: Arc<dyn LocationProvider>,
        geocoder: Arc<dyn Geocoder>,
        policy: Arc<dyn ServiceAreaPolicy>,
        location_timeout: Duration,
    ) -> Self {
        Self {
            state: Mutex::new(AddressBookSnapshot::default()),
            store,
            location,
            geocoder,
            policy,
            location_timeout,
        }
    }

    /// Rehydrate the confirmed address and saved list from storage.
    pub async fn load(&self) {
        let mut state = self.state.lock().await;
        match storage::load_json::<AddressBookSnapshot>(self.store.as_ref(), ADDRESS_BOOK_KEY).await
        {
            Ok(Some(stored)) => *state = stored,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "failed to rehydrate address book, starting empty");
            }
        }
    }

    /// Detect the device's current location and reverse-geocode it into a
    /// candidate address. The candidate is NOT confirmed; callers must pass
    /// it through [`AddressBook::confirm`].
    ///
    /// # Errors
    ///
    /// `PermissionDenied` or `LocationTimeout` if no fix could be obtained,
    /// `GeocodeUnavailable` if the fix could not be turned into text.
    #[tracing::instrument(skip(self))]
    pub async fn detect_current(&self) -> Result<Address, AddressError> {
        let coordinates = self.location.current_position(self.location_timeout).await?;
        let formatted = self.geocoder.reverse(coordinates).await?;
        Ok(Address::geocoded(coordinates, formatted))
    }

    /// Run the eligibility gate over a candidate and, if it passes, make it
    /// the confirmed address and fold it into the saved list (deduplicated by
    /// formatted text, newest first). Rejection mutates nothing.
    ///
    /// # Errors
    ///
    /// `OutOfServiceArea` if the candidate fails the eligibility policy.
    #[tracing::instrument(skip(self, candidate), fields(address = %candidate.formatted_text))]
    pub async fn confirm(&self, candidate: Address) -> Result<Address, AddressError> {
        if !self.policy.check(&candidate).is_eligible() {
            tracing::info!("address rejected by service-area policy");
            return Err(AddressError::OutOfServiceArea);
        }

        let mut state = self.state.lock().await;
        state
            .saved
            .retain(|saved| saved.formatted_text != candidate.formatted_text);
        state.saved.insert(0, candidate.clone());
        state.confirmed = Some(candidate.clone());
        self.persist(&state).await;

        Ok(candidate)
    }

    /// Promote a previously saved address to confirmed. Still re-validated
    /// through the eligibility gate.
    ///
    /// # Errors
    ///
    /// `OutOfServiceArea` if the address no longer passes the policy.
    pub async fn select_saved(&self, address: Address) -> Result<Address, AddressError> {
        self.confirm(address).await
    }

    /// Build a candidate from free-text input and confirm it. The candidate
    /// carries the ungeocoded coordinate sentinel.
    ///
    /// # Errors
    ///
    /// `OutOfServiceArea` if the text fails the eligibility policy.
    pub async fn confirm_manual_text(
        &self,
        text: &str,
        details: Option<StructuredDetails>,
    ) -> Result<Address, AddressError> {
        let mut candidate = Address::manual_entry(text);
        if let Some(details) = details {
            candidate = candidate.with_details(details);
        }
        self.confirm(candidate).await
    }

    /// The currently confirmed delivery target, if any.
    pub async fn confirmed(&self) -> Option<Address> {
        self.state.lock().await.confirmed.clone()
    }

    /// Saved addresses, newest first.
    pub async fn saved(&self) -> Vec<Address> {
        self.state.lock().await.saved.clone()
    }

    /// Best-effort snapshot write; failures are logged, never propagated.
    async fn persist(&self, state: &AddressBookSnapshot) {
        if let Err(e) = storage::save_json(self.store.as_ref(), ADDRESS_BOOK_KEY, state).await {
            tracing::warn!(error = %e, "failed to persist address book");
        }
    }
}
