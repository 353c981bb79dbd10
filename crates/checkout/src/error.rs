//! Unified checkout error taxonomy.
//!
//! Collaborator errors are classified into one flat enum at the orchestration
//! boundary so callers can pattern-match on retry-ability. Every kind maps to
//! a distinct user-facing message; only raw transport failures are
//! generalized to a "network issue" message.

use thiserror::Error;

use crate::address::AddressError;
use crate::payment::PaymentError;
use crate::services::{ApiError, GeocodeError, LocateError, PaymentSdkError};

/// Every failure kind a checkout attempt can surface.
///
/// String payloads keep the type `Clone`, which lets the last error live on
/// the checkout session without holding transport errors alive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
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

    /// Submission attempted with no items.
    #[error("cart is empty")]
    EmptyCart,

    /// Transport-level failure talking to the order API.
    #[error("network error: {0}")]
    Network(String),

    /// The order API refused the submission.
    #[error("order rejected by server: {0}")]
    ServerRejected(String),

    /// The order API rejected our credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// The user backed out of the hosted payment flow. A normal exit, not a
    /// defect: the session returns to the payment-selection step.
    #[error("payment cancelled")]
    PaymentCancelled,

    /// The payment provider reported a charge failure.
    #[error("payment provider error: {0}")]
    PaymentProvider(String),

    /// A submission was requested while one is already in flight. Internal
    /// no-op signal, never shown to the user.
    #[error("submission already in flight")]
    DuplicateSubmissionSuppressed,

    /// An operation was called in a phase that does not allow it.
    #[error("checkout session is not ready: {0}")]
    NotReady(&'static str),
}

impl CheckoutError {
    /// The message shown to the user for this failure.
    ///
    /// Each kind gets a specific message; raw transport errors collapse into
    /// a generic retry prompt.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Location access is required to deliver to you. Please allow location access."
            }
            Self::LocationTimeout => {
                "We couldn't detect your location in time. Please try again or enter your address."
            }
            Self::GeocodeUnavailable(_) => {
                "We couldn't look up your address right now. Please enter it manually."
            }
            Self::OutOfServiceArea => "Sorry, we don't deliver to this area yet.",
            Self::EmptyCart => "Your cart is empty. Add some items before checking out.",
            Self::Network(_) => "Network issue, please retry.",
            Self::ServerRejected(_) => "The store couldn't accept your order. Please try again.",
            Self::Unauthorized => "Your session has expired. Please sign in again.",
            Self::PaymentCancelled => "Payment was cancelled. Your cart is unchanged.",
            Self::PaymentProvider(_) => {
                "Your payment could not be completed. You have not been charged twice."
            }
            Self::DuplicateSubmissionSuppressed | Self::NotReady(_) => {
                "Please wait a moment and try again."
            }
        }
    }

    /// Whether the user can retry the flow without losing their cart.
    ///
    /// Every failure except an authorization rejection leaves the cart
    /// intact, so nearly everything is recoverable in place.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Unauthorized)
    }
}

impl From<LocateError> for CheckoutError {
    fn from(err: LocateError) -> Self {
        match err {
            LocateError::PermissionDenied => Self::PermissionDenied,
            LocateError::Timeout => Self::LocationTimeout,
        }
    }
}

impl From<GeocodeError> for CheckoutError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::Unavailable(message) => Self::GeocodeUnavailable(message),
        }
    }
}

impl From<ApiError> for CheckoutError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(e) => Self::Network(e.to_string()),
            ApiError::ServerRejected { status, message } => {
                Self::ServerRejected(format!("{status}: {message}"))
            }
            ApiError::Unauthorized => Self::Unauthorized,
        }
    }
}

impl From<PaymentSdkError> for CheckoutError {
    fn from(err: PaymentSdkError) -> Self {
        match err {
            PaymentSdkError::Cancelled => Self::PaymentCancelled,
            PaymentSdkError::Provider(message) => Self::PaymentProvider(message),
        }
    }
}

impl From<AddressError> for CheckoutError {
    fn from(err: AddressError) -> Self {
        match err {
            AddressError::PermissionDenied => Self::PermissionDenied,
            AddressError::LocationTimeout => Self::LocationTimeout,
            AddressError::GeocodeUnavailable(message) => Self::GeocodeUnavailable(message),
            AddressError::OutOfServiceArea => Self::OutOfServiceArea,
        }
    }
}

impl From<PaymentError> for CheckoutError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Api(api) => api.into(),
            PaymentError::Cancelled => Self::PaymentCancelled,
            PaymentError::Provider(message) => Self::PaymentProvider(message),
        }
    }
}
