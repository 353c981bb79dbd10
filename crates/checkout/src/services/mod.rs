//! External collaborator contracts and their shipped implementations.
//!
//! Everything the checkout subsystem talks to lives behind a trait here:
//! the remote order API, the device location provider, the reverse geocoder,
//! and the payment provider's hosted checkout surface. HTTP-backed
//! implementations are shipped where one exists; device-bound collaborators
//! (location, payment SDK) are trait-only and supplied by the host shell.

pub mod geocoder;
pub mod location;
pub mod order_api;
pub mod payment_sdk;

pub use geocoder::{GeocodeError, Geocoder, NominatimGeocoder};
pub use location::{LocateError, LocationProvider};
pub use order_api::{
    ApiError, CodOrderResponse, CreateOrderRequest, CreateOrderResponse, HttpOrderApi, OrderApi,
    OrderLine, PaymentSession,
};
pub use payment_sdk::{PaymentSdk, PaymentSdkError};

// Generated mocks, re-exported for downstream test suites.
pub use geocoder::MockGeocoder;
pub use location::MockLocationProvider;
pub use order_api::MockOrderApi;
pub use payment_sdk::MockPaymentSdk;
