//! Fully wired checkout subsystem.
//!
//! The host shell supplies the device-bound pieces (storage, location,
//! payment SDK) and the signed-in customer; everything network-facing is
//! built here from configuration.

use std::sync::Arc;

use swiftcart_core::CustomerId;

use crate::address::{AddressBook, TokenPolicy};
use crate::cart::CartStore;
use crate::config::CheckoutConfig;
use crate::ledger::OrderLedger;
use crate::orchestrator::CheckoutOrchestrator;
use crate::payment::PaymentGateway;
use crate::services::{
    ApiError, GeocodeError, HttpOrderApi, LocationProvider, NominatimGeocoder, PaymentSdk,
};
use crate::storage::KvStore;

/// Error wiring the subsystem from configuration.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("order API client: {0}")]
    OrderApi(#[from] ApiError),
    #[error("geocoder client: {0}")]
    Geocoder(#[from] GeocodeError),
}

/// The assembled subsystem, shared across the host app's screens.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct CheckoutSystem {
    inner: Arc<CheckoutSystemInner>,
}

struct CheckoutSystemInner {
    cart: Arc<CartStore>,
    address_book: Arc<AddressBook>,
    ledger: Arc<OrderLedger>,
    orchestrator: CheckoutOrchestrator,
}

impl CheckoutSystem {
    /// Wire the subsystem.
    ///
    /// # Arguments
    ///
    /// * `config` - Checkout configuration, usually from the environment
    /// * `store` - Host-provided persistent key-value storage
    /// * `location` - Host-provided device location access
    /// * `payment_sdk` - Host-provided payment provider surface
    /// * `customer_id` - The signed-in customer
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(
        config: &CheckoutConfig,
        store: Arc<dyn KvStore>,
        location: Arc<dyn LocationProvider>,
        payment_sdk: Arc<dyn PaymentSdk>,
        customer_id: CustomerId,
    ) -> Result<Self, SetupError> {
        let order_api = Arc::new(HttpOrderApi::new(&config.order_api)?);
        let geocoder = Arc::new(NominatimGeocoder::new(&config.geocoder)?);
        let policy = Arc::new(TokenPolicy::new(&config.service_area));

        let cart = Arc::new(CartStore::new(Arc::clone(&store)));
        let address_book = Arc::new(AddressBook::new(
            Arc::clone(&store),
            location,
            geocoder,
            policy,
            config.location_timeout,
        ));
        let ledger = Arc::new(OrderLedger::new(store));
        let gateway = PaymentGateway::new(order_api, payment_sdk, customer_id);
        let orchestrator = CheckoutOrchestrator::new(
            Arc::clone(&cart),
            Arc::clone(&address_book),
            Arc::clone(&ledger),
            gateway,
        );

        Ok(Self {
            inner: Arc::new(CheckoutSystemInner {
                cart,
                address_book,
                ledger,
                orchestrator,
            }),
        })
    }

    /// Rehydrate all persisted state. Call once at startup.
    pub async fn load(&self) {
        self.inner.cart.load().await;
        self.inner.address_book.load().await;
        self.inner.ledger.load().await;
    }

    /// The live cart.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Delivery addresses.
    #[must_use]
    pub fn address_book(&self) -> &AddressBook {
        &self.inner.address_book
    }

    /// Local order history.
    #[must_use]
    pub fn ledger(&self) -> &OrderLedger {
        &self.inner.ledger
    }

    /// The checkout flow.
    #[must_use]
    pub fn orchestrator(&self) -> &CheckoutOrchestrator {
        &self.inner.orchestrator
    }
}
