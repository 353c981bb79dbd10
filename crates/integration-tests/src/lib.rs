//! Integration test harness for SwiftCart.
//!
//! Wires the real stores and the orchestrator against an in-memory key-value
//! store and mocked device/network boundaries. Each test configures the mock
//! expectations on the builder, builds the app, and drives the public flow.
//!
//! The shared [`MemoryStore`] doubles as the "device storage": building a
//! second app over the same store simulates an app relaunch.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use swiftcart_checkout::address::{AddressBook, TokenPolicy};
use swiftcart_checkout::cart::CartStore;
use swiftcart_checkout::ledger::OrderLedger;
use swiftcart_checkout::models::Product;
use swiftcart_checkout::orchestrator::CheckoutOrchestrator;
use swiftcart_checkout::payment::PaymentGateway;
use swiftcart_checkout::services::{
    MockGeocoder, MockLocationProvider, MockOrderApi, MockPaymentSdk,
};
use swiftcart_checkout::storage::{KvStore, MemoryStore};
use swiftcart_core::{CustomerId, Price, ProductId};

/// The service-area token all harness apps are configured with.
pub const SERVICE_AREA: &str = "bhiwandi";

/// A catalog line for tests.
#[must_use]
pub fn product(id: &str, price_inr: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("product {id}"),
        unit_price: Price::inr(Decimal::from(price_inr)),
        image_url: format!("https://cdn.example/{id}.jpg"),
        description: None,
    }
}

/// Collects mock expectations before the app is wired together.
pub struct TestAppBuilder {
    pub api: MockOrderApi,
    pub sdk: MockPaymentSdk,
    pub location: MockLocationProvider,
    pub geocoder: MockGeocoder,
    kv: Arc<MemoryStore>,
}

/// Route store/orchestrator traces into test output when `RUST_LOG` is set.
fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

impl TestAppBuilder {
    fn new(kv: Arc<MemoryStore>) -> Self {
        init_tracing();
        Self {
            api: MockOrderApi::new(),
            sdk: MockPaymentSdk::new(),
            location: MockLocationProvider::new(),
            geocoder: MockGeocoder::new(),
            kv,
        }
    }

    /// Wire the stores and orchestrator and rehydrate them from storage.
    pub async fn build(self) -> TestApp {
        let cart = Arc::new(CartStore::new(Arc::clone(&self.kv) as Arc<dyn KvStore>));
        cart.load().await;

        let address_book = Arc::new(AddressBook::new(
            Arc::clone(&self.kv) as Arc<dyn KvStore>,
            Arc::new(self.location),
            Arc::new(self.geocoder),
            Arc::new(TokenPolicy::from_token(SERVICE_AREA)),
            Duration::from_secs(15),
        ));
        address_book.load().await;

        let ledger = Arc::new(OrderLedger::new(Arc::clone(&self.kv) as Arc<dyn KvStore>));
        ledger.load().await;

        let gateway = PaymentGateway::new(
            Arc::new(self.api),
            Arc::new(self.sdk),
            CustomerId::new("cust-1"),
        );
        let orchestrator = CheckoutOrchestrator::new(
            Arc::clone(&cart),
            Arc::clone(&address_book),
            Arc::clone(&ledger),
            gateway,
        );

        TestApp {
            kv: self.kv,
            cart,
            address_book,
            ledger,
            orchestrator,
        }
    }
}

/// A fully wired in-process app instance.
pub struct TestApp {
    pub kv: Arc<MemoryStore>,
    pub cart: Arc<CartStore>,
    pub address_book: Arc<AddressBook>,
    pub ledger: Arc<OrderLedger>,
    pub orchestrator: CheckoutOrchestrator,
}

impl TestApp {
    /// Start building an app over a fresh storage backend.
    #[must_use]
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::new(Arc::new(MemoryStore::new()))
    }

    /// Start building a second app over this app's storage, as a relaunch.
    #[must_use]
    pub fn relaunch(&self) -> TestAppBuilder {
        TestAppBuilder::new(Arc::clone(&self.kv))
    }
}
