//! Persistence across app relaunches.
//!
//! A relaunch is simulated by building a second app instance over the same
//! storage backend and rehydrating the stores.

use rust_decimal_macros::dec;
use swiftcart_checkout::models::Address;
use swiftcart_checkout::services::CodOrderResponse;
use swiftcart_checkout::storage::KvStore;
use swiftcart_core::{OrderId, PaymentMethod, Price};
use swiftcart_integration_tests::{TestApp, product};

#[tokio::test]
async fn test_cart_survives_relaunch() {
    let app = TestApp::builder().build().await;
    app.cart.add(product("atta", 60), 2).await;
    app.cart.add(product("poha", 40), 1).await;

    let relaunched = app.relaunch().build().await;

    assert_eq!(relaunched.cart.count().await, 3);
    assert_eq!(relaunched.cart.subtotal().await, Price::inr(dec!(160)));
    assert_eq!(relaunched.cart.snapshot().await, app.cart.snapshot().await);
}

#[tokio::test]
async fn test_addresses_survive_relaunch() {
    let app = TestApp::builder().build().await;
    app.address_book
        .confirm(Address::manual_entry("12 Market Rd, Bhiwandi"))
        .await
        .expect("confirm");
    app.address_book
        .confirm(Address::manual_entry("8 Station Rd, Bhiwandi"))
        .await
        .expect("confirm");

    let relaunched = app.relaunch().build().await;

    assert_eq!(
        relaunched
            .address_book
            .confirmed()
            .await
            .map(|a| a.formatted_text),
        Some("8 Station Rd, Bhiwandi".to_string())
    );
    let saved = relaunched.address_book.saved().await;
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].formatted_text, "8 Station Rd, Bhiwandi");
}

#[tokio::test]
async fn test_order_history_survives_relaunch() {
    let mut builder = TestApp::builder();
    builder
        .api
        .expect_create_cod_order()
        .times(1)
        .returning(|_| {
            Ok(CodOrderResponse {
                order_id: OrderId::new("ord-200"),
            })
        });
    let app = builder.build().await;

    app.cart.add(product("atta", 60), 1).await;
    app.orchestrator.begin().await.expect("begin");
    app.orchestrator
        .confirm_address(Address::manual_entry("12 Market Rd, Bhiwandi"))
        .await
        .expect("confirm");
    app.orchestrator
        .choose_payment_method(PaymentMethod::CashOnDelivery)
        .await
        .expect("method");
    app.orchestrator.submit().await.expect("settled");

    let relaunched = app.relaunch().build().await;

    let history = relaunched.ledger.orders().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].order_id, OrderId::new("ord-200"));
    assert!(relaunched.cart.is_empty().await, "cleared cart stays cleared");
}

#[tokio::test]
async fn test_corrupt_cart_blob_degrades_to_empty() {
    let app = TestApp::builder().build().await;
    app.cart.add(product("atta", 60), 1).await;
    app.kv
        .set("cart", b"{not json".to_vec())
        .await
        .expect("seed corrupt blob");

    let relaunched = app.relaunch().build().await;

    assert!(relaunched.cart.is_empty().await);
    // The store stays usable after the corrupt read.
    relaunched.cart.add(product("poha", 40), 1).await;
    assert_eq!(relaunched.cart.count().await, 1);
}
