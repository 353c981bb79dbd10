//! Payment gateway: the two settlement paths behind one contract.
//!
//! `settle` issues exactly one remote order-creation call per invocation by
//! construction; the at-most-once guard against repeated submission taps
//! lives in the orchestrator, which is the only caller.

use std::sync::Arc;

use swiftcart_core::{CustomerId, PaymentMethod, PaymentStatus};
use thiserror::Error;

use crate::models::{Address, Cart, Order};
use crate::services::{ApiError, CreateOrderRequest, OrderApi, PaymentSdk, PaymentSdkError};

/// Failures during settlement.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The order API call failed; no order exists on the server unless the
    /// response was lost in transit.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The user backed out of the hosted payment flow. The pending order
    /// stays unpaid on the server; the local flow treats this as a normal,
    /// recoverable exit.
    #[error("payment cancelled by user")]
    Cancelled,

    /// The provider reported a charge failure after the order was created.
    #[error("payment provider error: {0}")]
    Provider(String),
}

/// Settles a cart snapshot against the remote order API.
pub struct PaymentGateway {
    api: Arc<dyn OrderApi>,
    sdk: Arc<dyn PaymentSdk>,
    customer_id: CustomerId,
}

impl PaymentGateway {
    /// Create a gateway for one customer.
    #[must_use]
    pub fn new(api: Arc<dyn OrderApi>, sdk: Arc<dyn PaymentSdk>, customer_id: CustomerId) -> Self {
        Self {
            api,
            sdk,
            customer_id,
        }
    }

    /// Settle a cart snapshot.
    ///
    /// Cash on delivery is a single order-creation call; the returned order
    /// is settled immediately with status `PendingCollection`. Online payment
    /// is two-phase: create a pending order to obtain a payment session, then
    /// hand the session to the provider SDK and wait for its completion.
    ///
    /// # Errors
    ///
    /// `Cancelled` when the user dismisses the hosted payment, `Provider` on
    /// a charge failure, `Api` on network/server/authorization failures. In
    /// every error case no settled order exists locally and the caller's cart
    /// must stay untouched.
    #[tracing::instrument(skip(self, snapshot, address), fields(method = %method, lines = snapshot.items().len()))]
    pub async fn settle(
        &self,
        snapshot: &Cart,
        address: &Address,
        method: PaymentMethod,
        notes: Option<String>,
    ) -> Result<Order, PaymentError> {
        let request = CreateOrderRequest::from_cart(
            self.customer_id.clone(),
            snapshot,
            address.clone(),
            method,
            notes,
        );

        match method {
            PaymentMethod::CashOnDelivery => {
                let response = self.api.create_cod_order(request).await?;
                tracing::info!(order_id = %response.order_id, "COD order accepted");
                Ok(Order::from_submission(
                    response.order_id,
                    snapshot,
                    address.clone(),
                    method,
                    PaymentStatus::PendingCollection,
                    None,
                ))
            }
            PaymentMethod::Online => {
                let response = self.api.create_order(request).await?;
                let order_id = response.order_id;

                match self.sdk.open(&response.payment_session).await {
                    Ok(reference) => {
                        tracing::info!(order_id = %order_id, "online payment confirmed");
                        Ok(Order::from_submission(
                            order_id,
                            snapshot,
                            address.clone(),
                            method,
                            PaymentStatus::Paid,
                            Some(reference),
                        ))
                    }
                    Err(PaymentSdkError::Cancelled) => {
                        tracing::info!(order_id = %order_id, "payment cancelled, order left unpaid");
                        Err(PaymentError::Cancelled)
                    }
                    Err(PaymentSdkError::Provider(message)) => {
                        tracing::warn!(order_id = %order_id, error = %message, "provider charge failure");
                        Err(PaymentError::Provider(message))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CartItem;
    use crate::services::{
        CodOrderResponse, CreateOrderResponse, MockOrderApi, MockPaymentSdk, PaymentSession,
    };
    use rust_decimal_macros::dec;
    use swiftcart_core::{OrderId, PaymentReference, PaymentSessionId, Price, ProductId};

    fn snapshot() -> Cart {
        let mut cart = Cart::new();
        cart.merge(CartItem {
            id: ProductId::new("A"),
            name: "Atta 5kg".into(),
            unit_price: Price::inr(dec!(260)),
            quantity: 1,
            image_url: "https://cdn.example/atta.jpg".into(),
            description: None,
        });
        cart
    }

    fn address() -> Address {
        Address::manual_entry("12 Market Rd, Bhiwandi")
    }

    fn session() -> PaymentSession {
        PaymentSession {
            id: PaymentSessionId::new("sess-1"),
            amount: Price::inr(dec!(260)),
        }
    }

    fn gateway(api: MockOrderApi, sdk: MockPaymentSdk) -> PaymentGateway {
        PaymentGateway::new(Arc::new(api), Arc::new(sdk), CustomerId::new("cust-1"))
    }

    #[tokio::test]
    async fn test_cod_settles_immediately() {
        let mut api = MockOrderApi::new();
        api.expect_create_cod_order().times(1).returning(|_| {
            Ok(CodOrderResponse {
                order_id: OrderId::new("ord-1"),
            })
        });
        api.expect_create_order().times(0);
        let sdk = MockPaymentSdk::new();

        let order = gateway(api, sdk)
            .settle(&snapshot(), &address(), PaymentMethod::CashOnDelivery, None)
            .await
            .expect("settled");

        assert_eq!(order.payment_status, PaymentStatus::PendingCollection);
        assert_eq!(order.payment_reference, None);
        assert!(order.payment_status.is_settled());
    }

    #[tokio::test]
    async fn test_online_success_carries_reference() {
        let mut api = MockOrderApi::new();
        api.expect_create_order().times(1).returning(|_| {
            Ok(CreateOrderResponse {
                order_id: OrderId::new("ord-2"),
                payment_session: session(),
            })
        });
        let mut sdk = MockPaymentSdk::new();
        sdk.expect_open()
            .times(1)
            .returning(|_| Ok(PaymentReference::new("pay_abc")));

        let order = gateway(api, sdk)
            .settle(&snapshot(), &address(), PaymentMethod::Online, None)
            .await
            .expect("settled");

        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.payment_reference, Some(PaymentReference::new("pay_abc")));
    }

    #[tokio::test]
    async fn test_online_cancellation_is_recoverable() {
        let mut api = MockOrderApi::new();
        api.expect_create_order().times(1).returning(|_| {
            Ok(CreateOrderResponse {
                order_id: OrderId::new("ord-3"),
                payment_session: session(),
            })
        });
        let mut sdk = MockPaymentSdk::new();
        sdk.expect_open()
            .returning(|_| Err(PaymentSdkError::Cancelled));

        let err = gateway(api, sdk)
            .settle(&snapshot(), &address(), PaymentMethod::Online, None)
            .await
            .expect_err("cancelled");

        assert!(matches!(err, PaymentError::Cancelled));
    }

    #[tokio::test]
    async fn test_server_rejection_classified() {
        let mut api = MockOrderApi::new();
        api.expect_create_cod_order().returning(|_| {
            Err(ApiError::ServerRejected {
                status: 422,
                message: "out of stock".into(),
            })
        });
        let sdk = MockPaymentSdk::new();

        let err = gateway(api, sdk)
            .settle(&snapshot(), &address(), PaymentMethod::CashOnDelivery, None)
            .await
            .expect_err("rejected");

        assert!(matches!(
            err,
            PaymentError::Api(ApiError::ServerRejected { status: 422, .. })
        ));
    }

    #[tokio::test]
    async fn test_request_carries_notes() {
        let mut api = MockOrderApi::new();
        api.expect_create_cod_order()
            .withf(|request| request.notes.as_deref() == Some("ring the bell twice"))
            .returning(|_| {
                Ok(CodOrderResponse {
                    order_id: OrderId::new("ord-4"),
                })
            });
        let sdk = MockPaymentSdk::new();

        gateway(api, sdk)
            .settle(
                &snapshot(),
                &address(),
                PaymentMethod::CashOnDelivery,
                Some("ring the bell twice".to_string()),
            )
            .await
            .expect("settled");
    }
}
