//! Remote order API client.
//!
//! Request and response payloads are explicit record types validated at this
//! boundary; nothing upstream ever sees an untyped map. Failures are
//! classified into the three kinds the orchestrator distinguishes: network,
//! server rejection, and authorization.

use async_trait::async_trait;
use mockall::automock;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use swiftcart_core::{CustomerId, OrderId, PaymentMethod, PaymentSessionId, Price, ProductId};
use thiserror::Error;

use crate::config::OrderApiConfig;
use crate::models::{Address, Cart};

/// Errors that can occur when talking to the order API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (DNS, connect, timeout, TLS).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server refused the order.
    #[error("order rejected: {status} - {message}")]
    ServerRejected { status: u16, message: String },

    /// The bearer token was rejected.
    #[error("unauthorized")]
    Unauthorized,
}

/// One order line as submitted to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
}

/// Request payload for order creation (both COD and online).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: CustomerId,
    pub items: Vec<OrderLine>,
    pub total_amount: Price,
    pub address: Address,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreateOrderRequest {
    /// Build a request from a cart snapshot and confirmed address.
    ///
    /// The total is derived from the snapshot so the payload can never carry
    /// an amount that disagrees with its own lines.
    #[must_use]
    pub fn from_cart(
        customer_id: CustomerId,
        snapshot: &Cart,
        address: Address,
        payment_method: PaymentMethod,
        notes: Option<String>,
    ) -> Self {
        Self {
            customer_id,
            items: snapshot
                .items()
                .iter()
                .map(|line| OrderLine {
                    product_id: line.id.clone(),
                    name: line.name.clone(),
                    unit_price: line.unit_price,
                    quantity: line.quantity,
                })
                .collect(),
            total_amount: snapshot.subtotal(),
            address,
            payment_method,
            notes,
        }
    }
}

/// Provider payment-session handle returned for online orders.
///
/// Opaque to this subsystem: it is created by the server and consumed by the
/// payment SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSession {
    pub id: PaymentSessionId,
    pub amount: Price,
}

/// Response to online order creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: OrderId,
    pub payment_session: PaymentSession,
}

/// Response to COD order creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodOrderResponse {
    pub order_id: OrderId,
}

/// Remote order API.
#[automock]
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Create a pending order and open a provider payment session.
    async fn create_order(&self, request: CreateOrderRequest)
    -> Result<CreateOrderResponse, ApiError>;

    /// Create a cash-on-delivery order; settled server-side on acceptance.
    async fn create_cod_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<CodOrderResponse, ApiError>;
}

/// HTTP implementation of [`OrderApi`].
#[derive(Debug, Clone)]
pub struct HttpOrderApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrderApi {
    /// Create a new order API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &OrderApiConfig) -> Result<Self, ApiError> {
        let mut headers = reqwest::header::HeaderMap::new();

        let auth_value = format!("Bearer {}", config.auth_token.expose_secret());
        let mut auth_header = reqwest::header::HeaderValue::from_str(&auth_value)
            .map_err(|_| ApiError::Unauthorized)?;
        auth_header.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        request: &CreateOrderRequest,
    ) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::ServerRejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl OrderApi for HttpOrderApi {
    #[tracing::instrument(skip(self, request), fields(lines = request.items.len()))]
    async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ApiError> {
        self.post_json("/order/create-order", &request).await
    }

    #[tracing::instrument(skip(self, request), fields(lines = request.items.len()))]
    async fn create_cod_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<CodOrderResponse, ApiError> {
        self.post_json("/order/create-cod-order", &request).await
    }
}
