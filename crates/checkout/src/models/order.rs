//! Completed orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swiftcart_core::{OrderId, PaymentMethod, PaymentReference, PaymentStatus, Price};

use super::address::Address;
use super::cart::{Cart, CartItem};

/// A server-acknowledged order, immutable on the client once created.
///
/// Carries enough of the submission (lines, address, method, status) that an
/// invoice view can be rendered from the ledger alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub items: Vec<CartItem>,
    pub total_amount: Price,
    pub address: Address,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<PaymentReference>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Build an order from a settled submission.
    ///
    /// The total is recomputed from the line items rather than trusted from
    /// the caller, so a ledger entry can never disagree with its own lines.
    #[must_use]
    pub fn from_submission(
        order_id: OrderId,
        snapshot: &Cart,
        address: Address,
        payment_method: PaymentMethod,
        payment_status: PaymentStatus,
        payment_reference: Option<PaymentReference>,
    ) -> Self {
        Self {
            order_id,
            items: snapshot.items().to_vec(),
            total_amount: snapshot.subtotal(),
            address,
            payment_method,
            payment_status,
            payment_reference,
            created_at: Utc::now(),
        }
    }
}
