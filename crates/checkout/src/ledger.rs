//! Append-only local order history.
//!
//! Most-recent-first, persisted whole as one JSON blob. Feeds the invoice
//! view and the reorder flow; the only destructive operation is an
//! administrative `clear`, never exposed in the normal flow.

use std::sync::Arc;

use swiftcart_core::OrderId;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::cart::CartStore;
use crate::models::Order;
use crate::storage::{self, KvStore};

/// Storage key for the persisted order history.
const ORDERS_KEY: &str = "user_orders";

/// Failures from ledger lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// No order with this id exists in the local history.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The order exists but has no line items to re-add.
    #[error("order {0} has no items")]
    Empty(OrderId),
}

/// Owns the local order history.
pub struct OrderLedger {
    orders: Mutex<Vec<Order>>,
    store: Arc<dyn KvStore>,
}

impl OrderLedger {
    /// Create an empty ledger. Call [`OrderLedger::load`] afterwards to
    /// rehydrate persisted history.
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            orders: Mutex::new(Vec::new()),
            store,
        }
    }

    /// Rehydrate history from storage.
    pub async fn load(&self) {
        let mut orders = self.orders.lock().await;
        match storage::load_json::<Vec<Order>>(self.store.as_ref(), ORDERS_KEY).await {
            Ok(Some(stored)) => *orders = stored,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "failed to rehydrate order history, starting empty");
            }
        }
    }

    /// Prepend a completed order and persist the whole list. Best-effort:
    /// a failed write is logged and the in-memory history stands.
    pub async fn append(&self, order: Order) {
        let mut orders = self.orders.lock().await;
        orders.insert(0, order);
        if let Err(e) = storage::save_json(self.store.as_ref(), ORDERS_KEY, &*orders).await {
            tracing::warn!(error = %e, "failed to persist order history");
        }
    }

    /// Order history, most recent first.
    pub async fn orders(&self) -> Vec<Order> {
        self.orders.lock().await.clone()
    }

    /// Look up one order by id.
    pub async fn find(&self, order_id: &OrderId) -> Option<Order> {
        self.orders
            .lock()
            .await
            .iter()
            .find(|order| &order.order_id == order_id)
            .cloned()
    }

    /// Re-add a past order's lines to the live cart through the cart store's
    /// merge rule (additive, single persistence write). Returns the number of
    /// lines merged; the caller then directs the user to the cart view.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `Empty` for an order with no lines.
    pub async fn reorder(&self, order_id: &OrderId, cart: &CartStore) -> Result<usize, LedgerError> {
        let order = self
            .find(order_id)
            .await
            .ok_or_else(|| LedgerError::NotFound(order_id.clone()))?;

        if order.items.is_empty() {
            return Err(LedgerError::Empty(order_id.clone()));
        }

        let merged = order.items.len();
        cart.add_many(order.items).await;
        tracing::info!(order_id = %order_id, lines = merged, "reorder merged into cart");
        Ok(merged)
    }

    /// Erase all history (administrative/debug operation).
    pub async fn clear(&self) {
        let mut orders = self.orders.lock().await;
        orders.clear();
        if let Err(e) = self.store.remove(ORDERS_KEY).await {
            tracing::warn!(error = %e, "failed to erase persisted order history");
        }
    }
}
