//! The cart store: single owner of the live cart.
//!
//! Every surface that can add items (product list, product detail, cart
//! screen, reorder) routes through this one store, so concurrent taps can
//! never produce duplicate rows for the same product. Mutations are applied
//! in call order under one async lock, and each mutation persists a snapshot
//! before releasing it, so the stored bytes always reflect the latest state.
//!
//! The in-memory cart is the source of truth for the running session; the
//! key-value store is best-effort durability. Storage failures are logged and
//! never surfaced to callers, and they never roll back a mutation.

use std::sync::Arc;

use swiftcart_core::{Price, ProductId};
use tokio::sync::Mutex;

use crate::models::{Cart, CartItem, Product};
use crate::storage::{self, KvStore};

/// Storage key for the persisted cart snapshot.
const CART_KEY: &str = "cart";

/// Owns the live cart and its persistence.
pub struct CartStore {
    cart: Mutex<Cart>,
    store: Arc<dyn KvStore>,
}

impl CartStore {
    /// Create an empty cart store. Call [`CartStore::load`] afterwards to
    /// rehydrate a previous session's snapshot.
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            cart: Mutex::new(Cart::new()),
            store,
        }
    }

    /// Rehydrate the cart from the persisted snapshot, if one exists.
    ///
    /// A missing or corrupt snapshot leaves the cart empty; corruption is
    /// logged, not propagated, because a fresh cart is always a safe start.
    pub async fn load(&self) {
        let mut cart = self.cart.lock().await;
        match storage::load_json::<Cart>(self.store.as_ref(), CART_KEY).await {
            Ok(Some(stored)) => *cart = stored,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "failed to rehydrate cart, starting empty");
            }
        }
    }

    /// Add a product to the cart. An existing row with the same id has its
    /// quantity incremented by `quantity`; otherwise a new row is appended.
    pub async fn add(&self, product: Product, quantity: u32) {
        let mut cart = self.cart.lock().await;
        cart.merge(CartItem::from_product(product, quantity));
        self.persist(&cart).await;
    }

    /// Merge a batch of lines (used by reorder). The whole batch lands in a
    /// single persistence write, not one write per item.
    pub async fn add_many(&self, items: Vec<CartItem>) {
        let mut cart = self.cart.lock().await;
        cart.merge_all(items);
        self.persist(&cart).await;
    }

    /// Delete a row unconditionally.
    pub async fn remove(&self, id: &ProductId) {
        let mut cart = self.cart.lock().await;
        cart.remove(id);
        self.persist(&cart).await;
    }

    /// Overwrite a row's quantity; zero removes the row.
    pub async fn set_quantity(&self, id: &ProductId, quantity: u32) {
        let mut cart = self.cart.lock().await;
        cart.set_quantity(id, quantity);
        self.persist(&cart).await;
    }

    /// Empty the cart and erase the persisted snapshot.
    pub async fn clear(&self) {
        let mut cart = self.cart.lock().await;
        cart.clear();
        if let Err(e) = self.store.remove(CART_KEY).await {
            tracing::warn!(error = %e, "failed to erase persisted cart");
        }
    }

    /// A point-in-time copy of the whole cart.
    pub async fn snapshot(&self) -> Cart {
        self.cart.lock().await.clone()
    }

    /// The current rows, in insertion order.
    pub async fn items(&self) -> Vec<CartItem> {
        self.cart.lock().await.items().to_vec()
    }

    /// Sum of quantities across rows.
    pub async fn count(&self) -> u32 {
        self.cart.lock().await.count()
    }

    /// Sum of line totals.
    pub async fn subtotal(&self) -> Price {
        self.cart.lock().await.subtotal()
    }

    /// Whether the cart has no rows.
    pub async fn is_empty(&self) -> bool {
        self.cart.lock().await.is_empty()
    }

    /// Best-effort snapshot write, performed while the cart lock is held so
    /// writes land in mutation order.
    async fn persist(&self, cart: &Cart) {
        if let Err(e) = storage::save_json(self.store.as_ref(), CART_KEY, cart).await {
            tracing::warn!(error = %e, "failed to persist cart snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, MockKvStore, StorageError};
    use rust_decimal_macros::dec;

    fn product(id: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("product {id}"),
            unit_price: Price::inr(rust_decimal::Decimal::from(price)),
            image_url: format!("https://cdn.example/{id}.jpg"),
            description: None,
        }
    }

    fn line(id: &str, qty: u32, price: i64) -> CartItem {
        CartItem::from_product(product(id, price), qty)
    }

    #[tokio::test]
    async fn test_add_merges_by_id() {
        let store = CartStore::new(Arc::new(MemoryStore::new()));
        store.add(product("A", 60), 2).await;
        store.add(product("A", 60), 1).await;

        let items = store.items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_add_many_single_write() {
        let mut kv = MockKvStore::new();
        kv.expect_set()
            .times(1)
            .returning(|_, _| Ok(()));

        let store = CartStore::new(Arc::new(kv));
        store
            .add_many(vec![line("A", 2, 60), line("B", 1, 25), line("A", 1, 60)])
            .await;

        assert_eq!(store.count().await, 4);
    }

    #[tokio::test]
    async fn test_set_quantity_zero_removes() {
        let store = CartStore::new(Arc::new(MemoryStore::new()));
        store.add(product("A", 60), 2).await;
        store.set_quantity(&ProductId::new("A"), 0).await;

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear_erases_snapshot() {
        let kv = Arc::new(MemoryStore::new());
        let store = CartStore::new(Arc::clone(&kv) as Arc<dyn KvStore>);
        store.add(product("A", 60), 2).await;
        assert!(kv.get(CART_KEY).await.expect("get").is_some());

        store.clear().await;
        assert!(store.is_empty().await);
        assert!(kv.get(CART_KEY).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_rehydration_round_trip() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());

        let store = CartStore::new(Arc::clone(&kv));
        store.add(product("A", 60), 2).await;
        store.add(product("B", 25), 1).await;
        let before = store.snapshot().await;

        let restored = CartStore::new(Arc::clone(&kv));
        restored.load().await;
        assert_eq!(restored.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_storage_failure_does_not_roll_back() {
        let mut kv = MockKvStore::new();
        kv.expect_set()
            .returning(|_, _| Err(StorageError::Backend("disk full".into())));

        let store = CartStore::new(Arc::new(kv));
        store.add(product("A", 60), 2).await;

        // In-memory cart is the source of truth; the failed write is logged.
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn test_derived_totals() {
        let store = CartStore::new(Arc::new(MemoryStore::new()));
        store.add(product("A", 60), 2).await;
        store.add(product("B", 25), 3).await;

        assert_eq!(store.count().await, 5);
        assert_eq!(store.subtotal().await.amount, dec!(195));
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_starts_empty() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(CART_KEY, b"garbage".to_vec()).await.expect("set");

        let store = CartStore::new(Arc::clone(&kv) as Arc<dyn KvStore>);
        store.load().await;
        assert!(store.is_empty().await);
    }
}
