//! Cart line items and the pure merge rules over them.
//!
//! The model is deliberately free of I/O: every mutation rule (merge by
//! product id, quantity floor of one, zero quantity removes the row) lives
//! here so [`crate::cart::CartStore`] stays a thin persistence shell.

use serde::{Deserialize, Serialize};
use swiftcart_core::{Price, ProductId};

/// A catalog product as shown on a listing or detail surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One cart row: a product with a positive quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CartItem {
    /// Build a line from a catalog product. Quantity is floored at one; a
    /// zero-quantity row never exists.
    #[must_use]
    pub fn from_product(product: Product, quantity: u32) -> Self {
        Self {
            id: product.id,
            name: product.name,
            unit_price: product.unit_price,
            quantity: quantity.max(1),
            image_url: product.image_url,
            description: product.description,
        }
    }

    /// Price of this row: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Ordered collection of cart rows.
///
/// Insertion order is preserved for display; totals are derived and never
/// stored. At most one row exists per product id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// The current rows, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total item count: sum of quantities across rows.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Subtotal: sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items
            .iter()
            .fold(Price::zero(), |acc, item| acc.plus(&item.line_total()))
    }

    /// Merge a line into the cart: an existing row with the same id has its
    /// quantity incremented, otherwise the line is appended. Additive, never
    /// overwriting. A zero-quantity incoming line is ignored.
    pub fn merge(&mut self, item: CartItem) {
        if item.quantity == 0 {
            return;
        }
        if let Some(existing) = self.items.iter_mut().find(|row| row.id == item.id) {
            existing.quantity += item.quantity;
        } else {
            self.items.push(item);
        }
    }

    /// Merge a whole batch, one row at a time (used by reorder).
    pub fn merge_all(&mut self, items: impl IntoIterator<Item = CartItem>) {
        for item in items {
            self.merge(item);
        }
    }

    /// Overwrite a row's quantity. Zero removes the row instead of leaving a
    /// zero-quantity entry behind. Unknown ids are a no-op.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(id);
        } else if let Some(existing) = self.items.iter_mut().find(|row| &row.id == id) {
            existing.quantity = quantity;
        }
    }

    /// Delete a row unconditionally.
    pub fn remove(&mut self, id: &ProductId) {
        self.items.retain(|row| &row.id != id);
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(id: &str, qty: u32, price: i64) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            name: format!("product {id}"),
            unit_price: Price::inr(rust_decimal::Decimal::from(price)),
            quantity: qty,
            image_url: format!("https://cdn.example/{id}.jpg"),
            description: None,
        }
    }

    #[test]
    fn test_merge_increments_existing_row() {
        let mut cart = Cart::new();
        cart.merge(item("A", 2, 60));
        cart.merge(item("A", 1, 60));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_merge_batch_is_additive() {
        let mut cart = Cart::new();
        cart.merge(item("A", 2, 60));
        cart.merge_all(vec![item("A", 3, 60), item("B", 1, 25)]);

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.items()[1].quantity, 1);
    }

    #[test]
    fn test_zero_quantity_merge_ignored() {
        let mut cart = Cart::new();
        cart.merge(item("A", 0, 60));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.merge(item("A", 2, 60));
        cart.set_quantity(&ProductId::new("A"), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let mut cart = Cart::new();
        cart.merge(item("A", 2, 60));
        cart.set_quantity(&ProductId::new("A"), 7);
        assert_eq!(cart.items()[0].quantity, 7);
    }

    #[test]
    fn test_every_row_has_positive_quantity() {
        let mut cart = Cart::new();
        cart.merge(item("A", 2, 60));
        cart.merge(item("B", 0, 10));
        cart.merge(item("C", 1, 15));
        cart.set_quantity(&ProductId::new("C"), 0);
        cart.remove(&ProductId::new("missing"));

        assert!(cart.items().iter().all(|row| row.quantity >= 1));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_derived_totals() {
        let mut cart = Cart::new();
        cart.merge(item("A", 2, 60));
        cart.merge(item("B", 3, 25));

        assert_eq!(cart.count(), 5);
        assert_eq!(cart.subtotal().amount, dec!(195));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut cart = Cart::new();
        cart.merge(item("B", 1, 10));
        cart.merge(item("A", 1, 10));
        cart.merge(item("B", 1, 10));

        let ids: Vec<&str> = cart.items().iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut cart = Cart::new();
        cart.merge(item("A", 2, 60));
        cart.merge(item("B", 1, 25));

        let bytes = serde_json::to_vec(&cart).expect("serialize");
        let back: Cart = serde_json::from_slice(&bytes).expect("deserialize");
        assert_eq!(back, cart);
    }
}
