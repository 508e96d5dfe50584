//! Cart domain types.
//!
//! The cart has two backing representations: persisted `cart_line` rows for
//! authenticated users and a transient per-session map for anonymous
//! visitors. Both are surfaced to callers as [`CartItem`] values so templates
//! and totals are representation-agnostic.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use voltbay_core::ProductId;

use super::product::Product;

/// One resolved cart line: product data plus the quantity in the cart.
#[derive(Debug, Clone)]
pub struct CartItem {
    /// The product in the cart.
    pub product: Product,
    /// How many units of it.
    pub quantity: i64,
}

impl CartItem {
    /// Quantity times unit price (unset prices count as zero).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.unit_price() * Decimal::from(self.quantity)
    }
}

/// The anonymous cart: product id -> quantity, stored in the session.
///
/// Keys are stringified product ids because the session store round-trips
/// values through JSON, where map keys must be strings. Entries whose key no
/// longer parses (or no longer resolves to a product) are skipped on read,
/// never surfaced as errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SessionCart(HashMap<String, i64>);

impl SessionCart {
    /// Create an empty session cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment (or initialize) the quantity for a product.
    pub fn add(&mut self, product_id: ProductId, quantity: i64) {
        *self.0.entry(product_id.to_string()).or_insert(0) += quantity;
    }

    /// Set the absolute quantity for a product.
    ///
    /// A quantity of zero or less deletes the entry instead of storing zero.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) {
        let key = product_id.to_string();
        if quantity > 0 {
            self.0.insert(key, quantity);
        } else {
            self.0.remove(&key);
        }
    }

    /// Remove a product. Missing entries are a no-op.
    pub fn remove(&mut self, product_id: ProductId) {
        self.0.remove(&product_id.to_string());
    }

    /// Quantity for a product, zero when absent.
    #[must_use]
    pub fn quantity(&self, product_id: ProductId) -> i64 {
        self.0.get(&product_id.to_string()).copied().unwrap_or(0)
    }

    /// Whether the cart holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of units across all entries.
    #[must_use]
    pub fn total_count(&self) -> i64 {
        self.0.values().sum()
    }

    /// Iterate the entries as typed (product id, quantity) pairs.
    ///
    /// Keys that do not parse as product ids are skipped.
    pub fn entries(&self) -> impl Iterator<Item = (ProductId, i64)> + '_ {
        self.0
            .iter()
            .filter_map(|(key, &quantity)| Some((ProductId::new(key.parse().ok()?), quantity)))
    }

    /// Drop all entries (after a merge into the persisted cart).
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    const P1: ProductId = ProductId::new(1);
    const P2: ProductId = ProductId::new(2);

    #[test]
    fn test_add_accumulates() {
        let mut cart = SessionCart::new();
        cart.add(P1, 2);
        cart.add(P1, 3);
        assert_eq!(cart.quantity(P1), 5);
        assert_eq!(cart.total_count(), 5);
    }

    #[test]
    fn test_set_quantity_is_absolute() {
        let mut cart = SessionCart::new();
        cart.add(P1, 4);
        cart.set_quantity(P1, 2);
        assert_eq!(cart.quantity(P1), 2);
    }

    #[test]
    fn test_set_quantity_zero_or_less_deletes() {
        let mut cart = SessionCart::new();
        cart.add(P1, 4);
        cart.set_quantity(P1, 0);
        assert!(cart.is_empty());

        cart.add(P2, 1);
        cart.set_quantity(P2, -1);
        assert_eq!(cart.quantity(P2), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cart = SessionCart::new();
        cart.remove(P1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_entries_skip_unparsable_keys() {
        let json = r#"{"1": 2, "not-a-product": 9}"#;
        let cart: SessionCart = serde_json::from_str(json).unwrap();
        let entries: Vec<_> = cart.entries().collect();
        assert_eq!(entries, vec![(P1, 2)]);
    }

    #[test]
    fn test_merge_is_additive() {
        // Persisted cart {p1: 1}, anonymous session cart {p1: 2, p2: 1}.
        let mut persisted = SessionCart::new();
        persisted.add(P1, 1);

        let mut session = SessionCart::new();
        session.add(P1, 2);
        session.add(P2, 1);

        for (product_id, quantity) in session.entries() {
            persisted.add(product_id, quantity);
        }
        session.clear();

        assert_eq!(persisted.quantity(P1), 3);
        assert_eq!(persisted.quantity(P2), 1);
        assert!(session.is_empty());
    }

    #[test]
    fn test_clear_after_merge() {
        let mut cart = SessionCart::new();
        cart.add(P1, 2);
        cart.add(P2, 1);
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_line_total() {
        let product = Product {
            id: P1,
            name: "Widget".into(),
            description: String::new(),
            price: Some(rust_decimal::Decimal::new(1050, 2)),
            image_path: None,
            category: None,
            stock: Some(5),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let item = CartItem {
            product,
            quantity: 3,
        };
        assert_eq!(item.line_total(), rust_decimal::Decimal::new(3150, 2));
    }
}
