//! Catalog product type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use voltbay_core::ProductId;

/// A catalog product.
///
/// Products are created and edited through administrative tooling and never
/// deleted in code; retiring a product flips `is_active` instead so that old
/// cart lines and reviews keep a valid reference.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Unit price. `None` means the price has not been set yet.
    pub price: Option<Decimal>,
    /// Relative path of the product image, if one was uploaded.
    pub image_path: Option<String>,
    /// Free-form category label.
    pub category: Option<String>,
    /// Units on hand. `None` means untracked.
    pub stock: Option<i32>,
    /// Soft-delete flag.
    pub is_active: bool,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Unit price with an unset price treated as zero.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.price.unwrap_or_default()
    }

    /// Whether the product can currently be moved from a wishlist into a cart.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock.is_some_and(|s| s > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: Option<Decimal>, stock: Option<i32>) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Test".into(),
            description: String::new(),
            price,
            image_path: None,
            category: None,
            stock,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_unit_price_defaults_to_zero() {
        assert_eq!(product(None, None).unit_price(), Decimal::ZERO);
        assert_eq!(
            product(Some(Decimal::new(999, 2)), None).unit_price(),
            Decimal::new(999, 2)
        );
    }

    #[test]
    fn test_in_stock() {
        assert!(product(None, Some(3)).in_stock());
        assert!(!product(None, Some(0)).in_stock());
        assert!(!product(None, None).in_stock());
    }
}
