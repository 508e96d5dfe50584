//! Wishlist types.

use chrono::{DateTime, Utc};
use voltbay_core::{ProductId, UserId, WishlistEntryId};

use super::product::Product;

/// A saved-for-later product, unique per (user, product).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WishlistEntry {
    /// Unique entry ID.
    pub id: WishlistEntryId,
    /// Owning user.
    pub user_id: UserId,
    /// Saved product.
    pub product_id: ProductId,
    /// When the product was saved.
    pub created_at: DateTime<Utc>,
}

/// A wishlist entry joined with its product for display.
#[derive(Debug, Clone)]
pub struct WishlistItem {
    /// The wishlist entry.
    pub entry: WishlistEntry,
    /// The saved product.
    pub product: Product,
}
