//! Wishlist service.
//!
//! Wishlists are always user-scoped; there is no session-backed variant and
//! no merge step.

use serde::Serialize;
use sqlx::PgPool;
use tower_sessions::Session;

use voltbay_core::{ProductId, UserId, WishlistEntryId};

use crate::db::RepositoryError;
use crate::db::products::ProductRepository;
use crate::db::wishlist::WishlistRepository;
use crate::models::wishlist::WishlistItem;
use crate::services::cart::{CartError, CartIdentity, CartService, CartStore};

/// Errors from wishlist operations.
#[derive(Debug, thiserror::Error)]
pub enum WishlistError {
    /// Entry does not exist or is not owned by the caller.
    #[error("wishlist entry not found")]
    EntryNotFound,

    /// Referenced product does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The product has no stock to move into a cart.
    #[error("product is out of stock")]
    OutOfStock,

    /// Cart failure during move-to-cart.
    #[error("cart error: {0}")]
    Cart(#[from] CartError),

    /// Database failure.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Which way a toggle went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    /// The product was not wishlisted and now is.
    Added,
    /// The product was wishlisted and no longer is.
    Removed,
}

/// Wishlist service.
pub struct WishlistService<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistService<'a> {
    /// Create a new wishlist service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Toggle wishlist membership for (user, product), reporting which way
    /// the toggle went.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::ProductNotFound` if the product id does not
    /// resolve.
    pub async fn toggle(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<ToggleAction, WishlistError> {
        let products = ProductRepository::new(self.pool);
        if products.get(product_id).await?.is_none() {
            return Err(WishlistError::ProductNotFound(product_id));
        }

        let entries = WishlistRepository::new(self.pool);
        if entries.delete_by_product(user_id, product_id).await? {
            return Ok(ToggleAction::Removed);
        }

        match entries.insert(user_id, product_id).await {
            Ok(_) => Ok(ToggleAction::Added),
            // Lost a race with a concurrent toggle; the entry exists, which
            // is what "added" reports.
            Err(RepositoryError::Conflict(_)) => Ok(ToggleAction::Added),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove an entry the caller owns.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::EntryNotFound` when the entry is missing or
    /// owned by someone else.
    pub async fn remove(
        &self,
        user_id: UserId,
        entry_id: WishlistEntryId,
    ) -> Result<(), WishlistError> {
        let removed = WishlistRepository::new(self.pool)
            .delete_owned(entry_id, user_id)
            .await?;
        if removed {
            Ok(())
        } else {
            Err(WishlistError::EntryNotFound)
        }
    }

    /// Move an owned entry into the user's cart (quantity 1).
    ///
    /// The product must have strictly positive stock. The add-to-cart and
    /// the entry deletion are two separate statements; a failure between
    /// them leaves the product in both the cart and the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::EntryNotFound` for a missing or foreign entry
    /// and `WishlistError::OutOfStock` when stock is zero or untracked (the
    /// entry is left intact).
    pub async fn move_to_cart(
        &self,
        user_id: UserId,
        entry_id: WishlistEntryId,
        session: &Session,
    ) -> Result<(), WishlistError> {
        let entries = WishlistRepository::new(self.pool);
        let entry = entries
            .get(entry_id)
            .await?
            .filter(|e| e.user_id == user_id)
            .ok_or(WishlistError::EntryNotFound)?;

        let product = ProductRepository::new(self.pool)
            .get(entry.product_id)
            .await?
            .ok_or(WishlistError::ProductNotFound(entry.product_id))?;
        if !product.in_stock() {
            return Err(WishlistError::OutOfStock);
        }

        let cart = CartService::new(self.pool, session, CartIdentity::Authenticated(user_id));
        cart.add(entry.product_id, 1).await?;

        entries.delete_owned(entry_id, user_id).await?;
        Ok(())
    }

    /// Whether the user has this product wishlisted.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::Repository` if the query fails.
    pub async fn is_wishlisted(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, WishlistError> {
        Ok(WishlistRepository::new(self.pool)
            .exists(user_id, product_id)
            .await?)
    }

    /// The user's wishlist, joined with product data.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::Repository` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<WishlistItem>, WishlistError> {
        Ok(WishlistRepository::new(self.pool).list(user_id).await?)
    }
}
