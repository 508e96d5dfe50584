//! Wishlist repository.

use sqlx::PgPool;

use voltbay_core::{ProductId, UserId, WishlistEntryId};

use super::RepositoryError;
use crate::models::product::Product;
use crate::models::wishlist::{WishlistEntry, WishlistItem};

/// A `wishlist_entry` row joined with its product.
///
/// Entry columns are aliased in the query because `id` and `created_at`
/// exist on both sides of the join.
#[derive(sqlx::FromRow)]
struct WishlistItemRow {
    entry_id: WishlistEntryId,
    entry_user_id: UserId,
    entry_created_at: chrono::DateTime<chrono::Utc>,
    #[sqlx(flatten)]
    product: Product,
}

/// Repository for wishlist entries.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an entry by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: WishlistEntryId,
    ) -> Result<Option<WishlistEntry>, RepositoryError> {
        let entry = sqlx::query_as::<_, WishlistEntry>(
            "SELECT id, user_id, product_id, created_at \
             FROM storefront.wishlist_entry WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(entry)
    }

    /// Whether the user has this product wishlisted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS ( \
                 SELECT 1 FROM storefront.wishlist_entry \
                 WHERE user_id = $1 AND product_id = $2 \
             )",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Insert an entry for (user, product).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the pair is already wishlisted.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistEntry, RepositoryError> {
        let entry = sqlx::query_as::<_, WishlistEntry>(
            "INSERT INTO storefront.wishlist_entry (user_id, product_id) \
             VALUES ($1, $2) \
             RETURNING id, user_id, product_id, created_at",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("product already wishlisted".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(entry)
    }

    /// Delete the entry for (user, product). Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn delete_by_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM storefront.wishlist_entry \
             WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an entry by ID, scoped to its owner. Returns whether a row was
    /// removed; an entry owned by someone else is indistinguishable from a
    /// missing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn delete_owned(
        &self,
        id: WishlistEntryId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM storefront.wishlist_entry \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List the user's wishlist joined with product data, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<WishlistItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistItemRow>(
            "SELECT w.id AS entry_id, w.user_id AS entry_user_id, \
                    w.created_at AS entry_created_at, p.* \
             FROM storefront.wishlist_entry w \
             JOIN storefront.product p ON p.id = w.product_id \
             WHERE w.user_id = $1 \
             ORDER BY w.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| WishlistItem {
                entry: WishlistEntry {
                    id: r.entry_id,
                    user_id: r.entry_user_id,
                    product_id: r.product.id,
                    created_at: r.entry_created_at,
                },
                product: r.product,
            })
            .collect())
    }
}
