//! Persisted cart repository.
//!
//! All mutations are single statements so that two concurrent requests from
//! the same user (two browser tabs adding the same product) cannot lose an
//! increment: the add path is an `INSERT .. ON CONFLICT .. DO UPDATE` against
//! the partial unique index on active (user, product) pairs.

use sqlx::PgPool;

use voltbay_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::CartItem;
use crate::models::product::Product;

/// A `cart_line` row joined with its product.
#[derive(sqlx::FromRow)]
struct CartLineRow {
    quantity: i32,
    #[sqlx(flatten)]
    product: Product,
}

/// Narrow a quantity to the `INT4` column type.
///
/// Callers validate range before reaching the repository; an
/// unrepresentable value here is a caller bug and must fail, never be
/// substituted with a different quantity.
fn bind_quantity(quantity: i64) -> Result<i32, RepositoryError> {
    i32::try_from(quantity)
        .map_err(|_| RepositoryError::InvalidArgument(format!("quantity {quantity} out of range")))
}

/// Repository for persisted cart lines.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add `quantity` units to the active line for (user, product), creating
    /// the line if it does not exist. Returns the resulting quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidArgument` if `quantity` does not fit
    /// the column. Returns `RepositoryError::Database` if the statement
    /// fails (including the quantity CHECK when `quantity` is not positive).
    pub async fn add_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<i64, RepositoryError> {
        let (new_quantity,): (i32,) = sqlx::query_as(
            "INSERT INTO storefront.cart_line (user_id, product_id, quantity) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, product_id) WHERE is_active \
             DO UPDATE SET quantity = cart_line.quantity + EXCLUDED.quantity \
             RETURNING quantity",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(bind_quantity(quantity)?)
        .fetch_one(self.pool)
        .await?;

        Ok(i64::from(new_quantity))
    }

    /// Set the absolute quantity for (user, product).
    ///
    /// A quantity of zero or less deletes the line (without an audit record;
    /// the user zeroed it from the cart page rather than removing it).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidArgument` if `quantity` does not fit
    /// the column. Returns `RepositoryError::Database` if the statement
    /// fails.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        if quantity <= 0 {
            sqlx::query(
                "DELETE FROM storefront.cart_line \
                 WHERE user_id = $1 AND product_id = $2 AND is_active",
            )
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO storefront.cart_line (user_id, product_id, quantity) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, product_id) WHERE is_active \
             DO UPDATE SET quantity = EXCLUDED.quantity",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(bind_quantity(quantity)?)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete the active line for (user, product), snapshotting it into the
    /// `deleted_item` audit trail. A missing line is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
        reason: Option<&str>,
    ) -> Result<(), RepositoryError> {
        // Delete and audit in one statement so the snapshot always matches
        // the removed row.
        sqlx::query(
            "WITH removed AS ( \
                 DELETE FROM storefront.cart_line \
                 WHERE user_id = $1 AND product_id = $2 AND is_active \
                 RETURNING user_id, product_id, quantity \
             ) \
             INSERT INTO storefront.deleted_item (user_id, product_id, quantity, reason) \
             SELECT user_id, product_id, quantity, $3 FROM removed",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(reason)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// List the user's cart lines joined with product data, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            "SELECT p.*, cl.quantity \
             FROM storefront.cart_line cl \
             JOIN storefront.product p ON p.id = cl.product_id \
             WHERE cl.user_id = $1 AND cl.is_active \
             ORDER BY cl.created_at ASC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CartItem {
                product: r.product,
                quantity: i64::from(r.quantity),
            })
            .collect())
    }

    /// Total units across the user's active lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total_count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT \
             FROM storefront.cart_line \
             WHERE user_id = $1 AND is_active",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_quantity_refuses_unrepresentable_values() {
        assert_eq!(bind_quantity(1).unwrap(), 1);
        assert_eq!(bind_quantity(i64::from(i32::MAX)).unwrap(), i32::MAX);

        for q in [-5_000_000_000, i64::from(i32::MAX) + 1, i64::MIN] {
            assert!(matches!(
                bind_quantity(q),
                Err(RepositoryError::InvalidArgument(_))
            ));
        }
    }
}
