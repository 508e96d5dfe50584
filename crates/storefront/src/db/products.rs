//! Product repository for catalog reads.
//!
//! The catalog is read-mostly: products are written through administrative
//! tooling and the CLI seeder, so this repository only exposes lookups and
//! listing. Products are soft-deactivated, never deleted, which is why cart
//! and wishlist reads can join against `product` unconditionally.

use sqlx::PgPool;

use voltbay_core::ProductId;

use super::RepositoryError;
use crate::models::product::Product;

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM storefront.product WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// List every product, newest first (home page).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM storefront.product ORDER BY created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// List active products, optionally filtered by a case-insensitive name
    /// search and/or an exact category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(
        &self,
        search: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM storefront.product \
             WHERE is_active \
               AND ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%') \
               AND ($2::TEXT IS NULL OR category = $2) \
             ORDER BY created_at DESC",
        )
        .bind(search)
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }
}
