//! Product review repository.

use sqlx::PgPool;

use voltbay_core::{ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::review::ProductReview;

/// Repository for product reviews.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a review.
    ///
    /// Every storefront submission is stored as a verified purchase; there is
    /// no purchase-history check behind the flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails (including
    /// the rating range CHECK).
    pub async fn insert(
        &self,
        product_id: ProductId,
        user_id: UserId,
        rating: i16,
        body: &str,
    ) -> Result<ReviewId, RepositoryError> {
        let (id,): (ReviewId,) = sqlx::query_as(
            "INSERT INTO storefront.product_review \
                 (product_id, user_id, rating, body, verified_purchase) \
             VALUES ($1, $2, $3, $4, TRUE) \
             RETURNING id",
        )
        .bind(product_id)
        .bind(user_id)
        .bind(rating)
        .bind(body)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// List verified-purchase reviews for a product, newest first, joined
    /// with the author's username.
    ///
    /// Unverified rows are excluded here rather than at display time so the
    /// average rating is computed over the same set the page shows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_verified(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductReview>, RepositoryError> {
        let reviews = sqlx::query_as::<_, ProductReview>(
            "SELECT r.id, r.product_id, r.user_id, u.username, r.rating, \
                    r.body, r.verified_purchase, r.created_at \
             FROM storefront.product_review r \
             JOIN storefront.users u ON u.id = r.user_id \
             WHERE r.product_id = $1 AND r.verified_purchase \
             ORDER BY r.created_at DESC",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(reviews)
    }
}
