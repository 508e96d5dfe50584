//! Review submission and aggregation service.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use sqlx::PgPool;

use voltbay_core::{ProductId, ReviewId, UserId};

use crate::db::RepositoryError;
use crate::db::products::ProductRepository;
use crate::db::reviews::ReviewRepository;
use crate::models::review::{ProductReview, average_rating};

/// Maximum review body length.
const MAX_BODY_LENGTH: usize = 4000;

/// Errors from review operations.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// Referenced product does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Field-level validation failures: field name -> problem.
    #[error("validation failed")]
    Validation(BTreeMap<String, String>),

    /// Database failure.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A product's reviews together with their aggregates.
#[derive(Debug, Clone)]
pub struct ReviewSummary {
    /// Verified-purchase reviews, newest first.
    pub reviews: Vec<ProductReview>,
    /// Average rating over those reviews, zero when none.
    pub average: Decimal,
}

impl ReviewSummary {
    /// Number of reviews in the summary.
    #[must_use]
    pub fn count(&self) -> usize {
        self.reviews.len()
    }
}

/// Review service.
pub struct ReviewService<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewService<'a> {
    /// Create a new review service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Submit a review for a product.
    ///
    /// Requires an authenticated user (enforced at the route layer). Every
    /// submission is stored as a verified purchase.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Validation` with field errors for an
    /// out-of-range rating or empty/oversized body, and
    /// `ReviewError::ProductNotFound` for an unknown product.
    pub async fn submit(
        &self,
        user_id: UserId,
        product_id: ProductId,
        rating: i16,
        body: &str,
    ) -> Result<ReviewId, ReviewError> {
        let body = body.trim();
        validate_review(rating, body)?;

        let products = ProductRepository::new(self.pool);
        if products.get(product_id).await?.is_none() {
            return Err(ReviewError::ProductNotFound(product_id));
        }

        Ok(ReviewRepository::new(self.pool)
            .insert(product_id, user_id, rating, body)
            .await?)
    }

    /// Verified-purchase reviews for a product plus their average rating.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Repository` if the query fails.
    pub async fn summary(&self, product_id: ProductId) -> Result<ReviewSummary, ReviewError> {
        let reviews = ReviewRepository::new(self.pool)
            .list_verified(product_id)
            .await?;
        let ratings: Vec<i16> = reviews.iter().map(|r| r.rating).collect();

        Ok(ReviewSummary {
            average: average_rating(&ratings),
            reviews,
        })
    }
}

/// Validate a review submission, collecting field errors.
fn validate_review(rating: i16, body: &str) -> Result<(), ReviewError> {
    let mut errors = BTreeMap::new();

    if !(1..=5).contains(&rating) {
        errors.insert(
            "rating".to_owned(),
            "Rating must be between 1 and 5".to_owned(),
        );
    }
    if body.is_empty() {
        errors.insert("body".to_owned(), "Review text cannot be empty".to_owned());
    } else if body.len() > MAX_BODY_LENGTH {
        errors.insert(
            "body".to_owned(),
            format!("Review text must be at most {MAX_BODY_LENGTH} characters"),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ReviewError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_review() {
        assert!(validate_review(4, "Solid keyboard.").is_ok());
    }

    #[test]
    fn test_rating_out_of_range() {
        let Err(ReviewError::Validation(errors)) = validate_review(0, "ok") else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("rating"));

        let Err(ReviewError::Validation(errors)) = validate_review(6, "ok") else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("rating"));
    }

    #[test]
    fn test_empty_body() {
        // The service trims before validating, so whitespace-only ends up empty.
        let Err(ReviewError::Validation(errors)) = validate_review(3, "   ".trim()) else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("body"));
    }

    #[test]
    fn test_oversized_body() {
        let long = "a".repeat(MAX_BODY_LENGTH + 1);
        let Err(ReviewError::Validation(errors)) = validate_review(3, &long) else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("body"));
    }

    #[test]
    fn test_collects_multiple_field_errors() {
        let Err(ReviewError::Validation(errors)) = validate_review(9, "") else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 2);
    }
}
