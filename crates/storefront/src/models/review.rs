//! Product review types and rating aggregation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use voltbay_core::{ProductId, ReviewId, UserId};

/// A product review, joined with the author's username for display.
///
/// Reviews are append-only from the user's perspective. Every review
/// submitted through the storefront is flagged as a verified purchase
/// unconditionally; no purchase-history check is performed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductReview {
    /// Unique review ID.
    pub id: ReviewId,
    /// Reviewed product.
    pub product_id: ProductId,
    /// Review author.
    pub user_id: UserId,
    /// Author username (joined for display).
    pub username: String,
    /// Star rating, 1 to 5.
    pub rating: i16,
    /// Review text.
    pub body: String,
    /// Verified-purchase flag.
    pub verified_purchase: bool,
    /// When the review was submitted.
    pub created_at: DateTime<Utc>,
}

/// Average of the given ratings, zero when there are none.
///
/// Callers pass verified-purchase ratings only; unverified reviews never
/// count toward the displayed average.
#[must_use]
pub fn average_rating(ratings: &[i16]) -> Decimal {
    if ratings.is_empty() {
        return Decimal::ZERO;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    (Decimal::from(sum) / Decimal::from(ratings.len())).round_dp(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_of_verified_ratings() {
        assert_eq!(average_rating(&[5, 3, 4]), Decimal::new(40, 1));
    }

    #[test]
    fn test_average_defaults_to_zero() {
        assert_eq!(average_rating(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_average_rounds_to_one_place() {
        assert_eq!(average_rating(&[5, 4]), Decimal::new(45, 1));
        assert_eq!(average_rating(&[5, 5, 4]), Decimal::new(47, 1));
    }
}
