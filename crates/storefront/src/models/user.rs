//! User domain types.
//!
//! These types represent validated domain objects separate from database row
//! types; repositories parse raw rows into them.

use chrono::{DateTime, Utc};
use voltbay_core::{Email, UserId, Username};

/// A storefront user (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login handle.
    pub username: Username,
    /// User's email address.
    pub email: Email,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Optional phone number, stored as entered.
    pub phone_number: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
