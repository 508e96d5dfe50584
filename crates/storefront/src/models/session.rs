//! Session-related types.
//!
//! Types stored in the session: the logged-in identity and, for anonymous
//! visitors, the session cart.

use serde::{Deserialize, Serialize};

use voltbay_core::UserId;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Login handle, for display.
    pub username: String,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the anonymous session cart (product id -> quantity map).
    pub const CART: &str = "cart";
}
