//! Database operations for storefront `PostgreSQL`.
//!
//! # Tables (schema `storefront`)
//!
//! - `users` - Site authentication
//! - `product` - Catalog (read-mostly; soft-deactivated, never deleted)
//! - `cart_line` - Persisted cart rows, one active row per (user, product)
//! - `wishlist_entry` - Saved-for-later products
//! - `product_review` - Append-only reviews
//! - `deleted_item` - Audit trail of removed cart lines
//! - `sessions` - Tower-sessions storage (public schema)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p voltbay-cli -- migrate storefront
//! ```
//!
//! Repositories use the runtime sqlx query API with `FromRow` row types, so
//! the crate builds without a live database.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod cart;
pub mod products;
pub mod reviews;
pub mod users;
pub mod wishlist;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Caller-supplied value the schema cannot represent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
