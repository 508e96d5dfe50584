//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-class errors to
//! Sentry before responding to the client. Route handlers return
//! `Result<T, AppError>`; the error kinds are a closed enumeration mapped
//! onto the HTTP taxonomy (not-found, validation, business-rule,
//! unauthorized, internal) instead of a broad catch-all.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::services::reviews::ReviewError;
use crate::services::wishlist::WishlistError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Referenced resource does not exist (or is not owned by the caller).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request data failed validation; field name -> problem.
    #[error("Validation failed")]
    Validation(BTreeMap<String, String>),

    /// A business rule rejected the request (e.g. out of stock).
    #[error("Business rule: {0}")]
    BusinessRule(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Session store failure.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("resource not found".to_owned()),
            RepositoryError::InvalidArgument(msg) => Self::BusinessRule(msg),
            other => Self::Database(other),
        }
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ProductNotFound(id) => Self::NotFound(format!("product {id} not found")),
            CartError::InvalidQuantity(q) => Self::Validation(BTreeMap::from([(
                "quantity".to_owned(),
                format!("quantity must be between 1 and {}, got {q}", i32::MAX),
            )])),
            CartError::Session(e) => Self::Session(e),
            CartError::Repository(e) => e.into(),
        }
    }
}

impl From<WishlistError> for AppError {
    fn from(err: WishlistError) -> Self {
        match err {
            WishlistError::EntryNotFound => {
                Self::NotFound("wishlist entry not found".to_owned())
            }
            WishlistError::ProductNotFound(id) => {
                Self::NotFound(format!("product {id} not found"))
            }
            WishlistError::OutOfStock => {
                Self::BusinessRule("product is out of stock".to_owned())
            }
            WishlistError::Cart(e) => e.into(),
            WishlistError::Repository(e) => e.into(),
        }
    }
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::ProductNotFound(id) => {
                Self::NotFound(format!("product {id} not found"))
            }
            ReviewError::Validation(errors) => Self::Validation(errors),
            ReviewError::Repository(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_) | Self::Session(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Session(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::InvalidUsername(_)
                | AuthError::InvalidEmail(_)
                | AuthError::WeakPassword(_)
                | AuthError::PasswordMismatch => StatusCode::BAD_REQUEST,
                AuthError::Hash(_) | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::BusinessRule(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        };

        // Don't expose internal error details to clients
        let body = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Session(_) => {
                json!({"status": "error", "message": "Internal server error"})
            }
            Self::Validation(errors) => json!({"status": "error", "errors": errors}),
            Self::Auth(err) => json!({"status": "error", "message": err.user_message()}),
            other => json!({"status": "error", "message": other.to_string()}),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::BusinessRule("product is out of stock".to_string());
        assert_eq!(err.to_string(), "Business rule: product is out of stock");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Validation(BTreeMap::new())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::BusinessRule("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_maps_from_repository() {
        let err: AppError = RepositoryError::NotFound.into();
        assert_eq!(get_status(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_quantity_is_validation() {
        let err: AppError = CartError::InvalidQuantity(-5_000_000_000).into();
        assert!(matches!(
            &err,
            AppError::Validation(fields) if fields.contains_key("quantity")
        ));
        assert_eq!(get_status(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_out_of_stock_is_400() {
        let err: AppError = WishlistError::OutOfStock.into();
        assert_eq!(get_status(err), StatusCode::BAD_REQUEST);
    }
}
