//! Business-logic services.
//!
//! Services sit between the route handlers and the repositories. The cart
//! service is the interesting one: it presents a uniform cart abstraction
//! over the session map and the persisted rows and reconciles them at the
//! anonymous-to-authenticated boundary.

pub mod auth;
pub mod cart;
pub mod reviews;
pub mod wishlist;
