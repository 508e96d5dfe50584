//! Core types for Voltbay.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod username;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::format_usd;
pub use username::{Username, UsernameError};
