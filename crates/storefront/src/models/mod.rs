//! Domain types for the storefront.

pub mod cart;
pub mod product;
pub mod review;
pub mod session;
pub mod user;
pub mod wishlist;

pub use cart::{CartItem, SessionCart};
pub use product::Product;
pub use review::ProductReview;
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
pub use wishlist::{WishlistEntry, WishlistItem};
