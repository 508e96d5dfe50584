//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page (all products)
//! GET  /health                  - Health check
//!
//! # Catalog
//! GET  /products                - Active products (?q= search, ?category= filter)
//! GET  /product/{id}            - Product detail with reviews
//! POST /product/{id}            - Review submission (form, redirects back)
//! POST /product/{id}/review     - Review submission (AJAX, JSON)
//!
//! # Cart
//! GET  /cart                    - Cart page (subtotal, tax, total)
//! POST /add_to_cart             - Add line (JSON body: product_id, quantity)
//! POST /cart/update/{id}        - Set absolute quantity (form), redirect /cart
//! POST /cart/remove/{id}        - Remove line, redirect /cart
//! GET  /api/cart/count          - Item count for the current identity (JSON)
//!
//! # Wishlist (requires auth)
//! GET  /wishlist                - Wishlist page
//! POST /wishlist/add/{id}       - Toggle membership (JSON)
//! POST /wishlist/remove/{id}    - Remove entry, ownership-checked (JSON)
//! POST /wishlist/move-to-cart/{id} - Move entry to cart (JSON, 400 if out of stock)
//! GET  /wishlist/status/{id}    - Membership check (JSON)
//!
//! # Auth
//! GET  /sign-up                 - Signup page
//! POST /sign-up                 - Signup action (logs in, merges session cart)
//! GET  /login                   - Login page
//! POST /login                   - Login action (merges session cart)
//! POST /logout                  - Logout action
//! GET  /profile                 - Profile page (requires auth)
//!
//! # Pages
//! GET  /about, /contact, /policy - Static pages
//! GET  /checkout                - Checkout stub page
//! ```

pub mod auth;
pub mod cart;
pub mod home;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router (mounted at the root; the paths are part of
/// the public JS contract).
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/add_to_cart", post(cart::add))
        .route("/cart/update/{product_id}", post(cart::update))
        .route("/cart/remove/{product_id}", post(cart::remove))
        .route("/api/cart/count", get(cart::count))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add/{product_id}", post(wishlist::toggle))
        .route("/remove/{entry_id}", post(wishlist::remove))
        .route("/move-to-cart/{entry_id}", post(wishlist::move_to_cart))
        .route("/status/{product_id}", get(wishlist::status))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-up", get(auth::signup_page).post(auth::signup))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/profile", get(auth::profile))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home and static pages
        .route("/", get(home::index))
        .route("/about", get(home::about))
        .route("/contact", get(home::contact))
        .route("/policy", get(home::policy))
        .route("/checkout", get(home::checkout))
        // Catalog
        .route("/products", get(products::index))
        .route(
            "/product/{product_id}",
            get(products::show).post(products::submit_review_form),
        )
        .route("/product/{product_id}/review", post(products::submit_review))
        // Cart
        .merge(cart_routes())
        // Wishlist
        .nest("/wishlist", wishlist_routes())
        // Auth
        .merge(auth_routes())
}
