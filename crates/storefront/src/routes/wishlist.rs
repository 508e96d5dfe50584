//! Wishlist route handlers.
//!
//! Every endpoint here requires a logged-in user; anonymous visitors get
//! redirected to login (pages) or a 401 (API calls). The toggle and
//! move-to-cart endpoints answer JSON for the storefront buttons.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use voltbay_core::{ProductId, WishlistEntryId, format_usd};

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::wishlist::WishlistItem;
use crate::services::wishlist::WishlistService;
use crate::state::AppState;

/// Wishlist entry display data for templates.
#[derive(Clone)]
pub struct WishlistItemView {
    pub entry_id: String,
    pub product_id: String,
    pub name: String,
    pub price: String,
    pub image_path: Option<String>,
    pub in_stock: bool,
}

impl From<&WishlistItem> for WishlistItemView {
    fn from(item: &WishlistItem) -> Self {
        Self {
            entry_id: item.entry.id.to_string(),
            product_id: item.product.id.to_string(),
            name: item.product.name.clone(),
            price: format_usd(item.product.unit_price()),
            image_path: item.product.image_path.clone(),
            in_stock: item.product.in_stock(),
        }
    }
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistShowTemplate {
    pub username: Option<String>,
    pub items: Vec<WishlistItemView>,
}

/// Display the wishlist page, newest entries first.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<WishlistShowTemplate> {
    let items = WishlistService::new(state.pool()).list(user.id).await?;

    Ok(WishlistShowTemplate {
        username: Some(user.username),
        items: items.iter().map(Into::into).collect(),
    })
}

/// Toggle wishlist membership for a product.
///
/// Answers which way the toggle went so the button can update its state.
#[instrument(skip(state))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Value>> {
    let action = WishlistService::new(state.pool())
        .toggle(user.id, product_id)
        .await?;

    Ok(Json(json!({"status": "success", "action": action})))
}

/// Remove an entry the caller owns.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(entry_id): Path<WishlistEntryId>,
) -> Result<Json<Value>> {
    WishlistService::new(state.pool())
        .remove(user.id, entry_id)
        .await?;

    Ok(Json(json!({"status": "success"})))
}

/// Move an owned entry into the cart (quantity 1).
///
/// Out-of-stock products answer 400 and stay on the wishlist.
#[instrument(skip(state, session))]
pub async fn move_to_cart(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(entry_id): Path<WishlistEntryId>,
) -> Result<Json<Value>> {
    WishlistService::new(state.pool())
        .move_to_cart(user.id, entry_id, &session)
        .await?;

    Ok(Json(json!({"status": "success"})))
}

/// Membership check for the product-page wishlist button.
#[instrument(skip(state))]
pub async fn status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Value>> {
    let wishlisted = WishlistService::new(state.pool())
        .is_wishlisted(user.id, product_id)
        .await?;

    Ok(Json(json!({"is_wishlisted": wishlisted})))
}
