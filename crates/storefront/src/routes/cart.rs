//! Cart route handlers.
//!
//! Cart operations work for both identities: anonymous carts live in the
//! session, authenticated carts in Postgres. Handlers resolve the identity
//! explicitly and hand it to the cart service; mutation endpoints either
//! return small JSON payloads (for the storefront JS) or redirect back to
//! the cart page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Path, State},
    response::Redirect,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use voltbay_core::{ProductId, format_usd};

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::cart::CartItem;
use crate::services::cart::{CartService, CartStore, identity_of};
use crate::state::AppState;

/// Tax rate applied on the cart page (10%).
const TAX_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub image_path: Option<String>,
    pub quantity: i64,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product.id.to_string(),
            name: item.product.name.clone(),
            image_path: item.product.image_path.clone(),
            quantity: item.quantity,
            unit_price: format_usd(item.product.unit_price()),
            line_total: format_usd(item.line_total()),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

impl CartView {
    /// Build the cart page numbers from resolved items.
    fn build(items: &[CartItem]) -> Self {
        let subtotal: Decimal = items.iter().map(CartItem::line_total).sum();
        let tax = (subtotal * TAX_RATE).round_dp(2);

        Self {
            items: items.iter().map(Into::into).collect(),
            subtotal: format_usd(subtotal),
            tax: format_usd(tax),
            total: format_usd(subtotal + tax),
        }
    }
}

/// Add-to-cart JSON body.
#[derive(Debug, Deserialize)]
pub struct AddToCartBody {
    pub product_id: ProductId,
    pub quantity: Option<i64>,
}

/// Update-cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub quantity: Option<i64>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub username: Option<String>,
    pub cart: CartView,
}

/// Display the cart page with subtotal, tax, and grand total.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<CartShowTemplate> {
    let cart = CartService::new(state.pool(), &session, identity_of(user.as_ref()));
    let items = cart.items().await?;

    Ok(CartShowTemplate {
        username: user.map(|u| u.username),
        cart: CartView::build(&items),
    })
}

/// Add a line to the cart.
///
/// Quantity defaults to 1; quantities outside the representable line range
/// come back as a 400 with a field error.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(body): Json<AddToCartBody>,
) -> Result<Json<Value>> {
    let cart = CartService::new(state.pool(), &session, identity_of(user.as_ref()));
    cart.add(body.product_id, body.quantity.unwrap_or(1)).await?;

    Ok(Json(json!({"status": "success"})))
}

/// Set the absolute quantity for a product; zero or less removes the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(product_id): Path<ProductId>,
    Form(form): Form<UpdateCartForm>,
) -> Result<Redirect> {
    let cart = CartService::new(state.pool(), &session, identity_of(user.as_ref()));
    cart.update(product_id, form.quantity.unwrap_or(1)).await?;

    Ok(Redirect::to("/cart"))
}

/// Remove a line. Removing a product not in the cart is a no-op.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Redirect> {
    let cart = CartService::new(state.pool(), &session, identity_of(user.as_ref()));
    cart.remove(product_id).await?;

    Ok(Redirect::to("/cart"))
}

/// Item count for the cart badge.
#[instrument(skip(state, session))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<Value>> {
    let cart = CartService::new(state.pool(), &session, identity_of(user.as_ref()));
    let count = cart.count().await?;

    Ok(Json(json!({"count": count})))
}
