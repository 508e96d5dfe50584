//! Catalog route handlers: product listing, search, detail, reviews.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use voltbay_core::{ProductId, format_usd};

use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::product::Product;
use crate::models::review::ProductReview;
use crate::services::cart::{CartService, CartStore, identity_of};
use crate::services::reviews::ReviewService;
use crate::state::AppState;

/// Product card display data for listing templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub image_path: Option<String>,
    pub in_stock: bool,
    /// Units of this product already in the viewer's cart.
    pub cart_quantity: i64,
}

impl From<Product> for ProductCardView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: format_usd(product.unit_price()),
            category: product.category.clone().unwrap_or_default(),
            image_path: product.image_path.clone(),
            in_stock: product.in_stock(),
            cart_quantity: 0,
        }
    }
}

/// Review display data for the detail template.
#[derive(Clone)]
pub struct ReviewView {
    pub username: String,
    pub rating: i16,
    pub body: String,
    pub submitted_on: String,
}

impl From<&ProductReview> for ReviewView {
    fn from(review: &ProductReview) -> Self {
        Self {
            username: review.username.clone(),
            rating: review.rating,
            body: review.body.clone(),
            submitted_on: review.created_at.format("%B %-d, %Y").to_string(),
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub category: Option<String>,
}

/// Review form data (both the form and the AJAX endpoint).
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub rating: i16,
    pub body: String,
}

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductIndexTemplate {
    pub username: Option<String>,
    pub products: Vec<ProductCardView>,
    pub query: String,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub username: Option<String>,
    pub product: ProductCardView,
    pub reviews: Vec<ReviewView>,
    pub average_rating: String,
    pub review_count: usize,
}

/// Active products with the viewer's cart quantity per product.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: tower_sessions::Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<ListingQuery>,
) -> Result<ProductIndexTemplate> {
    let products = ProductRepository::new(state.pool())
        .list_active(query.q.as_deref(), query.category.as_deref())
        .await?;

    // Annotate each card with how many units are already in the cart.
    let cart = CartService::new(state.pool(), &session, identity_of(user.as_ref()));
    let cart_items = cart.items().await?;

    let cards = products
        .into_iter()
        .map(|product| {
            let quantity = cart_items
                .iter()
                .find(|item| item.product.id == product.id)
                .map_or(0, |item| item.quantity);
            let mut card = ProductCardView::from(product);
            card.cart_quantity = quantity;
            card
        })
        .collect();

    Ok(ProductIndexTemplate {
        username: user.map(|u| u.username),
        products: cards,
        query: query.q.unwrap_or_default(),
    })
}

/// Product detail page with verified-purchase reviews.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(product_id): Path<ProductId>,
) -> Result<ProductShowTemplate> {
    let product = ProductRepository::new(state.pool())
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id} not found")))?;

    let summary = ReviewService::new(state.pool()).summary(product_id).await?;

    Ok(ProductShowTemplate {
        username: user.map(|u| u.username),
        product: product.into(),
        reviews: summary.reviews.iter().map(Into::into).collect(),
        average_rating: format!("{:.1}", summary.average),
        review_count: summary.count(),
    })
}

/// Review submission from the detail page form; redirects back on success.
#[instrument(skip(state))]
pub async fn submit_review_form(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(product_id): Path<ProductId>,
    Form(form): Form<ReviewForm>,
) -> Result<Redirect> {
    let user = user.ok_or_else(|| {
        AppError::Unauthorized("you must be logged in to review".to_owned())
    })?;

    ReviewService::new(state.pool())
        .submit(user.id, product_id, form.rating, &form.body)
        .await?;

    Ok(Redirect::to(&format!("/product/{product_id}")))
}

/// AJAX review submission; `{status}` on success, 400 with field errors.
#[instrument(skip(state))]
pub async fn submit_review(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(product_id): Path<ProductId>,
    Json(form): Json<ReviewForm>,
) -> Result<Json<Value>> {
    let user = user.ok_or_else(|| {
        AppError::Unauthorized("you must be logged in to review".to_owned())
    })?;

    ReviewService::new(state.pool())
        .submit(user.id, product_id, form.rating, &form.body)
        .await?;

    Ok(Json(json!({"status": "success"})))
}
