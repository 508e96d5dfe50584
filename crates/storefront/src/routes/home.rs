//! Home page and static page handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub username: Option<String>,
    pub products: Vec<ProductCardView>,
}

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub username: Option<String>,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub username: Option<String>,
}

/// Policy page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/policy.html")]
pub struct PolicyTemplate {
    pub username: Option<String>,
}

/// Checkout stub template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/checkout.html")]
pub struct CheckoutTemplate {
    pub username: Option<String>,
}

/// Display the home page with the full catalog.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<IndexTemplate> {
    let products = crate::db::products::ProductRepository::new(state.pool())
        .list_all()
        .await?;

    Ok(IndexTemplate {
        username: user.map(|u| u.username),
        products: products.into_iter().map(Into::into).collect(),
    })
}

/// Display the about page.
pub async fn about(OptionalAuth(user): OptionalAuth) -> AboutTemplate {
    AboutTemplate {
        username: user.map(|u| u.username),
    }
}

/// Display the contact page.
pub async fn contact(OptionalAuth(user): OptionalAuth) -> ContactTemplate {
    ContactTemplate {
        username: user.map(|u| u.username),
    }
}

/// Display the policy page.
pub async fn policy(OptionalAuth(user): OptionalAuth) -> PolicyTemplate {
    PolicyTemplate {
        username: user.map(|u| u.username),
    }
}

/// Display the checkout stub page.
///
/// Checkout is not implemented; this page only summarizes the next steps.
pub async fn checkout(OptionalAuth(user): OptionalAuth) -> CheckoutTemplate {
    CheckoutTemplate {
        username: user.map(|u| u.username),
    }
}
