//! Authentication route handlers.
//!
//! Handles signup, login, logout, and the profile page. Login and signup
//! finish by merging any anonymous session cart into the user's persisted
//! cart; a merge failure is logged but never blocks the login itself.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::models::user::User;
use crate::services::auth::{AuthError, AuthService, SignupRequest};
use crate::services::cart::{CartIdentity, CartService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub username: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub username: Option<String>,
    pub error: Option<String>,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/profile.html")]
pub struct ProfileTemplate {
    pub username: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    SignupTemplate {
        username: None,
        error: query.error,
    }
}

/// Handle signup form submission.
///
/// A new account is logged in immediately, after which the session cart (if
/// any) is merged into the fresh persisted cart.
#[instrument(skip(state, session, form))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    let request = SignupRequest {
        username: &form.username,
        email: &form.email,
        password: &form.password,
        password_confirm: &form.password_confirm,
        first_name: &form.first_name,
        last_name: &form.last_name,
        phone_number: form.phone_number.as_deref().filter(|p| !p.is_empty()),
    };

    match AuthService::new(state.pool()).sign_up(request).await {
        Ok(user) => establish_session(&state, &session, &user).await,
        Err(e) => {
            tracing::warn!("Signup failed: {}", e);
            let code = match e {
                AuthError::UserAlreadyExists => "username_taken",
                AuthError::InvalidUsername(_) => "invalid_username",
                AuthError::InvalidEmail(_) => "invalid_email",
                AuthError::WeakPassword(_) => "password_too_short",
                AuthError::PasswordMismatch => "password_mismatch",
                _ => "failed",
            };
            Redirect::to(&format!("/sign-up?error={code}")).into_response()
        }
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        username: None,
        error: query.error,
        success: query.success,
    }
}

/// Handle login form submission.
///
/// An unknown username takes the same error path as a wrong password.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await
    {
        Ok(user) => establish_session(&state, &session, &user).await,
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!(username = %form.username, "Login failed");
            Redirect::to("/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::error!("Login error: {}", e);
            Redirect::to("/login?error=failed").into_response()
        }
    }
}

/// Store the identity in the session, then merge the anonymous cart.
///
/// The merge is additive and best-effort: on failure the session map is
/// left in place (it re-merges on the next login) and the user is still
/// logged in.
async fn establish_session(state: &AppState, session: &Session, user: &User) -> Response {
    let current_user = CurrentUser {
        id: user.id,
        username: user.username.to_string(),
    };

    if let Err(e) = set_current_user(session, &current_user).await {
        tracing::error!("Failed to set session: {}", e);
        return Redirect::to("/login?error=session").into_response();
    }

    let cart = CartService::new(state.pool(), session, CartIdentity::Authenticated(user.id));
    if let Err(e) = cart.merge_session_cart().await {
        tracing::error!(user_id = %user.id, "Cart merge failed: {}", e);
    }

    Redirect::to("/").into_response()
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Clears the identity and destroys the session, which also discards any
/// anonymous cart map left behind.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }

    Redirect::to("/").into_response()
}

// =============================================================================
// Profile Route
// =============================================================================

/// Display the profile page.
#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ProfileTemplate, crate::error::AppError> {
    let account = AuthService::new(state.pool()).get_user(user.id).await?;

    Ok(ProfileTemplate {
        username: Some(account.username.to_string()),
        email: account.email.to_string(),
        first_name: account.first_name,
        last_name: account.last_name,
        phone_number: account.phone_number,
    })
}
