//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The session
//! carries both the login identity and the anonymous cart, so it must exist
//! before any cart operation.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "vb_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// The session cookie is signed with a key derived from the configured
/// session secret, so a tampered cookie is rejected instead of resolving to
/// a foreign session.
///
/// # Panics
///
/// Panics if the secret is shorter than 32 bytes; configuration loading
/// enforces that minimum before this is called.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    // Note: The sessions table must be created via migration
    let store = PostgresStore::new(pool.clone());
    let key = Key::derive_from(config.session_secret.expose_secret().as_bytes());

    SessionManagerLayer::new(store)
        .with_signed(key)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use secrecy::SecretString;

    use super::*;

    #[tokio::test]
    async fn test_layer_builds_with_configured_secret() {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/voltbay"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            base_url: "https://shop.voltbay.dev".to_owned(),
            session_secret: SecretString::from("k".repeat(48)),
            sentry_dsn: None,
            sentry_environment: None,
        };
        let pool = PgPool::connect_lazy("postgres://localhost/voltbay").unwrap();

        // Key derivation must accept any secret that passes config loading.
        let _layer = create_session_layer(&pool, &config);
    }
}
