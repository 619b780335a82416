//! Session middleware configuration.
//!
//! The cart lives in the visitor's session, so every route that touches it
//! needs this layer. Production uses the `PostgreSQL` store from
//! `tower-sessions-sqlx-store`; tests plug in `MemoryStore`.

use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::StoreConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "myshop_session";

/// Session expiry time in seconds (2 weeks).
const SESSION_EXPIRY_SECONDS: i64 = 14 * 24 * 60 * 60;

/// Create the session layer around `store`.
///
/// Sessions expire after two weeks of inactivity. Cookies are `Secure` when
/// the public base URL is HTTPS.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &StoreConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
