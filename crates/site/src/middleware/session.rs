//! Session middleware configuration.
//!
//! Sessions are stored server-side (`PostgreSQL` in production, memory in
//! tests) and identified by a signed cookie.

use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::SiteConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "ucpl_session";

/// Create the session layer over `store`.
///
/// The cookie signing key is derived from `SESSION_SECRET`. Idle sessions
/// expire after `SESSION_MAX_AGE_SECS`; a successful admin login pins the
/// expiry to a fixed time instead.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &SiteConfig) -> SessionManagerLayer<S, SignedCookie>
where
    S: SessionStore + Clone,
{
    let max_age = i64::try_from(config.session_max_age.as_secs()).unwrap_or(i64::MAX);

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(max_age),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(config.session_secret.expose_secret()))
}

/// Derive a 64-byte cookie key from the configured secret.
fn signing_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}
