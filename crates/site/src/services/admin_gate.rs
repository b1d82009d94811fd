//! Admin Gate: the shared-password privilege check for the admin area.
//!
//! A single secret from configuration guards every `/admin` route. A correct
//! password raises the `is_admin` flag on the caller's session; the flag is
//! all the [`RequireAdmin`](crate::middleware::RequireAdmin) extractor looks at.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tower_sessions::{Expiry, Session};
use tower_sessions::cookie::time::{self, OffsetDateTime};

use crate::models::session_keys;

/// Errors that can occur during admin authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The provided password did not match.
    #[error("invalid credential")]
    InvalidCredential,

    /// The session store failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Admin Gate.
#[derive(Clone)]
pub struct AdminGate {
    secret: SecretString,
    max_age: Duration,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("secret", &"[REDACTED]")
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl AdminGate {
    /// Create a gate for `secret`. Sessions raised by it last `max_age`.
    #[must_use]
    pub const fn new(secret: SecretString, max_age: Duration) -> Self {
        Self { secret, max_age }
    }

    /// Check `provided` against the configured secret.
    ///
    /// On success the session id is cycled, the admin flag is set, and the
    /// session is pinned to expire `max_age` from now. On failure the session
    /// is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredential` on mismatch, or
    /// `AuthError::Session` if the session cannot be updated.
    pub async fn login(&self, session: &Session, provided: &str) -> Result<(), AuthError> {
        if provided != self.secret.expose_secret() {
            tracing::warn!("Admin login failed");
            return Err(AuthError::InvalidCredential);
        }

        session.cycle_id().await?;
        session.insert(session_keys::IS_ADMIN, true).await?;
        session.set_expiry(Some(Expiry::AtDateTime(self.expires_at())));

        tracing::info!("Admin logged in");
        Ok(())
    }

    /// Destroy the session server-side.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the store cannot delete the session.
    pub async fn logout(&self, session: &Session) -> Result<(), AuthError> {
        session.flush().await?;
        tracing::info!("Admin logged out");
        Ok(())
    }

    /// Whether the session carries the admin flag.
    ///
    /// Session store failures count as "not an admin".
    pub async fn is_admin(session: &Session) -> bool {
        session
            .get::<bool>(session_keys::IS_ADMIN)
            .await
            .ok()
            .flatten()
            .unwrap_or(false)
    }

    fn expires_at(&self) -> OffsetDateTime {
        let secs = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        OffsetDateTime::now_utc().saturating_add(time::Duration::seconds(secs))
    }
}
