//! Admin authentication extractor.
//!
//! Every admin handler takes [`RequireAdmin`] as an argument, so the check
//! runs before the handler body and before any form or multipart body is
//! read.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::services::AdminGate;

/// Path unauthenticated admin requests are sent to.
pub const LOGIN_PATH: &str = "/admin/login";

/// Extractor that requires an admin session.
///
/// If the session does not carry the admin flag, the request is redirected
/// to the login page and the handler never runs.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAdmin(session): RequireAdmin) -> impl IntoResponse {
///     "only admins see this"
/// }
/// ```
pub struct RequireAdmin(pub Session);

/// Error returned when an admin session is required but absent.
#[derive(Debug)]
pub struct AdminRejection;

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        Redirect::to(LOGIN_PATH).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AdminRejection)?;

        if AdminGate::is_admin(&session).await {
            Ok(Self(session))
        } else {
            tracing::debug!(path = %parts.uri.path(), "Admin session required");
            Err(AdminRejection)
        }
    }
}
