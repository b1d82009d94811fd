//! Password-gated admin area.
//!
//! Every handler except the login form takes [`crate::middleware::RequireAdmin`].

pub mod auth;
pub mod gallery;
pub mod inquiries;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{get, post},
};

use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Build the admin router, mounted under `/admin`.
///
/// `upload_body_limit` replaces axum's default body limit on the upload
/// route only.
pub fn routes(upload_body_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/inquiries", get(inquiries::index))
        .route("/inquiries/{id}", get(inquiries::show))
        .route("/inquiries/{id}/resolve", post(inquiries::resolve))
        .route("/inquiries/{id}/delete", post(inquiries::delete))
        .route("/fix-status", get(inquiries::fix_status))
        .route("/gallery", get(gallery::index))
        .route(
            "/gallery/upload",
            post(gallery::upload).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route("/gallery/{id}/delete", post(gallery::delete))
}

/// Admin landing page.
async fn index(RequireAdmin(_session): RequireAdmin) -> Redirect {
    Redirect::to(inquiries::INQUIRIES_PATH)
}
