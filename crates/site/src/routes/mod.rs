//! HTTP route handlers for the library site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! GET  /history                   - Library history
//! GET  /collections               - Collections overview
//! GET  /policies                  - Library policies
//! GET  /contact                   - Contact details
//! GET  /programs                  - Program list
//! GET  /programs/{slug}           - Program detail
//! GET  /gallery                   - Public gallery
//! GET  /ask-a-librarian           - Ask a Librarian form
//! POST /ask-a-librarian           - Submit an inquiry
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (storage reachable)
//!
//! # Admin (password-gated)
//! GET  /admin                     - Redirect to inquiries
//! GET  /admin/login               - Login form
//! POST /admin/login               - Check password
//! POST /admin/logout              - End admin session
//! GET  /admin/inquiries           - Inquiry list (?status=new|resolved)
//! GET  /admin/inquiries/{id}      - Inquiry detail
//! POST /admin/inquiries/{id}/resolve - Mark resolved
//! POST /admin/inquiries/{id}/delete  - Delete inquiry
//! GET  /admin/fix-status          - Backfill missing statuses
//! GET  /admin/gallery             - Upload form and image list
//! POST /admin/gallery/upload      - Upload images (multipart)
//! POST /admin/gallery/{id}/delete - Delete image
//! ```

pub mod admin;
pub mod ask;
pub mod gallery;
pub mod pages;
pub mod programs;

use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::state::AppState;

/// Build the site router.
pub fn routes(upload_body_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/history", get(pages::history))
        .route("/collections", get(pages::collections))
        .route("/policies", get(pages::policies))
        .route("/contact", get(pages::contact))
        .route("/programs", get(programs::index))
        .route("/programs/{slug}", get(programs::show))
        .route("/gallery", get(gallery::index))
        .route("/ask-a-librarian", get(ask::form).post(ask::submit))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/admin", admin::routes(upload_body_limit))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if inquiry storage is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.inquiries().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
