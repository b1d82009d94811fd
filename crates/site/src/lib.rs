//! UCPL library website.
//!
//! This crate provides the site as a library so the router can be built and
//! exercised in tests without a running database or mail server.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod programs;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Request, header::CACHE_CONTROL},
};
use tower::ServiceBuilder;
use tower_http::{
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tower_sessions::SessionStore;
use tracing::Level;

use crate::models::GALLERY_URL_PREFIX;
use crate::state::AppState;

/// Cache policy for the stylesheet, whose URL carries a content hash.
const STATIC_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Cache policy for gallery images. Names are never reused, but an image can
/// be deleted.
const GALLERY_CACHE_CONTROL: &str = "public, max-age=86400";

/// Build the complete application router.
///
/// Layers, outermost first: tracing span, request id, security headers,
/// session. Static assets and gallery images are served from the
/// configured directories.
pub fn app<S>(state: AppState, store: S) -> Router
where
    S: SessionStore + Clone,
{
    let config = state.config();
    let session_layer = middleware::create_session_layer(store, config);
    let static_files = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(STATIC_CACHE_CONTROL),
        ))
        .service(ServeDir::new(&config.static_dir));
    let gallery_files = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(GALLERY_CACHE_CONTROL),
        ))
        .service(ServeDir::new(&config.gallery_dir));
    let upload_body_limit = state.gallery().limits().max_body_bytes();

    Router::new()
        .merge(routes::routes(upload_body_limit))
        .nest_service("/static", static_files)
        .nest_service(GALLERY_URL_PREFIX, gallery_files)
        .fallback(routes::pages::not_found)
        .layer(session_layer)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                    )
                })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
