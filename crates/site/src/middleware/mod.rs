//! HTTP middleware stack for the site.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors and transactions)
//! 2. `TraceLayer` (`http_request` span)
//! 3. Request ID (record on span, echo in response)
//! 4. Security headers
//! 5. Session layer (tower-sessions, signed cookie)
//!
//! Admin routes additionally use the [`RequireAdmin`] extractor.

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{AdminRejection, LOGIN_PATH, RequireAdmin};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
