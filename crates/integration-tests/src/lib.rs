//! Integration tests for the UCPL library website.
//!
//! Tests drive the complete router from [`ucpl_site::app`] in-process with
//! `tower::ServiceExt::oneshot`. Inquiries and gallery records live in the
//! in-memory repositories, sessions in a `MemoryStore`, and gallery files in
//! a temporary directory, so no database or mail server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ucpl-integration-tests
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{
        Request, StatusCode,
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    },
    response::Response,
};
use secrecy::SecretString;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use ucpl_site::config::SiteConfig;
use ucpl_site::db::memory::{MemoryGalleryRepository, MemoryInquiryRepository};
use ucpl_site::db::{GalleryRepository, InquiryRepository};
use ucpl_site::models::Inquiry;
use ucpl_site::services::{InquiryNotifier, NotifyError};
use ucpl_site::state::AppState;

/// Admin password configured for every test app.
pub const ADMIN_PASSWORD: &str = "library-admin-password";

/// Session cookie name set by the site.
pub const SESSION_COOKIE: &str = "ucpl_session";

const MULTIPART_BOUNDARY: &str = "ucpl-test-boundary";

/// Programs file used unless a test supplies its own.
pub const PROGRAMS_JSON: &str = r#"{
  "list": [
    {
      "slug": "story-time",
      "name": "Story Time",
      "summary": "Songs and picture books.",
      "schedule": "Tuesdays, 10:30 AM"
    },
    {
      "slug": "chess-club",
      "name": "Chess Club",
      "audience": "All ages"
    }
  ]
}"#;

// =============================================================================
// Test App
// =============================================================================

/// A site router wired to in-memory backends.
pub struct TestApp {
    router: Router,
    /// Inquiry records.
    pub inquiries: Arc<MemoryInquiryRepository>,
    /// Gallery records.
    pub gallery: Arc<MemoryGalleryRepository>,
    gallery_dir: TempDir,
    data_dir: TempDir,
}

impl TestApp {
    /// Build an app without mail notification.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None, PROGRAMS_JSON, |_| {})
    }

    /// Build an app whose admin sessions last `max_age`.
    #[must_use]
    pub fn with_session_max_age(max_age: Duration) -> Self {
        Self::build(None, PROGRAMS_JSON, |config| config.session_max_age = max_age)
    }

    /// Build an app that sends notifications through `notifier`.
    #[must_use]
    pub fn with_notifier(notifier: Arc<dyn InquiryNotifier>) -> Self {
        Self::build(Some(notifier), PROGRAMS_JSON, |_| {})
    }

    /// Build an app whose programs file holds `programs_json`.
    #[must_use]
    pub fn with_programs(programs_json: &str) -> Self {
        Self::build(None, programs_json, |_| {})
    }

    fn build(
        notifier: Option<Arc<dyn InquiryNotifier>>,
        programs_json: &str,
        configure: impl FnOnce(&mut SiteConfig),
    ) -> Self {
        let gallery_dir = TempDir::new().expect("create gallery dir");
        let data_dir = TempDir::new().expect("create data dir");
        let programs_path = data_dir.path().join("programs.json");
        std::fs::write(&programs_path, programs_json).expect("write programs file");

        let mut config = test_config(gallery_dir.path(), &programs_path);
        configure(&mut config);
        let inquiries = Arc::new(MemoryInquiryRepository::new());
        let gallery = Arc::new(MemoryGalleryRepository::new());

        let inquiry_repo: Arc<dyn InquiryRepository> = inquiries.clone();
        let gallery_repo: Arc<dyn GalleryRepository> = gallery.clone();
        let state = AppState::with_backends(config, inquiry_repo, gallery_repo, notifier);
        let router = ucpl_site::app(state, MemoryStore::default());

        Self {
            router,
            inquiries,
            gallery,
            gallery_dir,
            data_dir,
        }
    }

    /// The File Store directory.
    #[must_use]
    pub fn gallery_dir(&self) -> &Path {
        self.gallery_dir.path()
    }

    /// The directory holding the programs file.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        self.data_dir.path()
    }

    /// Names of the files currently in the File Store.
    #[must_use]
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.gallery_dir())
            .expect("read gallery dir")
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// `GET` a path, optionally with a session cookie.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        self.send(request("GET", uri, cookie).body(Body::empty()).expect("valid request"))
            .await
    }

    /// `POST` a URL-encoded form body.
    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response {
        self.send(
            request("POST", uri, cookie)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .expect("valid request"),
        )
        .await
    }

    /// `POST` files as `multipart/form-data` under the `images` field.
    pub async fn post_images(&self, uri: &str, files: &[TestFile], cookie: Option<&str>) -> Response {
        self.send(
            request("POST", uri, cookie)
                .header(
                    CONTENT_TYPE,
                    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
                )
                .body(Body::from(multipart_body(files)))
                .expect("valid request"),
        )
        .await
    }

    /// Log in with the configured password and return the session cookie.
    pub async fn login(&self) -> String {
        let response = self
            .post_form("/admin/login", &format!("password={ADMIN_PASSWORD}"), None)
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response).expect("login sets a session cookie")
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

fn request(method: &str, uri: &str, cookie: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match cookie {
        Some(cookie) => builder.header(COOKIE, cookie),
        None => builder,
    }
}

/// Site configuration pointing at temporary directories.
#[must_use]
pub fn test_config(gallery_dir: &Path, programs_path: &Path) -> SiteConfig {
    SiteConfig {
        database_url: SecretString::from("postgres://unused@localhost/unused"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost".to_string(),
        admin_password: SecretString::from(ADMIN_PASSWORD),
        session_secret: SecretString::from("kR7#pQ2$vX9!mN4&wL6*zT1^bH8@cF3%"),
        session_max_age: Duration::from_secs(7200),
        mail: None,
        gallery_dir: gallery_dir.to_path_buf(),
        static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../site/static")),
        programs_path: programs_path.to_path_buf(),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

// =============================================================================
// Response Helpers
// =============================================================================

/// Read a response body.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

/// Read a response body as text.
pub async fn body_text(response: Response) -> String {
    String::from_utf8_lossy(&body_bytes(response).await).into_owned()
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// The `name=value` pair of the session cookie set by a response.
#[must_use]
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|v| v.starts_with(SESSION_COOKIE))
        .find_map(|v| v.split(';').next())
        .map(str::to_string)
}

// =============================================================================
// Upload Helpers
// =============================================================================

/// A file part for an upload request.
pub struct TestFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl TestFile {
    /// A JPEG of `len` bytes.
    #[must_use]
    pub fn jpeg(filename: &str, len: usize) -> Self {
        Self::with_magic(filename, "image/jpeg", &[0xFF, 0xD8, 0xFF, 0xE0], len)
    }

    /// A PNG of `len` bytes.
    #[must_use]
    pub fn png(filename: &str, len: usize) -> Self {
        Self::with_magic(
            filename,
            "image/png",
            &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A],
            len,
        )
    }

    /// A WEBP of `len` bytes.
    #[must_use]
    pub fn webp(filename: &str, len: usize) -> Self {
        Self::with_magic(
            filename,
            "image/webp",
            b"RIFF\x00\x00\x00\x00WEBPVP8 ",
            len,
        )
    }

    /// Arbitrary content with a declared type.
    #[must_use]
    pub fn raw(filename: &str, content_type: &str, data: &[u8]) -> Self {
        Self {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            data: data.to_vec(),
        }
    }

    fn with_magic(filename: &str, content_type: &str, magic: &[u8], len: usize) -> Self {
        let mut data = magic.to_vec();
        data.resize(len.max(magic.len()), 0);
        Self::raw(filename, content_type, &data)
    }
}

fn multipart_body(files: &[TestFile]) -> Vec<u8> {
    let mut body = Vec::new();
    for file in files {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"images\"; filename=\"{}\"\r\n",
                file.filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", file.content_type).as_bytes());
        body.extend_from_slice(&file.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

// =============================================================================
// Notifiers
// =============================================================================

/// Notifier that forwards every inquiry to a channel.
pub struct RecordingNotifier {
    sent: mpsc::UnboundedSender<Inquiry>,
}

impl RecordingNotifier {
    /// Create a notifier and the receiving end of its channel.
    #[must_use]
    pub fn channel() -> (Arc<dyn InquiryNotifier>, mpsc::UnboundedReceiver<Inquiry>) {
        let (sent, received) = mpsc::unbounded_channel();
        (Arc::new(Self { sent }), received)
    }
}

#[async_trait]
impl InquiryNotifier for RecordingNotifier {
    async fn notify(&self, inquiry: &Inquiry) -> Result<(), NotifyError> {
        let _ = self.sent.send(inquiry.clone());
        Ok(())
    }
}

/// Notifier that always fails.
pub struct FailingNotifier;

#[async_trait]
impl InquiryNotifier for FailingNotifier {
    async fn notify(&self, _inquiry: &Inquiry) -> Result<(), NotifyError> {
        Err(NotifyError::InvalidAddress("unreachable relay".to_string()))
    }
}
