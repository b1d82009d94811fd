//! Public page, programs, and hardening tests.

#![allow(clippy::unwrap_used)]

use axum::http::{StatusCode, header};
use ucpl_integration_tests::{TestApp, body_text};

#[tokio::test]
async fn test_static_pages_render() {
    let app = TestApp::new();

    for path in ["/", "/history", "/collections", "/policies", "/contact", "/ask-a-librarian"] {
        let response = app.get(path, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
        let body = body_text(response).await;
        assert!(body.contains("<nav"), "{path} renders the layout");
    }
}

#[tokio::test]
async fn test_unmatched_path_is_404_page() {
    let app = TestApp::new();

    let response = app.get("/no-such-page", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Page Not Found"));
}

#[tokio::test]
async fn test_programs_list_and_detail() {
    let app = TestApp::new();

    let list = body_text(app.get("/programs", None).await).await;
    assert!(list.contains("Story Time"));
    assert!(list.contains("Chess Club"));
    assert!(list.contains("/programs/story-time"));

    let response = app.get("/programs/story-time", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_text(response).await;
    assert!(detail.contains("Story Time"));
    assert!(detail.contains("Tuesdays, 10:30 AM"));
}

#[tokio::test]
async fn test_unknown_program_is_404() {
    let app = TestApp::new();

    let response = app.get("/programs/knitting", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_broken_programs_file() {
    let app = TestApp::with_programs("{ not json");

    // The list degrades to empty
    let response = app.get("/programs", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("No programs are listed"));

    // A detail lookup cannot tell absent from unreadable
    let response = app.get("/programs/story-time", None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Internal server error");
}

#[tokio::test]
async fn test_malformed_program_entries_degrade() {
    let app = TestApp::with_programs(
        r#"{"list": [{"slug": "unnamed"}, "junk", {"slug": "book-club", "name": "Book Club"}]}"#,
    );

    let response = app.get("/programs", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("/programs/unnamed"));
    assert!(body.contains("Book Club"));

    std::fs::write(app.data_dir().join("programs.json"), r#"{"list": "none"}"#).unwrap();
    let response = app.get("/programs/book-club", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_programs_file_edits_apply_without_restart() {
    let app = TestApp::new();
    std::fs::write(
        app.data_dir().join("programs.json"),
        r#"{"list": [{"slug": "book-club", "name": "Book Club"}]}"#,
    )
    .unwrap();

    let body = body_text(app.get("/programs", None).await).await;
    assert!(body.contains("Book Club"));
    assert!(!body.contains("Story Time"));
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");

    let response = app.get("/health/ready", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let app = TestApp::new();

    let response = app.get("/", None).await;
    let headers = response.headers();
    assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
    assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_stylesheet_served_with_cache_header() {
    let app = TestApp::new();

    let response = app.get("/static/css/main.css", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cache_control = response
        .headers()
        .get(header::CACHE_CONTROL)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cache_control.contains("immutable"));
}

#[tokio::test]
async fn test_empty_public_gallery() {
    let app = TestApp::new();

    let response = app.get("/gallery", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("No photos yet."));
}
