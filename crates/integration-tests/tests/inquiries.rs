//! Ask a Librarian submission and admin inquiry management tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use ucpl_core::InquiryStatus;
use ucpl_integration_tests::{FailingNotifier, RecordingNotifier, TestApp, body_text, location};
use ucpl_site::db::InquiryRepository;
use ucpl_site::models::NewInquiry;

const VALID_FORM: &str = "name=A&email=a%40x.com&category=General&message=Hi";

#[tokio::test]
async fn test_submit_creates_new_inquiry() {
    let app = TestApp::new();

    let response = app.post_form("/ask-a-librarian", VALID_FORM, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Thank you"));

    let stored = app.inquiries.list(None).await.unwrap();
    assert_eq!(stored.len(), 1);
    let inquiry = &stored[0];
    assert_eq!(inquiry.name, "A");
    assert_eq!(inquiry.email.as_str(), "a@x.com");
    assert_eq!(inquiry.category, "General");
    assert_eq!(inquiry.message, "Hi");
    assert_eq!(inquiry.status, InquiryStatus::New);
}

#[tokio::test]
async fn test_submit_missing_field_rerenders_form() {
    let app = TestApp::new();

    let response = app
        .post_form(
            "/ask-a-librarian",
            "name=Ada&email=ada%40example.org&category=Local+History&message=",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Please fill in the message field."));
    // Input is preserved
    assert!(body.contains("value=\"Ada\""));
    assert!(body.contains("value=\"Local History\" selected"));

    assert!(app.inquiries.is_empty().await);
}

#[tokio::test]
async fn test_submit_absent_fields_rejected() {
    let app = TestApp::new();

    let response = app.post_form("/ask-a-librarian", "name=Ada", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Please fill in the email field."));
    assert!(app.inquiries.is_empty().await);
}

#[tokio::test]
async fn test_submit_notifies_with_record_id() {
    let (notifier, mut sent) = RecordingNotifier::channel();
    let app = TestApp::with_notifier(notifier);

    app.post_form("/ask-a-librarian", VALID_FORM, None).await;

    let notified = tokio::time::timeout(Duration::from_secs(5), sent.recv())
        .await
        .unwrap()
        .unwrap();
    let stored = app.inquiries.list(None).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(notified.id, stored[0].id);
}

#[tokio::test]
async fn test_submit_succeeds_when_notification_fails() {
    let app = TestApp::with_notifier(Arc::new(FailingNotifier));

    let response = app.post_form("/ask-a-librarian", VALID_FORM, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Thank you"));
    assert_eq!(app.inquiries.len().await, 1);
}

#[tokio::test]
async fn test_admin_list_newest_first_with_filter() {
    let app = TestApp::new();
    let first = app
        .inquiries
        .create(&NewInquiry::parse("First", "one@example.org", "General", "1").unwrap())
        .await
        .unwrap();
    let second = app
        .inquiries
        .create(&NewInquiry::parse("Second", "two@example.org", "General", "2").unwrap())
        .await
        .unwrap();
    app.inquiries
        .set_status(first.id, InquiryStatus::Resolved)
        .await
        .unwrap();

    let cookie = app.login().await;

    let body = body_text(app.get("/admin/inquiries", Some(&cookie)).await).await;
    let second_at = body.find("Second").unwrap();
    let first_at = body.find("First").unwrap();
    assert!(second_at < first_at, "newest inquiry is listed first");

    let body = body_text(app.get("/admin/inquiries?status=new", Some(&cookie)).await).await;
    assert!(body.contains(&second.id.to_string()));
    assert!(!body.contains(&first.id.to_string()));

    let body = body_text(
        app.get("/admin/inquiries?status=resolved", Some(&cookie))
            .await,
    )
    .await;
    assert!(body.contains(&first.id.to_string()));
    assert!(!body.contains(&second.id.to_string()));
}

#[tokio::test]
async fn test_inquiry_detail() {
    let app = TestApp::new();
    let created = app
        .inquiries
        .create(&NewInquiry::parse("Ada", "ada@example.org", "Research Help", "Census <1911>").unwrap())
        .await
        .unwrap();
    let cookie = app.login().await;

    let response = app
        .get(&format!("/admin/inquiries/{}", created.id), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("ada@example.org"));
    assert!(body.contains("Research Help"));
    assert!(!body.contains("Census <1911>"), "message is escaped");
}

#[tokio::test]
async fn test_unknown_or_malformed_inquiry_is_404() {
    let app = TestApp::new();
    let cookie = app.login().await;

    let response = app
        .get("/admin/inquiries/00000000-0000-0000-0000-000000000000", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/admin/inquiries/not-an-id", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resolve_twice_succeeds() {
    let app = TestApp::new();
    let created = app
        .inquiries
        .create(&NewInquiry::parse("Ada", "ada@example.org", "General", "Hello").unwrap())
        .await
        .unwrap();
    let cookie = app.login().await;
    let path = format!("/admin/inquiries/{}/resolve", created.id);

    for _ in 0..2 {
        let response = app.post_form(&path, "", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            location(&response),
            Some(format!("/admin/inquiries/{}", created.id).as_str())
        );
    }

    let stored = app.inquiries.get(created.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InquiryStatus::Resolved);
}

#[tokio::test]
async fn test_resolve_unknown_is_404() {
    let app = TestApp::new();
    let cookie = app.login().await;

    let response = app
        .post_form(
            "/admin/inquiries/00000000-0000-0000-0000-000000000000/resolve",
            "",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_inquiry() {
    let app = TestApp::new();
    let created = app
        .inquiries
        .create(&NewInquiry::parse("Ada", "ada@example.org", "General", "Hello").unwrap())
        .await
        .unwrap();
    let cookie = app.login().await;

    let response = app
        .post_form(&format!("/admin/inquiries/{}/delete", created.id), "", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/admin/inquiries?deleted=1"));
    assert!(app.inquiries.is_empty().await);

    let body = body_text(app.get("/admin/inquiries?deleted=1", Some(&cookie)).await).await;
    assert!(body.contains("Inquiry deleted."));
}

#[tokio::test]
async fn test_delete_missing_inquiry_succeeds() {
    let app = TestApp::new();
    let cookie = app.login().await;

    for id in ["00000000-0000-0000-0000-000000000000", "not-an-id"] {
        let response = app
            .post_form(&format!("/admin/inquiries/{id}/delete"), "", Some(&cookie))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{id}");
        assert_eq!(location(&response), Some("/admin/inquiries?deleted=1"));
    }
}

#[tokio::test]
async fn test_fix_status_backfills() {
    let app = TestApp::new();
    let legacy = app
        .inquiries
        .insert_without_status(&NewInquiry::parse("Old", "old@example.org", "General", "Hi").unwrap())
        .await;
    app.inquiries
        .insert_without_status(&NewInquiry::parse("Older", "older@example.org", "General", "Hi").unwrap())
        .await;
    let cookie = app.login().await;

    // Missing status already reads as new
    let body = body_text(app.get("/admin/inquiries?status=new", Some(&cookie)).await).await;
    assert!(body.contains(&legacy.to_string()));

    let response = app.get("/admin/fix-status", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_text(response).await,
        "Updated 2 inquiries with missing status."
    );

    let response = app.get("/admin/fix-status", Some(&cookie)).await;
    assert_eq!(
        body_text(response).await,
        "Updated 0 inquiries with missing status."
    );
}
