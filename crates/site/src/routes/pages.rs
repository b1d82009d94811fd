//! Static content page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{http::StatusCode, response::IntoResponse};

use crate::filters;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate;

/// Library history page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/history.html")]
pub struct HistoryTemplate;

/// Collections overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/collections.html")]
pub struct CollectionsTemplate;

/// Library policies page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/policies.html")]
pub struct PoliciesTemplate;

/// Contact details page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate;

/// Not found page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/404.html")]
pub struct NotFoundTemplate;

/// Display the home page.
pub async fn home() -> HomeTemplate {
    HomeTemplate
}

/// Display the library history page.
pub async fn history() -> HistoryTemplate {
    HistoryTemplate
}

/// Display the collections page.
pub async fn collections() -> CollectionsTemplate {
    CollectionsTemplate
}

/// Display the policies page.
pub async fn policies() -> PoliciesTemplate {
    PoliciesTemplate
}

/// Display the contact page.
pub async fn contact() -> ContactTemplate {
    ContactTemplate
}

/// Fallback for unmatched routes.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, NotFoundTemplate)
}
