//! Ask a Librarian form route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::services::InquiryError;
use crate::state::AppState;

/// Categories offered in the form.
pub const CATEGORIES: &[&str] = &[
    "General",
    "Research Help",
    "Local History",
    "Borrowing & Accounts",
    "Programs & Events",
    "Technology",
];

/// Ask a Librarian form data.
///
/// Missing fields deserialize as empty strings so that validation, not the
/// extractor, decides what to tell the user.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AskForm {
    pub name: String,
    pub email: String,
    pub category: String,
    pub message: String,
}

/// A category `<option>`.
pub struct CategoryOption {
    pub name: &'static str,
    pub selected: bool,
}

/// Ask a Librarian page template.
#[derive(Template, WebTemplate)]
#[template(path = "ask.html")]
pub struct AskTemplate {
    pub form: AskForm,
    pub categories: Vec<CategoryOption>,
    pub error: Option<String>,
    pub submitted: bool,
}

impl AskTemplate {
    fn new(form: AskForm, error: Option<String>, submitted: bool) -> Self {
        let categories = CATEGORIES
            .iter()
            .map(|&name| CategoryOption {
                name,
                selected: form.category == name,
            })
            .collect();

        Self {
            form,
            categories,
            error,
            submitted,
        }
    }
}

/// Display the Ask a Librarian form.
pub async fn form() -> AskTemplate {
    AskTemplate::new(AskForm::default(), None, false)
}

/// Submit an inquiry.
///
/// Validation errors re-render the form with the input preserved. A stored
/// inquiry renders a confirmation regardless of the notification outcome.
///
/// # Errors
///
/// Returns 500 if the inquiry cannot be stored.
#[instrument(skip(state, form))]
pub async fn submit(State(state): State<AppState>, Form(form): Form<AskForm>) -> Result<AskTemplate> {
    match state
        .inquiries()
        .submit(&form.name, &form.email, &form.category, &form.message)
        .await
    {
        Ok(_) => Ok(AskTemplate::new(AskForm::default(), None, true)),
        Err(InquiryError::Validation(e)) => Ok(AskTemplate::new(form, Some(e.to_string()), false)),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_category_preserved() {
        let form = AskForm {
            category: "Local History".to_string(),
            ..AskForm::default()
        };
        let template = AskTemplate::new(form, Some("Please fill in the name field.".to_string()), false);

        let selected: Vec<&str> = template
            .categories
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.name)
            .collect();
        assert_eq!(selected, vec!["Local History"]);

        let html = template.render().unwrap();
        assert!(html.contains("Please fill in the name field."));
    }

    #[test]
    fn test_submitted_renders_confirmation() {
        let html = AskTemplate::new(AskForm::default(), None, true).render().unwrap();
        assert!(html.contains("Thank you"));
    }
}
