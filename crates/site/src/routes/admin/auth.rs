//! Admin login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::inquiries::INQUIRIES_PATH;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{LOGIN_PATH, RequireAdmin};
use crate::services::{AdminGate, AuthError};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Display the login form, or skip it for an existing admin session.
pub async fn login_page(session: Session) -> Response {
    if AdminGate::is_admin(&session).await {
        return Redirect::to(INQUIRIES_PATH).into_response();
    }

    LoginTemplate { error: None }.into_response()
}

/// Check the submitted password.
///
/// A wrong password re-renders the form; it never reveals anything beyond
/// "incorrect".
///
/// # Errors
///
/// Returns 500 if the session store fails.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match state.admin_gate().login(&session, &form.password).await {
        Ok(()) => {
            add_breadcrumb("admin", "Signed in", None);
            Ok(Redirect::to(INQUIRIES_PATH).into_response())
        }
        Err(AuthError::InvalidCredential) => Ok(LoginTemplate {
            error: Some("Incorrect password.".to_string()),
        }
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// End the admin session.
///
/// # Errors
///
/// Returns 500 if the session store fails.
pub async fn logout(
    State(state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
) -> Result<Redirect> {
    state.admin_gate().logout(&session).await?;
    add_breadcrumb("admin", "Signed out", None);
    Ok(Redirect::to(LOGIN_PATH))
}
