//! Admin inquiry management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;
use ucpl_core::{InquiryId, InquiryStatus};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::Inquiry;
use crate::state::AppState;

/// Inquiry list path.
pub const INQUIRIES_PATH: &str = "/admin/inquiries";

/// Inquiry list query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `new` or `resolved`; anything else lists everything.
    pub status: Option<String>,
    /// Set after a delete.
    pub deleted: Option<String>,
}

/// Inquiry list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/inquiries.html")]
pub struct InquiriesTemplate {
    pub inquiries: Vec<Inquiry>,
    /// Active filter: `all`, `new` or `resolved`.
    pub filter: &'static str,
    pub deleted: bool,
}

/// Inquiry detail template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/inquiry.html")]
pub struct InquiryTemplate {
    pub inquiry: Inquiry,
}

fn parse_id(raw: &str) -> Option<InquiryId> {
    raw.parse().ok()
}

fn inquiry_not_found(raw: &str) -> AppError {
    AppError::NotFound(format!("inquiry {raw}"))
}

/// List inquiries, newest first, optionally filtered by status.
///
/// # Errors
///
/// Returns 500 if the inquiries cannot be read.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<InquiriesTemplate> {
    let status = query
        .status
        .as_deref()
        .and_then(|s| s.parse::<InquiryStatus>().ok());

    let inquiries = state.inquiries().list(status).await?;

    Ok(InquiriesTemplate {
        inquiries,
        filter: status.map_or("all", InquiryStatus::as_str),
        deleted: query.deleted.is_some(),
    })
}

/// Show one inquiry.
///
/// # Errors
///
/// Returns 404 for an unknown or malformed id.
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<InquiryTemplate> {
    let inquiry_id = parse_id(&id).ok_or_else(|| inquiry_not_found(&id))?;
    let inquiry = state.inquiries().get(inquiry_id).await?;
    Ok(InquiryTemplate { inquiry })
}

/// Mark an inquiry resolved.
///
/// # Errors
///
/// Returns 404 for an unknown or malformed id.
#[instrument(skip(state, _admin))]
pub async fn resolve(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let inquiry_id = parse_id(&id).ok_or_else(|| inquiry_not_found(&id))?;
    state.inquiries().resolve(inquiry_id).await?;
    add_breadcrumb("admin", "Resolved inquiry", Some(&[("inquiry_id", &id)]));
    Ok(Redirect::to(&format!("{INQUIRIES_PATH}/{inquiry_id}")))
}

/// Delete an inquiry.
///
/// Deleting an unknown id, malformed or not, still lands on the list.
///
/// # Errors
///
/// Returns 500 if the store fails.
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<Redirect> {
    if let Some(inquiry_id) = parse_id(&id) {
        state.inquiries().delete(inquiry_id).await?;
        add_breadcrumb("admin", "Deleted inquiry", Some(&[("inquiry_id", &id)]));
    } else {
        tracing::debug!(id = %id, "Ignoring delete for malformed inquiry id");
    }

    Ok(Redirect::to(&format!("{INQUIRIES_PATH}?deleted=1")))
}

/// Set the status of every inquiry stored without one.
///
/// # Errors
///
/// Returns 500 if the store fails.
#[instrument(skip(state, _admin))]
pub async fn fix_status(State(state): State<AppState>, _admin: RequireAdmin) -> Result<String> {
    let updated = state.inquiries().backfill_missing_status().await?;
    add_breadcrumb("admin", "Backfilled inquiry status", None);
    Ok(format!("Updated {updated} inquiries with missing status."))
}
