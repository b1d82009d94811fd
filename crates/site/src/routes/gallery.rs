//! Public gallery route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::models::GalleryImage;
use crate::state::AppState;

/// Public gallery template.
#[derive(Template, WebTemplate)]
#[template(path = "gallery.html")]
pub struct GalleryTemplate {
    pub images: Vec<GalleryImage>,
}

/// Display the gallery, newest images first.
///
/// # Errors
///
/// Returns 500 if the gallery records cannot be read.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<GalleryTemplate> {
    let images = state.gallery().list().await?;
    Ok(GalleryTemplate { images })
}
