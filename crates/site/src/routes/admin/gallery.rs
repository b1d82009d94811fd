//! Admin gallery management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;
use ucpl_core::GalleryImageId;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::GalleryImage;
use crate::services::{GalleryError, UploadLimits, UploadedFile};
use crate::state::AppState;

/// Admin gallery page path.
pub const GALLERY_PATH: &str = "/admin/gallery";

/// Multipart field carrying the uploaded images.
pub const UPLOAD_FIELD: &str = "images";

/// Admin gallery query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    /// Number of images just uploaded.
    pub uploaded: Option<usize>,
    /// Set after a delete.
    pub deleted: Option<String>,
}

/// Admin gallery template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/gallery.html")]
pub struct AdminGalleryTemplate {
    pub images: Vec<GalleryImage>,
    pub notice: Option<String>,
    pub error: Option<String>,
    pub max_files: usize,
    pub max_file_mb: usize,
}

impl AdminGalleryTemplate {
    fn new(
        images: Vec<GalleryImage>,
        limits: UploadLimits,
        notice: Option<String>,
        error: Option<String>,
    ) -> Self {
        Self {
            images,
            notice,
            error,
            max_files: limits.max_files,
            max_file_mb: limits.max_file_bytes / (1024 * 1024),
        }
    }
}

fn notice_for(query: &GalleryQuery) -> Option<String> {
    match (query.uploaded, query.deleted.is_some()) {
        (Some(1), _) => Some("Uploaded 1 image.".to_string()),
        (Some(n), _) => Some(format!("Uploaded {n} images.")),
        (None, true) => Some("Image deleted.".to_string()),
        (None, false) => None,
    }
}

/// Display the upload form and every image.
///
/// # Errors
///
/// Returns 500 if the gallery records cannot be read.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<GalleryQuery>,
) -> Result<AdminGalleryTemplate> {
    let gallery = state.gallery();
    let images = gallery.list().await?;
    Ok(AdminGalleryTemplate::new(
        images,
        gallery.limits(),
        notice_for(&query),
        None,
    ))
}

/// Accept one or more images.
///
/// Parts without a file name (an empty file input) are skipped. Validation
/// failures re-render the page with the reason; nothing is stored.
///
/// # Errors
///
/// Returns 500 if storing the batch fails after validation.
#[instrument(skip_all)]
pub async fn upload(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut files = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected multipart upload body");
                return Ok(e.into_response());
            }
        };

        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read uploaded file");
                return Ok(e.into_response());
            }
        };

        if original_name.is_empty() && data.is_empty() {
            continue;
        }

        files.push(UploadedFile {
            original_name,
            content_type,
            data,
        });
    }

    let gallery = state.gallery();
    match gallery.upload(files).await {
        Ok(created) => {
            let count = created.len().to_string();
            add_breadcrumb("admin", "Uploaded gallery images", Some(&[("count", &count)]));
            Ok(Redirect::to(&format!("{GALLERY_PATH}?uploaded={count}")).into_response())
        }
        Err(GalleryError::Validation(e)) => {
            let images = gallery.list().await?;
            Ok(
                AdminGalleryTemplate::new(images, gallery.limits(), None, Some(e.to_string()))
                    .into_response(),
            )
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete an image record and its file.
///
/// # Errors
///
/// Returns 404 for an unknown or malformed id, or 500 if the file cannot be
/// removed.
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let image_id: GalleryImageId = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("gallery image {id}")))?;

    state.gallery().delete(image_id).await?;
    add_breadcrumb("admin", "Deleted gallery image", Some(&[("image_id", &id)]));
    Ok(Redirect::to(&format!("{GALLERY_PATH}?deleted=1")))
}
