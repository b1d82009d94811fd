//! Gallery maintenance commands.

use std::sync::Arc;

use ucpl_site::config::gallery_dir_from_env;
use ucpl_site::db::PgGalleryRepository;
use ucpl_site::services::{FileStore, GalleryService, UploadLimits};

use super::{CommandError, connect};

/// Compare the gallery directory with the gallery records.
///
/// Only files with no record are ever removed, and only when
/// `delete_orphan_files` is set. Records whose file is missing are reported
/// and left for an admin to delete.
///
/// # Errors
///
/// Returns an error if the database or gallery directory cannot be read.
pub async fn reconcile(delete_orphan_files: bool) -> Result<(), CommandError> {
    let pool = connect().await?;
    let service = GalleryService::new(
        Arc::new(PgGalleryRepository::new(pool)),
        FileStore::new(gallery_dir_from_env()),
        UploadLimits::default(),
    );

    let report = service.reconcile(delete_orphan_files).await?;

    for filename in &report.orphan_files {
        tracing::warn!(filename = %filename, "File has no gallery record");
    }
    for image in &report.missing_files {
        tracing::warn!(
            image_id = %image.id,
            filename = %image.filename,
            "Gallery record has no file"
        );
    }
    for filename in &report.removed_files {
        tracing::info!(filename = %filename, "Removed orphan file");
    }

    tracing::info!(
        orphan_files = report.orphan_files.len(),
        missing_files = report.missing_files.len(),
        removed_files = report.removed_files.len(),
        "Gallery reconcile complete"
    );
    Ok(())
}
