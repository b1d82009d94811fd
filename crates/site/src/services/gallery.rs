//! Gallery Service: upload, list, delete, and reconcile gallery images.
//!
//! An image lives in two places: a row in `gallery_images` and a file in the
//! [`FileStore`]. Upload writes files first and then inserts all rows in one
//! transaction; delete removes the file first and then the row. Neither spans
//! a cross-resource transaction, so [`GalleryService::reconcile`] exists to
//! report (and optionally sweep) the leftovers of a partial failure.

use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::sync::Arc;

use axum::body::Bytes;
use rand::Rng;
use thiserror::Error;
use tracing::instrument;

use ucpl_core::GalleryImageId;

use super::file_store::FileStore;
use crate::db::{GalleryRepository, RepositoryError};
use crate::models::{DEFAULT_CAPTION, GalleryImage, ImageKind, NewGalleryImage, ValidationError};

/// Attempts at finding an unused file name before giving up.
const MAX_NAME_ATTEMPTS: usize = 5;

/// Errors returned by the gallery service.
#[derive(Debug, Error)]
pub enum GalleryError {
    /// The upload was rejected before anything was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No image with the requested id.
    #[error("gallery image not found")]
    NotFound,

    /// The record store failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// The File Store failed.
    #[error("storage error: {0}")]
    Storage(#[from] io::Error),
}

/// Upload size and count ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Maximum bytes per file.
    pub max_file_bytes: usize,
    /// Maximum files per upload.
    pub max_files: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: 15 * 1024 * 1024,
            max_files: 20,
        }
    }
}

impl UploadLimits {
    /// Largest request body an upload within these limits can need.
    #[must_use]
    pub const fn max_body_bytes(&self) -> usize {
        self.max_files * self.max_file_bytes + 1024 * 1024
    }
}

/// One file received from the upload form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// File name as sent by the browser.
    pub original_name: String,
    /// Declared content type.
    pub content_type: String,
    /// File contents.
    pub data: Bytes,
}

/// Result of comparing the File Store against the records.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Files with no matching record.
    pub orphan_files: Vec<String>,
    /// Records whose file is missing.
    pub missing_files: Vec<GalleryImage>,
    /// Orphan files that were removed by this run.
    pub removed_files: Vec<String>,
}

/// Gallery Service.
#[derive(Clone)]
pub struct GalleryService {
    repo: Arc<dyn GalleryRepository>,
    files: FileStore,
    limits: UploadLimits,
}

impl GalleryService {
    /// Create a new gallery service.
    #[must_use]
    pub fn new(repo: Arc<dyn GalleryRepository>, files: FileStore, limits: UploadLimits) -> Self {
        Self {
            repo,
            files,
            limits,
        }
    }

    /// Configured upload limits.
    #[must_use]
    pub const fn limits(&self) -> UploadLimits {
        self.limits
    }

    /// The File Store backing this service.
    #[must_use]
    pub const fn files(&self) -> &FileStore {
        &self.files
    }

    /// List images, newest first.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<GalleryImage>, GalleryError> {
        Ok(self.repo.list().await?)
    }

    /// Validate and store a batch of uploaded images.
    ///
    /// Every file is checked before anything is written; one bad file rejects
    /// the whole batch. If writing or inserting fails part-way, files already
    /// written by this call are removed again.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::Validation` for a rejected batch, or
    /// `Storage`/`Repository` if persisting fails.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn upload(&self, files: Vec<UploadedFile>) -> Result<Vec<GalleryImage>, GalleryError> {
        let kinds = self.validate(&files)?;

        self.files.ensure_dir().await?;

        let mut written: Vec<String> = Vec::with_capacity(files.len());
        let mut pending = Vec::with_capacity(files.len());

        for (file, kind) in files.iter().zip(kinds) {
            let extension = stored_extension(&file.original_name, kind);
            match self.write_with_fresh_name(extension, &file.data).await {
                Ok(filename) => {
                    written.push(filename.clone());
                    pending.push(NewGalleryImage {
                        filename,
                        original_name: file.original_name.clone(),
                        caption: DEFAULT_CAPTION.to_string(),
                    });
                }
                Err(e) => {
                    self.discard(&written).await;
                    return Err(e.into());
                }
            }
        }

        match self.repo.create_many(&pending).await {
            Ok(created) => {
                tracing::info!(count = created.len(), "Gallery images uploaded");
                Ok(created)
            }
            Err(e) => {
                self.discard(&written).await;
                Err(e.into())
            }
        }
    }

    /// Delete an image: its file first, then its record.
    ///
    /// A missing file is tolerated. Any other file error aborts the delete
    /// and keeps the record.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::NotFound` if the id is unknown, `Storage` if the
    /// file cannot be removed, or `Repository` if the store fails.
    #[instrument(skip(self), fields(image_id = %id))]
    pub async fn delete(&self, id: GalleryImageId) -> Result<(), GalleryError> {
        let image = self.repo.get(id).await?.ok_or(GalleryError::NotFound)?;

        if !self.files.remove(&image.filename).await? {
            tracing::warn!(filename = %image.filename, "Gallery file already absent");
        }

        self.repo.delete(id).await?;
        tracing::info!(filename = %image.filename, "Gallery image deleted");
        Ok(())
    }

    /// Compare files against records.
    ///
    /// With `delete_orphan_files`, files that have no record are removed.
    /// Records are never removed.
    ///
    /// # Errors
    ///
    /// Returns `Repository` or `Storage` errors from listing.
    pub async fn reconcile(&self, delete_orphan_files: bool) -> Result<ReconcileReport, GalleryError> {
        let records = self.repo.list().await?;
        let files = self.files.list().await?;

        let known: HashSet<&str> = records.iter().map(|r| r.filename.as_str()).collect();
        let present: HashSet<&str> = files.iter().map(String::as_str).collect();

        let orphan_files: Vec<String> = files
            .iter()
            .filter(|f| !known.contains(f.as_str()))
            .cloned()
            .collect();
        let missing_files: Vec<GalleryImage> = records
            .iter()
            .filter(|r| !present.contains(r.filename.as_str()))
            .cloned()
            .collect();

        let mut removed_files = Vec::new();
        if delete_orphan_files {
            for name in &orphan_files {
                match self.files.remove(name).await {
                    Ok(_) => removed_files.push(name.clone()),
                    Err(e) => tracing::warn!(filename = %name, error = %e, "Failed to remove orphan file"),
                }
            }
        }

        Ok(ReconcileReport {
            orphan_files,
            missing_files,
            removed_files,
        })
    }

    fn validate(&self, files: &[UploadedFile]) -> Result<Vec<ImageKind>, ValidationError> {
        if files.is_empty() {
            return Err(ValidationError::NoFiles);
        }
        if files.len() > self.limits.max_files {
            return Err(ValidationError::TooManyFiles {
                max: self.limits.max_files,
            });
        }

        files
            .iter()
            .map(|file| {
                let kind = ImageKind::from_mime(&file.content_type).ok_or_else(|| {
                    ValidationError::UnsupportedType {
                        filename: file.original_name.clone(),
                        content_type: file.content_type.clone(),
                    }
                })?;

                if file.data.len() > self.limits.max_file_bytes {
                    return Err(ValidationError::TooLarge {
                        filename: file.original_name.clone(),
                        max_mb: self.limits.max_file_bytes / (1024 * 1024),
                    });
                }
                if file.data.is_empty() {
                    return Err(ValidationError::EmptyFile {
                        filename: file.original_name.clone(),
                    });
                }
                if !kind.matches_magic(&file.data) {
                    return Err(ValidationError::ContentMismatch {
                        filename: file.original_name.clone(),
                        expected: kind.label(),
                    });
                }
                Ok(kind)
            })
            .collect()
    }

    async fn write_with_fresh_name(&self, extension: &str, data: &[u8]) -> io::Result<String> {
        let mut last_err = None;
        for _ in 0..MAX_NAME_ATTEMPTS {
            let filename = generate_filename(extension);
            match self.files.write_new(&filename, data).await {
                Ok(()) => return Ok(filename),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => last_err = Some(e),
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| io::Error::other("no file name attempts made")))
    }

    async fn discard(&self, written: &[String]) {
        for filename in written {
            if let Err(e) = self.files.remove(filename).await {
                tracing::warn!(filename = %filename, error = %e, "Failed to clean up uploaded file");
            }
        }
    }
}

/// `{unix millis}-{9 random digits}{extension}`.
fn generate_filename(extension: &str) -> String {
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
    format!(
        "{}-{suffix:09}{extension}",
        chrono::Utc::now().timestamp_millis()
    )
}

/// The lower-cased original extension if it is one `kind` is known by,
/// otherwise the kind's default extension.
fn stored_extension(original_name: &str, kind: ImageKind) -> &'static str {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match (kind, ext.as_deref()) {
        (ImageKind::Jpeg, Some("jpeg")) => ".jpeg",
        (ImageKind::Jpeg, Some("jpg")) => ".jpg",
        (ImageKind::Png, Some("png")) => ".png",
        (ImageKind::Webp, Some("webp")) => ".webp",
        _ => kind.extension(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::db::memory::MemoryGalleryRepository;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn file(name: &str, content_type: &str, data: &[u8]) -> UploadedFile {
        UploadedFile {
            original_name: name.to_string(),
            content_type: content_type.to_string(),
            data: Bytes::copy_from_slice(data),
        }
    }

    fn service(dir: &Path) -> (GalleryService, Arc<MemoryGalleryRepository>) {
        let repo = Arc::new(MemoryGalleryRepository::new());
        let service = GalleryService::new(
            repo.clone(),
            FileStore::new(dir.join("gallery")),
            UploadLimits::default(),
        );
        (service, repo)
    }

    /// Repository whose inserts always fail.
    struct FailingInsertRepository;

    #[async_trait]
    impl GalleryRepository for FailingInsertRepository {
        async fn create_many(
            &self,
            _images: &[NewGalleryImage],
        ) -> Result<Vec<GalleryImage>, RepositoryError> {
            Err(RepositoryError::Conflict("forced".to_string()))
        }
        async fn list(&self) -> Result<Vec<GalleryImage>, RepositoryError> {
            Ok(Vec::new())
        }
        async fn get(&self, _id: GalleryImageId) -> Result<Option<GalleryImage>, RepositoryError> {
            Ok(None)
        }
        async fn delete(&self, _id: GalleryImageId) -> Result<bool, RepositoryError> {
            Ok(false)
        }
    }

    #[test]
    fn test_generate_filename_shape() {
        let name = generate_filename(".jpg");
        let (stem, ext) = name.split_once('.').unwrap();
        assert_eq!(ext, "jpg");
        let (millis, suffix) = stem.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_stored_extension() {
        assert_eq!(stored_extension("Photo.JPG", ImageKind::Jpeg), ".jpg");
        assert_eq!(stored_extension("photo.jpeg", ImageKind::Jpeg), ".jpeg");
        assert_eq!(stored_extension("photo", ImageKind::Png), ".png");
        assert_eq!(stored_extension("evil.html", ImageKind::Webp), ".webp");
        assert_eq!(stored_extension("../../x.png", ImageKind::Jpeg), ".jpg");
    }

    #[test]
    fn test_max_body_bytes_covers_full_batch() {
        let limits = UploadLimits::default();
        assert!(limits.max_body_bytes() > limits.max_files * limits.max_file_bytes);
    }

    #[tokio::test]
    async fn test_upload_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _repo) = service(dir.path());

        let created = service
            .upload(vec![
                file("first.jpg", "image/jpeg", JPEG),
                file("second.png", "image/png", PNG),
            ])
            .await
            .unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(created[0].original_name, "first.jpg");
        assert_eq!(created[1].original_name, "second.png");
        assert!(created[0].filename.ends_with(".jpg"));
        assert!(created[1].filename.ends_with(".png"));
        assert_eq!(created[0].caption, DEFAULT_CAPTION);
        for image in &created {
            assert!(service.files().exists(&image.filename).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_one_bad_file_rejects_batch() {
        let dir = tempfile::tempdir().unwrap();
        let (service, repo) = service(dir.path());

        let err = service
            .upload(vec![
                file("ok.jpg", "image/jpeg", JPEG),
                file("anim.gif", "image/gif", b"GIF89a"),
            ])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GalleryError::Validation(ValidationError::UnsupportedType { .. })
        ));
        assert!(repo.is_empty().await);
        assert!(service.files().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let (service, repo) = service(dir.path());

        let mut big = JPEG.to_vec();
        big.resize(UploadLimits::default().max_file_bytes + 1, 0);
        let err = service
            .upload(vec![file("big.jpg", "image/jpeg", &big)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GalleryError::Validation(ValidationError::TooLarge { max_mb: 15, .. })
        ));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_rejects_content_mismatch_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _repo) = service(dir.path());

        let err = service
            .upload(vec![file("fake.png", "image/png", b"<html></html>")])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GalleryError::Validation(ValidationError::ContentMismatch { .. })
        ));

        let err = service
            .upload(vec![file("empty.png", "image/png", b"")])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GalleryError::Validation(ValidationError::EmptyFile { .. })
        ));
    }

    #[tokio::test]
    async fn test_rejects_file_count() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _repo) = service(dir.path());

        let err = service.upload(Vec::new()).await.unwrap_err();
        assert!(matches!(err, GalleryError::Validation(ValidationError::NoFiles)));

        let files = (0..21)
            .map(|i| file(&format!("{i}.jpg"), "image/jpeg", JPEG))
            .collect();
        let err = service.upload(files).await.unwrap_err();
        assert!(matches!(
            err,
            GalleryError::Validation(ValidationError::TooManyFiles { max: 20 })
        ));
    }

    #[tokio::test]
    async fn test_failed_insert_removes_written_files() {
        let dir = tempfile::tempdir().unwrap();
        let files = FileStore::new(dir.path().join("gallery"));
        let service = GalleryService::new(
            Arc::new(FailingInsertRepository),
            files.clone(),
            UploadLimits::default(),
        );

        let err = service
            .upload(vec![
                file("a.jpg", "image/jpeg", JPEG),
                file("b.jpg", "image/jpeg", JPEG),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, GalleryError::Repository(_)));
        assert!(files.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_file_and_record() {
        let dir = tempfile::tempdir().unwrap();
        let (service, repo) = service(dir.path());

        let created = service
            .upload(vec![file("a.jpg", "image/jpeg", JPEG)])
            .await
            .unwrap();
        let image = &created[0];

        service.delete(image.id).await.unwrap();

        assert!(!service.files().exists(&image.filename).await.unwrap());
        assert!(repo.get(image.id).await.unwrap().is_none());
        assert!(matches!(
            service.delete(image.id).await,
            Err(GalleryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let (service, repo) = service(dir.path());

        let created = service
            .upload(vec![file("a.jpg", "image/jpeg", JPEG)])
            .await
            .unwrap();
        std::fs::remove_file(service.files().root().join(&created[0].filename)).unwrap();

        service.delete(created[0].id).await.unwrap();
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_keeps_record_when_file_removal_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (service, repo) = service(dir.path());

        let created = service
            .upload(vec![file("a.jpg", "image/jpeg", JPEG)])
            .await
            .unwrap();
        let path = service.files().root().join(&created[0].filename);
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let err = service.delete(created[0].id).await.unwrap_err();
        assert!(matches!(err, GalleryError::Storage(_)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_reconcile_reports_and_sweeps() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _repo) = service(dir.path());

        let created = service
            .upload(vec![
                file("kept.jpg", "image/jpeg", JPEG),
                file("lost.jpg", "image/jpeg", JPEG),
            ])
            .await
            .unwrap();
        std::fs::remove_file(service.files().root().join(&created[1].filename)).unwrap();
        service.files().write_new("stray.jpg", JPEG).await.unwrap();

        let report = service.reconcile(false).await.unwrap();
        assert_eq!(report.orphan_files, vec!["stray.jpg"]);
        assert_eq!(report.missing_files.len(), 1);
        assert_eq!(report.missing_files[0].id, created[1].id);
        assert!(report.removed_files.is_empty());
        assert!(service.files().exists("stray.jpg").await.unwrap());

        let report = service.reconcile(true).await.unwrap();
        assert_eq!(report.removed_files, vec!["stray.jpg"]);
        assert!(!service.files().exists("stray.jpg").await.unwrap());
        assert_eq!(service.list().await.unwrap().len(), 2);
    }
}
