//! Database operations for the site `PostgreSQL` store.
//!
//! # Tables
//!
//! - `inquiries` - Ask a Librarian submissions
//! - `gallery_images` - Metadata for files in the gallery File Store
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p ucpl-cli -- migrate
//! ```
//!
//! Handlers and services talk to the store through the [`InquiryRepository`]
//! and [`GalleryRepository`] traits. The `PostgreSQL` implementations live in
//! [`inquiries`] and [`gallery`]; [`memory`] holds in-process implementations
//! for tests.

pub mod gallery;
pub mod inquiries;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use ucpl_core::{GalleryImageId, InquiryId, InquiryStatus};

use crate::models::{GalleryImage, Inquiry, NewGalleryImage, NewInquiry};

pub use gallery::PgGalleryRepository;
pub use inquiries::PgInquiryRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., duplicate stored file name).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

// =============================================================================
// Repository Traits
// =============================================================================

/// Storage for inquiry records.
#[async_trait]
pub trait InquiryRepository: Send + Sync {
    /// Insert a new inquiry with status `new`.
    async fn create(&self, inquiry: &NewInquiry) -> Result<Inquiry, RepositoryError>;

    /// List inquiries, newest first. A missing status counts as `new`.
    async fn list(&self, status: Option<InquiryStatus>) -> Result<Vec<Inquiry>, RepositoryError>;

    /// Fetch a single inquiry.
    async fn get(&self, id: InquiryId) -> Result<Option<Inquiry>, RepositoryError>;

    /// Set the status of an inquiry. Returns `None` if it does not exist.
    async fn set_status(
        &self,
        id: InquiryId,
        status: InquiryStatus,
    ) -> Result<Option<Inquiry>, RepositoryError>;

    /// Delete an inquiry. Returns whether a record was removed.
    async fn delete(&self, id: InquiryId) -> Result<bool, RepositoryError>;

    /// Set `status = new` on every record without a status.
    async fn backfill_missing_status(&self) -> Result<u64, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Storage for gallery image records.
#[async_trait]
pub trait GalleryRepository: Send + Sync {
    /// Insert a batch of images atomically, preserving input order.
    async fn create_many(
        &self,
        images: &[NewGalleryImage],
    ) -> Result<Vec<GalleryImage>, RepositoryError>;

    /// List images, newest first.
    async fn list(&self) -> Result<Vec<GalleryImage>, RepositoryError>;

    /// Fetch a single image record.
    async fn get(&self, id: GalleryImageId) -> Result<Option<GalleryImage>, RepositoryError>;

    /// Delete an image record. Returns whether a record was removed.
    async fn delete(&self, id: GalleryImageId) -> Result<bool, RepositoryError>;
}
