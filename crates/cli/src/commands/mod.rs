//! CLI subcommands.

pub mod gallery;
pub mod inquiries;
pub mod migrate;

use sqlx::PgPool;
use thiserror::Error;
use ucpl_site::config::{ConfigError, database_url_from_env};
use ucpl_site::services::{GalleryError, InquiryError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Inquiry maintenance failed.
    #[error("Inquiry error: {0}")]
    Inquiry(#[from] InquiryError),

    /// Gallery maintenance failed.
    #[error("Gallery error: {0}")]
    Gallery(#[from] GalleryError),
}

/// Connect to the database named by `UCPL_DATABASE_URL` or `DATABASE_URL`.
async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = database_url_from_env()?;

    tracing::info!("Connecting to database...");
    Ok(ucpl_site::db::create_pool(&database_url).await?)
}
