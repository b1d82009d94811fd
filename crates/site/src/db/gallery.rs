//! Gallery image repository backed by `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use ucpl_core::GalleryImageId;

use super::{GalleryRepository, RepositoryError};
use crate::models::{GalleryImage, NewGalleryImage};

/// Internal row type for `PostgreSQL` gallery image queries.
#[derive(Debug, sqlx::FromRow)]
struct GalleryImageRow {
    id: Uuid,
    filename: String,
    original_name: String,
    caption: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<GalleryImageRow> for GalleryImage {
    fn from(row: GalleryImageRow) -> Self {
        Self {
            id: GalleryImageId::from_uuid(row.id),
            filename: row.filename,
            original_name: row.original_name,
            caption: row.caption,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `PostgreSQL` implementation of [`GalleryRepository`].
#[derive(Clone)]
pub struct PgGalleryRepository {
    pool: PgPool,
}

impl PgGalleryRepository {
    /// Create a new gallery repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GalleryRepository for PgGalleryRepository {
    async fn create_many(
        &self,
        images: &[NewGalleryImage],
    ) -> Result<Vec<GalleryImage>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(images.len());

        // One timestamp per batch; `seq` keeps list order stable within it.
        let now = Utc::now();
        for image in images {
            let row = sqlx::query_as::<_, GalleryImageRow>(
                r"
                INSERT INTO gallery_images (id, filename, original_name, caption, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $5)
                RETURNING id, filename, original_name, caption, created_at, updated_at
                ",
            )
            .bind(Uuid::new_v4())
            .bind(&image.filename)
            .bind(&image.original_name)
            .bind(&image.caption)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    RepositoryError::Conflict(format!("duplicate filename {}", image.filename))
                }
                _ => RepositoryError::Database(e),
            })?;

            created.push(row.into());
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<GalleryImage>, RepositoryError> {
        let rows = sqlx::query_as::<_, GalleryImageRow>(
            r"
            SELECT id, filename, original_name, caption, created_at, updated_at
            FROM gallery_images
            ORDER BY created_at DESC, seq DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: GalleryImageId) -> Result<Option<GalleryImage>, RepositoryError> {
        let row = sqlx::query_as::<_, GalleryImageRow>(
            r"
            SELECT id, filename, original_name, caption, created_at, updated_at
            FROM gallery_images
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: GalleryImageId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM gallery_images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
