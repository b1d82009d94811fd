//! Inquiry repository backed by `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use ucpl_core::{Email, InquiryId, InquiryStatus};

use super::{InquiryRepository, RepositoryError};
use crate::models::{Inquiry, NewInquiry};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` inquiry queries.
#[derive(Debug, sqlx::FromRow)]
struct InquiryRow {
    id: Uuid,
    name: String,
    email: String,
    category: String,
    message: String,
    status: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InquiryRow> for Inquiry {
    type Error = RepositoryError;

    fn try_from(row: InquiryRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        // Legacy rows may predate the status column default.
        let status = match row.status.as_deref() {
            None => InquiryStatus::New,
            Some(s) => s.parse().map_err(RepositoryError::DataCorruption)?,
        };

        Ok(Self {
            id: InquiryId::from_uuid(row.id),
            name: row.name,
            email,
            category: row.category,
            message: row.message,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Convert listed rows, skipping any that no longer parse.
fn collect_listed(rows: Vec<InquiryRow>) -> Vec<Inquiry> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match Inquiry::try_from(row) {
                Ok(inquiry) => Some(inquiry),
                Err(e) => {
                    tracing::warn!(inquiry_id = %id, error = %e, "Skipping unreadable inquiry row");
                    None
                }
            }
        })
        .collect()
}

const SELECT_COLUMNS: &str =
    "SELECT id, name, email, category, message, status, created_at, updated_at FROM inquiries";

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL` implementation of [`InquiryRepository`].
#[derive(Clone)]
pub struct PgInquiryRepository {
    pool: PgPool,
}

impl PgInquiryRepository {
    /// Create a new inquiry repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InquiryRepository for PgInquiryRepository {
    async fn create(&self, inquiry: &NewInquiry) -> Result<Inquiry, RepositoryError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, InquiryRow>(
            r"
            INSERT INTO inquiries (id, name, email, category, message, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 'new', $6, $6)
            RETURNING id, name, email, category, message, status, created_at, updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(&inquiry.name)
        .bind(inquiry.email.as_str())
        .bind(&inquiry.category)
        .bind(&inquiry.message)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn list(&self, status: Option<InquiryStatus>) -> Result<Vec<Inquiry>, RepositoryError> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, InquiryRow>(&format!(
                    "{SELECT_COLUMNS} WHERE COALESCE(status, 'new') = $1 ORDER BY created_at DESC, seq DESC"
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, InquiryRow>(&format!(
                    "{SELECT_COLUMNS} ORDER BY created_at DESC, seq DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(collect_listed(rows))
    }

    async fn get(&self, id: InquiryId) -> Result<Option<Inquiry>, RepositoryError> {
        let row = sqlx::query_as::<_, InquiryRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn set_status(
        &self,
        id: InquiryId,
        status: InquiryStatus,
    ) -> Result<Option<Inquiry>, RepositoryError> {
        let row = sqlx::query_as::<_, InquiryRow>(
            r"
            UPDATE inquiries
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, category, message, status, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, id: InquiryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM inquiries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn backfill_missing_status(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE inquiries SET status = 'new', updated_at = NOW() WHERE status IS NULL",
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
