//! In-process repositories.
//!
//! Used by unit and integration tests in place of `PostgreSQL`. Ordering
//! matches the SQL implementations: newest `created_at` first, ties broken by
//! insertion order (later first).

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use ucpl_core::{GalleryImageId, InquiryId, InquiryStatus};

use super::{GalleryRepository, InquiryRepository, RepositoryError};
use crate::models::{GalleryImage, Inquiry, NewGalleryImage, NewInquiry};

// =============================================================================
// Inquiries
// =============================================================================

#[derive(Debug, Clone)]
struct StoredInquiry {
    seq: u64,
    inquiry: Inquiry,
    /// `None` mirrors a row with a NULL status column.
    status: Option<InquiryStatus>,
}

impl StoredInquiry {
    fn to_inquiry(&self) -> Inquiry {
        Inquiry {
            status: self.status.unwrap_or_default(),
            ..self.inquiry.clone()
        }
    }
}

#[derive(Debug, Default)]
struct InquiryTable {
    next_seq: u64,
    rows: Vec<StoredInquiry>,
}

/// In-memory [`InquiryRepository`].
#[derive(Debug, Default)]
pub struct MemoryInquiryRepository {
    table: RwLock<InquiryTable>,
}

impl MemoryInquiryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record with no status, as left behind by older data.
    pub async fn insert_without_status(&self, inquiry: &NewInquiry) -> InquiryId {
        let mut table = self.table.write().await;
        let stored = new_stored(&mut table, inquiry, None);
        let id = stored.inquiry.id;
        table.rows.push(stored);
        id
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    /// Whether the repository holds no records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn new_stored(
    table: &mut InquiryTable,
    inquiry: &NewInquiry,
    status: Option<InquiryStatus>,
) -> StoredInquiry {
    let now = Utc::now();
    table.next_seq += 1;
    StoredInquiry {
        seq: table.next_seq,
        inquiry: Inquiry {
            id: InquiryId::new(),
            name: inquiry.name.clone(),
            email: inquiry.email.clone(),
            category: inquiry.category.clone(),
            message: inquiry.message.clone(),
            status: status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        },
        status,
    }
}

#[async_trait]
impl InquiryRepository for MemoryInquiryRepository {
    async fn create(&self, inquiry: &NewInquiry) -> Result<Inquiry, RepositoryError> {
        let mut table = self.table.write().await;
        let stored = new_stored(&mut table, inquiry, Some(InquiryStatus::New));
        let created = stored.to_inquiry();
        table.rows.push(stored);
        Ok(created)
    }

    async fn list(&self, status: Option<InquiryStatus>) -> Result<Vec<Inquiry>, RepositoryError> {
        let table = self.table.read().await;
        let mut rows: Vec<&StoredInquiry> = table
            .rows
            .iter()
            .filter(|row| status.is_none_or(|s| row.status.unwrap_or_default() == s))
            .collect();
        rows.sort_by(|a, b| {
            b.inquiry
                .created_at
                .cmp(&a.inquiry.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(rows.into_iter().map(StoredInquiry::to_inquiry).collect())
    }

    async fn get(&self, id: InquiryId) -> Result<Option<Inquiry>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .find(|row| row.inquiry.id == id)
            .map(StoredInquiry::to_inquiry))
    }

    async fn set_status(
        &self,
        id: InquiryId,
        status: InquiryStatus,
    ) -> Result<Option<Inquiry>, RepositoryError> {
        let mut table = self.table.write().await;
        let Some(row) = table.rows.iter_mut().find(|row| row.inquiry.id == id) else {
            return Ok(None);
        };
        row.status = Some(status);
        row.inquiry.updated_at = Utc::now();
        Ok(Some(row.to_inquiry()))
    }

    async fn delete(&self, id: InquiryId) -> Result<bool, RepositoryError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|row| row.inquiry.id != id);
        Ok(table.rows.len() < before)
    }

    async fn backfill_missing_status(&self) -> Result<u64, RepositoryError> {
        let mut table = self.table.write().await;
        let mut fixed = 0;
        for row in table.rows.iter_mut().filter(|row| row.status.is_none()) {
            row.status = Some(InquiryStatus::New);
            row.inquiry.updated_at = Utc::now();
            fixed += 1;
        }
        Ok(fixed)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

// =============================================================================
// Gallery
// =============================================================================

#[derive(Debug, Default)]
struct GalleryTable {
    next_seq: u64,
    rows: Vec<(u64, GalleryImage)>,
}

/// In-memory [`GalleryRepository`].
#[derive(Debug, Default)]
pub struct MemoryGalleryRepository {
    table: RwLock<GalleryTable>,
}

impl MemoryGalleryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    /// Whether the repository holds no records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl GalleryRepository for MemoryGalleryRepository {
    async fn create_many(
        &self,
        images: &[NewGalleryImage],
    ) -> Result<Vec<GalleryImage>, RepositoryError> {
        let mut table = self.table.write().await;

        for (i, image) in images.iter().enumerate() {
            let taken = table.rows.iter().any(|(_, r)| r.filename == image.filename)
                || images
                    .iter()
                    .take(i)
                    .any(|other| other.filename == image.filename);
            if taken {
                return Err(RepositoryError::Conflict(format!(
                    "duplicate filename {}",
                    image.filename
                )));
            }
        }

        let now = Utc::now();
        let mut created = Vec::with_capacity(images.len());
        for image in images {
            table.next_seq += 1;
            let record = GalleryImage {
                id: GalleryImageId::new(),
                filename: image.filename.clone(),
                original_name: image.original_name.clone(),
                caption: image.caption.clone(),
                created_at: now,
                updated_at: now,
            };
            let seq = table.next_seq;
            table.rows.push((seq, record.clone()));
            created.push(record);
        }
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<GalleryImage>, RepositoryError> {
        let table = self.table.read().await;
        let mut rows: Vec<&(u64, GalleryImage)> = table.rows.iter().collect();
        rows.sort_by(|(a_seq, a), (b_seq, b)| {
            b.created_at.cmp(&a.created_at).then(b_seq.cmp(a_seq))
        });
        Ok(rows.into_iter().map(|(_, image)| image.clone()).collect())
    }

    async fn get(&self, id: GalleryImageId) -> Result<Option<GalleryImage>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .find(|(_, image)| image.id == id)
            .map(|(_, image)| image.clone()))
    }

    async fn delete(&self, id: GalleryImageId) -> Result<bool, RepositoryError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|(_, image)| image.id != id);
        Ok(table.rows.len() < before)
    }
}
