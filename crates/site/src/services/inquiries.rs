//! Inquiry Service: Ask a Librarian submissions and their admin workflow.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::instrument;

use ucpl_core::{InquiryId, InquiryStatus};

use super::email::{InquiryNotifier, NotifyError};
use crate::db::{InquiryRepository, RepositoryError};
use crate::models::{Inquiry, NewInquiry, ValidationError};

/// Errors returned by the inquiry service.
#[derive(Debug, Error)]
pub enum InquiryError {
    /// The submission was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No inquiry with the requested id.
    #[error("inquiry not found")]
    NotFound,

    /// The record store failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Inquiry Service.
#[derive(Clone)]
pub struct InquiryService {
    repo: Arc<dyn InquiryRepository>,
    notifier: Option<Arc<dyn InquiryNotifier>>,
    notify_timeout: Duration,
}

impl InquiryService {
    /// Create a new inquiry service.
    ///
    /// With `notifier = None` submissions are stored without any email.
    #[must_use]
    pub fn new(
        repo: Arc<dyn InquiryRepository>,
        notifier: Option<Arc<dyn InquiryNotifier>>,
        notify_timeout: Duration,
    ) -> Self {
        Self {
            repo,
            notifier,
            notify_timeout,
        }
    }

    /// Validate and store a submission, then notify staff in the background.
    ///
    /// The record is committed before any notification is attempted, and the
    /// notification outcome never affects the result.
    ///
    /// # Errors
    ///
    /// Returns `InquiryError::Validation` if a field is blank or the email is
    /// malformed, or `Repository` if the record cannot be stored.
    #[instrument(skip_all)]
    pub async fn submit(
        &self,
        name: &str,
        email: &str,
        category: &str,
        message: &str,
    ) -> Result<Inquiry, InquiryError> {
        let new = NewInquiry::parse(name, email, category, message)?;
        let inquiry = self.repo.create(&new).await?;
        tracing::info!(inquiry_id = %inquiry.id, category = %inquiry.category, "Inquiry submitted");

        if let Some(notifier) = &self.notifier {
            let notifier = Arc::clone(notifier);
            let timeout = self.notify_timeout;
            let stored = inquiry.clone();
            tokio::spawn(async move {
                let outcome = tokio::time::timeout(timeout, notifier.notify(&stored))
                    .await
                    .unwrap_or(Err(NotifyError::Timeout));
                if let Err(e) = outcome {
                    tracing::warn!(inquiry_id = %stored.id, error = %e, "Inquiry notification failed");
                }
            });
        }

        Ok(inquiry)
    }

    /// List inquiries, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `InquiryError::Repository` if the store fails.
    pub async fn list(&self, status: Option<InquiryStatus>) -> Result<Vec<Inquiry>, InquiryError> {
        Ok(self.repo.list(status).await?)
    }

    /// Fetch one inquiry.
    ///
    /// # Errors
    ///
    /// Returns `InquiryError::NotFound` if the id is unknown.
    pub async fn get(&self, id: InquiryId) -> Result<Inquiry, InquiryError> {
        self.repo.get(id).await?.ok_or(InquiryError::NotFound)
    }

    /// Mark an inquiry resolved. Resolving twice is not an error.
    ///
    /// # Errors
    ///
    /// Returns `InquiryError::NotFound` if the id is unknown.
    #[instrument(skip(self), fields(inquiry_id = %id))]
    pub async fn resolve(&self, id: InquiryId) -> Result<Inquiry, InquiryError> {
        let inquiry = self
            .repo
            .set_status(id, InquiryStatus::Resolved)
            .await?
            .ok_or(InquiryError::NotFound)?;
        tracing::info!("Inquiry resolved");
        Ok(inquiry)
    }

    /// Delete an inquiry. Deleting an unknown id is not an error.
    ///
    /// # Errors
    ///
    /// Returns `InquiryError::Repository` if the store fails.
    #[instrument(skip(self), fields(inquiry_id = %id))]
    pub async fn delete(&self, id: InquiryId) -> Result<(), InquiryError> {
        if self.repo.delete(id).await? {
            tracing::info!("Inquiry deleted");
        }
        Ok(())
    }

    /// Give every inquiry without a status the status `new`.
    ///
    /// # Errors
    ///
    /// Returns `InquiryError::Repository` if the store fails.
    pub async fn backfill_missing_status(&self) -> Result<u64, InquiryError> {
        let fixed = self.repo.backfill_missing_status().await?;
        tracing::info!(fixed, "Inquiry status backfill complete");
        Ok(fixed)
    }

    /// Check that the record store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `InquiryError::Repository` if the store cannot be reached.
    pub async fn ping(&self) -> Result<(), InquiryError> {
        Ok(self.repo.ping().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::*;
    use crate::db::memory::MemoryInquiryRepository;

    /// Forwards every notified inquiry id to a channel.
    struct ChannelNotifier {
        tx: mpsc::UnboundedSender<InquiryId>,
        fail: bool,
    }

    #[async_trait]
    impl InquiryNotifier for ChannelNotifier {
        async fn notify(&self, inquiry: &Inquiry) -> Result<(), NotifyError> {
            let _ = self.tx.send(inquiry.id);
            if self.fail {
                Err(NotifyError::InvalidAddress("forced".to_string()))
            } else {
                Ok(())
            }
        }
    }

    /// Never finishes.
    struct HangingNotifier;

    #[async_trait]
    impl InquiryNotifier for HangingNotifier {
        async fn notify(&self, _inquiry: &Inquiry) -> Result<(), NotifyError> {
            std::future::pending().await
        }
    }

    fn service(
        notifier: Option<Arc<dyn InquiryNotifier>>,
    ) -> (InquiryService, Arc<MemoryInquiryRepository>) {
        let repo = Arc::new(MemoryInquiryRepository::new());
        let service = InquiryService::new(repo.clone(), notifier, Duration::from_millis(50));
        (service, repo)
    }

    #[tokio::test]
    async fn test_submit_creates_new_record() {
        let (service, repo) = service(None);

        let inquiry = service.submit("A", "a@x.com", "General", "Hi").await.unwrap();

        assert_eq!(inquiry.status, InquiryStatus::New);
        assert_eq!(repo.len().await, 1);
        assert_eq!(service.get(inquiry.id).await.unwrap(), inquiry);
    }

    #[tokio::test]
    async fn test_submit_missing_field_stores_nothing() {
        let (service, repo) = service(None);

        for (name, email, category, message) in [
            ("", "a@x.com", "General", "Hi"),
            ("A", "", "General", "Hi"),
            ("A", "a@x.com", "", "Hi"),
            ("A", "a@x.com", "General", "  "),
        ] {
            let err = service
                .submit(name, email, category, message)
                .await
                .unwrap_err();
            assert!(matches!(err, InquiryError::Validation(_)));
        }
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_notification_carries_new_id() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier: Arc<dyn InquiryNotifier> = Arc::new(ChannelNotifier { tx, fail: false });
        let (service, _repo) = service(Some(notifier));

        let inquiry = service.submit("A", "a@x.com", "General", "Hi").await.unwrap();

        assert_eq!(rx.recv().await, Some(inquiry.id));
    }

    #[tokio::test]
    async fn test_failed_notification_keeps_record() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier: Arc<dyn InquiryNotifier> = Arc::new(ChannelNotifier { tx, fail: true });
        let (service, repo) = service(Some(notifier));

        let inquiry = service.submit("A", "a@x.com", "General", "Hi").await.unwrap();
        assert_eq!(rx.recv().await, Some(inquiry.id));

        assert_eq!(repo.len().await, 1);
        assert_eq!(service.get(inquiry.id).await.unwrap().status, InquiryStatus::New);
    }

    #[tokio::test]
    async fn test_hanging_notification_does_not_block_submit() {
        let (service, repo) = service(Some(Arc::new(HangingNotifier)));

        let submitted = tokio::time::timeout(
            Duration::from_secs(1),
            service.submit("A", "a@x.com", "General", "Hi"),
        )
        .await;

        assert!(submitted.unwrap().is_ok());
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let (service, _repo) = service(None);
        let inquiry = service.submit("A", "a@x.com", "General", "Hi").await.unwrap();

        let first = service.resolve(inquiry.id).await.unwrap();
        let second = service.resolve(inquiry.id).await.unwrap();

        assert_eq!(first.status, InquiryStatus::Resolved);
        assert_eq!(second.status, InquiryStatus::Resolved);
        assert!(matches!(
            service.resolve(InquiryId::new()).await,
            Err(InquiryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let (service, repo) = service(None);
        let inquiry = service.submit("A", "a@x.com", "General", "Hi").await.unwrap();

        service.delete(InquiryId::new()).await.unwrap();
        assert_eq!(repo.len().await, 1);

        service.delete(inquiry.id).await.unwrap();
        service.delete(inquiry.id).await.unwrap();
        assert!(repo.is_empty().await);
        assert!(matches!(
            service.get(inquiry.id).await,
            Err(InquiryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_backfill() {
        let (service, repo) = service(None);
        let legacy = NewInquiry::parse("Old", "old@x.com", "General", "Hello").unwrap();
        repo.insert_without_status(&legacy).await;

        assert_eq!(service.backfill_missing_status().await.unwrap(), 1);
        assert_eq!(service.backfill_missing_status().await.unwrap(), 0);
    }
}
