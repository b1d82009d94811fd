//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::db::{GalleryRepository, InquiryRepository, PgGalleryRepository, PgInquiryRepository};
use crate::programs::ProgramsSource;
use crate::services::{
    AdminGate, FileStore, GalleryService, InquiryNotifier, InquiryService, NotifyError,
    SmtpNotifier, UploadLimits,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the services built from it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    admin_gate: AdminGate,
    inquiries: InquiryService,
    gallery: GalleryService,
    programs: ProgramsSource,
}

impl AppState {
    /// Create the production state backed by `PostgreSQL` and SMTP.
    ///
    /// # Arguments
    ///
    /// * `config` - Site configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if mail is configured but the SMTP relay or
    /// addresses are invalid.
    pub fn new(config: SiteConfig, pool: PgPool) -> Result<Self, NotifyError> {
        let notifier: Option<Arc<dyn InquiryNotifier>> = match &config.mail {
            Some(mail) => Some(Arc::new(SmtpNotifier::new(mail)?)),
            None => {
                tracing::info!("Mail not configured; inquiry notifications disabled");
                None
            }
        };

        Ok(Self::with_backends(
            config,
            Arc::new(PgInquiryRepository::new(pool.clone())),
            Arc::new(PgGalleryRepository::new(pool)),
            notifier,
        ))
    }

    /// Create state from explicit backends.
    ///
    /// Used by tests to run the full router against in-memory repositories.
    #[must_use]
    pub fn with_backends(
        config: SiteConfig,
        inquiry_repo: Arc<dyn InquiryRepository>,
        gallery_repo: Arc<dyn GalleryRepository>,
        notifier: Option<Arc<dyn InquiryNotifier>>,
    ) -> Self {
        let notify_timeout = config
            .mail
            .as_ref()
            .map_or(std::time::Duration::from_secs(10), |m| m.timeout);

        let admin_gate = AdminGate::new(config.admin_password.clone(), config.session_max_age);
        let inquiries = InquiryService::new(inquiry_repo, notifier, notify_timeout);
        let gallery = GalleryService::new(
            gallery_repo,
            FileStore::new(config.gallery_dir.clone()),
            UploadLimits::default(),
        );
        let programs = ProgramsSource::new(config.programs_path.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                admin_gate,
                inquiries,
                gallery,
                programs,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the Admin Gate.
    #[must_use]
    pub fn admin_gate(&self) -> &AdminGate {
        &self.inner.admin_gate
    }

    /// Get a reference to the inquiry service.
    #[must_use]
    pub fn inquiries(&self) -> &InquiryService {
        &self.inner.inquiries
    }

    /// Get a reference to the gallery service.
    #[must_use]
    pub fn gallery(&self) -> &GalleryService {
        &self.inner.gallery
    }

    /// Get a reference to the programs data source.
    #[must_use]
    pub fn programs(&self) -> &ProgramsSource {
        &self.inner.programs
    }
}
