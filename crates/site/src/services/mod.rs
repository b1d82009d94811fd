//! Business logic services for the site.
//!
//! # Services
//!
//! - `admin_gate` - Shared-password admin sessions
//! - `inquiries` - Ask a Librarian submissions and their admin workflow
//! - `gallery` - Image upload, listing, deletion, and reconciliation
//! - `file_store` - The gallery upload directory
//! - `email` - Staff notification for new inquiries

pub mod admin_gate;
pub mod email;
pub mod file_store;
pub mod gallery;
pub mod inquiries;

pub use admin_gate::{AdminGate, AuthError};
pub use email::{InquiryNotifier, NotifyError, SmtpNotifier};
pub use file_store::FileStore;
pub use gallery::{GalleryError, GalleryService, ReconcileReport, UploadLimits, UploadedFile};
pub use inquiries::{InquiryError, InquiryService};
