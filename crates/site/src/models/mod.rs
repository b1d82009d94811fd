//! Domain models for the site.
//!
//! Records are validated when they are constructed: a [`NewInquiry`] or
//! [`NewGalleryImage`] only exists once its input has passed the rules in
//! [`validation`], and rows read back from the store are checked again when
//! converted into [`Inquiry`] or [`GalleryImage`].

pub mod gallery;
pub mod inquiry;
pub mod session;
pub mod validation;

pub use gallery::{DEFAULT_CAPTION, GALLERY_URL_PREFIX, GalleryImage, ImageKind, NewGalleryImage};
pub use inquiry::{Inquiry, NewInquiry};
pub use session::keys as session_keys;
pub use validation::ValidationError;
