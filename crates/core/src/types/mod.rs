//! Core types for the library website.
//!
//! This module provides type-safe wrappers for record identifiers, reader
//! email addresses, and inquiry statuses.

pub mod email;
pub mod id;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use status::InquiryStatus;
