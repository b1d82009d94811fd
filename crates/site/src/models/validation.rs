//! Input validation errors shown back to the user.

use thiserror::Error;

use ucpl_core::EmailError;

/// A rejected form submission or upload.
///
/// The `Display` text is written for the person filling in the form; routes
/// render it above the re-displayed form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required form field was absent or blank.
    #[error("Please fill in the {0} field.")]
    MissingField(&'static str),

    /// The email address could not be parsed.
    #[error("Please enter a valid email address ({0}).")]
    InvalidEmail(#[from] EmailError),

    /// An upload request carried no files.
    #[error("Please choose at least one image to upload.")]
    NoFiles,

    /// An upload request carried more files than allowed.
    #[error("You can upload at most {max} images at a time.")]
    TooManyFiles {
        /// Maximum files per upload.
        max: usize,
    },

    /// A file's declared type is not an accepted image type.
    #[error("{filename}: only JPEG, PNG, and WEBP images are allowed (got {content_type}).")]
    UnsupportedType {
        /// Original file name.
        filename: String,
        /// Declared content type.
        content_type: String,
    },

    /// A file exceeds the per-file size ceiling.
    #[error("{filename} is larger than the {max_mb} MB limit.")]
    TooLarge {
        /// Original file name.
        filename: String,
        /// Size ceiling in megabytes.
        max_mb: usize,
    },

    /// A file's contents do not match its declared image type.
    #[error("{filename} does not look like a valid {expected} image.")]
    ContentMismatch {
        /// Original file name.
        filename: String,
        /// Declared image type.
        expected: &'static str,
    },

    /// A file has no content.
    #[error("{filename} is empty.")]
    EmptyFile {
        /// Original file name.
        filename: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_user_facing() {
        assert_eq!(
            ValidationError::MissingField("email").to_string(),
            "Please fill in the email field."
        );
        assert_eq!(
            ValidationError::TooLarge {
                filename: "big.jpg".to_string(),
                max_mb: 15
            }
            .to_string(),
            "big.jpg is larger than the 15 MB limit."
        );
    }

    #[test]
    fn test_from_email_error() {
        let err: ValidationError = EmailError::MissingAtSymbol.into();
        assert!(matches!(err, ValidationError::InvalidEmail(_)));
    }
}
