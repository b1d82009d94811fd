//! Ask a Librarian inquiry records.

use chrono::{DateTime, Utc};

use ucpl_core::{Email, InquiryId, InquiryStatus};

use super::ValidationError;

/// A stored reader inquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inquiry {
    pub id: InquiryId,
    pub name: String,
    pub email: Email,
    pub category: String,
    pub message: String,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated inquiry submission, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInquiry {
    pub name: String,
    pub email: Email,
    pub category: String,
    pub message: String,
}

impl NewInquiry {
    /// Validate raw form input.
    ///
    /// Every field is trimmed and must be non-empty. The email address is
    /// normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` for the first blank field (in
    /// form order), or `ValidationError::InvalidEmail` if the address does
    /// not parse.
    pub fn parse(
        name: &str,
        email: &str,
        category: &str,
        message: &str,
    ) -> Result<Self, ValidationError> {
        let name = required("name", name)?;
        let email = required("email", email)?;
        let category = required("category", category)?;
        let message = required("message", message)?;

        Ok(Self {
            name: name.to_string(),
            email: Email::parse(email)?,
            category: category.to_string(),
            message: message.to_string(),
        })
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_normalizes() {
        let inquiry = NewInquiry::parse(" A ", " A@X.com ", "General ", " Hi").unwrap();
        assert_eq!(inquiry.name, "A");
        assert_eq!(inquiry.email.as_str(), "a@x.com");
        assert_eq!(inquiry.category, "General");
        assert_eq!(inquiry.message, "Hi");
    }

    #[test]
    fn test_parse_missing_fields() {
        assert_eq!(
            NewInquiry::parse("", "a@x.com", "General", "Hi"),
            Err(ValidationError::MissingField("name"))
        );
        assert_eq!(
            NewInquiry::parse("A", "   ", "General", "Hi"),
            Err(ValidationError::MissingField("email"))
        );
        assert_eq!(
            NewInquiry::parse("A", "a@x.com", "", "Hi"),
            Err(ValidationError::MissingField("category"))
        );
        assert_eq!(
            NewInquiry::parse("A", "a@x.com", "General", "\n"),
            Err(ValidationError::MissingField("message"))
        );
    }

    #[test]
    fn test_parse_invalid_email() {
        let err = NewInquiry::parse("A", "not-an-email", "General", "Hi").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEmail(_)));
    }
}
