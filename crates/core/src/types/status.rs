//! Inquiry status.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a reader inquiry.
///
/// Transitions are one-directional: `New -> Resolved`. A record whose status
/// is absent in storage is read as [`InquiryStatus::New`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    /// Submitted and not yet handled by library staff.
    #[default]
    New,
    /// Handled by library staff.
    Resolved,
}

impl InquiryStatus {
    /// The stored string form of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Resolved => "resolved",
        }
    }

    /// Whether this inquiry has been handled.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Resolved)
    }
}

impl std::fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InquiryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "resolved" => Ok(Self::Resolved),
            _ => Err(format!("invalid inquiry status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_new() {
        assert_eq!(InquiryStatus::default(), InquiryStatus::New);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("new".parse::<InquiryStatus>().unwrap(), InquiryStatus::New);
        assert_eq!(
            "resolved".parse::<InquiryStatus>().unwrap(),
            InquiryStatus::Resolved
        );
        assert!("closed".parse::<InquiryStatus>().is_err());
        assert!("NEW".parse::<InquiryStatus>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&InquiryStatus::Resolved).unwrap();
        assert_eq!(json, "\"resolved\"");
    }
}
