//! Fetch and decode errors.

use std::time::Duration;

use milestone_storage::StoreError;

/// What was wrong with a field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    /// Required field absent
    #[error("missing")]
    Missing,

    /// Field present with the wrong JSON type
    #[error("expected {expected}")]
    WrongType {
        /// What the decoder wanted
        expected: &'static str,
    },

    /// Value of the right type outside its allowed range
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// Value of the right type that still cannot be used
    #[error("invalid: {0}")]
    Invalid(String),
}

/// A malformed remote record, with the offending document and field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("document {document}: field {field}: {kind}")]
pub struct ParseError {
    /// Document key
    pub document: String,

    /// Field path, e.g. `milestones[2].milestoneDueDate`
    pub field: String,

    /// What went wrong
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Create a parse error.
    pub fn new(document: impl Into<String>, field: impl Into<String>, kind: ParseErrorKind) -> Self {
        Self {
            document: document.into(),
            field: field.into(),
            kind,
        }
    }
}

/// Errors fetching a user's projects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Store unreachable
    #[error("network error: {0}")]
    Network(String),

    /// Session may not read the collection
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Store did not answer in time
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    /// A document failed to decode and the fetch was strict
    #[error("malformed record: {0}")]
    Malformed(#[from] ParseError),

    /// Any other store failure
    #[error("storage error: {0}")]
    Storage(String),
}

impl FetchError {
    /// Whether trying again could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}

impl From<StoreError> for FetchError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => Self::Network(msg),
            StoreError::Unauthorized(msg) => Self::Unauthorized(msg),
            other => Self::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(
            "thesis",
            "milestones[0].milestoneDifficultyRating",
            ParseErrorKind::WrongType { expected: "integer" },
        );
        assert_eq!(
            err.to_string(),
            "document thesis: field milestones[0].milestoneDifficultyRating: expected integer"
        );
    }

    #[test]
    fn test_store_error_mapping() {
        assert!(matches!(
            FetchError::from(StoreError::Unavailable("down".into())),
            FetchError::Network(_)
        ));
        assert!(matches!(
            FetchError::from(StoreError::Unauthorized("no".into())),
            FetchError::Unauthorized(_)
        ));
        assert!(matches!(
            FetchError::from(StoreError::InvalidKey("..".into())),
            FetchError::Storage(_)
        ));
    }

    #[test]
    fn test_retryable() {
        assert!(FetchError::Network("x".into()).is_retryable());
        assert!(FetchError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(!FetchError::Unauthorized("x".into()).is_retryable());
    }
}
