//! Error types for the editor service.

use sctext_storage::StoreError;

/// Error while fetching or saving one document.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// The request does not name a usable document.
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// The guard refused access.
    #[error("Not allowed to edit {id}")]
    Unauthorized {
        /// Document id.
        id: String,
    },

    /// The document changed since the client fetched it.
    #[error("Document {id} changed since it was fetched (expected revision {expected}, found {actual})")]
    Conflict {
        /// Document id.
        id: String,
        /// Revision the client sent.
        expected: String,
        /// Revision currently stored.
        actual: String,
    },

    /// Store failure.
    #[error("{0}")]
    Storage(#[from] StoreError),
}

impl EditorError {
    /// Short machine-readable name of the error category.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTarget(_) => "invalid_target",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Conflict { .. } => "conflict",
            Self::Storage(_) => "storage",
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sctext_storage::StoreErrorKind;

    use super::*;

    #[test]
    fn test_display() {
        let err = EditorError::Unauthorized {
            id: "home".to_owned(),
        };
        assert_eq!(err.to_string(), "Not allowed to edit home");
        assert_eq!(err.code(), "unauthorized");
    }

    #[test]
    fn test_from_store_error() {
        let err: EditorError = StoreError::not_found("home").into();

        assert!(matches!(&err, EditorError::Storage(e) if e.kind == StoreErrorKind::NotFound));
        assert_eq!(err.to_string(), "Not found (id: home)");
    }
}
