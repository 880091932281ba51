//! Store trait and error types.
//!
//! Provides the core [`DocumentStore`] trait for loading and saving the raw
//! markup of a document, along with [`StoreError`] for unified error
//! handling across backends.
//!
//! # Document Ids
//!
//! Ids are opaque strings chosen by the backend. The filesystem backend uses
//! relative paths (`"pages/home.txt"`); other backends may use numeric post
//! ids or slugs.

use sha2::{Digest, Sha256};

/// Raw markup of one stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Backend-specific identifier.
    pub id: String,
    /// Raw markup.
    pub content: String,
}

impl Document {
    /// Create a document.
    #[must_use]
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }

    /// Content revision used for optimistic concurrency checks.
    #[must_use]
    pub fn revision(&self) -> String {
        revision_of(&self.content)
    }
}

/// Hex-encoded SHA-256 of `content`.
#[must_use]
pub fn revision_of(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorKind {
    /// Document does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Malformed or unsafe document id.
    InvalidId,
    /// Backend is temporarily unavailable.
    Unavailable,
    /// Other/unknown error category.
    Other,
}

/// Retry guidance.
#[derive(Debug, PartialEq, Eq, Default)]
pub enum ErrorStatus {
    /// Don't retry (not found, invalid id).
    #[default]
    Permanent,
    /// Retry immediately (timeout, interrupted).
    Temporary,
    /// Retry with backoff (backend unavailable).
    Persistent,
}

/// Store error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StoreError {
    /// Semantic error category.
    pub kind: StoreErrorKind,
    /// Retry guidance.
    pub status: ErrorStatus,
    /// Document id (if applicable).
    pub id: Option<String>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Create a new store error.
    #[must_use]
    pub fn new(kind: StoreErrorKind) -> Self {
        Self {
            kind,
            status: ErrorStatus::Permanent,
            id: None,
            backend: None,
            source: None,
        }
    }

    /// Attach document id context.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set retry status.
    #[must_use]
    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error for a document id.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::NotFound).with_id(id)
    }

    /// Create an invalid id error.
    #[must_use]
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::InvalidId).with_id(id)
    }

    /// Create a store error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, id: Option<&str>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StoreErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StoreErrorKind::PermissionDenied,
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted => {
                StoreErrorKind::Unavailable
            }
            _ => StoreErrorKind::Other,
        };
        let status = match err.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted => {
                ErrorStatus::Temporary
            }
            _ => ErrorStatus::Permanent,
        };
        let mut error = Self::new(kind).with_status(status).with_source(err);
        if let Some(id) = id {
            error = error.with_id(id);
        }
        error
    }

    /// Whether retrying the operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.status != ErrorStatus::Permanent
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (id: pages/home)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StoreErrorKind::NotFound => "Not found",
            StoreErrorKind::PermissionDenied => "Permission denied",
            StoreErrorKind::InvalidId => "Invalid id",
            StoreErrorKind::Unavailable => "Unavailable",
            StoreErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(id) = &self.id {
            write!(f, " (id: {id})")?;
        }

        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Persistence boundary for document markup.
///
/// One blocking read before processing and one blocking write after; the
/// editing core itself never calls the store.
pub trait DocumentStore: Send + Sync {
    /// Load a document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] with [`StoreErrorKind::NotFound`] if there is
    /// no such document, or another kind if it can't be read.
    fn load(&self, id: &str) -> Result<Document, StoreError>;

    /// Replace the content of a document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the document can't be written.
    fn save(&self, id: &str, content: &str) -> Result<(), StoreError>;

    /// Check if a document exists.
    ///
    /// Returns `false` on errors (treats errors as "doesn't exist").
    fn exists(&self, id: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_document_revision_is_sha256() {
        let document = Document::new("home", "hello");

        assert_eq!(
            document.revision(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_revision_changes_with_content() {
        assert_ne!(revision_of("[a]1[/a]"), revision_of("[a]2[/a]"));
        assert_eq!(revision_of(""), revision_of(""));
    }

    #[test]
    fn test_store_error_new() {
        let err = StoreError::new(StoreErrorKind::NotFound);

        assert_eq!(err.kind, StoreErrorKind::NotFound);
        assert_eq!(err.status, ErrorStatus::Permanent);
        assert!(err.id.is_none());
        assert!(err.backend.is_none());
    }

    #[test]
    fn test_store_error_with_id() {
        let err = StoreError::not_found("pages/home");

        assert_eq!(err.kind, StoreErrorKind::NotFound);
        assert_eq!(err.id.as_deref(), Some("pages/home"));
    }

    #[test]
    fn test_store_error_with_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = StoreError::new(StoreErrorKind::NotFound).with_source(io_err);

        assert!(err.downcast_source::<std::io::Error>().is_some());
    }

    #[test]
    fn test_store_error_io_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = StoreError::io(io_err, Some("home"));

        assert_eq!(err.kind, StoreErrorKind::NotFound);
        assert_eq!(err.status, ErrorStatus::Permanent);
        assert_eq!(err.id.as_deref(), Some("home"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_store_error_io_permission_denied() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = StoreError::io(io_err, None);

        assert_eq!(err.kind, StoreErrorKind::PermissionDenied);
    }

    #[test]
    fn test_store_error_io_timeout_is_retryable() {
        let io_err = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let err = StoreError::io(io_err, None);

        assert_eq!(err.kind, StoreErrorKind::Unavailable);
        assert_eq!(err.status, ErrorStatus::Temporary);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_store_error_display_simple() {
        let err = StoreError::new(StoreErrorKind::InvalidId);

        assert_eq!(err.to_string(), "Invalid id");
    }

    #[test]
    fn test_store_error_display_kinds() {
        let labels: Vec<String> = [
            StoreErrorKind::NotFound,
            StoreErrorKind::PermissionDenied,
            StoreErrorKind::InvalidId,
            StoreErrorKind::Unavailable,
            StoreErrorKind::Other,
        ]
        .into_iter()
        .map(|kind| StoreError::new(kind).to_string())
        .collect();

        assert_eq!(
            labels,
            vec!["Not found", "Permission denied", "Invalid id", "Unavailable", "Error"]
        );
    }

    #[test]
    fn test_store_error_display_full() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = StoreError::new(StoreErrorKind::NotFound)
            .with_backend("Fs")
            .with_id("pages/home")
            .with_source(io_err);

        assert_eq!(
            err.to_string(),
            "[Fs] Not found: file not found (id: pages/home)"
        );
    }

    #[test]
    fn test_store_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StoreError>();
    }

    #[test]
    fn test_error_status_default() {
        assert_eq!(ErrorStatus::default(), ErrorStatus::Permanent);
    }
}
