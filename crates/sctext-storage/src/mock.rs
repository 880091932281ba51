//! Mock store implementation for testing.
//!
//! Provides [`MockStore`] for unit testing without filesystem access.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::store::{Document, DocumentStore, ErrorStatus, StoreError, StoreErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock store for testing.
///
/// Stores documents in memory and records every save. Use the builder
/// methods to configure the mock with test data.
///
/// # Example
///
/// ```
/// use sctext_storage::{DocumentStore, MockStore};
///
/// let store = MockStore::new().with_document("home", "[et_pb_text]Hi[/et_pb_text]");
///
/// store.save("home", "[et_pb_text]Hello[/et_pb_text]").unwrap();
/// assert_eq!(store.writes(), vec!["home".to_owned()]);
/// ```
#[derive(Debug, Default)]
pub struct MockStore {
    documents: RwLock<HashMap<String, String>>,
    writes: RwLock<Vec<String>>,
    failing_saves: RwLock<HashSet<String>>,
}

impl MockStore {
    /// Create a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_document(self, id: impl Into<String>, content: impl Into<String>) -> Self {
        self.documents
            .write()
            .unwrap()
            .insert(id.into(), content.into());
        self
    }

    /// Make every save of `id` fail with an unavailable error.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failing_save(self, id: impl Into<String>) -> Self {
        self.failing_saves.write().unwrap().insert(id.into());
        self
    }

    /// Current content of a document.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn content(&self, id: &str) -> Option<String> {
        self.documents.read().unwrap().get(id).cloned()
    }

    /// Replace a document behind the caller's back, without recording a write.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_content(&self, id: impl Into<String>, content: impl Into<String>) {
        self.documents
            .write()
            .unwrap()
            .insert(id.into(), content.into());
    }

    /// Ids of successful saves, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn writes(&self) -> Vec<String> {
        self.writes.read().unwrap().clone()
    }
}

impl DocumentStore for MockStore {
    fn load(&self, id: &str) -> Result<Document, StoreError> {
        self.documents
            .read()
            .unwrap()
            .get(id)
            .map(|content| Document::new(id, content.clone()))
            .ok_or_else(|| StoreError::not_found(id).with_backend(BACKEND))
    }

    fn save(&self, id: &str, content: &str) -> Result<(), StoreError> {
        if self.failing_saves.read().unwrap().contains(id) {
            return Err(StoreError::new(StoreErrorKind::Unavailable)
                .with_status(ErrorStatus::Persistent)
                .with_id(id)
                .with_backend(BACKEND));
        }

        self.documents
            .write()
            .unwrap()
            .insert(id.to_owned(), content.to_owned());
        self.writes.write().unwrap().push(id.to_owned());
        Ok(())
    }

    fn exists(&self, id: &str) -> bool {
        self.documents.read().unwrap().contains_key(id)
    }
}
