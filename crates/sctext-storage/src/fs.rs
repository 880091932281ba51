//! Filesystem storage implementation.
//!
//! Provides [`FsStore`] for documents kept as files under a root directory.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::store::{Document, DocumentStore, StoreError};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem document store.
///
/// Document ids are paths relative to the root directory. Saves go through a
/// sibling temporary file and a rename, so readers never see a half-written
/// document.
///
/// # Example
///
/// ```no_run
/// use sctext_storage::{DocumentStore, FsStore};
///
/// let store = FsStore::new("pages");
/// let document = store.load("about.txt")?;
/// store.save("about.txt", &document.content.replace("Hi", "Hello"))?;
/// # Ok::<(), sctext_storage::StoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FsStore {
    /// Root directory for document storage.
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an id to a file path under the root.
    ///
    /// Rejects empty ids, absolute paths and parent directory components
    /// (`..`) so an id can never escape the root.
    fn resolve(&self, id: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(id);
        let is_safe = !id.trim().is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

        if !is_safe {
            return Err(StoreError::invalid_id(id).with_backend(BACKEND));
        }
        Ok(self.root.join(relative))
    }
}

impl DocumentStore for FsStore {
    fn load(&self, id: &str) -> Result<Document, StoreError> {
        let path = self.resolve(id)?;
        let content = fs::read_to_string(&path)
            .map_err(|e| StoreError::io(e, Some(id)).with_backend(BACKEND))?;

        tracing::debug!(id, path = %path.display(), bytes = content.len(), "Loaded document");
        Ok(Document::new(id, content))
    }

    fn save(&self, id: &str, content: &str) -> Result<(), StoreError> {
        let path = self.resolve(id)?;
        let io_error = |e| StoreError::io(e, Some(id)).with_backend(BACKEND);

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| StoreError::invalid_id(id).with_backend(BACKEND))?;
        let temp = path.with_file_name(format!(".{file_name}.sctext-tmp"));

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(&temp, content).map_err(io_error)?;
        if let Err(e) = fs::rename(&temp, &path) {
            let _ = fs::remove_file(&temp);
            return Err(io_error(e));
        }

        tracing::info!(id, path = %path.display(), bytes = content.len(), "Saved document");
        Ok(())
    }

    fn exists(&self, id: &str) -> bool {
        self.resolve(id).is_ok_and(|path| path.is_file())
    }
}
