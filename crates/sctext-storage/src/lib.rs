//! Document store abstraction for shortcode text editing.
//!
//! The editing core never touches storage itself: callers load a document,
//! hand its content to the extractor or reinjector, and save the result.
//! This crate provides that boundary.
//!
//! # Architecture
//!
//! - [`DocumentStore`] trait with `load()`, `save()`, and `exists()` methods
//! - [`FsStore`] for documents kept as files under a root directory
//! - [`MockStore`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```no_run
//! use sctext_storage::{DocumentStore, FsStore};
//!
//! let store = FsStore::new("pages");
//! let document = store.load("home.txt")?;
//! println!("{} @ {}", document.id, document.revision());
//! # Ok::<(), sctext_storage::StoreError>(())
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod store;

pub use fs::FsStore;
#[cfg(feature = "mock")]
pub use mock::MockStore;
pub use store::{Document, DocumentStore, ErrorStatus, StoreError, StoreErrorKind, revision_of};
