//! Fetch and save orchestration for shortcode text editing.
//!
//! [`Editor`] wraps the pure extraction core with the collaborators a real
//! request needs:
//!
//! 1. Authorization via a [`Guard`], asked before every read and write
//! 2. Loading and saving through a [`DocumentStore`](sctext_storage::DocumentStore)
//! 3. Sanitizing incoming values with a [`Sanitizer`]
//! 4. Optimistic revision checks so concurrent edits are not lost silently
//!
//! A save request may target several documents. Each one is processed on
//! its own and reported in its own [`DocumentOutcome`].

mod editor;
mod envelope;
mod error;
mod guard;
mod sanitize;

pub use editor::Editor;
pub use envelope::{
    DocumentOutcome, Edit, FetchResponse, OutcomeStatus, SaveRequest, TextRecord,
};
pub use error::EditorError;
pub use guard::{AllowAll, AllowList, Guard};
pub use sanitize::{Passthrough, PostSanitizer, Sanitizer};
