//! Shortcode text extraction and reinjection.
//!
//! This crate finds the human-editable text inside page-builder shortcode
//! markup (`[tag attr="value"]body[/tag]`), hands it out as a flat list of
//! [`EditableText`] fields, and later writes edited values back into the
//! original markup without touching anything else.
//!
//! # Architecture
//!
//! ```text
//! document ──► Tokenizer ──► Occurrence* ──► Extractor ──► Extraction
//!                 ▲                              │          (texts, blocks, debug)
//!              Grammar                        Catalog
//!
//! document + TextEdit* ──► (re-extract) ──► Reinjector ──► Reinjection
//! ```
//!
//! - [`Tokenizer`] splits a document into top-level [`Occurrence`]s with byte
//!   ranges, balancing same-named nested tags.
//! - [`Attributes`] parses the raw attribute text of an opening tag.
//! - [`Catalog`] decides which attributes and bodies count as visible text.
//! - [`Extractor`] walks occurrences (recursing into nested bodies) and assigns
//!   every block a stable index.
//! - [`reinject`] applies [`TextEdit`]s addressed by `(block_index, kind, key)`.
//! - [`FallbackExtractor`] is a regex-only path for when no host grammar is
//!   available.
//!
//! [`Engine`] picks one of the two strategies per call.
//!
//! # Example
//!
//! ```
//! use sctext_shortcode::{Catalog, Extractor, Grammar, TextEdit, TextKind, reinject};
//!
//! let catalog = Catalog::builtin();
//! let grammar = Grammar::permissive();
//! let extractor = Extractor::new(&catalog, &grammar);
//!
//! let document = "[et_pb_text]Hello[/et_pb_text]";
//! let extraction = extractor.extract(document);
//! assert_eq!(extraction.texts[0].value, "Hello");
//!
//! let edit = TextEdit::new(0, TextKind::InnerContent, "content", "World");
//! let result = reinject(document, &extraction, &[edit]);
//! assert_eq!(result.document, "[et_pb_text]World[/et_pb_text]");
//! ```

mod attributes;
mod catalog;
mod extract;
mod fallback;
mod grammar;
mod reinject;
mod splice;
mod strategy;
mod text;
mod tokenizer;

pub use attributes::{Attribute, Attributes, Quote};
pub use catalog::{
    Catalog, Classification, DEFAULT_HEURISTIC_ATTRIBUTES, DEFAULT_STRUCTURAL_TAGS, TagPolicy,
};
pub use extract::{DebugInfo, Extraction, Extractor, StrategyKind};
pub use fallback::{
    DEFAULT_FALLBACK_ATTRIBUTES, DEFAULT_FALLBACK_PREFIX, DEFAULT_STRUCTURAL_PREFIXES,
    FallbackExtractor,
};
pub use grammar::Grammar;
pub use reinject::{Reinjection, SkipReason, SkippedEdit, reinject};
pub use strategy::{Engine, TextStrategy};
pub use text::{CONTENT_KEY, EditableText, FieldAddress, TextEdit, TextKind};
pub use tokenizer::{Occurrence, Segment, Shape, Tokenizer, Tokens};
