//! Extraction strategy selection.

use crate::catalog::Catalog;
use crate::extract::{Extraction, Extractor, StrategyKind};
use crate::fallback::FallbackExtractor;
use crate::grammar::Grammar;
use crate::reinject::{Reinjection, reinject};
use crate::text::TextEdit;

/// A way to extract editable text and write edits back.
///
/// Reinjection always re-extracts the current document with the same
/// strategy, so block indices line up with what a fresh fetch returns.
pub trait TextStrategy {
    /// Which path this is.
    fn kind(&self) -> StrategyKind;

    /// Extract editable fields.
    fn extract(&self, document: &str) -> Extraction;

    /// Apply edits to `document`.
    fn reinject(&self, document: &str, edits: &[TextEdit]) -> Reinjection {
        let extraction = self.extract(document);
        reinject(document, &extraction, edits)
    }
}

impl TextStrategy for Extractor<'_> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Grammar
    }

    fn extract(&self, document: &str) -> Extraction {
        Extractor::extract(self, document)
    }
}

impl TextStrategy for FallbackExtractor {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Fallback
    }

    fn extract(&self, document: &str) -> Extraction {
        FallbackExtractor::extract(self, document)
    }
}

/// The strategy chosen for one call.
///
/// # Example
///
/// ```
/// use sctext_shortcode::{Catalog, Engine, FallbackExtractor, StrategyKind, TextStrategy};
///
/// let catalog = Catalog::builtin();
/// let fallback = FallbackExtractor::new();
///
/// let engine = Engine::select(None, &catalog, &fallback);
/// assert_eq!(engine.kind(), StrategyKind::Fallback);
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Engine<'a> {
    /// Host grammar with the tag catalog.
    Grammar(Extractor<'a>),
    /// Regex-only fallback.
    Fallback(&'a FallbackExtractor),
}

impl<'a> Engine<'a> {
    /// Use the host grammar when there is one, otherwise the fallback.
    #[must_use]
    pub fn select(
        grammar: Option<&'a Grammar>,
        catalog: &'a Catalog,
        fallback: &'a FallbackExtractor,
    ) -> Self {
        match grammar {
            Some(grammar) => Self::Grammar(Extractor::new(catalog, grammar)),
            None => {
                tracing::info!(
                    prefix = fallback.prefix(),
                    "Shortcode grammar unavailable, using regex fallback"
                );
                Self::Fallback(fallback)
            }
        }
    }
}

impl TextStrategy for Engine<'_> {
    fn kind(&self) -> StrategyKind {
        match self {
            Self::Grammar(extractor) => extractor.kind(),
            Self::Fallback(fallback) => fallback.kind(),
        }
    }

    fn extract(&self, document: &str) -> Extraction {
        match self {
            Self::Grammar(extractor) => TextStrategy::extract(extractor, document),
            Self::Fallback(fallback) => TextStrategy::extract(*fallback, document),
        }
    }
}
