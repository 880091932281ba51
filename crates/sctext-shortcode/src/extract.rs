//! Editable text extraction.

use std::collections::HashMap;
use std::ops::Range;

use crate::attributes::Attributes;
use crate::catalog::{Catalog, has_text};
use crate::grammar::Grammar;
use crate::text::{CONTENT_KEY, EditableText, TextEdit, TextKind};
use crate::tokenizer::{Occurrence, Shape, Tokenizer, Tokens};

/// Maximum preview length in characters.
const PREVIEW_CHARS: usize = 200;

/// Which extraction path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StrategyKind {
    /// Host grammar with the tag catalog.
    #[default]
    Grammar,
    /// Regex-only fallback.
    Fallback,
}

/// Diagnostic summary of one extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebugInfo {
    /// Extraction path used.
    pub strategy: StrategyKind,
    /// Shortcode occurrences matched, structural ones included.
    pub match_count: usize,
    /// Number of blocks.
    pub block_count: usize,
    /// Malformed markup notes.
    pub warnings: Vec<String>,
    /// Truncated block texts.
    pub block_previews: Vec<String>,
}

/// Physical location of one block inside the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Site {
    /// Absolute start of the raw attribute text.
    pub(crate) attributes_start: usize,
    /// Parsed attributes; value ranges are relative to `attributes_start`.
    pub(crate) attributes: Attributes,
    /// Absolute offset where absent attributes are appended.
    pub(crate) append_at: usize,
    /// Absolute range replaced by an inner-content edit.
    pub(crate) content: Option<Range<usize>>,
}

impl Site {
    /// Site of a tokenized occurrence.
    fn new(
        occurrence: &Occurrence<'_>,
        attributes: Attributes,
        content: Option<Range<usize>>,
    ) -> Self {
        let attributes_start = occurrence.attributes.start;
        Self {
            attributes_start,
            attributes,
            append_at: attributes_start + occurrence.raw_attributes.trim_end().len(),
            content,
        }
    }
}

/// Result of extracting one document.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Editable fields in display order.
    pub texts: Vec<EditableText>,
    /// Full original text of every block, indexed by `block_index`.
    pub blocks: Vec<String>,
    /// Diagnostics.
    pub debug: DebugInfo,
    /// Physical sites of each block, parallel to `blocks`.
    pub(crate) sites: Vec<Vec<Site>>,
}

impl Extraction {
    /// Edits that set every field to its current value.
    ///
    /// Reinjecting them leaves the document unchanged.
    #[must_use]
    pub fn identity_edits(&self) -> Vec<TextEdit> {
        self.texts
            .iter()
            .map(|text| text.edit(text.value.clone()))
            .collect()
    }

    /// Fields belonging to `block_index`.
    pub fn texts_of(&self, block_index: usize) -> impl Iterator<Item = &EditableText> {
        self.texts
            .iter()
            .filter(move |text| text.block_index == block_index)
    }

    /// Number of physical copies a block index stands for.
    #[must_use]
    pub fn copies_of(&self, block_index: usize) -> usize {
        self.sites.get(block_index).map_or(0, Vec::len)
    }
}

/// Accumulates blocks and fields while walking a document.
///
/// Shared by the grammar extractor and the fallback.
#[derive(Debug, Default)]
pub(crate) struct Collector {
    texts: Vec<EditableText>,
    blocks: Vec<String>,
    sites: Vec<Vec<Site>>,
    by_text: HashMap<String, usize>,
    warnings: Vec<String>,
    match_count: usize,
}

impl Collector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Count one matched occurrence.
    pub(crate) fn matched(&mut self) {
        self.match_count += 1;
    }

    pub(crate) fn warn(&mut self, warnings: &[String]) {
        self.warnings.extend_from_slice(warnings);
    }

    /// Assign a block index to an occurrence.
    ///
    /// With `dedupe`, a block whose full text is already known gains another
    /// site instead of a new index. Returns the index and whether it is new.
    pub(crate) fn register(&mut self, full_text: &str, site: Site, dedupe: bool) -> (usize, bool) {
        if dedupe && let Some(&index) = self.by_text.get(full_text) {
            self.sites[index].push(site);
            return (index, false);
        }

        let index = self.blocks.len();
        self.blocks.push(full_text.to_owned());
        self.sites.push(vec![site]);
        self.by_text.entry(full_text.to_owned()).or_insert(index);
        (index, true)
    }

    pub(crate) fn push_text(
        &mut self,
        block_index: usize,
        tag: &str,
        kind: TextKind,
        key: &str,
        value: &str,
    ) {
        self.texts.push(EditableText {
            block_index,
            tag: tag.to_owned(),
            kind,
            key: key.to_owned(),
            value: value.to_owned(),
        });
    }

    pub(crate) fn finish(self, strategy: StrategyKind) -> Extraction {
        let block_previews = self.blocks.iter().map(|block| preview(block)).collect();
        let info = DebugInfo {
            strategy,
            match_count: self.match_count,
            block_count: self.blocks.len(),
            warnings: self.warnings,
            block_previews,
        };

        tracing::debug!(
            strategy = ?strategy,
            blocks = info.block_count,
            fields = self.texts.len(),
            warnings = info.warnings.len(),
            "Extracted editable text"
        );

        Extraction {
            texts: self.texts,
            blocks: self.blocks,
            debug: info,
            sites: self.sites,
        }
    }
}

/// Trimmed range of `body` inside the document, or the whole body if blank.
pub(crate) fn content_range(body: &str, range: Range<usize>) -> Range<usize> {
    let trimmed_start = body.trim_start();
    if trimmed_start.is_empty() {
        return range;
    }
    let start = range.start + (body.len() - trimmed_start.len());
    start..start + trimmed_start.trim_end().len()
}

fn preview(block: &str) -> String {
    match block.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}…", &block[..cut]),
        None => block.to_owned(),
    }
}

/// Extracts editable text using the host grammar and a tag catalog.
///
/// # Example
///
/// ```
/// use sctext_shortcode::{Catalog, Extractor, Grammar, TextKind};
///
/// let catalog = Catalog::builtin();
/// let grammar = Grammar::permissive();
/// let document = r#"[et_pb_section][et_pb_button button_text="Buy"][/et_pb_button][/et_pb_section]"#;
///
/// let extraction = Extractor::new(&catalog, &grammar).extract(document);
///
/// assert_eq!(extraction.blocks.len(), 1);
/// assert_eq!(extraction.texts[0].kind, TextKind::Attribute);
/// assert_eq!(extraction.texts[0].value, "Buy");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Extractor<'a> {
    catalog: &'a Catalog,
    grammar: &'a Grammar,
}

impl<'a> Extractor<'a> {
    /// Create an extractor.
    #[must_use]
    pub fn new(catalog: &'a Catalog, grammar: &'a Grammar) -> Self {
        Self { catalog, grammar }
    }

    /// Catalog used for classification.
    #[must_use]
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Extract every editable field of `document`.
    ///
    /// Block indices follow document order. Nested blocks are numbered
    /// after their parent.
    #[must_use]
    pub fn extract(&self, document: &str) -> Extraction {
        let tokenizer = Tokenizer::new(self.grammar);
        let mut collector = Collector::new();
        self.walk(&tokenizer, document, tokenizer.tokenize(document), false, &mut collector);
        collector.finish(StrategyKind::Grammar)
    }

    fn walk(
        &self,
        tokenizer: &Tokenizer<'_>,
        document: &str,
        tokens: Tokens<'_>,
        nested: bool,
        collector: &mut Collector,
    ) {
        collector.warn(tokens.warnings());

        for occurrence in tokens.into_occurrences() {
            collector.matched();

            if self.catalog.is_structural(occurrence.tag) {
                let inner = tokenizer.tokenize_range(document, occurrence.body.clone());
                self.walk(tokenizer, document, inner, nested, collector);
                continue;
            }

            let attributes = Attributes::parse(occurrence.raw_attributes);
            let classification =
                self.catalog
                    .policy_for(occurrence.tag, &attributes, occurrence.inner_body);

            let body_is_text = classification.body_is_text && occurrence.shape == Shape::Paired;
            let inner = (body_is_text && has_text(occurrence.inner_body))
                .then(|| tokenizer.tokenize_range(document, occurrence.body.clone()))
                .filter(|inner| !inner.is_empty());

            let content = (body_is_text && inner.is_none())
                .then(|| content_range(occurrence.inner_body, occurrence.body.clone()));

            let site = Site::new(&occurrence, attributes.clone(), content.clone());
            let (index, is_new) = collector.register(occurrence.full_text, site, nested);

            if is_new {
                for key in &classification.attribute_keys {
                    if let Some(value) = attributes.get(key) {
                        collector.push_text(index, occurrence.tag, TextKind::Attribute, key, value);
                    }
                }
                if let Some(range) = &content
                    && has_text(&document[range.clone()])
                {
                    collector.push_text(
                        index,
                        occurrence.tag,
                        TextKind::InnerContent,
                        CONTENT_KEY,
                        &document[range.clone()],
                    );
                }
            } else {
                tracing::trace!(block_index = index, tag = occurrence.tag, "Repeated nested block");
            }

            if let Some(inner) = inner {
                self.walk(tokenizer, document, inner, true, collector);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::catalog::TagPolicy;

    fn extract(document: &str) -> Extraction {
        let catalog = Catalog::builtin();
        let grammar = Grammar::permissive();
        Extractor::new(&catalog, &grammar).extract(document)
    }

    fn fields(extraction: &Extraction) -> Vec<(usize, TextKind, &str, &str)> {
        extraction
            .texts
            .iter()
            .map(|t| (t.block_index, t.kind, t.key.as_str(), t.value.as_str()))
            .collect()
    }

    #[test]
    fn test_text_module() {
        let extraction = extract("[et_pb_text]  Hello  [/et_pb_text]");

        assert_eq!(
            fields(&extraction),
            vec![(0, TextKind::InnerContent, "content", "Hello")]
        );
        assert_eq!(extraction.blocks, vec!["[et_pb_text]  Hello  [/et_pb_text]"]);
        assert_eq!(extraction.sites[0][0].content, Some(14..19));
    }

    #[test]
    fn test_attributes_in_source_order() {
        let extraction = extract(
            r#"[et_pb_blurb content="Body" image="x.png" title="Head"][/et_pb_blurb]"#,
        );

        assert_eq!(
            fields(&extraction),
            vec![
                (0, TextKind::Attribute, "content", "Body"),
                (0, TextKind::Attribute, "title", "Head"),
            ]
        );
    }

    #[test]
    fn test_block_without_text_keeps_slot() {
        let extraction = extract(
            r#"[et_pb_divider /][et_pb_button button_text="Go"][/et_pb_button]"#,
        );

        assert_eq!(extraction.blocks.len(), 2);
        assert_eq!(
            fields(&extraction),
            vec![(1, TextKind::Attribute, "button_text", "Go")]
        );
    }

    #[test]
    fn test_structural_tags_take_no_slot() {
        let extraction = extract(
            "[et_pb_section][et_pb_row][et_pb_column]\
             [et_pb_text]A[/et_pb_text][et_pb_text]B[/et_pb_text]\
             [/et_pb_column][/et_pb_row][/et_pb_section]",
        );

        assert_eq!(
            fields(&extraction),
            vec![
                (0, TextKind::InnerContent, "content", "A"),
                (1, TextKind::InnerContent, "content", "B"),
            ]
        );
        assert_eq!(extraction.debug.match_count, 5);
        assert_eq!(extraction.debug.block_count, 2);
    }

    #[test]
    fn test_nested_body_is_recursed() {
        let extraction = extract(
            r#"[et_pb_tabs][et_pb_tab title="One"][et_pb_text]Inside[/et_pb_text][/et_pb_tab][/et_pb_tabs]"#,
        );

        assert_eq!(
            fields(&extraction),
            vec![
                (1, TextKind::Attribute, "title", "One"),
                (2, TextKind::InnerContent, "content", "Inside"),
            ]
        );
        assert_eq!(extraction.blocks.len(), 3);
        assert!(extraction.sites[1][0].content.is_none());
    }

    #[test]
    fn test_nested_duplicates_share_index() {
        let extraction = extract(
            "[et_pb_tab][et_pb_text]Same[/et_pb_text][et_pb_text]Same[/et_pb_text][/et_pb_tab]",
        );

        assert_eq!(extraction.blocks.len(), 2);
        assert_eq!(
            fields(&extraction),
            vec![(1, TextKind::InnerContent, "content", "Same")]
        );
        assert_eq!(extraction.copies_of(1), 2);
    }

    #[test]
    fn test_top_level_duplicates_stay_distinct() {
        let extraction = extract("[et_pb_text]Same[/et_pb_text][et_pb_text]Same[/et_pb_text]");

        assert_eq!(
            fields(&extraction),
            vec![
                (0, TextKind::InnerContent, "content", "Same"),
                (1, TextKind::InnerContent, "content", "Same"),
            ]
        );
    }

    #[test]
    fn test_unknown_tag_heuristics() {
        let with_body = extract(r#"[dipi_typing title="Welcome"]Typed[/dipi_typing]"#);
        let without_body = extract(r#"[dipi_typing title="Welcome"][/dipi_typing]"#);

        assert_eq!(
            fields(&with_body),
            vec![(0, TextKind::InnerContent, "content", "Typed")]
        );
        assert_eq!(
            fields(&without_body),
            vec![(0, TextKind::Attribute, "title", "Welcome")]
        );
    }

    #[test]
    fn test_blank_body_has_slot_but_no_field() {
        let extraction = extract("[et_pb_text]   [/et_pb_text]");

        assert!(extraction.texts.is_empty());
        assert_eq!(extraction.sites[0][0].content, Some(12..15));
    }

    #[test]
    fn test_unclosed_tag_is_warned() {
        let extraction = extract(r#"[et_pb_button button_text="Go"] tail"#);

        assert_eq!(extraction.debug.warnings.len(), 1);
        assert_eq!(
            fields(&extraction),
            vec![(0, TextKind::Attribute, "button_text", "Go")]
        );
        assert!(extraction.sites[0][0].content.is_none());
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = Catalog::empty()
            .with_tag("quote", TagPolicy::attributes(["cite"]).with_inner_content())
            .with_structural("grid");
        let grammar = Grammar::permissive();
        let extraction = Extractor::new(&catalog, &grammar)
            .extract(r#"[grid][quote cite="Ann"]Words[/quote][/grid]"#);

        assert_eq!(
            fields(&extraction),
            vec![
                (0, TextKind::Attribute, "cite", "Ann"),
                (0, TextKind::InnerContent, "content", "Words"),
            ]
        );
    }

    #[test]
    fn test_append_offset_before_self_closing_slash() {
        let extraction = extract(r#"[et_pb_button url="/x" /]"#);
        let site = &extraction.sites[0][0];

        assert_eq!(site.attributes_start, 13);
        assert_eq!(site.append_at, 22);
    }

    #[test]
    fn test_preview_truncates() {
        let long = format!("[et_pb_text]{}[/et_pb_text]", "é".repeat(300));
        let extraction = extract(&long);
        let preview = &extraction.debug.block_previews[0];

        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 1);
        assert!(preview.ends_with('…'));
    }

    #[test]
    fn test_identity_edits_cover_all_fields() {
        let extraction = extract(r#"[et_pb_cta title="T" button_text="B"][/et_pb_cta]"#);
        let edits = extraction.identity_edits();

        assert_eq!(edits.len(), 2);
        assert_eq!(edits[1].value, "B");
        assert_eq!(extraction.texts_of(0).count(), 2);
    }

    #[test]
    fn test_content_range() {
        assert_eq!(content_range("  ab  ", 10..16), 12..14);
        assert_eq!(content_range("ab", 0..2), 0..2);
        assert_eq!(content_range("   ", 5..8), 5..8);
    }
}
