//! Regex-only extraction used when no host grammar is available.
//!
//! Lower fidelity than [`Extractor`](crate::Extractor): only tags with a
//! fixed name prefix are seen, a paired tag ends at the first closing tag
//! with its name, and one priority list of attribute names replaces the
//! per-tag catalog. Results have the same shape, so [`reinject`](crate::reinject)
//! works on them unchanged.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::attributes::{Attribute, Attributes, Quote};
use crate::catalog::has_text;
use crate::extract::{Collector, Extraction, Site, StrategyKind, content_range};
use crate::text::{CONTENT_KEY, TextKind};

/// Tag name prefix recognized by default.
pub const DEFAULT_FALLBACK_PREFIX: &str = "et_pb_";

/// Name suffixes (after the prefix) of layout containers.
pub const DEFAULT_STRUCTURAL_PREFIXES: &[&str] = &["section", "row", "column", "fullwidth_section"];

/// Attribute names surfaced as text, in output order.
pub const DEFAULT_FALLBACK_ATTRIBUTES: &[&str] = &[
    "title",
    "heading",
    "content",
    "button_text",
    "button_one_text",
    "button_two_text",
    "subhead",
    "name",
    "position",
    "author",
    "job_title",
    "company_name",
    "placeholder",
    "field_title",
    "subtitle",
    "sum",
    "number",
    "success_message",
    "submit_button_text",
];

static OPEN_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([A-Za-z][\w-]*)([^\]]*)\]").unwrap());

static SELF_CLOSING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([A-Za-z][\w-]*)([^\]]*)/\]").unwrap());

static ATTRIBUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\w+)=(?:"([^"]*)"|'([^']*)')"#).unwrap());

/// Regex-based extractor restricted to one tag prefix.
///
/// # Example
///
/// ```
/// use sctext_shortcode::{FallbackExtractor, StrategyKind};
///
/// let fallback = FallbackExtractor::new();
/// let extraction = fallback.extract(r#"[et_pb_row][et_pb_cta title="Hi"]Body[/et_pb_cta][/et_pb_row]"#);
///
/// assert_eq!(extraction.debug.strategy, StrategyKind::Fallback);
/// assert_eq!(extraction.texts.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackExtractor {
    prefix: String,
    structural: Vec<String>,
    attributes: Vec<String>,
}

impl Default for FallbackExtractor {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_FALLBACK_PREFIX.to_owned(),
            structural: to_strings(DEFAULT_STRUCTURAL_PREFIXES),
            attributes: to_strings(DEFAULT_FALLBACK_ATTRIBUTES),
        }
    }
}

impl FallbackExtractor {
    /// Fallback with the page-builder defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tag name prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the structural name suffixes.
    #[must_use]
    pub fn with_structural_prefixes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.structural = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the attribute priority list.
    #[must_use]
    pub fn with_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = names.into_iter().map(Into::into).collect();
        self
    }

    /// Tag name prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Extract editable text from `document`.
    #[must_use]
    pub fn extract(&self, document: &str) -> Extraction {
        let mut collector = Collector::new();
        self.walk(document, 0..document.len(), &mut collector);
        collector.finish(StrategyKind::Fallback)
    }

    fn walk(&self, document: &str, range: Range<usize>, collector: &mut Collector) {
        let base = range.start;
        let text = &document[range];
        let mut paired: Vec<Range<usize>> = Vec::new();

        // Paired tags, each ending at the first closing tag with its name.
        let mut pos = 0;
        while let Some(caps) = OPEN_TAG_RE.captures_at(text, pos) {
            let (Some(whole), Some(name), Some(raw)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                break;
            };
            pos = whole.end();

            let Some(suffix) = name.as_str().strip_prefix(self.prefix.as_str()) else {
                continue;
            };
            if raw.as_str().trim_end().ends_with('/') {
                continue;
            }
            if self.is_structural(suffix) {
                collector.matched();
                continue;
            }

            let closing = format!("[/{}]", name.as_str());
            let Some(close) = text[whole.end()..].find(&closing) else {
                continue;
            };
            let body = whole.end()..whole.end() + close;
            let end = body.end + closing.len();
            collector.matched();

            let inner_body = &text[body.clone()];
            let absolute_body = base + body.start..base + body.end;
            let nested = has_text(inner_body) && self.contains_tag(inner_body);
            let content = (!nested).then(|| content_range(inner_body, absolute_body.clone()));

            let index = self.record(
                document,
                collector,
                &caps,
                &text[whole.start()..end],
                base,
                content,
            );
            tracing::trace!(block_index = index, tag = name.as_str(), "Fallback block");

            if nested {
                self.walk(document, absolute_body, collector);
            }

            paired.push(base + whole.start()..base + end);
            pos = end;
        }

        // Self-closing tags outside the paired spans found above.
        for caps in SELF_CLOSING_RE.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let start = base + whole.start();
            if paired.iter().any(|span| span.contains(&start)) {
                continue;
            }
            let Some(suffix) = name.as_str().strip_prefix(self.prefix.as_str()) else {
                continue;
            };
            collector.matched();
            if self.is_structural(suffix) {
                continue;
            }
            self.record(document, collector, &caps, whole.as_str(), base, None);
        }
    }

    /// Register one matched tag and emit its fields.
    fn record(
        &self,
        document: &str,
        collector: &mut Collector,
        caps: &Captures<'_>,
        full_text: &str,
        base: usize,
        content: Option<Range<usize>>,
    ) -> usize {
        let tag = caps.get(1).map_or("", |m| m.as_str());
        let (raw, attributes_start) = caps
            .get(2)
            .map_or(("", base), |m| (m.as_str(), base + m.start()));
        let attributes = parse_attributes(raw);

        let site = Site {
            attributes_start,
            attributes: attributes.clone(),
            append_at: attributes_start + raw.trim_end().len(),
            content: content.clone(),
        };
        let (index, _) = collector.register(full_text, site, false);

        for key in &self.attributes {
            if let Some(value) = attributes.get(key).filter(|v| has_text(v)) {
                collector.push_text(index, tag, TextKind::Attribute, key, value);
            }
        }
        if let Some(range) = content
            && has_text(&document[range.clone()])
        {
            collector.push_text(
                index,
                tag,
                TextKind::InnerContent,
                CONTENT_KEY,
                &document[range],
            );
        }

        index
    }

    fn is_structural(&self, suffix: &str) -> bool {
        self.structural.iter().any(|s| suffix.starts_with(s.as_str()))
    }

    fn contains_tag(&self, body: &str) -> bool {
        body.contains(&format!("[{}", self.prefix))
    }
}

/// Quoted `name="value"` pairs only; bare values and flags are ignored.
fn parse_attributes(raw: &str) -> Attributes {
    let mut attributes = Attributes::default();
    for caps in ATTRIBUTE_RE.captures_iter(raw) {
        let Some(name) = caps.get(1) else {
            continue;
        };
        let (value, quote) = match (caps.get(2), caps.get(3)) {
            (Some(value), _) => (value, Quote::Double),
            (None, Some(value)) => (value, Quote::Single),
            (None, None) => continue,
        };
        attributes.push(Attribute {
            name: name.as_str().to_owned(),
            value: value.as_str().to_owned(),
            quote,
            value_range: value.range(),
        });
    }
    attributes
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}
