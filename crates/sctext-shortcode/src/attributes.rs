//! Shortcode attribute parsing and rewriting.
//!
//! Parses the raw attribute text of an opening tag:
//! `key="value" key='value' key=value flag`.

use std::ops::Range;

/// How an attribute value is written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    /// `key="value"`
    Double,
    /// `key='value'`
    Single,
    /// `key=value`
    Bare,
    /// `key` with no value.
    Flag,
}

/// One parsed attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Raw value (empty for flags).
    pub value: String,
    /// Quoting style found in the source.
    pub quote: Quote,
    /// Range of the value, relative to the raw attribute text.
    ///
    /// Excludes quotes. For flags this is the empty range just past the name.
    pub value_range: Range<usize>,
}

impl Attribute {
    /// Replacement range and text that set this attribute to `value`.
    ///
    /// Keeps the quoting style when possible. Bare values that would need
    /// quoting and flags gain double quotes.
    pub(crate) fn replacement(&self, value: &str) -> (Range<usize>, String) {
        match self.quote {
            Quote::Double | Quote::Single => {
                (self.value_range.clone(), encode_value(value, self.quote))
            }
            Quote::Bare if is_bare_safe(value) => (self.value_range.clone(), value.to_owned()),
            Quote::Bare => (
                self.value_range.clone(),
                format!("\"{}\"", encode_value(value, Quote::Double)),
            ),
            Quote::Flag => (
                self.value_range.clone(),
                format!("=\"{}\"", encode_value(value, Quote::Double)),
            ),
        }
    }
}

/// Ordered attribute list of one opening tag.
///
/// # Example
///
/// ```
/// use sctext_shortcode::{Attributes, Quote};
///
/// let attrs = Attributes::parse(r#" title="Hi" size='2' align=left hidden"#);
/// assert_eq!(attrs.get("title"), Some("Hi"));
/// assert_eq!(attrs.get("size"), Some("2"));
/// assert_eq!(attrs.get("align"), Some("left"));
/// assert_eq!(attrs.find("hidden").map(|a| a.quote), Some(Quote::Flag));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    items: Vec<Attribute>,
}

impl Attributes {
    /// Parse raw attribute text.
    ///
    /// Tolerant: unterminated quotes run to the end of the text, stray
    /// characters are skipped. A repeated name keeps its first position
    /// and takes the later value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut attributes = Self::default();
        let mut pos = skip_whitespace(raw, 0);

        while pos < raw.len() {
            let rest = &raw[pos..];

            // Positional quoted value: "text" or 'text'. It names no
            // attribute, so it is stepped over and never addressable.
            if let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') {
                let inner_start = pos + 1;
                let inner_end = raw[inner_start..]
                    .find(quote)
                    .map_or(raw.len(), |i| inner_start + i);
                pos = skip_whitespace(raw, (inner_end + 1).min(raw.len()));
                continue;
            }

            let name_len = rest
                .find(|c: char| c.is_whitespace() || c == '=' || c == '"' || c == '\'')
                .unwrap_or(rest.len());
            let name_end = pos + name_len;
            let name = &raw[pos..name_end];
            let after_name = skip_whitespace(raw, name_end);

            if raw[after_name..].starts_with('=') {
                let (value_range, quote, next) = parse_value(raw, after_name + 1);
                if !name.is_empty() {
                    attributes.push(Attribute {
                        name: name.to_owned(),
                        value: raw[value_range.clone()].to_owned(),
                        quote,
                        value_range,
                    });
                }
                pos = skip_whitespace(raw, next);
            } else if name.is_empty() {
                // Lone quote-adjacent junk; step over one character.
                let step = rest.chars().next().map_or(1, char::len_utf8);
                pos = skip_whitespace(raw, pos + step);
            } else {
                attributes.push(flag(name, name_end));
                pos = after_name;
            }
        }

        attributes
    }

    /// Value of the named attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.find(name).map(|a| a.value.as_str())
    }

    /// The named attribute.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Attribute> {
        self.items.iter().find(|a| a.name == name)
    }

    /// Attributes in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.items.iter()
    }

    /// Number of distinct attribute names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add an attribute; a repeated name overwrites in place.
    pub(crate) fn push(&mut self, attribute: Attribute) {
        match self.items.iter_mut().find(|a| a.name == attribute.name) {
            Some(existing) => *existing = attribute,
            None => self.items.push(attribute),
        }
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Text that appends `name="value"` to an opening tag.
pub(crate) fn append_text(name: &str, value: &str) -> String {
    format!(" {name}=\"{}\"", encode_value(value, Quote::Double))
}

/// Escape characters that would end the value or the tag early.
fn encode_value(value: &str, quote: Quote) -> String {
    let mut encoded = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' if quote == Quote::Double => encoded.push_str("&quot;"),
            '\'' if quote == Quote::Single => encoded.push_str("&#039;"),
            '[' => encoded.push_str("&#91;"),
            ']' => encoded.push_str("&#93;"),
            _ => encoded.push(c),
        }
    }
    encoded
}

fn is_bare_safe(value: &str) -> bool {
    !value.is_empty()
        && !value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '[' | ']' | '/'))
}

fn flag(name: &str, name_end: usize) -> Attribute {
    Attribute {
        name: name.to_owned(),
        value: String::new(),
        quote: Quote::Flag,
        value_range: name_end..name_end,
    }
}

/// Parse a value starting at `start` (just past `=`).
///
/// Returns (value range, quote style, offset after the value).
fn parse_value(raw: &str, start: usize) -> (Range<usize>, Quote, usize) {
    let start = skip_whitespace(raw, start);
    let rest = &raw[start..];

    for (marker, quote) in [('"', Quote::Double), ('\'', Quote::Single)] {
        if rest.starts_with(marker) {
            let value_start = start + 1;
            return match raw[value_start..].find(marker) {
                Some(i) => (value_start..value_start + i, quote, value_start + i + 1),
                None => (value_start..raw.len(), quote, raw.len()),
            };
        }
    }

    let end = rest.find(char::is_whitespace).map_or(raw.len(), |i| start + i);
    (start..end, Quote::Bare, end)
}

fn skip_whitespace(raw: &str, pos: usize) -> usize {
    let rest = &raw[pos..];
    pos + (rest.len() - rest.trim_start().len())
}
