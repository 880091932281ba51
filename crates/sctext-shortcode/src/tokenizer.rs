//! Shortcode tokenizer.
//!
//! Splits markup into top-level shortcode occurrences:
//! `[name attrs]body[/name]`, `[name attrs /]`, or an opening tag that is
//! never closed. Nested occurrences are found by tokenizing an occurrence's
//! body range again.

use std::collections::HashMap;
use std::ops::Range;

use crate::grammar::{Grammar, is_tag_name_char};

/// How an occurrence was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `[name]body[/name]`
    Paired,
    /// `[name /]`
    SelfClosing,
    /// `[name]` with no matching `[/name]`; treated as an empty body.
    Unclosed,
}

/// One matched shortcode.
///
/// All ranges are absolute byte offsets into the tokenized document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence<'a> {
    /// Tag name.
    pub tag: &'a str,
    /// Unparsed attribute text of the opening tag (without the trailing `/`).
    pub raw_attributes: &'a str,
    /// Text between the opening and closing tag (empty unless paired).
    pub inner_body: &'a str,
    /// Entire matched span including brackets.
    pub full_text: &'a str,
    /// Range of `full_text`.
    pub span: Range<usize>,
    /// Range of the opening tag, `[` to `]` inclusive.
    pub open_tag: Range<usize>,
    /// Range of `raw_attributes`.
    pub attributes: Range<usize>,
    /// Range of `inner_body`.
    pub body: Range<usize>,
    /// How the occurrence was closed.
    pub shape: Shape,
}

/// Text or shortcode piece of a tokenized range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Untouched text between occurrences.
    Text(&'a str),
    /// A matched occurrence.
    Shortcode(Occurrence<'a>),
}

/// Result of tokenizing a range of a document.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    source: &'a str,
    range: Range<usize>,
    occurrences: Vec<Occurrence<'a>>,
    warnings: Vec<String>,
}

impl<'a> Tokens<'a> {
    /// Top-level occurrences in document order.
    #[must_use]
    pub fn occurrences(&self) -> &[Occurrence<'a>] {
        &self.occurrences
    }

    /// Consume and return the occurrences.
    #[must_use]
    pub fn into_occurrences(self) -> Vec<Occurrence<'a>> {
        self.occurrences
    }

    /// Malformed markup noticed while tokenizing.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Whether no occurrence was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// Interleave occurrences with the text around them.
    ///
    /// Concatenating every segment gives back the tokenized range exactly.
    #[must_use]
    pub fn segments(&self) -> Vec<Segment<'a>> {
        let mut segments = Vec::with_capacity(self.occurrences.len() * 2 + 1);
        let mut cursor = self.range.start;

        for occurrence in &self.occurrences {
            if occurrence.span.start > cursor {
                segments.push(Segment::Text(&self.source[cursor..occurrence.span.start]));
            }
            segments.push(Segment::Shortcode(occurrence.clone()));
            cursor = occurrence.span.end;
        }

        if cursor < self.range.end {
            segments.push(Segment::Text(&self.source[cursor..self.range.end]));
        }

        segments
    }
}

/// Parsed opening tag.
struct OpenTag {
    name: Range<usize>,
    attributes: Range<usize>,
    /// Offset just past the closing `]`.
    end: usize,
    self_closing: bool,
}

/// Tokenizer for a shortcode dialect.
///
/// # Example
///
/// ```
/// use sctext_shortcode::{Grammar, Shape, Tokenizer};
///
/// let grammar = Grammar::permissive();
/// let tokens = Tokenizer::new(&grammar).tokenize("[x][x]inner[/x]outer[/x]");
///
/// let outer = &tokens.occurrences()[0];
/// assert_eq!(tokens.occurrences().len(), 1);
/// assert_eq!(outer.inner_body, "[x]inner[/x]outer");
/// assert_eq!(outer.shape, Shape::Paired);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer<'g> {
    grammar: &'g Grammar,
}

impl<'g> Tokenizer<'g> {
    /// Create a tokenizer for the given grammar.
    #[must_use]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    /// Tokenize a whole document.
    #[must_use]
    pub fn tokenize<'a>(&self, source: &'a str) -> Tokens<'a> {
        self.tokenize_range(source, 0..source.len())
    }

    /// Tokenize `range` of `source`, reporting absolute offsets.
    ///
    /// Never fails: unbalanced markup becomes text or empty-body occurrences.
    #[must_use]
    pub fn tokenize_range<'a>(&self, source: &'a str, range: Range<usize>) -> Tokens<'a> {
        let end = range.end;
        let mut pos = range.start;
        let mut occurrences = Vec::new();
        let mut warnings = Vec::new();
        let mut closers = Closers::new(range.start);

        while pos < end {
            let Some(rel) = source[pos..end].find('[') else {
                break;
            };
            let start = pos + rel;

            // `[[name]]` is an escaped shortcode and stays literal text.
            if source[start + 1..end].starts_with('[') {
                pos = self
                    .escaped_end(source, start, end, &mut closers)
                    .unwrap_or(start + 1);
                continue;
            }

            match self.parse_at(source, start, end, &mut warnings, &mut closers) {
                Some(occurrence) => {
                    pos = occurrence.span.end;
                    occurrences.push(occurrence);
                }
                None => pos = start + 1,
            }
        }

        Tokens {
            source,
            range,
            occurrences,
            warnings,
        }
    }

    /// Parse an occurrence whose opening `[` sits at `start`.
    fn parse_at<'a>(
        &self,
        source: &'a str,
        start: usize,
        end: usize,
        warnings: &mut Vec<String>,
        closers: &mut Closers<'a>,
    ) -> Option<Occurrence<'a>> {
        let open = self.parse_open(source, start, end)?;
        let tag = &source[open.name.clone()];

        if open.self_closing {
            let body = open.end..open.end;
            return Some(build(source, tag, &open, start, body, open.end, Shape::SelfClosing));
        }

        match self.find_close(source, tag, open.end, end, closers) {
            Some(close) => Some(build(
                source,
                tag,
                &open,
                start,
                open.end..close.start,
                close.end,
                Shape::Paired,
            )),
            None => {
                warnings.push(format!(
                    "byte {start}: [{tag}] has no matching [/{tag}], treated as empty"
                ));
                let body = open.end..open.end;
                Some(build(source, tag, &open, start, body, open.end, Shape::Unclosed))
            }
        }
    }

    /// Parse `[name attrs]` or `[name attrs /]` starting at `start`.
    fn parse_open(&self, source: &str, start: usize, end: usize) -> Option<OpenTag> {
        let name_start = start + 1;
        let rest = source.get(name_start..end)?;

        let name_len = rest.find(|c: char| !is_tag_name_char(c)).unwrap_or(rest.len());
        let name = &rest[..name_len];
        if !self.grammar.accepts(name) {
            return None;
        }

        // The name must end at whitespace, `]` or `/`.
        let after_name = &rest[name_len..];
        let next = after_name.chars().next()?;
        if !(next.is_whitespace() || next == ']' || next == '/') {
            return None;
        }

        let close_rel = after_name.find(']')?;
        let attributes_start = name_start + name_len;
        let bracket = attributes_start + close_rel;
        let inside = &source[attributes_start..bracket];
        let trimmed = inside.trim_end();

        let (attributes_end, self_closing) = match trimmed.strip_suffix('/') {
            Some(before_slash) => (attributes_start + before_slash.trim_end().len(), true),
            None => (bracket, false),
        };

        Some(OpenTag {
            name: name_start..attributes_start,
            attributes: attributes_start..attributes_end,
            end: bracket + 1,
            self_closing,
        })
    }

    /// End of the escaped shortcode whose outer `[[` sits at `at`.
    ///
    /// Both `[[name attrs]]` and `[[name]body[/name]]` are escapes.
    fn escaped_end<'a>(
        &self,
        source: &'a str,
        at: usize,
        end: usize,
        closers: &mut Closers<'a>,
    ) -> Option<usize> {
        let open = self.parse_open(source, at + 1, end)?;
        if source[open.end..end].starts_with(']') {
            return Some(open.end + 1);
        }
        if open.self_closing {
            return None;
        }
        let name = &source[open.name.clone()];
        let close = self.find_close(source, name, open.end, end, closers)?;
        source[close.end..end]
            .starts_with(']')
            .then_some(close.end + 1)
    }

    /// Find the `[/name]` that balances an opening tag ending at `from`.
    ///
    /// Same-named openings in between raise the depth, so the match is the
    /// nearest closing tag with no unmatched nested opening before it.
    /// Escaped shortcodes are skipped as a whole. Openings with no closing
    /// tag anywhere after them return early instead of scanning the rest of
    /// the range.
    fn find_close<'a>(
        &self,
        source: &'a str,
        name: &'a str,
        from: usize,
        end: usize,
        closers: &mut Closers<'a>,
    ) -> Option<Range<usize>> {
        let last = closers.last(source, name, end)?;
        if last < from {
            return None;
        }

        let mut depth = 1usize;
        let mut pos = from;

        while pos <= last {
            let at = pos + source[pos..end].find('[')?;
            let rest = &source[at..end];

            if let Some(after_slash) = rest.strip_prefix("[/") {
                if after_slash.strip_prefix(name).is_some_and(|r| r.starts_with(']')) {
                    let close_end = at + name.len() + 3;
                    depth -= 1;
                    if depth == 0 {
                        return Some(at..close_end);
                    }
                    pos = close_end;
                    continue;
                }
            } else if rest.starts_with("[[")
                && let Some(escape_end) = self.escaped_end(source, at, end, closers)
            {
                pos = escape_end;
                continue;
            } else if let Some(open) = self.parse_open(source, at, end)
                && &source[open.name.clone()] == name
            {
                if !open.self_closing {
                    depth += 1;
                }
                pos = open.end;
                continue;
            }

            pos = at + 1;
        }

        None
    }
}

/// Start of the last `[/name]` in the scanned range, per tag name.
struct Closers<'a> {
    start: usize,
    last: HashMap<&'a str, Option<usize>>,
}

impl<'a> Closers<'a> {
    fn new(start: usize) -> Self {
        Self {
            start,
            last: HashMap::new(),
        }
    }

    fn last(&mut self, source: &str, name: &'a str, end: usize) -> Option<usize> {
        let start = self.start;
        *self.last.entry(name).or_insert_with(|| {
            source[start..end]
                .rfind(&format!("[/{name}]"))
                .map(|i| start + i)
        })
    }
}

fn build<'a>(
    source: &'a str,
    tag: &'a str,
    open: &OpenTag,
    start: usize,
    body: Range<usize>,
    end: usize,
    shape: Shape,
) -> Occurrence<'a> {
    Occurrence {
        tag,
        raw_attributes: &source[open.attributes.clone()],
        inner_body: &source[body.clone()],
        full_text: &source[start..end],
        span: start..end,
        open_tag: start..open.end,
        attributes: open.attributes.clone(),
        body,
        shape,
    }
}
