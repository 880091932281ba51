//! Single-pass byte-range replacement.

use std::ops::Range;

/// Collects byte-range replacements for single-pass application.
///
/// Ranges are absolute offsets into the string passed to
/// [`apply()`](Self::apply). Overlapping ranges are refused at insertion so
/// the final pass never has to choose between two edits.
///
/// ```text
/// source:  [a t="1"]x[/a]
///                ^  ^
///          6..7 -> "9"   9..10 -> "y"
/// result:  [a t="9"]y[/a]
/// ```
#[derive(Debug, Default)]
pub(crate) struct Splices {
    items: Vec<(Range<usize>, String)>,
}

impl Splices {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Whether `range` intersects an already registered replacement.
    ///
    /// Empty ranges (insertions) only conflict when strictly inside another
    /// range.
    pub(crate) fn overlaps(&self, range: &Range<usize>) -> bool {
        self.items.iter().any(|(existing, _)| {
            if range.is_empty() {
                existing.start < range.start && range.start < existing.end
            } else if existing.is_empty() {
                range.start < existing.start && existing.start < range.end
            } else {
                range.start < existing.end && existing.start < range.end
            }
        })
    }

    /// Register a replacement; returns `false` if it overlaps another one.
    pub(crate) fn add(&mut self, range: Range<usize>, text: impl Into<String>) -> bool {
        if self.overlaps(&range) {
            return false;
        }
        self.items.push((range, text.into()));
        true
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Apply all replacements in one pass.
    ///
    /// Insertions at the same offset keep their registration order and come
    /// before a replacement starting there.
    pub(crate) fn apply(mut self, source: &str) -> String {
        if self.items.is_empty() {
            return source.to_owned();
        }

        self.items.sort_by_key(|(range, _)| (range.start, range.end));

        let added: usize = self.items.iter().map(|(_, text)| text.len()).sum();
        let mut out = String::with_capacity(source.len() + added);
        let mut cursor = 0;

        for (range, text) in self.items {
            out.push_str(&source[cursor..range.start]);
            out.push_str(&text);
            cursor = range.end;
        }
        out.push_str(&source[cursor..]);

        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_empty_splices() {
        assert_eq!(Splices::new().apply("unchanged"), "unchanged");
    }

    #[test]
    fn test_single_replacement() {
        let mut splices = Splices::new();
        assert!(splices.add(6..11, "universe"));
        assert_eq!(splices.apply("hello world"), "hello universe");
    }

    #[test]
    fn test_replacements_registered_out_of_order() {
        let mut splices = Splices::new();
        splices.add(9..10, "y");
        splices.add(6..7, "9");
        assert_eq!(splices.apply(r#"[a t="1"]x[/a]"#), r#"[a t="9"]y[/a]"#);
    }

    #[test]
    fn test_overlap_is_refused() {
        let mut splices = Splices::new();
        assert!(splices.add(2..6, "x"));
        assert!(!splices.add(4..8, "y"));
        assert!(!splices.add(3..3, "z"));
        assert!(splices.add(6..8, "w"));
    }

    #[test]
    fn test_insertions_at_boundary() {
        let mut splices = Splices::new();
        assert!(splices.add(3..5, "XY"));
        assert!(splices.add(3..3, "<"));
        assert!(splices.add(5..5, ">"));
        assert_eq!(splices.apply("abcdefg"), "abc<XY>fg");
    }

    #[test]
    fn test_insertions_keep_order() {
        let mut splices = Splices::new();
        splices.add(1..1, "1");
        splices.add(1..1, "2");
        assert_eq!(splices.apply("ab"), "a12b");
    }

    #[test]
    fn test_multibyte_offsets() {
        let source = "grüße [x]";
        let mut splices = Splices::new();
        splices.add(0..7, "hi");
        assert_eq!(splices.apply(source), "hi [x]");
    }
}
