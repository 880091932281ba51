//! Host shortcode dialect.

use std::collections::BTreeSet;

/// Which tag names the host recognizes as shortcodes.
///
/// Names outside the grammar are left as plain text by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grammar {
    registered: Option<BTreeSet<String>>,
}

impl Grammar {
    /// Accept every syntactically valid tag name.
    #[must_use]
    pub fn permissive() -> Self {
        Self { registered: None }
    }

    /// Accept only the given tag names.
    #[must_use]
    pub fn registered<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            registered: Some(names.into_iter().map(Into::into).collect()),
        }
    }

    /// Check whether `name` is a shortcode in this dialect.
    #[must_use]
    pub fn accepts(&self, name: &str) -> bool {
        is_valid_tag_name(name)
            && self
                .registered
                .as_ref()
                .is_none_or(|names| names.contains(name))
    }

    /// Whether the grammar is restricted to a registered set.
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        self.registered.is_some()
    }
}

/// Valid names start with an ASCII letter and continue with
/// alphanumerics, hyphens or underscores.
pub(crate) fn is_valid_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic()) && chars.all(is_tag_name_char)
}

pub(crate) fn is_tag_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tag_names() {
        assert!(is_valid_tag_name("et_pb_text"));
        assert!(is_valid_tag_name("dipi-typing-text"));
        assert!(is_valid_tag_name("x"));
        assert!(!is_valid_tag_name(""));
        assert!(!is_valid_tag_name("1"));
        assert!(!is_valid_tag_name("_hidden"));
        assert!(!is_valid_tag_name("foo@bar"));
    }

    #[test]
    fn test_permissive_accepts_any_valid_name() {
        let grammar = Grammar::permissive();
        assert!(grammar.accepts("anything"));
        assert!(!grammar.accepts("42"));
        assert!(!grammar.is_restricted());
    }

    #[test]
    fn test_registered_rejects_unknown_names() {
        let grammar = Grammar::registered(["et_pb_text", "et_pb_button"]);
        assert!(grammar.accepts("et_pb_text"));
        assert!(!grammar.accepts("gallery"));
        assert!(grammar.is_restricted());
    }
}
