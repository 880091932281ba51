//! Sanitization of incoming edited values.
//!
//! Values reach the reinjector only after passing through a [`Sanitizer`].

use std::sync::LazyLock;

use regex::Regex;

/// Elements removed together with their content.
const BLOCKED_ELEMENTS: &[&str] = &["script", "style", "iframe", "object", "embed"];

static ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = BLOCKED_ELEMENTS
        .iter()
        .map(|name| format!(r"<{name}\b[^>]*>.*?</{name}\s*>"))
        .collect();
    Regex::new(&format!("(?is){}", alternatives.join("|"))).unwrap()
});

static STRAY_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)</?(?:{})\b[^>]*>",
        BLOCKED_ELEMENTS.join("|")
    ))
    .unwrap()
});

static EVENT_ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:\s+|/)on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).unwrap()
});

static JAVASCRIPT_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript\s*:").unwrap());

/// Cleans one edited value.
pub trait Sanitizer: Send + Sync {
    /// Return the cleaned value.
    fn sanitize(&self, value: &str) -> String;
}

/// Post-content sanitizer.
///
/// Keeps ordinary inline markup, removes active content: script, style,
/// iframe, object and embed elements, `on*` event handler attributes and
/// `javascript:` URLs. Passes repeat until the value is stable, so markup
/// reassembled by one removal is caught by the next.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostSanitizer;

impl Sanitizer for PostSanitizer {
    fn sanitize(&self, value: &str) -> String {
        let mut cleaned = value.to_owned();
        // Every pass only removes text, so this terminates.
        loop {
            let stripped = ELEMENT_RE.replace_all(&cleaned, "");
            let stripped = STRAY_TAG_RE.replace_all(&stripped, "");
            let stripped = EVENT_ATTRIBUTE_RE.replace_all(&stripped, "");
            let stripped = JAVASCRIPT_URL_RE.replace_all(&stripped, "");
            if stripped == cleaned {
                break;
            }
            cleaned = stripped.into_owned();
        }

        if cleaned != value {
            tracing::debug!(
                before = value.len(),
                after = cleaned.len(),
                "Stripped active content"
            );
        }
        cleaned
    }
}

/// Leaves values untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Sanitizer for Passthrough {
    fn sanitize(&self, value: &str) -> String {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(PostSanitizer.sanitize("Hello, world"), "Hello, world");
    }

    #[test]
    fn test_inline_markup_kept() {
        let value = r#"<p>Read <a href="/about">more</a> <strong>now</strong></p>"#;
        assert_eq!(PostSanitizer.sanitize(value), value);
    }

    #[test]
    fn test_strips_script_element() {
        assert_eq!(
            PostSanitizer.sanitize("Hi<script>alert(1)</script> there"),
            "Hi there"
        );
    }

    #[test]
    fn test_strips_multiline_style_and_iframe() {
        let value = "<STYLE>\nbody { display: none }\n</STYLE>A<iframe src=\"x\"></iframe>B";
        assert_eq!(PostSanitizer.sanitize(value), "AB");
    }

    #[test]
    fn test_strips_unclosed_tag() {
        assert_eq!(PostSanitizer.sanitize("A<embed src=\"x.swf\">B"), "AB");
    }

    #[test]
    fn test_strips_event_handlers() {
        assert_eq!(
            PostSanitizer.sanitize(r#"<p onclick="steal()">Hi</p><img src="a.png" onerror='x()'>"#),
            r#"<p>Hi</p><img src="a.png">"#
        );
    }

    #[test]
    fn test_strips_slash_separated_event_handler() {
        assert_eq!(
            PostSanitizer.sanitize("<img/src=x/onerror=alert(1)>"),
            "<img/src=x>"
        );
    }

    #[test]
    fn test_strips_tags_reassembled_by_removal() {
        assert_eq!(
            PostSanitizer.sanitize("<scr<embed>ipt>alert(1)</scr<embed>ipt>"),
            ""
        );
        assert_eq!(
            PostSanitizer.sanitize(r#"<a href="javajavascript:script:x()">y</a>"#),
            r#"<a href="x()">y</a>"#
        );
    }

    #[test]
    fn test_strips_javascript_urls() {
        assert_eq!(
            PostSanitizer.sanitize(r#"<a href="JavaScript:alert(1)">x</a>"#),
            r#"<a href="alert(1)">x</a>"#
        );
    }

    #[test]
    fn test_passthrough() {
        let value = "<script>x</script>";
        assert_eq!(Passthrough.sanitize(value), value);
    }
}
