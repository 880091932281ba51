//! Tag catalog and text classification policy.
//!
//! Maps known tag names to the attributes and body that hold visible text.
//! Tags missing from the catalog fall back to a heuristic, and structural
//! container tags are never treated as text holders.

use std::collections::{HashMap, HashSet};

use crate::attributes::Attributes;

/// Container tags that never hold visible text of their own.
pub const DEFAULT_STRUCTURAL_TAGS: &[&str] = &[
    "et_pb_section",
    "et_pb_row",
    "et_pb_row_inner",
    "et_pb_column",
    "et_pb_column_inner",
    "et_pb_fullwidth_section",
];

/// Attribute names tried, in order, for tags missing from the catalog.
pub const DEFAULT_HEURISTIC_ATTRIBUTES: &[&str] = &[
    "title",
    "heading",
    "button_text",
    "label",
    "text",
    "subhead",
    "subtitle",
    "name",
    "content",
];

/// Which parts of a tag are visible text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPolicy {
    /// Whether the inner body is text.
    pub uses_inner_content: bool,
    /// Attribute names holding visible text.
    pub text_attributes: Vec<String>,
}

impl TagPolicy {
    /// Policy with text attributes and no body.
    #[must_use]
    pub fn attributes<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            uses_inner_content: false,
            text_attributes: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Policy whose body is text.
    #[must_use]
    pub fn inner_content() -> Self {
        Self {
            uses_inner_content: true,
            text_attributes: Vec::new(),
        }
    }

    /// Also treat the body as text.
    #[must_use]
    pub fn with_inner_content(mut self) -> Self {
        self.uses_inner_content = true;
        self
    }
}

/// Effective classification of one occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification<'a> {
    /// Text attribute names in source order.
    pub attribute_keys: Vec<&'a str>,
    /// Whether the body is text.
    pub body_is_text: bool,
}

/// Immutable tag catalog.
///
/// Built once and handed to the extractor; swap in a different catalog to
/// support another tag vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    policies: HashMap<String, TagPolicy>,
    structural: HashSet<String>,
    heuristic: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Catalog with no tag policies, no structural tags and the default
    /// heuristic list.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            policies: HashMap::new(),
            structural: HashSet::new(),
            heuristic: DEFAULT_HEURISTIC_ATTRIBUTES
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
        }
    }

    /// Page-builder module catalog.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for tag in DEFAULT_STRUCTURAL_TAGS {
            catalog.structural.insert((*tag).to_owned());
        }

        catalog
            .with_tag("et_pb_text", TagPolicy::inner_content())
            .with_tag("et_pb_blurb", TagPolicy::attributes(["title", "content"]))
            .with_tag("et_pb_button", TagPolicy::attributes(["button_text"]))
            .with_tag(
                "et_pb_fullwidth_header",
                TagPolicy::attributes([
                    "title",
                    "subhead",
                    "content",
                    "button_one_text",
                    "button_two_text",
                ]),
            )
            .with_tag(
                "et_pb_testimonial",
                TagPolicy::attributes(["author", "job_title", "company_name", "content"]),
            )
            .with_tag(
                "et_pb_accordion_item",
                TagPolicy::attributes(["title", "content"]),
            )
            .with_tag("et_pb_toggle", TagPolicy::attributes(["title", "content"]))
            .with_tag(
                "et_pb_slide",
                TagPolicy::attributes(["heading", "button_text", "content"]),
            )
            .with_tag(
                "et_pb_cta",
                TagPolicy::attributes(["title", "button_text", "content"]),
            )
            .with_tag("et_pb_countdown_timer", TagPolicy::attributes(["title"]))
            .with_tag(
                "et_pb_pricing_table",
                TagPolicy::attributes([
                    "title",
                    "subtitle",
                    "currency",
                    "per",
                    "sum",
                    "button_text",
                ])
                .with_inner_content(),
            )
            .with_tag(
                "et_pb_tab",
                TagPolicy::attributes(["title"]).with_inner_content(),
            )
            .with_tag(
                "et_pb_number_counter",
                TagPolicy::attributes(["title", "number"]),
            )
            .with_tag(
                "et_pb_team_member",
                TagPolicy::attributes(["name", "position"]).with_inner_content(),
            )
            .with_tag(
                "et_pb_contact_form",
                TagPolicy::attributes(["title", "success_message", "submit_button_text"])
                    .with_inner_content(),
            )
            .with_tag(
                "et_pb_search",
                TagPolicy::attributes(["button_text", "placeholder"]),
            )
            .with_tag(
                "et_pb_signup_custom_field",
                TagPolicy::attributes(["field_title"]),
            )
    }

    /// Add or replace the policy for a tag.
    #[must_use]
    pub fn with_tag(mut self, name: impl Into<String>, policy: TagPolicy) -> Self {
        self.policies.insert(name.into(), policy);
        self
    }

    /// Mark a tag as structural.
    #[must_use]
    pub fn with_structural(mut self, name: impl Into<String>) -> Self {
        self.structural.insert(name.into());
        self
    }

    /// Replace the heuristic attribute priority list.
    #[must_use]
    pub fn with_heuristic_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.heuristic = names.into_iter().map(Into::into).collect();
        self
    }

    /// Policy registered for `tag`.
    #[must_use]
    pub fn policy(&self, tag: &str) -> Option<&TagPolicy> {
        self.policies.get(tag)
    }

    /// Whether `tag` is a structural container.
    #[must_use]
    pub fn is_structural(&self, tag: &str) -> bool {
        self.structural.contains(tag)
    }

    /// Heuristic attribute priority list.
    #[must_use]
    pub fn heuristic_attributes(&self) -> &[String] {
        &self.heuristic
    }

    /// Tag names with a registered policy or marked structural.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.policies
            .keys()
            .chain(self.structural.iter())
            .map(String::as_str)
    }

    /// Decide which attributes and whether the body of an occurrence are text.
    ///
    /// Unknown tags: a non-blank body wins; otherwise the first non-blank
    /// attribute from the heuristic list.
    #[must_use]
    pub fn policy_for<'a>(
        &self,
        tag: &str,
        attributes: &'a Attributes,
        body: &str,
    ) -> Classification<'a> {
        if let Some(policy) = self.policies.get(tag) {
            let attribute_keys = attributes
                .iter()
                .filter(|a| has_text(&a.value) && policy.text_attributes.contains(&a.name))
                .map(|a| a.name.as_str())
                .collect();
            return Classification {
                attribute_keys,
                body_is_text: policy.uses_inner_content,
            };
        }

        if has_text(body) {
            return Classification {
                attribute_keys: Vec::new(),
                body_is_text: true,
            };
        }

        let attribute_keys = self
            .heuristic
            .iter()
            .find_map(|name| attributes.find(name).filter(|a| has_text(&a.value)))
            .map(|a| vec![a.name.as_str()])
            .unwrap_or_default();

        Classification {
            attribute_keys,
            body_is_text: false,
        }
    }
}

pub(crate) fn has_text(value: &str) -> bool {
    !value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_builtin_has_text_module() {
        let catalog = Catalog::builtin();
        let policy = catalog.policy("et_pb_text").unwrap();

        assert!(policy.uses_inner_content);
        assert!(policy.text_attributes.is_empty());
    }

    #[test]
    fn test_builtin_structural() {
        let catalog = Catalog::builtin();

        assert!(catalog.is_structural("et_pb_section"));
        assert!(catalog.is_structural("et_pb_column_inner"));
        assert!(!catalog.is_structural("et_pb_text"));
    }

    #[test]
    fn test_known_tag_uses_source_order() {
        let catalog = Catalog::builtin();
        let attributes = Attributes::parse(
            r#" content="Body" admin_label="x" title="Head" button_text="""#,
        );

        let classification = catalog.policy_for("et_pb_cta", &attributes, "");

        assert_eq!(classification.attribute_keys, vec!["content", "title"]);
        assert!(!classification.body_is_text);
    }

    #[test]
    fn test_unknown_tag_with_body() {
        let catalog = Catalog::builtin();
        let attributes = Attributes::parse(r#" title="Welcome""#);

        let classification = catalog.policy_for("dipi_typing_text", &attributes, " Hi ");

        assert!(classification.attribute_keys.is_empty());
        assert!(classification.body_is_text);
    }

    #[test]
    fn test_unknown_tag_heuristic_priority() {
        let catalog = Catalog::builtin();
        let attributes = Attributes::parse(r#" label="L" heading=" " title="Welcome""#);

        let classification = catalog.policy_for("custom_tag", &attributes, "   ");

        assert_eq!(classification.attribute_keys, vec!["title"]);
        assert!(!classification.body_is_text);
    }

    #[test]
    fn test_unknown_tag_without_text() {
        let catalog = Catalog::builtin();
        let attributes = Attributes::parse(r#" color="red""#);

        let classification = catalog.policy_for("custom_tag", &attributes, "");

        assert!(classification.attribute_keys.is_empty());
        assert!(!classification.body_is_text);
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = Catalog::empty()
            .with_tag("quote", TagPolicy::attributes(["cite"]).with_inner_content())
            .with_structural("grid")
            .with_heuristic_attributes(["caption"]);

        assert!(catalog.policy("quote").unwrap().uses_inner_content);
        assert!(catalog.is_structural("grid"));
        assert_eq!(catalog.heuristic_attributes(), ["caption".to_owned()]);
        assert!(catalog.policy("et_pb_text").is_none());
    }
}
