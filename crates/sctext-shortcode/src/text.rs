//! Editable text records and the edits that target them.

/// Key used for inner-content fields.
pub const CONTENT_KEY: &str = "content";

/// Where an editable value lives inside its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TextKind {
    /// Value of an attribute in the opening tag.
    Attribute,
    /// Body between the opening and closing tag.
    InnerContent,
}

/// The `(block_index, kind, key)` tuple identifying one field.
///
/// Unique within a single extraction result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldAddress {
    /// Index into the extraction's block list.
    pub block_index: usize,
    /// Attribute or inner content.
    pub kind: TextKind,
    /// Attribute name, or [`CONTENT_KEY`] for inner content.
    pub key: String,
}

/// One user-facing editable field.
///
/// `value` is stored raw. Escaping for display is the presenter's job.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EditableText {
    /// Index of the owning block.
    pub block_index: usize,
    /// Tag name of the owning block (informational).
    pub tag: String,
    /// Attribute or inner content.
    pub kind: TextKind,
    /// Attribute name, or [`CONTENT_KEY`].
    pub key: String,
    /// Current text value.
    pub value: String,
}

impl EditableText {
    /// Addressing tuple of this field.
    #[must_use]
    pub fn address(&self) -> FieldAddress {
        FieldAddress {
            block_index: self.block_index,
            kind: self.kind,
            key: self.key.clone(),
        }
    }

    /// Build an edit that sets this field to `value`.
    #[must_use]
    pub fn edit(&self, value: impl Into<String>) -> TextEdit {
        TextEdit::new(self.block_index, self.kind, self.key.clone(), value)
    }
}

/// A new value for one addressed field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextEdit {
    /// Index of the target block.
    pub block_index: usize,
    /// Attribute or inner content.
    pub kind: TextKind,
    /// Attribute name, or [`CONTENT_KEY`].
    pub key: String,
    /// Replacement value (already sanitized).
    pub value: String,
}

impl TextEdit {
    /// Create an edit.
    #[must_use]
    pub fn new(
        block_index: usize,
        kind: TextKind,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            block_index,
            kind,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Addressing tuple of this edit.
    #[must_use]
    pub fn address(&self) -> FieldAddress {
        FieldAddress {
            block_index: self.block_index,
            kind: self.kind,
            key: self.key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_keeps_address() {
        let text = EditableText {
            block_index: 3,
            tag: "et_pb_button".to_owned(),
            kind: TextKind::Attribute,
            key: "button_text".to_owned(),
            value: "Buy".to_owned(),
        };

        let edit = text.edit("Order now");

        assert_eq!(edit.address(), text.address());
        assert_eq!(edit.value, "Order now");
    }
}
