//! Request and response envelopes.
//!
//! These are the wire shapes exchanged with clients. Transport is the
//! caller's concern; everything here is plain serde data.

use std::collections::BTreeMap;

use sctext_shortcode::{DebugInfo, EditableText, FieldAddress, SkippedEdit, TextEdit, TextKind};
use serde::{Deserialize, Serialize};

/// One editable field together with the document it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRecord {
    /// Originating document id.
    pub document: String,
    /// The field.
    #[serde(flatten)]
    pub text: EditableText,
}

/// Extraction result for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResponse {
    /// Document id.
    pub document: String,
    /// Revision to send back with edits.
    pub revision: String,
    /// Editable fields.
    pub texts: Vec<TextRecord>,
    /// Verbatim block texts.
    pub blocks: Vec<String>,
    /// Diagnostics.
    pub debug: DebugInfo,
}

/// One edit as sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// Target document id.
    pub document: String,
    /// Block index from the fetch response.
    pub block_index: usize,
    /// Attribute or inner content.
    pub kind: TextKind,
    /// Attribute name, or `content`.
    pub key: String,
    /// New value, not yet sanitized.
    pub value: String,
}

impl Edit {
    /// The document-local edit.
    #[must_use]
    pub fn to_text_edit(&self) -> TextEdit {
        TextEdit::new(self.block_index, self.kind, self.key.clone(), self.value.clone())
    }
}

/// A batch of edits, possibly spanning several documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRequest {
    /// Edits in client order.
    pub edits: Vec<Edit>,
    /// Revisions the client fetched, by document id. Documents without an
    /// entry are written without a revision check.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub revisions: BTreeMap<String, String>,
}

impl SaveRequest {
    /// Group edits by document, in order of first appearance.
    #[must_use]
    pub fn by_document(&self) -> Vec<(&str, Vec<TextEdit>)> {
        let mut groups: Vec<(&str, Vec<TextEdit>)> = Vec::new();
        for edit in &self.edits {
            let text_edit = edit.to_text_edit();
            match groups.iter_mut().find(|(id, _)| *id == edit.document) {
                Some((_, edits)) => edits.push(text_edit),
                None => groups.push((edit.document.as_str(), vec![text_edit])),
            }
        }
        groups
    }
}

/// What happened to one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Changes were written.
    Saved,
    /// Nothing changed, nothing was written.
    Unchanged,
    /// Dry run: changes computed, nothing written.
    Previewed,
    /// The document was not processed.
    Failed,
}

/// Report for one document of a save or preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOutcome {
    /// Document id.
    pub document: String,
    /// Result category.
    pub status: OutcomeStatus,
    /// Fields that changed.
    #[serde(default)]
    pub applied: Vec<FieldAddress>,
    /// Edits that matched nothing.
    #[serde(default)]
    pub skipped: Vec<SkippedEdit>,
    /// Revision after the operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    /// Rewritten markup (previews only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Error category, for failed documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Error message, for failed documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentOutcome {
    pub(crate) fn new(document: &str, status: OutcomeStatus) -> Self {
        Self {
            document: document.to_owned(),
            status,
            applied: Vec::new(),
            skipped: Vec::new(),
            revision: None,
            content: None,
            error_code: None,
            error: None,
        }
    }

    /// Whether the document failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == OutcomeStatus::Failed
    }
}
