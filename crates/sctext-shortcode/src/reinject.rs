//! Writing edited values back into markup.

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use crate::attributes::append_text;
use crate::extract::{Extraction, Site};
use crate::splice::Splices;
use crate::text::{CONTENT_KEY, FieldAddress, TextEdit, TextKind};

/// Why an edit was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SkipReason {
    /// `block_index` is past the last block.
    UnknownBlock,
    /// The key cannot name a field of this kind.
    UnknownField,
    /// Inner-content edit for a block without a text body.
    NoContentSlot,
    /// The edit would rewrite bytes another edit already rewrites.
    Overlap,
    /// An earlier edit in the same request has the same address.
    Duplicate,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::UnknownBlock => "no block with this index",
            Self::UnknownField => "no such field",
            Self::NoContentSlot => "block has no editable body",
            Self::Overlap => "overlaps another edit",
            Self::Duplicate => "duplicate edit",
        };
        f.write_str(message)
    }
}

/// An edit that was left out, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkippedEdit {
    /// Address of the skipped edit.
    pub address: FieldAddress,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Result of applying edits to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reinjection {
    /// The rewritten document.
    pub document: String,
    /// Edits that changed the document.
    pub applied: Vec<FieldAddress>,
    /// Edits whose value was already current.
    pub unchanged: Vec<FieldAddress>,
    /// Edits that matched nothing.
    pub skipped: Vec<SkippedEdit>,
}

impl Reinjection {
    /// Whether any edit changed the document.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Apply `edits` to `document`.
///
/// `extraction` must come from this exact document. Edits are matched by
/// `(block_index, kind, key)`; an edit to a block index that stands for
/// several identical nested copies rewrites all of them. Edits that match
/// nothing are reported in [`Reinjection::skipped`] and never abort the
/// operation. Untouched bytes are copied verbatim.
#[must_use]
pub fn reinject(document: &str, extraction: &Extraction, edits: &[TextEdit]) -> Reinjection {
    let mut splices = Splices::new();
    let mut seen = HashSet::new();
    let mut applied = Vec::new();
    let mut unchanged = Vec::new();
    let mut skipped = Vec::new();

    for edit in edits {
        let address = edit.address();

        let planned = if seen.insert(address.clone()) {
            plan(document, extraction, edit)
        } else {
            Err(SkipReason::Duplicate)
        };

        match planned {
            Ok(changes) if changes.is_empty() => unchanged.push(address),
            Ok(changes) if changes.iter().any(|(range, _)| splices.overlaps(range)) => {
                skipped.push(SkippedEdit {
                    address,
                    reason: SkipReason::Overlap,
                });
            }
            Ok(changes) => {
                for (range, text) in changes {
                    splices.add(range, text);
                }
                applied.push(address);
            }
            Err(reason) => skipped.push(SkippedEdit { address, reason }),
        }
    }

    for skip in &skipped {
        tracing::debug!(
            block_index = skip.address.block_index,
            kind = ?skip.address.kind,
            key = %skip.address.key,
            reason = %skip.reason,
            "Skipped edit"
        );
    }

    let document = if splices.is_empty() {
        document.to_owned()
    } else {
        splices.apply(document)
    };

    Reinjection {
        document,
        applied,
        unchanged,
        skipped,
    }
}

/// Absolute byte range and its replacement text.
type Change = (Range<usize>, String);

/// Byte-range replacements for one edit across every site of its block.
fn plan(
    document: &str,
    extraction: &Extraction,
    edit: &TextEdit,
) -> Result<Vec<Change>, SkipReason> {
    let sites = extraction
        .sites
        .get(edit.block_index)
        .ok_or(SkipReason::UnknownBlock)?;

    let mut changes = Vec::new();
    for site in sites {
        let change = match edit.kind {
            TextKind::Attribute => plan_attribute(site, edit)?,
            TextKind::InnerContent => plan_content(document, site, edit)?,
        };
        changes.extend(change);
    }
    Ok(changes)
}

fn plan_attribute(site: &Site, edit: &TextEdit) -> Result<Option<Change>, SkipReason> {
    if !is_attribute_name(&edit.key) {
        return Err(SkipReason::UnknownField);
    }

    match site.attributes.find(&edit.key) {
        Some(attribute) if attribute.value == edit.value => Ok(None),
        Some(attribute) => {
            let (range, text) = attribute.replacement(&edit.value);
            let start = site.attributes_start;
            Ok(Some((start + range.start..start + range.end, text)))
        }
        None if edit.value.is_empty() => Ok(None),
        None => Ok(Some((
            site.append_at..site.append_at,
            append_text(&edit.key, &edit.value),
        ))),
    }
}

fn plan_content(
    document: &str,
    site: &Site,
    edit: &TextEdit,
) -> Result<Option<Change>, SkipReason> {
    if edit.key != CONTENT_KEY {
        return Err(SkipReason::UnknownField);
    }
    let range = site.content.clone().ok_or(SkipReason::NoContentSlot)?;

    if document[range.clone()] == edit.value {
        return Ok(None);
    }
    Ok(Some((range, edit.value.clone())))
}

fn is_attribute_name(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
