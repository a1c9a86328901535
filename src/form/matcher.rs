use serde::Serialize;

use crate::dom::{Document, DomError, NodeId};
use crate::form::form_model::{EnrichedFieldValue, FormLocator};
use crate::form::identity::form_fingerprint;
use crate::form::sanitize::sanitize_identifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    Label,
    Id,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldMatch {
    pub node: NodeId,
    pub strategy: MatchStrategy,
}

// ============================================================================
// Form lookup
// ============================================================================

/// Find the form a pass should operate on.
///
/// Order: a `<form>` whose `id` attribute equals `locator.id`; the form whose
/// fingerprint equals `locator.fingerprint`; the form at position `locator.id`.
/// Structurally identical forms share a fingerprint, so when several forms
/// carry it the position picks among them.
pub fn locate_form<D: Document + ?Sized>(doc: &D, locator: &FormLocator) -> Option<NodeId> {
    let forms = doc.forms();
    let position: Option<usize> = locator.id.trim().parse().ok();

    if !locator.id.is_empty() {
        if let Some(form) = forms
            .iter()
            .find(|f| doc.attribute(**f, "id") == Some(locator.id.as_str()))
        {
            return Some(*form);
        }
    }

    if let Some(fingerprint) = &locator.fingerprint {
        let candidates: Vec<(usize, NodeId)> = forms
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, f)| form_fingerprint(doc, *f) == *fingerprint)
            .collect();

        match candidates.as_slice() {
            [] => {}
            [(_, only)] => return Some(*only),
            several => {
                // The twin at the scanned position, else the first twin
                if let Some((_, form)) = several.iter().find(|(i, _)| Some(*i) == position) {
                    return Some(*form);
                }
                return several.first().map(|(_, form)| *form);
            }
        }
    }

    forms.get(position?).copied()
}

// ============================================================================
// Field resolution
// ============================================================================

/// First text node under `form` whose data contains `text`.
pub fn find_text_node<D: Document + ?Sized>(doc: &D, form: NodeId, text: &str) -> Option<NodeId> {
    doc.text_nodes(form)
        .into_iter()
        .find(|n| doc.node_text(*n).is_some_and(|data| data.contains(text)))
}

/// The first input/textarea under the parent of the element holding the
/// label text.
pub fn match_by_label<D: Document + ?Sized>(
    doc: &D,
    form: NodeId,
    label: &str,
) -> Result<Option<NodeId>, DomError> {
    let Some(text_node) = find_text_node(doc, form, label) else {
        return Ok(None);
    };
    let Some(container) = doc
        .parent_element(text_node)
        .and_then(|holder| doc.parent_element(holder))
    else {
        return Ok(None);
    };
    doc.query_selector(container, "input, textarea")
}

pub fn match_by_id<D: Document + ?Sized>(
    doc: &D,
    form: NodeId,
    id: &str,
) -> Result<Option<NodeId>, DomError> {
    doc.query_selector(form, &format!("#{}", sanitize_identifier(id)))
}

pub fn match_by_name<D: Document + ?Sized>(
    doc: &D,
    form: NodeId,
    name: &str,
) -> Result<Option<NodeId>, DomError> {
    doc.query_selector(form, &format!("[name=\"{}\"]", name))
}

/// Resolve one enriched value to a live element inside `form`.
///
/// Strategies run label, id, name. A later strategy that succeeds replaces an
/// earlier label match; an id match is never replaced. Selector errors
/// propagate.
pub fn resolve_field<D: Document + ?Sized>(
    doc: &D,
    form: NodeId,
    field: &EnrichedFieldValue,
) -> Result<Option<FieldMatch>, DomError> {
    let mut found = None;

    if !field.label.is_empty() {
        if let Some(node) = match_by_label(doc, form, &field.label)? {
            found = Some(FieldMatch {
                node,
                strategy: MatchStrategy::Label,
            });
        }
    }

    // NOTE: later strategies overwrite a label match even when the label was
    // the more specific signal.
    if !field.id.trim().is_empty() {
        if let Some(node) = match_by_id(doc, form, &field.id)? {
            return Ok(Some(FieldMatch {
                node,
                strategy: MatchStrategy::Id,
            }));
        }
    }

    if !field.name.is_empty() {
        if let Some(node) = match_by_name(doc, form, &field.name)? {
            found = Some(FieldMatch {
                node,
                strategy: MatchStrategy::Name,
            });
        }
    }

    Ok(found)
}
