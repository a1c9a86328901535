use serde::Serialize;
use tracing::{debug, error, warn};

use crate::dom::{Document, DomEvent, EventKind, NodeId};
use crate::form::form_model::{EnrichedFieldValue, FormLocator};
use crate::form::matcher::{locate_form, resolve_field, MatchStrategy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FieldOutcome {
    Applied {
        node: NodeId,
        strategy: MatchStrategy,
    },
    /// No strategy located an element; the value was skipped.
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldReport {
    pub key: String,
    pub value: String,
    #[serde(flatten)]
    pub outcome: FieldOutcome,
}

/// What a fulfillment pass did, field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FillReport {
    pub form_id: String,
    pub form: Option<NodeId>,
    pub fields: Vec<FieldReport>,
    /// Matching error that aborted the pass, if any.
    pub error: Option<String>,
}

impl FillReport {
    fn new(locator: &FormLocator) -> Self {
        Self {
            form_id: locator.id.clone(),
            form: None,
            fields: Vec::new(),
            error: None,
        }
    }

    pub fn form_found(&self) -> bool {
        self.form.is_some()
    }

    /// The boolean a fulfillment pass reports: the form was found and no
    /// matching error interrupted the pass.
    pub fn success(&self) -> bool {
        self.form.is_some() && self.error.is_none()
    }

    pub fn applied_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| matches!(f.outcome, FieldOutcome::Applied { .. }))
            .count()
    }

    pub fn unresolved_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| f.outcome == FieldOutcome::Unresolved)
            .count()
    }
}

/// Short human-readable key for an enriched value in reports and traces.
pub fn field_key(field: &EnrichedFieldValue) -> String {
    [&field.id, &field.name, &field.label, &field.placeholder]
        .into_iter()
        .find(|s| !s.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| "<anonymous>".to_string())
}

/// Write `value` into `node` and notify listeners as a user edit would:
/// a bubbling `input` event followed by a bubbling `change` event.
pub fn write_value<D: Document + ?Sized>(doc: &mut D, node: NodeId, value: &str) {
    doc.set_value(node, value);
    doc.dispatch_event(node, DomEvent::bubbling(EventKind::Input));
    doc.dispatch_event(node, DomEvent::bubbling(EventKind::Change));
}

/// Apply every enriched value to the form identified by `locator`.
///
/// Unresolved fields are skipped. A selector error stops the pass; values
/// already written stay written.
pub fn fulfill_report<D: Document + ?Sized>(
    doc: &mut D,
    locator: &FormLocator,
    fields: &[EnrichedFieldValue],
) -> FillReport {
    let mut report = FillReport::new(locator);

    let Some(form) = locate_form(&*doc, locator) else {
        warn!(form_id = %locator.id, "form not found; nothing written");
        return report;
    };
    report.form = Some(form);

    for field in fields {
        let key = field_key(field);
        match resolve_field(&*doc, form, field) {
            Ok(Some(found)) => {
                debug!(field = %key, strategy = ?found.strategy, "writing value");
                write_value(doc, found.node, &field.associated_value);
                report.fields.push(FieldReport {
                    key,
                    value: field.associated_value.clone(),
                    outcome: FieldOutcome::Applied {
                        node: found.node,
                        strategy: found.strategy,
                    },
                });
            }
            Ok(None) => {
                debug!(field = %key, "no element matched; skipped");
                report.fields.push(FieldReport {
                    key,
                    value: field.associated_value.clone(),
                    outcome: FieldOutcome::Unresolved,
                });
            }
            Err(e) => {
                error!(field = %key, error = %e, "error filling form");
                report.error = Some(e.to_string());
                break;
            }
        }
    }

    report
}

/// Fulfillment entry point: `true` when the form was found and the pass ran
/// to completion, regardless of how many fields matched.
pub fn fulfill<D: Document + ?Sized>(
    doc: &mut D,
    locator: &FormLocator,
    fields: &[EnrichedFieldValue],
) -> bool {
    fulfill_report(doc, locator, fields).success()
}
