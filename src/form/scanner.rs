use tracing::debug;
use url::Url;

use crate::dom::{control_type, Document, NodeId};
use crate::form::form_model::{FieldDescriptor, FormDescriptor, ScanOutcome};
use crate::form::identity::form_fingerprint;
use crate::form::label::{resolve_label, DEFAULT_MAX_LABEL_DEPTH};

/// Control types never reported as fillable fields.
pub const EXCLUDED_FIELD_TYPES: [&str; 8] = [
    "radio", "checkbox", "file", "button", "submit", "reset", "hidden", "image",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub max_label_depth: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_label_depth: DEFAULT_MAX_LABEL_DEPTH,
        }
    }
}

// ============================================================================
// Lazy scan
// ============================================================================

/// One-shot iterator over the forms present when [`scan`] was called.
///
/// The form list is fixed at creation; each descriptor is built on demand.
pub struct FormScan<'d, D: Document + ?Sized> {
    doc: &'d D,
    forms: std::vec::IntoIter<NodeId>,
    position: usize,
    options: ScanOptions,
}

impl<'d, D: Document + ?Sized> Iterator for FormScan<'d, D> {
    type Item = FormDescriptor;

    fn next(&mut self) -> Option<FormDescriptor> {
        let form = self.forms.next()?;
        let position = self.position;
        self.position += 1;
        Some(describe_form(self.doc, form, position, &self.options))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.forms.size_hint()
    }
}

pub fn scan<'d, D: Document + ?Sized>(doc: &'d D, options: ScanOptions) -> FormScan<'d, D> {
    FormScan {
        doc,
        forms: doc.forms().into_iter(),
        position: 0,
        options,
    }
}

/// Scan every form on the page. A page without forms is a normal outcome.
pub fn scan_forms<D: Document + ?Sized>(doc: &D, options: ScanOptions) -> ScanOutcome {
    let forms: Vec<FormDescriptor> = scan(doc, options).collect();
    if forms.is_empty() {
        debug!("no forms detected");
        ScanOutcome::NoFormsDetected
    } else {
        debug!(count = forms.len(), "forms detected");
        ScanOutcome::Forms(forms)
    }
}

// ============================================================================
// Descriptors
// ============================================================================

/// Inputs and textareas under `form` whose type is fillable, in document order.
pub fn eligible_fields<D: Document + ?Sized>(doc: &D, form: NodeId) -> Vec<NodeId> {
    doc.descendant_elements(form)
        .into_iter()
        .filter(|node| match control_type(doc, *node) {
            Some(t) => !EXCLUDED_FIELD_TYPES.contains(&t.as_str()),
            None => false,
        })
        .collect()
}

pub fn describe_form<D: Document + ?Sized>(
    doc: &D,
    form: NodeId,
    position: usize,
    options: &ScanOptions,
) -> FormDescriptor {
    let id = match doc.attribute(form, "id") {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => position.to_string(),
    };

    let fields = eligible_fields(doc, form)
        .into_iter()
        .map(|field| describe_field(doc, field, options))
        .collect();

    FormDescriptor {
        id,
        action: resolve_action(doc, form),
        fields,
        fingerprint: form_fingerprint(doc, form),
    }
}

pub fn describe_field<D: Document + ?Sized>(
    doc: &D,
    field: NodeId,
    options: &ScanOptions,
) -> FieldDescriptor {
    let attr = |name| doc.attribute(field, name).unwrap_or("").to_string();
    FieldDescriptor {
        id: attr("id"),
        name: attr("name"),
        label: resolve_label(doc, field, options.max_label_depth),
        field_type: control_type(doc, field).unwrap_or_else(|| "text".to_string()),
        placeholder: attr("placeholder"),
    }
}

/// The form's submission URL as the browser reports it: the document URL
/// when the attribute is missing or blank, otherwise the attribute resolved
/// against the document URL.
pub fn resolve_action<D: Document + ?Sized>(doc: &D, form: NodeId) -> String {
    let raw = doc.attribute(form, "action").unwrap_or("").trim();
    let base = doc.url().and_then(|u| Url::parse(u).ok());

    if raw.is_empty() {
        return doc.url().unwrap_or("").to_string();
    }

    match base {
        Some(base) => base
            .join(raw)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| raw.to_string()),
        None => Url::parse(raw)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| raw.to_string()),
    }
}

/// Drop descriptors that carry nothing the enrichment service could match on.
pub fn prepare_fields_for_enrichment(fields: &[FieldDescriptor]) -> Vec<FieldDescriptor> {
    fields
        .iter()
        .filter(|f| {
            !f.name.is_empty()
                || !f.placeholder.is_empty()
                || !f.id.is_empty()
                || f.label.as_deref().is_some_and(|l| !l.is_empty())
        })
        .cloned()
        .collect()
}
