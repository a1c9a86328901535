#![allow(dead_code)]

use form_autofill::dom::{Document, HeadlessDocument, NodeId};
use form_autofill::form::form_model::EnrichedFieldValue;

pub fn fixture(name: &str) -> String {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(path).unwrap()
}

pub fn page(body: &str) -> HeadlessDocument {
    HeadlessDocument::parse(&format!("<html><head></head><body>{}</body></html>", body))
}

pub fn fixture_page(name: &str) -> HeadlessDocument {
    HeadlessDocument::parse(&fixture(name))
}

/// First element matching `selector` anywhere in the document.
pub fn find(doc: &HeadlessDocument, selector: &str) -> NodeId {
    doc.query_selector(doc.root(), selector)
        .unwrap()
        .unwrap_or_else(|| panic!("nothing matches {}", selector))
}

// ---- EnrichedFieldValue builders ----

pub fn by_name(name: &str, value: &str) -> EnrichedFieldValue {
    EnrichedFieldValue {
        name: name.into(),
        associated_value: value.into(),
        ..Default::default()
    }
}

pub fn by_id(id: &str, value: &str) -> EnrichedFieldValue {
    EnrichedFieldValue {
        id: id.into(),
        associated_value: value.into(),
        ..Default::default()
    }
}

pub fn by_label(label: &str, value: &str) -> EnrichedFieldValue {
    EnrichedFieldValue {
        label: label.into(),
        associated_value: value.into(),
        ..Default::default()
    }
}
