use sha1::{Digest, Sha1};

use crate::dom::{control_type, Document, NodeId};
use crate::form::scanner::eligible_fields;

/// Tag-name chain from the document root down to `node`, e.g.
/// `html>body>div>form`.
pub fn ancestor_chain<D: Document + ?Sized>(doc: &D, node: NodeId) -> String {
    let mut tags = Vec::new();
    let mut cursor = Some(node);
    while let Some(current) = cursor {
        tags.push(doc.tag_name(current).unwrap_or("#text"));
        cursor = doc.parent_element(current);
    }
    tags.reverse();
    tags.join(">")
}

pub fn form_key<D: Document + ?Sized>(doc: &D, form: NodeId) -> String {
    let fields = eligible_fields(doc, form)
        .into_iter()
        .map(|f| {
            format!(
                "{}:{}:{}:{}",
                doc.tag_name(f).unwrap_or(""),
                control_type(doc, f).unwrap_or_default(),
                doc.attribute(f, "name").unwrap_or(""),
                doc.attribute(f, "id").unwrap_or(""),
            )
        })
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "{}::id={}::name={}::action={}::method={}::[{}]",
        ancestor_chain(doc, form),
        doc.attribute(form, "id").unwrap_or(""),
        doc.attribute(form, "name").unwrap_or(""),
        doc.attribute(form, "action").unwrap_or(""),
        doc.attribute(form, "method").unwrap_or(""),
        fields
    )
}

/// Content-addressed identity of a form, stable across re-renders that keep
/// its structure and attributes.
pub fn form_fingerprint<D: Document + ?Sized>(doc: &D, form: NodeId) -> String {
    let mut hasher = Sha1::new();
    hasher.update(form_key(doc, form).as_bytes());
    format!("{:x}", hasher.finalize())
}
