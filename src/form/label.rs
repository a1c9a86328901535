use crate::dom::{Document, NodeId};

/// Ancestor levels walked before giving up on a structural label.
pub const DEFAULT_MAX_LABEL_DEPTH: usize = 64;

/// Find the `<label>` describing `element` by tree position.
///
/// At each level (starting with the element itself) the node is checked, then
/// its preceding element siblings nearest-first, then the walk moves to the
/// parent. Stops at the document root or after `max_depth` ancestor moves.
pub fn find_structural_label<D: Document + ?Sized>(
    doc: &D,
    element: NodeId,
    max_depth: usize,
) -> Option<NodeId> {
    let mut cursor = Some(element);
    let mut depth = 0;

    while let Some(current) = cursor {
        if is_label(doc, current) {
            return Some(current);
        }

        let mut sibling = doc.previous_element_sibling(current);
        while let Some(candidate) = sibling {
            if is_label(doc, candidate) {
                return Some(candidate);
            }
            sibling = doc.previous_element_sibling(candidate);
        }

        if depth >= max_depth {
            return None;
        }
        depth += 1;
        cursor = doc.parent_element(current);
    }

    None
}

/// Label text for `element`: the first ASCII alphabetic run of the structural
/// label's text content.
pub fn resolve_label<D: Document + ?Sized>(
    doc: &D,
    element: NodeId,
    max_depth: usize,
) -> Option<String> {
    let label = find_structural_label(doc, element, max_depth)?;
    first_alphabetic_run(&doc.text_content(label))
}

pub fn first_alphabetic_run(text: &str) -> Option<String> {
    let start = text.find(|c: char| c.is_ascii_alphabetic())?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    Some(rest[..end].to_string())
}

fn is_label<D: Document + ?Sized>(doc: &D, node: NodeId) -> bool {
    doc.tag_name(node) == Some("label")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_alphabetic_run_strips_noise() {
        assert_eq!(first_alphabetic_run("  Email *"), Some("Email".into()));
        assert_eq!(first_alphabetic_run("1. First name"), Some("First".into()));
        assert_eq!(first_alphabetic_run("E-mail"), Some("E".into()));
        assert_eq!(first_alphabetic_run("Émail"), Some("mail".into()));
        assert_eq!(first_alphabetic_run("123 *"), None);
        assert_eq!(first_alphabetic_run(""), None);
    }
}
