use crate::dom::{Document, NodeId};

/// Default character budget for page context sent to the enrichment service.
pub const DEFAULT_PAGE_TEXT_BUDGET: usize = 100_000;

const SKIPPED_TAGS: [&str; 8] = [
    "script", "style", "noscript", "iframe", "header", "footer", "nav", "aside",
];

const BLOCK_TAGS: [&str; 30] = [
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset", "figcaption",
    "figure", "form", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "label", "li", "main", "ol",
    "option", "p", "pre", "section", "table", "tr", "ul",
];

/// Page chrome and invisible content that carries no useful context.
pub fn is_noise<D: Document + ?Sized>(doc: &D, node: NodeId) -> bool {
    let Some(tag) = doc.tag_name(node) else {
        return false;
    };
    if SKIPPED_TAGS.contains(&tag) {
        return true;
    }
    if doc.attribute(node, "hidden").is_some() || doc.attribute(node, "aria-hidden") == Some("true") {
        return true;
    }

    let style: String = doc
        .attribute(node, "style")
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    if style.contains("display:none") || style.contains("visibility:hidden") {
        return true;
    }

    let class = doc.attribute(node, "class").unwrap_or("");
    let id = doc.attribute(node, "id").unwrap_or("");
    class.contains("ad-")
        || class.contains("ads-")
        || class.contains("sponsor")
        || id.contains("ad-")
        || id.contains("sponsor")
}

/// Readable text of the page body with chrome, hidden nodes and ads removed.
/// Whitespace runs collapse to one space; block elements start new lines.
pub fn visible_page_text<D: Document + ?Sized>(doc: &D) -> String {
    let root = doc.root();
    let body = doc
        .descendant_elements(root)
        .into_iter()
        .find(|n| doc.tag_name(*n) == Some("body"))
        .unwrap_or(root);

    let mut raw = String::new();
    collect_text(doc, body, &mut raw);

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text<D: Document + ?Sized>(doc: &D, node: NodeId, out: &mut String) {
    for child in doc.children(node) {
        if let Some(text) = doc.node_text(child) {
            out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            continue;
        }
        if is_noise(doc, child) {
            continue;
        }
        let block = doc
            .tag_name(child)
            .is_some_and(|t| BLOCK_TAGS.contains(&t));
        if block {
            out.push('\n');
        }
        collect_text(doc, child, out);
        if block {
            out.push('\n');
        }
    }
}

/// Cut `text` to at most `budget` characters, keeping the start.
pub fn truncate_to_budget(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}
