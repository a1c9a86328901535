use serde::Serialize;

use crate::dom::selector::SelectorList;

/// Handle to a node (element or text) inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Input,
    Change,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Input => "input",
            EventKind::Change => "change",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DomEvent {
    pub kind: EventKind,
    pub bubbles: bool,
}

impl DomEvent {
    pub fn bubbling(kind: EventKind) -> Self {
        Self { kind, bubbles: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBlock {
    Start,
    Center,
    End,
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScrollIntoViewOptions {
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

impl ScrollIntoViewOptions {
    pub fn smooth_center() -> Self {
        Self {
            behavior: ScrollBehavior::Smooth,
            block: ScrollBlock::Center,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The structural-match expression could not be parsed.
    #[error("'{selector}' is not a valid selector: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

// ============================================================================
// Document capability
// ============================================================================

/// The live page, passed explicitly into every scan / fulfillment pass.
///
/// Implementors provide the primitive tree accessors and mutations; tree walks,
/// id lookup and selector queries are derived from them.
pub trait Document {
    /// URL the document was loaded from, if known.
    fn url(&self) -> Option<&str>;

    /// The document element (`<html>`).
    fn root(&self) -> NodeId;

    /// Lowercase tag name, or `None` for text nodes.
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    fn parent_element(&self, node: NodeId) -> Option<NodeId>;

    fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Child nodes (elements and text) in document order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Character data of a text node.
    fn node_text(&self, node: NodeId) -> Option<&str>;

    /// Current value of a form control; empty for anything else.
    fn value(&self, node: NodeId) -> String;

    fn set_value(&mut self, node: NodeId, value: &str);

    fn dispatch_event(&mut self, target: NodeId, event: DomEvent);

    /// Set an inline style property. An empty value clears it.
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    fn scroll_into_view(&mut self, node: NodeId, options: ScrollIntoViewOptions);

    fn is_element(&self, node: NodeId) -> bool {
        self.tag_name(node).is_some()
    }

    /// All nodes below `scope` in document (pre-)order, excluding `scope`.
    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).into_iter().rev());
        }
        out
    }

    fn descendant_elements(&self, scope: NodeId) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|n| self.is_element(*n))
            .collect()
    }

    fn text_nodes(&self, scope: NodeId) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|n| self.node_text(*n).is_some())
            .collect()
    }

    fn text_content(&self, node: NodeId) -> String {
        if let Some(text) = self.node_text(node) {
            return text.to_string();
        }
        self.text_nodes(node)
            .into_iter()
            .filter_map(|n| self.node_text(n))
            .collect()
    }

    /// All `<form>` elements in document order.
    fn forms(&self) -> Vec<NodeId> {
        self.descendant_elements(self.root())
            .into_iter()
            .filter(|n| self.tag_name(*n) == Some("form"))
            .collect()
    }

    /// First descendant of `scope` matching `selector`.
    fn query_selector(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .descendant_elements(scope)
            .into_iter()
            .find(|n| list.matches(self, *n)))
    }

    fn query_selector_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .descendant_elements(scope)
            .into_iter()
            .filter(|n| list.matches(self, *n))
            .collect())
    }
}

/// Browser-normalised `type` of an input or textarea.
///
/// Missing and unknown input types read as `"text"`, matching what the DOM
/// reports through the `type` property.
pub fn control_type<D: Document + ?Sized>(doc: &D, node: NodeId) -> Option<String> {
    match doc.tag_name(node)? {
        "textarea" => Some("textarea".to_string()),
        "input" => {
            let raw = doc
                .attribute(node, "type")
                .unwrap_or("")
                .trim()
                .to_ascii_lowercase();
            if KNOWN_INPUT_TYPES.contains(&raw.as_str()) {
                Some(raw)
            } else {
                Some("text".to_string())
            }
        }
        _ => None,
    }
}

const KNOWN_INPUT_TYPES: [&str; 22] = [
    "text",
    "search",
    "tel",
    "url",
    "email",
    "password",
    "date",
    "month",
    "week",
    "time",
    "datetime-local",
    "number",
    "range",
    "color",
    "checkbox",
    "radio",
    "file",
    "submit",
    "image",
    "reset",
    "button",
    "hidden",
];
