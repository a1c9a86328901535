use std::collections::HashMap;

use scraper::{ElementRef, Html};

use crate::dom::document::{DomEvent, Document, NodeId, ScrollIntoViewOptions};

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// An event as observed by listeners: the target plus every node it
/// propagated through (target first, then ancestors when bubbling).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedEvent {
    pub target: NodeId,
    pub event: DomEvent,
    pub path: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueWrite {
    pub node: NodeId,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRequest {
    pub node: NodeId,
    pub options: ScrollIntoViewOptions,
}

/// In-memory document built from an HTML snapshot.
///
/// Structure is fixed at parse time; form values, inline styles, dispatched
/// events and scroll requests are tracked on the side so a pass can be
/// inspected (or replayed onto a real page) afterwards.
#[derive(Debug, Clone)]
pub struct HeadlessDocument {
    url: Option<String>,
    nodes: Vec<Node>,
    root: NodeId,
    values: HashMap<NodeId, String>,
    styles: HashMap<NodeId, Vec<(String, String)>>,
    writes: Vec<ValueWrite>,
    events: Vec<DispatchedEvent>,
    scrolls: Vec<ScrollRequest>,
}

impl HeadlessDocument {
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut doc = HeadlessDocument {
            url: None,
            nodes: Vec::new(),
            root: NodeId(0),
            values: HashMap::new(),
            styles: HashMap::new(),
            writes: Vec::new(),
            events: Vec::new(),
            scrolls: Vec::new(),
        };
        doc.root = doc.import(parsed.root_element(), None);
        doc
    }

    pub fn parse_with_url(html: &str, url: &str) -> Self {
        Self::parse(html).with_url(url)
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    fn push(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    fn import(&mut self, element: ElementRef<'_>, parent: Option<NodeId>) -> NodeId {
        let source = element.value();
        let attrs = source
            .attrs()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
            .collect::<Vec<_>>();
        let style = attrs
            .iter()
            .find(|(k, _)| k == "style")
            .map(|(_, v)| parse_inline_style(v));
        let id = self.push(
            parent,
            NodeKind::Element {
                tag: source.name().to_ascii_lowercase(),
                attrs,
            },
        );
        if let Some(style) = style {
            self.styles.insert(id, style);
        }

        for child in element.children() {
            match child.value() {
                scraper::Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        self.import(child_element, Some(id));
                    }
                }
                scraper::Node::Text(text) => {
                    self.push(Some(id), NodeKind::Text(String::from(&**text)));
                }
                _ => {}
            }
        }

        id
    }

    fn attrs(&self, node: NodeId) -> &[(String, String)] {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attrs, .. } => attrs,
            NodeKind::Text(_) => &[],
        }
    }

    /// Every value written since parsing, in order.
    pub fn value_writes(&self) -> &[ValueWrite] {
        &self.writes
    }

    pub fn events(&self) -> &[DispatchedEvent] {
        &self.events
    }

    /// Events a listener attached to `node` would have received.
    pub fn events_reaching(&self, node: NodeId) -> Vec<&DispatchedEvent> {
        self.events.iter().filter(|e| e.path.contains(&node)).collect()
    }

    pub fn scroll_requests(&self) -> &[ScrollRequest] {
        &self.scrolls
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.styles
            .get(&node)?
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.as_str())
    }

    /// Serialise the current state back to HTML, reflecting written values
    /// into `value` attributes and textarea contents.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>");
        self.write_node(self.root, &mut out);
        out
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        let (tag, attrs) = match &self.nodes[node.0].kind {
            NodeKind::Text(text) => {
                let raw = self
                    .parent_element(node)
                    .and_then(|p| self.tag_name(p))
                    .is_some_and(|t| RAW_TEXT_ELEMENTS.contains(&t));
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
                return;
            }
            NodeKind::Element { tag, attrs } => (tag, attrs),
        };

        let written = self.values.get(&node);
        out.push('<');
        out.push_str(tag);
        for (name, value) in attrs {
            if name == "style" && self.styles.contains_key(&node) {
                continue;
            }
            if name == "value" && tag == "input" && written.is_some() {
                continue;
            }
            push_attr(out, name, value);
        }
        if let Some(style) = self.styles.get(&node) {
            if !style.is_empty() {
                push_attr(out, "style", &format_inline_style(style));
            }
        }
        if let (Some(value), "input") = (written, tag.as_str()) {
            push_attr(out, "value", value);
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&tag.as_str()) {
            return;
        }

        match (written, tag.as_str()) {
            (Some(value), "textarea") => out.push_str(&escape_text(value)),
            _ => {
                for child in &self.nodes[node.0].children {
                    self.write_node(*child, out);
                }
            }
        }

        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }

    fn select_value(&self, select: NodeId) -> String {
        let options: Vec<NodeId> = self
            .descendant_elements(select)
            .into_iter()
            .filter(|n| self.tag_name(*n) == Some("option"))
            .collect();
        let chosen = options
            .iter()
            .find(|o| self.attribute(**o, "selected").is_some())
            .or(options.first());
        match chosen {
            Some(option) => match self.attribute(*option, "value") {
                Some(v) => v.to_string(),
                None => self.text_content(*option).trim().to_string(),
            },
            None => String::new(),
        }
    }
}

impl Document for HeadlessDocument {
    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.attrs(node)
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent_element(node)?;
        let siblings = &self.nodes[parent.0].children;
        let position = siblings.iter().position(|s| *s == node)?;
        siblings[..position]
            .iter()
            .rev()
            .find(|s| self.is_element(**s))
            .copied()
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn node_text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    fn value(&self, node: NodeId) -> String {
        if let Some(value) = self.values.get(&node) {
            return value.clone();
        }
        match self.tag_name(node) {
            Some("input") | Some("option") | Some("button") => {
                self.attribute(node, "value").unwrap_or("").to_string()
            }
            Some("textarea") => self.text_content(node),
            Some("select") => self.select_value(node),
            _ => String::new(),
        }
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        self.values.insert(node, value.to_string());
        self.writes.push(ValueWrite {
            node,
            value: value.to_string(),
        });
    }

    fn dispatch_event(&mut self, target: NodeId, event: DomEvent) {
        let mut path = vec![target];
        if event.bubbles {
            let mut cursor = self.parent_element(target);
            while let Some(ancestor) = cursor {
                path.push(ancestor);
                cursor = self.parent_element(ancestor);
            }
        }
        self.events.push(DispatchedEvent {
            target,
            event,
            path,
        });
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        let style = self.styles.entry(node).or_default();
        style.retain(|(k, _)| k != property);
        if !value.is_empty() {
            style.push((property.to_string(), value.to_string()));
        }
    }

    fn scroll_into_view(&mut self, node: NodeId, options: ScrollIntoViewOptions) {
        self.scrolls.push(ScrollRequest { node, options });
    }
}

const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

fn parse_inline_style(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let k = k.trim().to_ascii_lowercase();
            let v = v.trim();
            if k.is_empty() || v.is_empty() {
                None
            } else {
                Some((k, v.to_string()))
            }
        })
        .collect()
}

fn format_inline_style(style: &[(String, String)]) -> String {
    style
        .iter()
        .map(|(k, v)| format!("{}: {};", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&value.replace('&', "&amp;").replace('"', "&quot;"));
    out.push('"');
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_style_parsing_skips_empty_declarations() {
        assert_eq!(
            parse_inline_style("border: 1px solid red; ; color:blue;"),
            vec![
                ("border".to_string(), "1px solid red".to_string()),
                ("color".to_string(), "blue".to_string()),
            ]
        );
    }

    #[test]
    fn written_values_are_serialised() {
        let mut doc = HeadlessDocument::parse(
            "<form><input name=\"a\" value=\"old\"><textarea name=\"b\">x</textarea></form>",
        );
        let input = doc.query_selector(doc.root(), "input").unwrap().unwrap();
        let area = doc.query_selector(doc.root(), "textarea").unwrap().unwrap();
        doc.set_value(input, "new \"one\"");
        doc.set_value(area, "<hi>");

        let html = doc.to_html();
        assert!(html.contains("value=\"new &quot;one&quot;\""));
        assert!(!html.contains("value=\"old\""));
        assert!(html.contains("<textarea name=\"b\">&lt;hi&gt;</textarea>"));
    }
}
