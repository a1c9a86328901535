use crate::dom::document::{Document, DomError, NodeId};

/// A parsed structural-match expression: a comma-separated list of compound
/// selectors (`input`, `#user\;name`, `[name="email"]`, `input.wide[required]`).
///
/// Combinators and pseudo-classes are rejected, the same way a browser rejects
/// malformed input with a syntax error.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    selectors: Vec<CompoundSelector>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct CompoundSelector {
    universal: bool,
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
}

#[derive(Debug, Clone, PartialEq)]
enum AttrCondition {
    Exists { name: String },
    Equals { name: String, value: String },
}

impl SelectorList {
    pub fn parse(source: &str) -> Result<Self, DomError> {
        Parser::new(source).parse_list()
    }

    pub fn matches<D: Document + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(doc, node))
    }
}

impl CompoundSelector {
    fn is_empty(&self) -> bool {
        !self.universal
            && self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
    }

    fn matches<D: Document + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        let Some(tag) = doc.tag_name(node) else {
            return false;
        };
        if let Some(expected) = &self.tag {
            if !tag.eq_ignore_ascii_case(expected) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if doc.attribute(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = doc.attribute(node, "class").unwrap_or("");
            let present: Vec<&str> = class_attr.split_ascii_whitespace().collect();
            if !self.classes.iter().all(|c| present.contains(&c.as_str())) {
                return false;
            }
        }
        self.attrs.iter().all(|cond| match cond {
            AttrCondition::Exists { name } => doc.attribute(node, name).is_some(),
            AttrCondition::Equals { name, value } => {
                doc.attribute(node, name) == Some(value.as_str())
            }
        })
    }
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> DomError {
        DomError::InvalidSelector {
            selector: self.source.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_css_whitespace) {
            self.pos += 1;
        }
    }

    fn parse_list(mut self) -> Result<SelectorList, DomError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            let compound = self.parse_compound()?;
            if compound.is_empty() {
                return Err(self.error("empty selector"));
            }
            selectors.push(compound);
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(',') => self.pos += 1,
                Some(c) => return Err(self.error(format!("unsupported combinator near '{}'", c))),
            }
        }
        Ok(SelectorList { selectors })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, DomError> {
        let mut compound = CompoundSelector::default();

        while let Some(c) = self.peek() {
            if is_css_whitespace(c) || c == ',' {
                break;
            }
            match c {
                '*' => {
                    if !compound.is_empty() {
                        return Err(self.error("'*' must start a compound selector"));
                    }
                    compound.universal = true;
                    self.pos += 1;
                }
                '#' => {
                    self.pos += 1;
                    let id = self.parse_ident().ok_or_else(|| self.error("invalid id"))?;
                    if compound.id.replace(id).is_some() {
                        return Err(self.error("duplicate id"));
                    }
                }
                '.' => {
                    self.pos += 1;
                    let class = self.parse_ident().ok_or_else(|| self.error("invalid class"))?;
                    compound.classes.push(class);
                }
                '[' => {
                    self.pos += 1;
                    let cond = self.parse_attr()?;
                    compound.attrs.push(cond);
                }
                ':' => return Err(self.error("pseudo-classes are not supported")),
                '>' | '+' | '~' => return Err(self.error("combinators are not supported")),
                _ => {
                    if !compound.is_empty() {
                        return Err(self.error(format!("unexpected '{}'", c)));
                    }
                    let tag = self.parse_ident().ok_or_else(|| self.error(format!("unexpected '{}'", c)))?;
                    compound.tag = Some(tag.to_ascii_lowercase());
                }
            }
        }

        Ok(compound)
    }

    fn parse_attr(&mut self) -> Result<AttrCondition, DomError> {
        self.skip_whitespace();
        let name = self
            .parse_ident()
            .ok_or_else(|| self.error("invalid attribute name"))?
            .to_ascii_lowercase();
        self.skip_whitespace();

        match self.peek() {
            Some(']') => {
                self.pos += 1;
                Ok(AttrCondition::Exists { name })
            }
            Some('=') => {
                self.pos += 1;
                self.skip_whitespace();
                let value = match self.peek() {
                    Some(q @ ('"' | '\'')) => {
                        self.pos += 1;
                        self.parse_string(q)?
                    }
                    _ => self
                        .parse_ident()
                        .ok_or_else(|| self.error("invalid attribute value"))?,
                };
                self.skip_whitespace();
                if self.peek() != Some(']') {
                    return Err(self.error("expected ']'"));
                }
                self.pos += 1;
                Ok(AttrCondition::Equals { name, value })
            }
            Some(_) => Err(self.error("unsupported attribute operator")),
            None => Err(self.error("unterminated attribute selector")),
        }
    }

    /// Quoted string body; the opening quote has been consumed.
    fn parse_string(&mut self, quote: char) -> Result<String, DomError> {
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some('\n') => return Err(self.error("newline in string")),
                Some('\\') => {
                    if self.peek_at(1) == Some('\n') {
                        self.pos += 2;
                        continue;
                    }
                    let c = self.parse_escape().ok_or_else(|| self.error("invalid escape"))?;
                    out.push(c);
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    /// CSS identifier with escapes resolved. `None` when the input at the
    /// cursor does not start a valid identifier (e.g. a leading digit).
    fn parse_ident(&mut self) -> Option<String> {
        let start = self.pos;
        let mut out = String::new();

        if self.peek() == Some('-') {
            out.push('-');
            self.pos += 1;
        }

        let double_dash = out == "-" && self.peek() == Some('-');
        if double_dash {
            out.push('-');
            self.pos += 1;
        } else {
            match self.peek() {
                Some('\\') => match self.parse_escape() {
                    Some(c) => out.push(c),
                    None => {
                        self.pos = start;
                        return None;
                    }
                },
                Some(c) if is_name_start(c) => {
                    out.push(c);
                    self.pos += 1;
                }
                _ => {
                    self.pos = start;
                    return None;
                }
            }
        }

        loop {
            match self.peek() {
                Some('\\') => {
                    let resume = self.pos;
                    match self.parse_escape() {
                        Some(c) => out.push(c),
                        None => {
                            self.pos = resume;
                            break;
                        }
                    }
                }
                Some(c) if is_name_char(c) => {
                    out.push(c);
                    self.pos += 1;
                }
                _ => break,
            }
        }

        Some(out)
    }

    /// Backslash escape at the cursor: `\c` or `\HEX` plus one optional
    /// whitespace.
    fn parse_escape(&mut self) -> Option<char> {
        debug_assert_eq!(self.peek(), Some('\\'));
        let next = self.peek_at(1)?;
        if next == '\n' {
            return None;
        }
        self.pos += 1;

        if !next.is_ascii_hexdigit() {
            self.pos += 1;
            return Some(next);
        }

        let mut code: u32 = 0;
        let mut digits = 0;
        while digits < 6 {
            match self.peek().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    code = code * 16 + d;
                    digits += 1;
                    self.pos += 1;
                }
                None => break,
            }
        }
        if self.peek().is_some_and(is_css_whitespace) {
            self.pos += 1;
        }

        let resolved = if code == 0 {
            None
        } else {
            char::from_u32(code)
        };
        Some(resolved.unwrap_or('\u{FFFD}'))
    }
}

fn is_css_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_digit_is_not_an_identifier() {
        assert!(SelectorList::parse("#123").is_err());
        assert!(SelectorList::parse("#-1a").is_err());
        assert!(SelectorList::parse("#\\31 23").is_ok());
    }

    #[test]
    fn escapes_resolve_to_literal_characters() {
        let list = SelectorList::parse("#user\\;name").unwrap();
        assert_eq!(list.selectors[0].id.as_deref(), Some("user;name"));

        let list = SelectorList::parse("#a\\.b\\ c").unwrap();
        assert_eq!(list.selectors[0].id.as_deref(), Some("a.b c"));

        let list = SelectorList::parse("#\\31 23").unwrap();
        assert_eq!(list.selectors[0].id.as_deref(), Some("123"));
    }

    #[test]
    fn unescaped_reserved_character_ends_the_selector() {
        assert!(SelectorList::parse("#user;name").is_err());
        assert!(SelectorList::parse("#first name").is_err());
    }

    #[test]
    fn lists_and_attribute_conditions() {
        let list = SelectorList::parse("input, textarea").unwrap();
        assert_eq!(list.selectors.len(), 2);

        let list = SelectorList::parse("[name=\"email\"]").unwrap();
        assert_eq!(
            list.selectors[0].attrs,
            vec![AttrCondition::Equals {
                name: "name".into(),
                value: "email".into()
            }]
        );

        assert!(SelectorList::parse("[name=\"a\"b\"]").is_err());
        assert!(SelectorList::parse("[name^=\"a\"]").is_err());
        assert!(SelectorList::parse("").is_err());
    }
}
