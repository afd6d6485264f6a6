//! Locator engine: a CSS selector subset with `querySelector` semantics.
//!
//! Supported: selector lists (`a, b`), descendant and child (`>`)
//! combinators, type and universal selectors, `#id`, `.class`, and attribute
//! selectors `[attr]`, `[attr=v]`, `[attr^=v]`, `[attr$=v]`, `[attr*=v]`
//! with bare or quoted values.

use thiserror::Error;

use super::document::Document;
use super::node::{Element, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected '{found}' at position {pos}")]
    Unexpected { found: char, pos: usize },
    #[error("unexpected end of selector")]
    UnexpectedEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Prefix,
    Suffix,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    op: AttrOp,
    value: String,
}

impl AttrSelector {
    fn matches(&self, el: &Element) -> bool {
        let Some(actual) = el.attributes.get(&self.name) else {
            return false;
        };
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => *actual == self.value,
            AttrOp::Prefix => !self.value.is_empty() && actual.starts_with(&self.value),
            AttrOp::Suffix => !self.value.is_empty() && actual.ends_with(&self.value),
            AttrOp::Contains => !self.value.is_empty() && actual.contains(&self.value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
}

impl Compound {
    fn matches(&self, el: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if el.tag != *tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.attributes.get("id") != Some(id) {
                return false;
            }
        }
        if !self
            .classes
            .iter()
            .all(|class| el.classes().any(|c| c == class))
        {
            return false;
        }
        self.attrs.iter().all(|attr| attr.matches(el))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<Compound>,
    /// `combinators[i]` joins `parts[i]` and `parts[i + 1]`
    combinators: Vec<Combinator>,
}

impl Complex {
    fn matches_at(&self, doc: &Document, idx: usize, node: NodeId) -> bool {
        let Some(el) = doc.get(node) else {
            return false;
        };
        if !self.parts[idx].matches(el) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match self.combinators[idx - 1] {
            Combinator::Child => el
                .parent()
                .is_some_and(|parent| self.matches_at(doc, idx - 1, parent)),
            Combinator::Descendant => {
                let mut ancestor = el.parent();
                while let Some(current) = ancestor {
                    if self.matches_at(doc, idx - 1, current) {
                        return true;
                    }
                    ancestor = doc.get(current).and_then(Element::parent);
                }
                false
            }
        }
    }
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        Parser::new(input).parse_list()
    }

    /// Whether `node` matches any alternative of the list.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|complex| complex.matches_at(doc, complex.parts.len() - 1, node))
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(found) => SelectorError::Unexpected {
                found,
                pos: self.pos,
            },
            None => SelectorError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn parse_list(&mut self) -> Result<Selector, SelectorError> {
        self.skip_whitespace();
        if self.peek().is_none() {
            return Err(SelectorError::Empty);
        }
        let mut alternatives = vec![self.parse_complex()?];
        while self.peek() == Some(',') {
            self.pos += 1;
            self.skip_whitespace();
            alternatives.push(self.parse_complex()?);
        }
        if self.peek().is_some() {
            return Err(self.unexpected());
        }
        Ok(Selector { alternatives })
    }

    fn parse_complex(&mut self) -> Result<Complex, SelectorError> {
        let mut parts = vec![self.parse_compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    Combinator::Child
                }
                None | Some(',') => break,
                Some(_) if had_space => Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            };
            combinators.push(combinator);
            parts.push(self.parse_compound()?);
        }
        Ok(Complex { parts, combinators })
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let start = self.pos;

        match self.peek() {
            Some('*') => {
                self.pos += 1;
            }
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.parse_ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.parse_attr()?);
                }
                _ => break,
            }
        }

        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let mut ident = String::new();
        while let Some(c) = self.peek().filter(|c| is_ident_char(*c)) {
            ident.push(c);
            self.pos += 1;
        }
        if ident.is_empty() {
            return Err(self.unexpected());
        }
        Ok(ident)
    }

    fn parse_attr(&mut self) -> Result<AttrSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(AttrSelector {
                    name,
                    op: AttrOp::Exists,
                    value: String::new(),
                });
            }
            Some('=') => AttrOp::Equals,
            Some('^') => AttrOp::Prefix,
            Some('$') => AttrOp::Suffix,
            Some('*') => AttrOp::Contains,
            _ => return Err(self.unexpected()),
        };
        self.pos += 1;
        if op != AttrOp::Equals {
            self.expect('=')?;
        }
        self.skip_whitespace();

        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some(c) if c == quote => break,
                        Some(c) => value.push(c),
                        None => return Err(SelectorError::UnexpectedEnd),
                    }
                }
                value
            }
            _ => self.parse_ident()?,
        };

        self.skip_whitespace();
        self.expect(']')?;
        Ok(AttrSelector { name, op, value })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeSpec;

    fn page() -> Document {
        Document::from_spec(
            &NodeSpec::new("html").child(
                NodeSpec::new("body")
                    .child(
                        NodeSpec::new("nav")
                            .class("top menu")
                            .child(NodeSpec::new("a").attr("href", "/projects").text("Projects"))
                            .child(NodeSpec::new("a").attr("href", "/contact").text("Contact")),
                    )
                    .child(
                        NodeSpec::new("section").id("contact").child(
                            NodeSpec::new("form").child(
                                NodeSpec::new("div").child(
                                    NodeSpec::new("input")
                                        .attr("name", "email")
                                        .attr("type", "email"),
                                ),
                            ),
                        ),
                    ),
            ),
        )
    }

    fn tag_of(doc: &Document, selector: &str) -> Option<String> {
        doc.query_selector(selector)
            .unwrap()
            .map(|id| doc.get(id).unwrap().tag.clone())
    }

    #[test]
    fn test_simple_selectors() {
        let doc = page();
        assert_eq!(tag_of(&doc, "#contact").as_deref(), Some("section"));
        assert_eq!(tag_of(&doc, "NAV").as_deref(), Some("nav"));
        assert_eq!(tag_of(&doc, ".menu.top").as_deref(), Some("nav"));
        assert_eq!(tag_of(&doc, "#missing"), None);
    }

    #[test]
    fn test_attribute_selectors() {
        let doc = page();
        let contact = doc
            .query_selector(r#"a[href="/contact"]"#)
            .unwrap()
            .unwrap();
        assert_eq!(doc.text_content(contact), "Contact");
        assert!(doc.query_selector("a[href^='/proj']").unwrap().is_some());
        assert!(doc.query_selector("a[href$=tact]").unwrap().is_some());
        assert!(doc.query_selector("a[href*=nope]").unwrap().is_none());
        assert!(doc.query_selector("[name]").unwrap().is_some());
    }

    #[test]
    fn test_combinators() {
        let doc = page();
        assert!(doc.query_selector("section input").unwrap().is_some());
        assert!(doc.query_selector("#contact > form > div > input").unwrap().is_some());
        assert!(doc.query_selector("#contact > input").unwrap().is_none());
        assert_eq!(tag_of(&doc, "#missing, nav > a").as_deref(), Some("a"));
    }

    #[test]
    fn test_document_order() {
        let doc = page();
        let first = doc.query_selector("nav a").unwrap().unwrap();
        assert_eq!(doc.text_content(first), "Projects");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
        assert_eq!(Selector::parse("[href"), Err(SelectorError::UnexpectedEnd));
        assert!(matches!(
            Selector::parse("div >> a"),
            Err(SelectorError::Unexpected { found: '>', .. })
        ));
        assert!(Selector::parse("a,").is_err());
        assert!(Selector::parse("#").is_err());
    }
}
