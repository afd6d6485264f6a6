//! Declarative page fixtures.
//!
//! A [`NodeSpec`] tree is the serde-friendly description of a page, loaded
//! from JSON by the CLI and built with the builder methods in tests.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::document::Document;
use super::node::{BoundingBox, ComputedStyle, Element};
use crate::core::{CobrowseError, Result};

/// Description of one element and its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub style: ComputedStyle,
    #[serde(default)]
    pub bounds: BoundingBox,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildSpec>,
}

/// Element content: either a nested element or a bare text run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChildSpec {
    Text(String),
    Element(NodeSpec),
}

impl NodeSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            style: ComputedStyle::default(),
            bounds: BoundingBox::default(),
            value: String::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(ChildSpec::Text(text.into()));
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(ChildSpec::Element(child));
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.bounds.width = width;
        self.bounds.height = height;
        self
    }

    /// `display: none`
    pub fn hidden(mut self) -> Self {
        self.style.display = "none".to_string();
        self
    }

    /// `visibility: hidden`
    pub fn invisible(mut self) -> Self {
        self.style.visibility = "hidden".to_string();
        self
    }

    /// `opacity: 0`
    pub fn transparent(mut self) -> Self {
        self.style.opacity = 0.0;
        self
    }

    pub(crate) fn apply_to(&self, el: &mut Element) {
        el.attributes = self.attributes.clone();
        el.style = self.style.clone();
        el.bounds = self.bounds.clone();
        el.value = self.value.clone();
    }

    /// Load a fixture from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CobrowseError::with_context(format!("Failed to read {}", path.display()), e)
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// A small portfolio site used when no fixture is supplied.
pub fn demo_portfolio() -> Document {
    let nav = NodeSpec::new("nav")
        .child(
            NodeSpec::new("a")
                .attr("href", "/")
                .child(NodeSpec::new("i").class("icon-home"))
                .text("Home"),
        )
        .child(NodeSpec::new("a").attr("href", "/projects").text("Projects"))
        .child(NodeSpec::new("a").attr("href", "#contact").text("Contact"));

    let projects = NodeSpec::new("section")
        .id("projects")
        .child(NodeSpec::new("h2").text("Selected Projects"))
        .child(
            NodeSpec::new("ul").child(
                NodeSpec::new("li")
                    .child(NodeSpec::new("h3").text("Realtime Chat"))
                    .child(NodeSpec::new("p").text("WebSocket chat with end-to-end encryption.")),
            ),
        )
        .child(
            NodeSpec::new("div")
                .class("tooltip")
                .hidden()
                .text("Internal notes"),
        );

    let contact = NodeSpec::new("section")
        .id("contact")
        .child(NodeSpec::new("h2").text("Get in touch"))
        .child(
            NodeSpec::new("form")
                .id("contact-form")
                .child(
                    NodeSpec::new("input")
                        .id("email")
                        .attr("name", "email")
                        .attr("type", "email")
                        .attr("placeholder", "you@example.com"),
                )
                .child(
                    NodeSpec::new("textarea")
                        .id("message")
                        .attr("name", "message")
                        .attr("placeholder", "Your message"),
                )
                .child(
                    NodeSpec::new("button")
                        .attr("type", "submit")
                        .attr("aria-label", "Send message")
                        .text("Send"),
                ),
        );

    Document::from_spec(
        &NodeSpec::new("html").child(
            NodeSpec::new("body")
                .child(NodeSpec::new("header").child(nav))
                .child(
                    NodeSpec::new("main")
                        .child(NodeSpec::new("h1").text("Jordan Doe, Systems Engineer"))
                        .child(projects)
                        .child(contact),
                )
                .child(NodeSpec::new("footer").text("Built with Rust")),
        ),
    )
}
