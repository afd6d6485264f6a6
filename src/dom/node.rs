//! UI tree node: attributes, layout, computed style and inline visual state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Handle to a node inside a [`Document`](super::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Computed style properties that decide visibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputedStyle {
    pub display: String,
    pub visibility: String,
    pub opacity: f64,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: 1.0,
        }
    }
}

/// Rendered box of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 20.0,
        }
    }
}

impl BoundingBox {
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Inline visual properties the dispatcher may write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualState {
    pub box_shadow: String,
    pub transition: String,
}

/// Ordered content of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Element(NodeId),
    Text(String),
}

/// A single element of the UI tree.
#[derive(Debug, Clone)]
pub struct Element {
    /// Lowercase tag name
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub style: ComputedStyle,
    pub bounds: BoundingBox,
    pub visual: VisualState,
    /// Current text value (text-entry nodes)
    pub value: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) content: Vec<Content>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            style: ComputedStyle::default(),
            bounds: BoundingBox::default(),
            visual: VisualState::default(),
            value: String::new(),
            parent: None,
            content: Vec::new(),
        }
    }

    /// Attribute value, treating an empty value as absent.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .get("class")
            .map(|c| c.split_whitespace())
            .into_iter()
            .flatten()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn content(&self) -> &[Content] {
        &self.content
    }

    /// Element children, in order.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.content.iter().filter_map(|c| match c {
            Content::Element(id) => Some(*id),
            Content::Text(_) => None,
        })
    }

    pub fn has_children(&self) -> bool {
        self.children().next().is_some()
    }

    /// Rendered according to computed style and layout.
    pub fn is_visible(&self) -> bool {
        self.style.display != "none"
            && self.style.visibility != "hidden"
            && self.style.opacity != 0.0
            && self.bounds.has_area()
    }

    /// Can hold a text value.
    pub fn is_text_entry(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea")
    }
}
