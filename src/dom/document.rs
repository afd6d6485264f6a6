//! In-memory document: an arena of elements plus the host state
//! (address, focus, scroll position, event bus) that commands act on.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;

use super::fixture::{ChildSpec, NodeSpec};
use super::node::{Content, Element, NodeId};
use super::selector::{Selector, SelectorError};
use crate::core::{CobrowseError, Result};

/// Document handle shared between the dispatcher and its deferred effects.
pub type SharedDocument = Arc<Mutex<Document>>;

const EVENT_CAPACITY: usize = 64;

/// Kind of synthetic event delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Input,
    Click,
    Focus,
}

/// A synthetic UI event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiEvent {
    pub target: NodeId,
    pub kind: EventKind,
    pub bubbles: bool,
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
}

/// The most recent scroll-into-view request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScrollRequest {
    pub target: NodeId,
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

#[derive(Debug)]
pub struct Document {
    nodes: Vec<Option<Element>>,
    root: NodeId,
    location: String,
    focused: Option<NodeId>,
    last_scroll: Option<ScrollRequest>,
    events: broadcast::Sender<UiEvent>,
}

impl Document {
    /// Create a document with a single root element.
    pub fn new(root_tag: &str) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            nodes: vec![Some(Element::new(root_tag))],
            root: NodeId(0),
            location: "about:blank".to_string(),
            focused: None,
            last_scroll: None,
            events,
        }
    }

    /// Build a document from a fixture tree.
    pub fn from_spec(spec: &NodeSpec) -> Self {
        let mut doc = Self::new(&spec.tag);
        let root = doc.root;
        if let Some(el) = doc.get_mut(root) {
            spec.apply_to(el);
        }
        doc.append_spec_children(root, spec);
        doc
    }

    fn append_spec_children(&mut self, parent: NodeId, spec: &NodeSpec) {
        for child in &spec.children {
            match child {
                ChildSpec::Text(text) => {
                    self.push_content(parent, Content::Text(text.clone()));
                }
                ChildSpec::Element(child_spec) => {
                    let mut el = Element::new(&child_spec.tag);
                    child_spec.apply_to(&mut el);
                    let id = self.insert(parent, el);
                    self.append_spec_children(id, child_spec);
                }
            }
        }
    }

    /// Wrap into a shared handle.
    pub fn into_shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The serialization root: the first `body` element, else the root.
    pub fn body(&self) -> NodeId {
        self.descendants(self.root)
            .into_iter()
            .find(|id| self.get(*id).is_some_and(|el| el.tag == "body"))
            .unwrap_or(self.root)
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Whether the node is still part of the tree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, parent: NodeId, mut element: Element) -> NodeId {
        let id = NodeId(self.nodes.len());
        element.parent = Some(parent);
        self.nodes.push(Some(element));
        self.push_content(parent, Content::Element(id));
        id
    }

    fn push_content(&mut self, parent: NodeId, content: Content) {
        if let Some(el) = self.get_mut(parent) {
            el.content.push(content);
        }
    }

    /// Append an element as the last child of `parent`.
    pub fn append_element(&mut self, parent: NodeId, element: Element) -> Result<NodeId> {
        if !self.contains(parent) {
            return Err(CobrowseError::document(format!(
                "parent node {} does not exist",
                parent.0
            )));
        }
        Ok(self.insert(parent, element))
    }

    /// Append a text run to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> Result<()> {
        if !self.contains(parent) {
            return Err(CobrowseError::document(format!(
                "parent node {} does not exist",
                parent.0
            )));
        }
        self.push_content(parent, Content::Text(text.into()));
        Ok(())
    }

    /// Detach a node and drop its whole subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(CobrowseError::document("cannot remove the root node"));
        }
        let parent = self
            .get(id)
            .ok_or_else(|| CobrowseError::document(format!("node {} does not exist", id.0)))?
            .parent;

        if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
            parent.content.retain(|c| *c != Content::Element(id));
        }
        for node in self.descendants(id) {
            self.nodes[node.0] = None;
            if self.focused == Some(node) {
                self.focused = None;
            }
        }
        Ok(())
    }

    /// `id` and all element descendants in document (pre-)order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(el) = self.get(next) else { continue };
            out.push(next);
            let children: Vec<NodeId> = el.children().collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Concatenated text of the node and all of its descendants, hidden or not.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let Some(el) = self.get(id) else { return out };

        // One content cursor per open element, so depth is bounded by the heap.
        let mut stack = vec![el.content.iter()];
        while let Some(cursor) = stack.last_mut() {
            match cursor.next() {
                Some(Content::Text(text)) => out.push_str(text),
                Some(Content::Element(child)) => {
                    if let Some(child) = self.get(*child) {
                        stack.push(child.content.iter());
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }
        out
    }

    /// First node matching `selector`, in document order.
    pub fn query_selector(
        &self,
        selector: &str,
    ) -> std::result::Result<Option<NodeId>, SelectorError> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(self.root)
            .into_iter()
            .find(|id| selector.matches(self, *id)))
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Move keyboard focus to `id` and emit a focus event.
    pub fn focus(&mut self, id: NodeId) {
        if self.contains(id) {
            self.focused = Some(id);
            self.dispatch_event(UiEvent {
                target: id,
                kind: EventKind::Focus,
                bubbles: false,
            });
        }
    }

    pub fn scroll_into_view(&mut self, id: NodeId, behavior: ScrollBehavior, block: ScrollBlock) {
        if self.contains(id) {
            self.last_scroll = Some(ScrollRequest {
                target: id,
                behavior,
                block,
            });
        }
    }

    pub fn last_scroll(&self) -> Option<ScrollRequest> {
        self.last_scroll
    }

    /// Attach a listener; it observes every event dispatched afterwards.
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }

    pub fn dispatch_event(&self, event: UiEvent) {
        // No listeners is not an error.
        let _ = self.events.send(event);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("html")
    }
}
