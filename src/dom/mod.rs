//! UI tree model
//!
//! An explicitly passed, in-memory element tree with the capabilities the
//! snapshot serializer reads (tags, attributes, computed visibility, text)
//! and the action executor writes (value, focus, scroll, inline visuals).

mod document;
pub mod fixture;
mod node;
mod selector;

pub use document::{
    Document, EventKind, ScrollBehavior, ScrollBlock, ScrollRequest, SharedDocument, UiEvent,
};
pub use fixture::{demo_portfolio, ChildSpec, NodeSpec};
pub use node::{BoundingBox, ComputedStyle, Content, Element, NodeId, VisualState};
pub use selector::{Selector, SelectorError};
