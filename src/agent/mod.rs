//! Agent module - turn orchestration and chat history
//!
//! Ties the snapshot serializer, the reasoning backend and the action
//! executor together, one user message at a time.

pub mod conversation;
pub mod orchestrator;

pub use conversation::{Conversation, Turn, TurnKind};
pub use orchestrator::{CoBrowser, TurnOutcome};
