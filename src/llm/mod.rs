//! Reasoning backend integration
//!
//! The remote service that reads a page snapshot plus the user's message and
//! answers with either text or a page command.

pub mod backend;
pub mod reply;
pub mod traits;

pub use backend::HttpReasoningClient;
pub use reply::{parse_model_reply, reply_from_value};
pub use traits::ReasoningClient;
