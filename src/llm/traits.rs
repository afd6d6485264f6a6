//! Reasoning client trait
//!
//! Abstracts the transport so the agent can run against the HTTP backend or
//! an in-process stand-in.

use async_trait::async_trait;

use crate::core::{ChatReply, ChatRequest, Result};

/// A service that decides how to answer one chat turn
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    /// Send the turn and return the backend's decision
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply>;

    /// Whether the service is reachable
    async fn is_available(&self) -> bool {
        true
    }

    /// Get the client name
    fn name(&self) -> &str;
}
