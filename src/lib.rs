//! cobrowse - Co-browsing agent for a live page
//!
//! Serializes what a user can currently see into a compact, token-bounded
//! HTML-like snapshot, sends it with the user's message to a remote
//! reasoning backend, and executes the UI command it replies with.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **DOM**: In-memory UI tree the agent reads and acts on
//! - **Tools**: Page serializer, action dispatcher, and command definitions
//! - **LLM**: Reasoning backend client and reply parsing
//! - **Agent**: Turn orchestration and conversation history
//! - **CLI**: Command-line interface and REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cobrowse::{dom::demo_portfolio, llm::HttpReasoningClient, CoBrowser, Config};
//!
//! #[tokio::main]
//! async fn main() -> cobrowse::Result<()> {
//!     let config = Config::load();
//!     let client = Arc::new(HttpReasoningClient::from_config(&config.backend)?);
//!     let mut agent = CoBrowser::new(config, demo_portfolio().into_shared(), client)?;
//!
//!     let outcome = agent.process("Show me your projects").await;
//!     println!("{}", outcome.display_text());
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod dom;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::{CoBrowser, TurnOutcome};
pub use cli::Repl;
pub use core::{Action, CobrowseError, Config, Result, ToolAction};
pub use dom::Document;
pub use tools::{ActionExecutor, Snapshot};
