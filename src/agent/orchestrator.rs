//! Co-browsing turn orchestration
//!
//! One turn: snapshot the visible page, send it with the user's message and
//! recent history to the reasoning backend, then either relay the text reply
//! or execute the returned command.

use std::sync::Arc;

use tracing::{info, warn};

use crate::agent::conversation::Conversation;
use crate::core::{ChatReply, ChatRequest, Config, Result, ToolAction};
use crate::dom::SharedDocument;
use crate::llm::ReasoningClient;
use crate::tools::{ActionExecutor, Navigator, Snapshot};

/// Shown when the backend could not be reached or failed.
pub const BACKEND_FALLBACK_REPLY: &str = "I am taking a moment to think. Please try again briefly.";

/// Shown when a returned command could not be carried out.
pub const FAILED_ACTION_REPLY: &str = "I couldn't complete that action. Could you try rephrasing?";

/// What happened in one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The backend answered in text
    Reply(String),
    /// The backend asked for a command, which was executed
    Executed { command: ToolAction, success: bool },
}

impl TurnOutcome {
    /// Human-readable summary for a transcript
    pub fn display_text(&self) -> String {
        match self {
            TurnOutcome::Reply(text) => text.clone(),
            TurnOutcome::Executed { command, success } => {
                let mut text = format!("Executing action: {} {}", command.action, command.target);
                if !success {
                    text.push('\n');
                    text.push_str(FAILED_ACTION_REPLY);
                }
                text
            }
        }
    }
}

/// The co-browsing agent bound to one page
pub struct CoBrowser {
    config: Config,
    client: Arc<dyn ReasoningClient>,
    executor: ActionExecutor,
    navigator: Option<Arc<dyn Navigator>>,
    conversation: Conversation,
}

impl CoBrowser {
    /// Create an agent for `document`. Must be called inside a tokio runtime.
    pub fn new(
        config: Config,
        document: SharedDocument,
        client: Arc<dyn ReasoningClient>,
    ) -> Result<Self> {
        let executor = ActionExecutor::new(document, config.dispatcher.clone())?;
        let conversation = Conversation::new(config.agent.max_history);

        Ok(Self {
            config,
            client,
            executor,
            navigator: None,
            conversation,
        })
    }

    /// Route `navigate` commands through a client-side router
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Serialize the currently visible page
    pub fn snapshot(&self) -> Snapshot {
        let doc = self.executor.document().lock();
        Snapshot::of_page(&doc)
    }

    /// Execute one command directly
    pub fn execute(&self, command: &ToolAction) -> bool {
        self.executor.execute(command, self.navigator.as_deref())
    }

    /// Handle one user message
    pub async fn process(&mut self, message: &str) -> TurnOutcome {
        let request = ChatRequest {
            message: message.to_string(),
            page_content: self.snapshot().into_string(),
            history: self
                .conversation
                .history_window(self.config.agent.history_window),
        };
        self.conversation.add_user(message);

        let reply = match self.client.chat(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(client = self.client.name(), error = %e, "Chat request failed");
                ChatReply::message(BACKEND_FALLBACK_REPLY)
            }
        };

        match reply {
            ChatReply::Message { content } => {
                self.conversation.add_model(content.clone());
                TurnOutcome::Reply(content)
            }
            ChatReply::Action(command) => {
                self.conversation.add_action_notice(format!(
                    "Executing action: {} {}",
                    command.action, command.target
                ));
                let success = self.execute(&command);
                info!(action = %command.action, success, "Turn finished with command");
                if !success {
                    self.conversation.add_model(FAILED_ACTION_REPLY);
                }
                TurnOutcome::Executed { command, success }
            }
        }
    }

    /// Whether the backend is reachable
    pub async fn backend_available(&self) -> bool {
        self.client.is_available().await
    }

    pub fn document(&self) -> &SharedDocument {
        self.executor.document()
    }

    pub fn executor(&self) -> &ActionExecutor {
        &self.executor
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn clear_history(&mut self) {
        self.conversation.clear();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client_name(&self) -> &str {
        self.client.name()
    }
}
