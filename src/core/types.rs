//! Shared types used across cobrowse modules
//!
//! Contains the command vocabulary, the backend wire format, and tool
//! definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the primitive UI manipulations the backend may request.
///
/// Deserializes from any string so that an unrecognised action still reaches
/// the dispatcher, which rejects it there.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Scroll,
    Navigate,
    Click,
    Highlight,
    Input,
    Focus,
    /// Anything outside the closed set
    Other(String),
}

impl Action {
    /// The six supported actions
    pub const KNOWN: [Action; 6] = [
        Action::Scroll,
        Action::Navigate,
        Action::Click,
        Action::Highlight,
        Action::Input,
        Action::Focus,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Action::Scroll => "scroll",
            Action::Navigate => "navigate",
            Action::Click => "click",
            Action::Highlight => "highlight",
            Action::Input => "input",
            Action::Focus => "focus",
            Action::Other(name) => name,
        }
    }

    /// Whether this action targets a node (everything except navigate)
    pub fn needs_node(&self) -> bool {
        !matches!(self, Action::Navigate)
    }
}

impl From<String> for Action {
    fn from(value: String) -> Self {
        match value.as_str() {
            "scroll" => Action::Scroll,
            "navigate" => Action::Navigate,
            "click" => Action::Click,
            "highlight" => Action::Highlight,
            "input" => Action::Input,
            "focus" => Action::Focus,
            _ => Action::Other(value),
        }
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.as_str().to_string()
    }
}

impl FromStr for Action {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Action::from(s.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured command produced by the reasoning backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolAction {
    /// What to do
    pub action: Action,
    /// Locator of the target node (a route for `navigate`)
    pub target: String,
    /// Text payload, used by `input` only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ToolAction {
    /// Create a command without a value
    pub fn new(action: impl Into<Action>, target: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            target: target.into(),
            value: None,
        }
    }

    /// Attach a text payload
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl From<&str> for Action {
    fn from(value: &str) -> Self {
        Action::from(value.to_string())
    }
}

/// Speaker of a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Model => write!(f, "model"),
        }
    }
}

/// One previous turn, in the backend's history format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub role: Role,
    pub parts: Vec<String>,
}

impl HistoryItem {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![content.into()],
        }
    }
}

/// Request body for the backend chat endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message
    pub message: String,
    /// Visible-page snapshot
    pub page_content: String,
    /// Prior turns, oldest first
    #[serde(default)]
    pub history: Vec<HistoryItem>,
}

/// What the backend decided to do with a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChatReply {
    /// Plain text answer
    Message { content: String },
    /// A command to execute against the page
    Action(ToolAction),
}

impl ChatReply {
    pub fn message(content: impl Into<String>) -> Self {
        ChatReply::Message {
            content: content.into(),
        }
    }
}

/// Envelope the backend wraps every reply in.
///
/// `response` is either a structured [`ChatReply`] object or the model's raw
/// text, so it is kept untyped until classified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: serde_json::Value,
}

/// Definition of a tool that can be called by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Type of tool (always "function" for now)
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function details
    pub function: FunctionDefinition,
}

/// Function definition within a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Name of the function
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// JSON Schema for the parameters
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new function tool definition
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_action_survives_parsing() {
        let cmd: ToolAction =
            serde_json::from_str(r##"{"action":"teleport","target":"#x"}"##).unwrap();
        assert_eq!(cmd.action, Action::Other("teleport".to_string()));
        assert_eq!(cmd.value, None);
    }

    #[test]
    fn test_reply_tagging() {
        let reply: ChatReply = serde_json::from_str(
            r##"{"type":"action","action":"input","target":"#email","value":"a@b.c"}"##,
        )
        .unwrap();
        assert_eq!(
            reply,
            ChatReply::Action(ToolAction::new(Action::Input, "#email").with_value("a@b.c"))
        );

        let reply: ChatReply =
            serde_json::from_str(r#"{"type":"message","content":"hello"}"#).unwrap();
        assert_eq!(reply, ChatReply::message("hello"));
    }

    #[test]
    fn test_history_wire_format() {
        let item = HistoryItem::new(Role::Model, "Hi!");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json, serde_json::json!({"role": "model", "parts": ["Hi!"]}));
    }
}
