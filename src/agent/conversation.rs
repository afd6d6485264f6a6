//! Conversation history management
//!
//! Keeps recent chat turns with a storage limit and renders the backend's
//! history format from them.

use std::collections::VecDeque;

use crate::core::{HistoryItem, Role};

/// Whether a turn was said or was a notice about an executed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    Message,
    Action,
}

/// One entry in the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub kind: TurnKind,
}

/// Manages conversation history
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: VecDeque<Turn>,
    max_length: usize,
}

impl Conversation {
    /// Create a new conversation
    pub fn new(max_length: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            max_length,
        }
    }

    /// Add a user message
    pub fn add_user(&mut self, content: impl Into<String>) {
        self.push(Role::User, content, TurnKind::Message);
    }

    /// Add a model message
    pub fn add_model(&mut self, content: impl Into<String>) {
        self.push(Role::Model, content, TurnKind::Message);
    }

    /// Record that a command was executed
    pub fn add_action_notice(&mut self, content: impl Into<String>) {
        self.push(Role::Model, content, TurnKind::Action);
    }

    fn push(&mut self, role: Role, content: impl Into<String>, kind: TurnKind) {
        self.turns.push_back(Turn {
            role,
            content: content.into(),
            kind,
        });

        while self.turns.len() > self.max_length {
            self.turns.pop_front();
        }
    }

    /// The last `window` message turns in the backend's format.
    /// Action notices are local only and never sent back.
    pub fn history_window(&self, window: usize) -> Vec<HistoryItem> {
        let messages: Vec<&Turn> = self
            .turns
            .iter()
            .filter(|t| t.kind == TurnKind::Message)
            .collect();
        let start = messages.len().saturating_sub(window);
        messages[start..]
            .iter()
            .map(|t| HistoryItem::new(t.role, t.content.clone()))
            .collect()
    }

    pub fn turns(&self) -> &VecDeque<Turn> {
        &self.turns
    }

    /// Get the last model turn
    pub fn last_model_turn(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.role == Role::Model)
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_limit() {
        let mut conv = Conversation::new(3);
        conv.add_user("1");
        conv.add_model("2");
        conv.add_user("3");
        conv.add_model("4");

        assert_eq!(conv.len(), 3);
        assert_eq!(conv.turns()[0].content, "2");
    }

    #[test]
    fn test_history_skips_action_notices() {
        let mut conv = Conversation::default();
        conv.add_user("Show me your projects");
        conv.add_action_notice("Executing action: scroll #projects");
        conv.add_user("Thanks");
        conv.add_model("You're welcome!");

        let history = conv.history_window(10);
        assert_eq!(
            history,
            vec![
                HistoryItem::new(Role::User, "Show me your projects"),
                HistoryItem::new(Role::User, "Thanks"),
                HistoryItem::new(Role::Model, "You're welcome!"),
            ]
        );
        assert_eq!(conv.last_model_turn().unwrap().content, "You're welcome!");
    }

    #[test]
    fn test_history_window_keeps_most_recent() {
        let mut conv = Conversation::default();
        for i in 0..5 {
            conv.add_user(format!("q{}", i));
        }
        let history = conv.history_window(2);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].parts, vec!["q3".to_string()]);
        assert!(conv.history_window(0).is_empty());
    }
}
