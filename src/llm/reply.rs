//! Parsing of raw model output into a [`ChatReply`].
//!
//! Models are asked for a bare JSON object but sometimes wrap it in a
//! markdown fence or answer in prose; both are tolerated.

use tracing::debug;

use crate::core::{ChatReply, ToolAction};

/// Interpret raw model text as a reply.
///
/// A fenced or bare JSON object tagged `"type": "action"` becomes a command,
/// `"type": "message"` becomes text, and anything that is not JSON is passed
/// through as a plain message.
pub fn parse_model_reply(raw: &str) -> ChatReply {
    let text = strip_fence(raw.trim());

    match serde_json::from_str(text) {
        Ok(value) => classify(value),
        Err(_) => ChatReply::message(text),
    }
}

/// Interpret the `response` field of a backend envelope.
///
/// Backends that relay the model's raw text send a string, which goes through
/// [`parse_model_reply`]; structured replies are classified directly.
pub fn reply_from_value(value: serde_json::Value) -> ChatReply {
    match value {
        serde_json::Value::String(raw) => parse_model_reply(&raw),
        value => classify(value),
    }
}

fn classify(value: serde_json::Value) -> ChatReply {
    match value.get("type").and_then(|t| t.as_str()) {
        Some("action") => match serde_json::from_value::<ToolAction>(value) {
            Ok(command) => ChatReply::Action(command),
            Err(e) => {
                debug!(error = %e, "Malformed action reply");
                ChatReply::message("Error: Malformed action.")
            }
        },
        Some("message") => {
            let content = value
                .get("content")
                .and_then(|c| c.as_str())
                .unwrap_or_default();
            ChatReply::message(content)
        }
        _ => ChatReply::message("Error: Unknown response type."),
    }
}

fn strip_fence(text: &str) -> &str {
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Action;

    #[test]
    fn test_fenced_action() {
        let reply = parse_model_reply(
            "```json\n{\"type\": \"action\", \"action\": \"scroll\", \"target\": \"#projects\"}\n```",
        );
        assert_eq!(
            reply,
            ChatReply::Action(ToolAction::new(Action::Scroll, "#projects"))
        );
    }

    #[test]
    fn test_plain_message() {
        let reply = parse_model_reply(r#"{"type": "message", "content": "Hi there"}"#);
        assert_eq!(reply, ChatReply::message("Hi there"));
    }

    #[test]
    fn test_prose_passes_through() {
        let reply = parse_model_reply("  Sure, the contact form is below.  ");
        assert_eq!(reply, ChatReply::message("Sure, the contact form is below."));
    }

    #[test]
    fn test_unknown_type_and_malformed_action() {
        assert_eq!(
            parse_model_reply(r#"{"type": "dance"}"#),
            ChatReply::message("Error: Unknown response type.")
        );
        assert_eq!(
            parse_model_reply(r#"{"type": "action", "action": "click"}"#),
            ChatReply::message("Error: Malformed action.")
        );
    }
}
