//! CLI commands
//!
//! Special commands that can be executed in the REPL.

use crate::agent::CoBrowser;
use crate::core::{Result, ToolAction};
use crate::tools::ToolRegistry;

/// Result of parsing a command
pub enum CommandResult {
    /// Continue processing as normal input
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
    /// Clear history
    Clear,
}

/// Parse and handle special commands
pub async fn handle_command(input: &str, agent: &mut CoBrowser) -> Result<CommandResult> {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd.as_str() {
        "exit" | "quit" | "q" => Ok(CommandResult::Exit),

        "clear" | "reset" => {
            agent.clear_history();
            Ok(CommandResult::Clear)
        }

        "help" | "?" => Ok(CommandResult::Handled(help_text())),

        "snapshot" => {
            let snapshot = agent.snapshot();
            Ok(CommandResult::Handled(format!(
                "Snapshot ({} chars):\n{}",
                snapshot.len(),
                snapshot
            )))
        }

        "tools" => Ok(CommandResult::Handled(handle_tools_command(args))),

        "do" => handle_do_command(args, agent),

        "status" => {
            let doc = agent.document().lock();
            let focused = doc
                .focused()
                .and_then(|id| doc.get(id))
                .map(|el| el.tag.clone())
                .unwrap_or_else(|| "none".to_string());
            let status = format!(
                "Co-browse Status:\n\
                 ─────────────────────────────\n\
                 Backend:      {} ({})\n\
                 Location:     {}\n\
                 Nodes:        {}\n\
                 Focused:      {}\n\
                 Highlights:   {} pending\n\
                 History:      {} turns\n\
                 Strict input: {}",
                agent.config().backend.url,
                agent.client_name(),
                doc.location(),
                doc.len(),
                focused,
                agent.executor().pending_highlights(),
                agent.conversation().len(),
                if agent.config().dispatcher.strict_input {
                    "on"
                } else {
                    "off"
                }
            );
            Ok(CommandResult::Handled(status))
        }

        _ => {
            if input.starts_with('/') {
                Ok(CommandResult::Handled(format!(
                    "Unknown command: {}. Type 'help' for available commands.",
                    cmd
                )))
            } else {
                Ok(CommandResult::Continue(input.to_string()))
            }
        }
    }
}

/// Handle `do <json command>`
fn handle_do_command(args: &str, agent: &mut CoBrowser) -> Result<CommandResult> {
    if args.is_empty() {
        return Ok(CommandResult::Handled(
            "Usage: do <json>\n\
             Examples:\n\
               do {\"action\": \"scroll\", \"target\": \"#projects\"}\n\
               do {\"action\": \"input\", \"target\": \"#email\", \"value\": \"me@example.com\"}"
                .to_string(),
        ));
    }

    let command: ToolAction = serde_json::from_str(args)?;
    let registry = ToolRegistry::new();
    if !registry.is_known(&command.action) {
        return Ok(CommandResult::Handled(format!(
            "Unknown action: {}. Known actions: {}",
            command.action,
            known_actions(&registry)
        )));
    }

    let success = agent.execute(&command);
    Ok(CommandResult::Handled(format!(
        "{} {} -> {}",
        command.action,
        command.target,
        if success { "ok" } else { "failed" }
    )))
}

/// Handle `tools [name]`
fn handle_tools_command(name: &str) -> String {
    let registry = ToolRegistry::new();
    if name.is_empty() {
        return registry.to_json();
    }
    match registry.get(name) {
        Some(definition) => serde_json::to_string_pretty(definition)
            .unwrap_or_else(|e| format!("Failed to render {}: {}", name, e)),
        None => format!(
            "No tool named {}. Known actions: {}",
            name,
            known_actions(&registry)
        ),
    }
}

fn known_actions(registry: &ToolRegistry) -> String {
    registry
        .all_definitions()
        .iter()
        .map(|d| d.function.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generate help text
fn help_text() -> String {
    r#"Co-browse Commands:
─────────────────────────────────────────────
  help, ?          Show this help message
  exit, quit, q    Exit
  clear, reset     Clear conversation history
  status           Show page and agent state
  snapshot         Print what the backend sees
  tools [name]     Print the action definitions
  do <json>        Execute a command directly

Anything else is sent to the backend together with a
fresh page snapshot.
─────────────────────────────────────────────"#
        .to_string()
}
