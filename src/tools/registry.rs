//! Tool registry - the closed action vocabulary
//!
//! Publishes the six page actions as function definitions so a reasoning
//! backend can be told exactly which commands it may return.

use std::collections::HashMap;

use crate::core::{Action, ToolDefinition};

/// Registry of page actions the executor understands
pub struct ToolRegistry {
    /// Definitions in registration order
    definitions: Vec<ToolDefinition>,
    /// Name to position in `definitions`
    index: HashMap<String, usize>,
}

fn target_only(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "target": {
                "type": "string",
                "description": description
            }
        },
        "required": ["target"]
    })
}

impl ToolRegistry {
    /// Create a registry holding the page actions
    pub fn new() -> Self {
        let mut registry = Self {
            definitions: Vec::new(),
            index: HashMap::new(),
        };
        registry.register_page_actions();
        registry
    }

    fn register_page_actions(&mut self) {
        self.register(ToolDefinition::function(
            Action::Scroll.as_str(),
            "Scroll to a specific element on the page.",
            target_only("CSS selector of the element to scroll to."),
        ));

        self.register(ToolDefinition::function(
            Action::Navigate.as_str(),
            "Navigate to a different route.",
            target_only("The route path to navigate to (e.g., '/projects')."),
        ));

        self.register(ToolDefinition::function(
            Action::Click.as_str(),
            "Click an element on the page.",
            target_only("CSS selector of the element to click."),
        ));

        self.register(ToolDefinition::function(
            Action::Highlight.as_str(),
            "Highlight an element on the page to draw attention.",
            target_only("CSS selector of the element to highlight."),
        ));

        self.register(ToolDefinition::function(
            Action::Input.as_str(),
            "Fill an input field with a value.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "target": {
                        "type": "string",
                        "description": "CSS selector of the input element."
                    },
                    "value": {
                        "type": "string",
                        "description": "The value to input."
                    }
                },
                "required": ["target", "value"]
            }),
        ));

        self.register(ToolDefinition::function(
            Action::Focus.as_str(),
            "Focus on a section by scrolling it to the top and moving keyboard focus to it.",
            target_only("CSS selector of the element to focus."),
        ));
    }

    /// Register a tool definition, replacing any with the same name
    pub fn register(&mut self, definition: ToolDefinition) {
        let name = definition.function.name.clone();
        match self.index.get(&name) {
            Some(&pos) => self.definitions[pos] = definition,
            None => {
                self.index.insert(name, self.definitions.len());
                self.definitions.push(definition);
            }
        }
    }

    /// Get all tool definitions
    pub fn all_definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Look up a definition by name
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&pos| &self.definitions[pos])
    }

    /// Whether an action has a published definition
    pub fn is_known(&self, action: &Action) -> bool {
        self.index.contains_key(action.as_str())
    }

    /// Definitions as a pretty JSON array
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.definitions).unwrap_or_else(|_| "[]".to_string())
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
