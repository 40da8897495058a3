//! Tool Definitions
//!
//! Schemas exposed through `tools/list`. Enumerated choices are generated from
//! the same tables the request parser accepts, so the two cannot drift.

use serde_json::{json, Value};

use raycast_core::Service;

use crate::protocol::{InputSchema, Tool};
use crate::request::{
    APP_TOOL, AUTH_TOOL, CLIPBOARD_TOOL, EXTENSIONS_TOOL, SEARCH_TOOL, SHORTCUT_TOOL, SYSTEM_TOOL,
    WINDOW_TOOL, WORKFLOWS_TOOL,
};
use crate::resolver::{SearchScope, Shortcut, SystemFunction, WindowLayout};
use crate::workflows::Workflow;

/// Create a tool definition with the given name, description, and schema properties
fn tool(name: &str, description: &str, properties: Value, required: Vec<&str>) -> Tool {
    let props = properties.as_object().cloned().unwrap_or_default();
    Tool {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: InputSchema {
            schema_type: "object".to_string(),
            properties: props,
            required: required.into_iter().map(|s| s.to_string()).collect(),
        },
    }
}

fn choices<T>(all: &[T], as_str: fn(&T) -> &'static str) -> Vec<&'static str> {
    all.iter().map(as_str).collect()
}

/// All nine tools
pub fn all_tools() -> Vec<Tool> {
    vec![
        // =========================================================================
        // GROUPS - keyed on `action`
        // =========================================================================
        tool(
            AUTH_TOOL,
            "Manage service credentials. Actions: setup, validate, oauth, status, audit",
            json!({
                "action": {
                    "type": "string",
                    "description": "Action to perform",
                    "enum": ["setup", "validate", "oauth", "status", "audit"]
                },
                "service": {
                    "type": "string",
                    "description": "Service (setup, validate, oauth)",
                    "enum": choices(Service::all(), Service::as_str)
                }
            }),
            vec!["action"],
        ),
        tool(
            EXTENSIONS_TOOL,
            "Work with Raycast extensions. Actions: list, open, search, install, validate",
            json!({
                "action": {
                    "type": "string",
                    "description": "Action to perform",
                    "enum": ["list", "open", "search", "install", "validate"]
                },
                "extension": {"type": "string", "description": "Extension id, e.g. calculator or author/name (open, install)"},
                "query": {"type": "string", "description": "Store search text (search)"},
                "manifest": {"type": "object", "description": "Inline package.json manifest (validate)"},
                "path": {"type": "string", "description": "Path to a package.json manifest (validate)"}
            }),
            vec!["action"],
        ),
        tool(
            WORKFLOWS_TOOL,
            "Run predefined multi-step workflows. Actions: list, describe, run",
            json!({
                "action": {
                    "type": "string",
                    "description": "Action to perform",
                    "enum": ["list", "describe", "run"]
                },
                "workflow": {
                    "type": "string",
                    "description": "Workflow name (describe, run)",
                    "enum": choices(Workflow::all(), Workflow::as_str)
                }
            }),
            vec!["action"],
        ),

        // =========================================================================
        // DIRECT AUTOMATION
        // =========================================================================
        tool(
            SEARCH_TOOL,
            "Search with Raycast",
            json!({
                "query": {"type": "string", "description": "Search text"},
                "scope": {
                    "type": "string",
                    "description": "Where to search (default: raycast)",
                    "enum": choices(SearchScope::all(), SearchScope::as_str)
                }
            }),
            vec!["query"],
        ),
        tool(
            SHORTCUT_TOOL,
            "Trigger a predefined Raycast shortcut or press a custom key combination",
            json!({
                "shortcut": {
                    "type": "string",
                    "description": "Predefined shortcut",
                    "enum": choices(Shortcut::all(), Shortcut::as_str)
                },
                "keys": {"type": "string", "description": "Key combination such as cmd+shift+c (modifiers: cmd, ctrl, alt, shift)"}
            }),
            vec![],
        ),
        tool(
            SYSTEM_TOOL,
            "Run a system function. restart, shutdown, logout and empty-trash ask for confirmation",
            json!({
                "function": {
                    "type": "string",
                    "description": "System function",
                    "enum": choices(SystemFunction::all(), SystemFunction::as_str)
                },
                "confirm": {"type": "boolean", "description": "Show a confirmation dialog for destructive functions (default: true)"}
            }),
            vec!["function"],
        ),
        tool(
            CLIPBOARD_TOOL,
            "Clipboard operations. Actions: copy, read, clear, history",
            json!({
                "action": {
                    "type": "string",
                    "description": "Action to perform",
                    "enum": ["copy", "read", "clear", "history"]
                },
                "text": {"type": "string", "description": "Text to copy (copy)"}
            }),
            vec!["action"],
        ),
        tool(
            WINDOW_TOOL,
            "Arrange the front window",
            json!({
                "layout": {
                    "type": "string",
                    "description": "Window layout",
                    "enum": choices(WindowLayout::all(), WindowLayout::as_str)
                }
            }),
            vec!["layout"],
        ),
        tool(
            APP_TOOL,
            "Control an application. Actions: activate, quit, status",
            json!({
                "action": {
                    "type": "string",
                    "description": "Action to perform",
                    "enum": ["activate", "quit", "status"]
                },
                "app": {"type": "string", "description": "Application name (default: Raycast)"}
            }),
            vec!["action"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ToolRequest;
    use crate::request::ToolCall;

    #[test]
    fn test_nine_unique_tools() {
        let tools = all_tools();
        assert_eq!(tools.len(), 9);

        let mut names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 9);
    }

    #[test]
    fn test_every_tool_is_routed() {
        for tool in all_tools() {
            let error = ToolCall::parse(&ToolRequest::new(&tool.name, json!({}))).err();
            assert!(
                !error.map_or(false, |e| e.to_string().starts_with("Unknown tool")),
                "{} is not routed",
                tool.name
            );
        }
    }

    #[test]
    fn test_enums_match_accepted_values() {
        let tools = all_tools();
        let system = tools.iter().find(|t| t.name == SYSTEM_TOOL).unwrap();
        let functions = system.input_schema.properties["function"]["enum"]
            .as_array()
            .unwrap()
            .len();
        assert_eq!(functions, 10);

        let schema = serde_json::to_value(&system).unwrap();
        assert_eq!(schema["inputSchema"]["required"], json!(["function"]));
    }
}
