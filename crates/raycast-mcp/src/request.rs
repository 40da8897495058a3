//! Typed tool calls
//!
//! The loosely typed `{name, arguments}` request is parsed once into a
//! `ToolCall`. Each variant carries only the fields its operation needs, so a
//! missing required field or an unknown enumerated value is rejected here,
//! before anything is resolved or executed.

use serde_json::{Map, Value};
use std::path::PathBuf;

use raycast_core::Service;

use crate::error::DispatchError;
use crate::protocol::ToolRequest;
use crate::resolver::{KeyCombo, SearchScope, Shortcut, SystemFunction, WindowLayout};
use crate::workflows::Workflow;

pub const AUTH_TOOL: &str = "raycast_auth";
pub const EXTENSIONS_TOOL: &str = "raycast_extensions";
pub const WORKFLOWS_TOOL: &str = "raycast_workflows";
pub const SEARCH_TOOL: &str = "raycast_search";
pub const SHORTCUT_TOOL: &str = "raycast_shortcut";
pub const SYSTEM_TOOL: &str = "raycast_system";
pub const CLIPBOARD_TOOL: &str = "raycast_clipboard";
pub const WINDOW_TOOL: &str = "raycast_window";
pub const APP_TOOL: &str = "raycast_app";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCall {
    Setup(Service),
    Validate(Service),
    Oauth(Service),
    Status,
    Audit,
}

/// Where an extension manifest comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestSource {
    Inline(Value),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionCall {
    List,
    Open(String),
    Search(String),
    Install(String),
    Validate(ManifestSource),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowCall {
    List,
    Describe(Workflow),
    Run(Workflow),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutCall {
    Named(Shortcut),
    Keys(KeyCombo),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardCall {
    Copy(String),
    Read,
    Clear,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Activate,
    Quit,
    Status,
}

impl AppAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Quit => "quit",
            Self::Status => "status",
        }
    }
}

/// A validated tool call
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    Auth(AuthCall),
    Extensions(ExtensionCall),
    Workflows(WorkflowCall),
    Search { query: String, scope: SearchScope },
    Shortcut(ShortcutCall),
    System { function: SystemFunction, confirm: bool },
    Clipboard(ClipboardCall),
    Window { layout: WindowLayout },
    App { action: AppAction, app: Option<String> },
}

// Helper functions
fn get_str<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
}

fn get_bool(args: &Map<String, Value>, key: &str) -> Option<bool> {
    args.get(key).and_then(|v| v.as_bool())
}

fn require_str(args: &Map<String, Value>, key: &str, purpose: &str) -> Result<String, DispatchError> {
    get_str(args, key)
        .map(str::to_string)
        .ok_or_else(|| DispatchError::missing(key, purpose))
}

fn require_action<'a>(args: &'a Map<String, Value>, tool: &str) -> Result<&'a str, DispatchError> {
    get_str(args, "action").ok_or_else(|| DispatchError::missing("action", tool))
}

fn unknown_action(tool: &str, action: &str) -> DispatchError {
    DispatchError::UnknownAction {
        tool: tool.to_string(),
        action: action.to_string(),
    }
}

fn lookup<T>(
    args: &Map<String, Value>,
    key: &str,
    purpose: &str,
    category: &str,
    from_str: fn(&str) -> Option<T>,
) -> Result<T, DispatchError> {
    let value = require_str(args, key, purpose)?;
    from_str(&value).ok_or_else(|| DispatchError::unknown(category, &value))
}

impl ToolCall {
    /// Parse and validate a decoded request
    pub fn parse(request: &ToolRequest) -> Result<Self, DispatchError> {
        let args = &request.arguments;
        match request.name.as_str() {
            AUTH_TOOL => parse_auth(args).map(Self::Auth),
            EXTENSIONS_TOOL => parse_extensions(args).map(Self::Extensions),
            WORKFLOWS_TOOL => parse_workflows(args).map(Self::Workflows),
            SEARCH_TOOL => {
                let query = require_str(args, "query", "search")?;
                let scope = match get_str(args, "scope") {
                    Some(s) => SearchScope::from_str(s)
                        .ok_or_else(|| DispatchError::unknown("search scope", s))?,
                    None => SearchScope::default(),
                };
                Ok(Self::Search { query, scope })
            }
            SHORTCUT_TOOL => {
                if let Some(name) = get_str(args, "shortcut") {
                    let shortcut = Shortcut::from_str(name)
                        .ok_or_else(|| DispatchError::unknown("shortcut", name))?;
                    Ok(Self::Shortcut(ShortcutCall::Named(shortcut)))
                } else if let Some(keys) = get_str(args, "keys") {
                    Ok(Self::Shortcut(ShortcutCall::Keys(KeyCombo::parse(keys)?)))
                } else {
                    Err(DispatchError::invalid("Shortcut or keys parameter required"))
                }
            }
            SYSTEM_TOOL => {
                let function = lookup(args, "function", "system", "system function", SystemFunction::from_str)?;
                let confirm = get_bool(args, "confirm").unwrap_or(true);
                Ok(Self::System { function, confirm })
            }
            CLIPBOARD_TOOL => {
                let action = require_action(args, CLIPBOARD_TOOL)?;
                let call = match action {
                    "copy" => {
                        // Whitespace-only text is still text to copy
                        let text = args
                            .get("text")
                            .and_then(|v| v.as_str())
                            .filter(|s| !s.is_empty())
                            .ok_or_else(|| DispatchError::missing("text", "copy"))?;
                        ClipboardCall::Copy(text.to_string())
                    }
                    "read" => ClipboardCall::Read,
                    "clear" => ClipboardCall::Clear,
                    "history" => ClipboardCall::History,
                    other => return Err(unknown_action(CLIPBOARD_TOOL, other)),
                };
                Ok(Self::Clipboard(call))
            }
            WINDOW_TOOL => {
                let layout = lookup(args, "layout", "window", "window layout", WindowLayout::from_str)?;
                Ok(Self::Window { layout })
            }
            APP_TOOL => {
                let action = match require_action(args, APP_TOOL)? {
                    "activate" => AppAction::Activate,
                    "quit" => AppAction::Quit,
                    "status" => AppAction::Status,
                    other => return Err(unknown_action(APP_TOOL, other)),
                };
                let app = get_str(args, "app").map(str::to_string);
                Ok(Self::App { action, app })
            }
            other => Err(DispatchError::UnknownTool(other.to_string())),
        }
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::Auth(_) => AUTH_TOOL,
            Self::Extensions(_) => EXTENSIONS_TOOL,
            Self::Workflows(_) => WORKFLOWS_TOOL,
            Self::Search { .. } => SEARCH_TOOL,
            Self::Shortcut(_) => SHORTCUT_TOOL,
            Self::System { .. } => SYSTEM_TOOL,
            Self::Clipboard(_) => CLIPBOARD_TOOL,
            Self::Window { .. } => WINDOW_TOOL,
            Self::App { .. } => APP_TOOL,
        }
    }

    /// Operation name used in failure and cancellation messages
    pub fn label(&self) -> String {
        match self {
            Self::Auth(AuthCall::Setup(s)) => format!("{} setup", s.display_name()),
            Self::Auth(AuthCall::Validate(s)) => format!("{} validation", s.display_name()),
            Self::Auth(AuthCall::Oauth(s)) => format!("{} OAuth", s.display_name()),
            Self::Auth(AuthCall::Status) => "Auth status".to_string(),
            Self::Auth(AuthCall::Audit) => "Credential audit".to_string(),
            Self::Extensions(ExtensionCall::List) => "Extension list".to_string(),
            Self::Extensions(ExtensionCall::Open(_)) => "Extension open".to_string(),
            Self::Extensions(ExtensionCall::Search(_)) => "Extension search".to_string(),
            Self::Extensions(ExtensionCall::Install(_)) => "Extension install".to_string(),
            Self::Extensions(ExtensionCall::Validate(_)) => "Manifest validation".to_string(),
            Self::Workflows(WorkflowCall::List) => "Workflow list".to_string(),
            Self::Workflows(WorkflowCall::Describe(w)) | Self::Workflows(WorkflowCall::Run(w)) => {
                format!("Workflow {}", w.as_str())
            }
            Self::Search { .. } => "Search".to_string(),
            Self::Shortcut(_) => "Shortcut".to_string(),
            Self::System { function, .. } => format!("System {}", function.as_str()),
            Self::Clipboard(ClipboardCall::Copy(_)) => "Clipboard copy".to_string(),
            Self::Clipboard(ClipboardCall::Read) => "Clipboard read".to_string(),
            Self::Clipboard(ClipboardCall::Clear) => "Clipboard clear".to_string(),
            Self::Clipboard(ClipboardCall::History) => "Clipboard history".to_string(),
            Self::Window { .. } => "Window layout".to_string(),
            Self::App { action, .. } => format!("App {}", action.as_str()),
        }
    }

    /// Whether the caller left the confirmation dialog enabled
    pub fn wants_confirmation(&self) -> bool {
        match self {
            Self::System { confirm, .. } => *confirm,
            _ => true,
        }
    }
}

fn parse_auth(args: &Map<String, Value>) -> Result<AuthCall, DispatchError> {
    let service = |purpose: &str| lookup(args, "service", purpose, "service", Service::from_str);

    match require_action(args, AUTH_TOOL)? {
        "setup" => Ok(AuthCall::Setup(service("setup")?)),
        "validate" => Ok(AuthCall::Validate(service("validation")?)),
        "oauth" => Ok(AuthCall::Oauth(service("OAuth")?)),
        "status" => Ok(AuthCall::Status),
        "audit" => Ok(AuthCall::Audit),
        other => Err(unknown_action(AUTH_TOOL, other)),
    }
}

fn parse_extensions(args: &Map<String, Value>) -> Result<ExtensionCall, DispatchError> {
    match require_action(args, EXTENSIONS_TOOL)? {
        "list" => Ok(ExtensionCall::List),
        "open" => Ok(ExtensionCall::Open(require_str(args, "extension", "open")?)),
        "search" => Ok(ExtensionCall::Search(require_str(args, "query", "search")?)),
        "install" => Ok(ExtensionCall::Install(require_str(args, "extension", "install")?)),
        "validate" => {
            if let Some(manifest) = args.get("manifest").filter(|v| v.is_object()) {
                Ok(ExtensionCall::Validate(ManifestSource::Inline(manifest.clone())))
            } else if let Some(path) = get_str(args, "path") {
                Ok(ExtensionCall::Validate(ManifestSource::File(PathBuf::from(path))))
            } else {
                Err(DispatchError::invalid("Manifest or path parameter required for validate"))
            }
        }
        other => Err(unknown_action(EXTENSIONS_TOOL, other)),
    }
}

fn parse_workflows(args: &Map<String, Value>) -> Result<WorkflowCall, DispatchError> {
    let workflow = |purpose: &str| lookup(args, "workflow", purpose, "workflow", Workflow::from_str);

    match require_action(args, WORKFLOWS_TOOL)? {
        "list" => Ok(WorkflowCall::List),
        "describe" => Ok(WorkflowCall::Describe(workflow("describe")?)),
        "run" => Ok(WorkflowCall::Run(workflow("run")?)),
        other => Err(unknown_action(WORKFLOWS_TOOL, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(name: &str, arguments: Value) -> Result<ToolCall, DispatchError> {
        ToolCall::parse(&ToolRequest::new(name, arguments))
    }

    fn rejection(name: &str, arguments: Value) -> String {
        parse(name, arguments).unwrap_err().to_string()
    }

    #[test]
    fn test_unknown_tool() {
        assert_eq!(rejection("raycast_teleport", json!({})), "Unknown tool: raycast_teleport");
    }

    #[test]
    fn test_auth_requires_service_per_action() {
        assert_eq!(
            rejection(AUTH_TOOL, json!({"action": "validate"})),
            "Service parameter required for validation"
        );
        assert_eq!(
            rejection(AUTH_TOOL, json!({"action": "setup"})),
            "Service parameter required for setup"
        );
        assert_eq!(
            rejection(AUTH_TOOL, json!({"action": "oauth", "service": ""})),
            "Service parameter required for OAuth"
        );
        assert_eq!(
            rejection(AUTH_TOOL, json!({"action": "validate", "service": "gitlab"})),
            "Unknown service: gitlab"
        );
        assert_eq!(
            parse(AUTH_TOOL, json!({"action": "status"})).unwrap(),
            ToolCall::Auth(AuthCall::Status)
        );
    }

    #[test]
    fn test_service_names_are_exact() {
        assert_eq!(
            rejection(AUTH_TOOL, json!({"action": "validate", "service": "GitHub"})),
            "Unknown service: GitHub"
        );
        assert!(parse(AUTH_TOOL, json!({"action": "validate", "service": "github"})).is_ok());
    }

    #[test]
    fn test_app_actions() {
        assert_eq!(
            parse(APP_TOOL, json!({"action": "activate"})).unwrap(),
            ToolCall::App {
                action: AppAction::Activate,
                app: None
            }
        );
        assert_eq!(
            parse(APP_TOOL, json!({"action": "quit", "app": "Safari"})).unwrap(),
            ToolCall::App {
                action: AppAction::Quit,
                app: Some("Safari".to_string())
            }
        );
        assert_eq!(
            parse(APP_TOOL, json!({"action": "status", "app": "Finder"})).unwrap(),
            ToolCall::App {
                action: AppAction::Status,
                app: Some("Finder".to_string())
            }
        );
    }

    #[test]
    fn test_app_action_is_checked() {
        assert_eq!(
            rejection(APP_TOOL, json!({"action": "launch"})),
            "Unknown action: launch"
        );
        assert_eq!(
            rejection(APP_TOOL, json!({"app": "Safari"})),
            "Action parameter required for raycast_app"
        );
    }

    #[test]
    fn test_action_is_required_for_groups() {
        assert_eq!(
            rejection(AUTH_TOOL, json!({"service": "github"})),
            "Action parameter required for raycast_auth"
        );
        assert_eq!(
            rejection(EXTENSIONS_TOOL, json!({"action": 7})),
            "Action parameter required for raycast_extensions"
        );
        assert_eq!(
            rejection(WORKFLOWS_TOOL, json!({"action": "delete"})),
            "Unknown action: delete"
        );
    }

    #[test]
    fn test_search_requires_query() {
        assert_eq!(rejection(SEARCH_TOOL, json!({})), "Query parameter required for search");
        assert_eq!(
            rejection(EXTENSIONS_TOOL, json!({"action": "search"})),
            "Query parameter required for search"
        );
        assert_eq!(
            parse(SEARCH_TOOL, json!({"query": "notes"})).unwrap(),
            ToolCall::Search {
                query: "notes".into(),
                scope: SearchScope::Raycast
            }
        );
        assert_eq!(
            rejection(SEARCH_TOOL, json!({"query": "notes", "scope": "web"})),
            "Unknown search scope: web"
        );
    }

    #[test]
    fn test_shortcut_variants() {
        assert_eq!(
            parse(SHORTCUT_TOOL, json!({"shortcut": "calculator"})).unwrap(),
            ToolCall::Shortcut(ShortcutCall::Named(Shortcut::Calculator))
        );
        assert!(matches!(
            parse(SHORTCUT_TOOL, json!({"keys": "cmd+shift+c"})).unwrap(),
            ToolCall::Shortcut(ShortcutCall::Keys(_))
        ));
        assert_eq!(rejection(SHORTCUT_TOOL, json!({"shortcut": "warp"})), "Unknown shortcut: warp");
        assert_eq!(rejection(SHORTCUT_TOOL, json!({})), "Shortcut or keys parameter required");
        assert_eq!(
            rejection(SHORTCUT_TOOL, json!({"keys": "cmd+a+b"})),
            "Key combination has more than one key: cmd+a+b"
        );
    }

    #[test]
    fn test_system_confirm_flag_defaults_on() {
        assert_eq!(
            parse(SYSTEM_TOOL, json!({"function": "shutdown"})).unwrap(),
            ToolCall::System {
                function: SystemFunction::Shutdown,
                confirm: true
            }
        );
        let call = parse(SYSTEM_TOOL, json!({"function": "restart", "confirm": false})).unwrap();
        assert!(!call.wants_confirmation());
        assert_eq!(
            rejection(SYSTEM_TOOL, json!({"function": "reboot"})),
            "Unknown system function: reboot"
        );
        assert_eq!(rejection(SYSTEM_TOOL, json!({})), "Function parameter required for system");
    }

    #[test]
    fn test_clipboard_copy_keeps_whitespace_text() {
        assert_eq!(
            parse(CLIPBOARD_TOOL, json!({"action": "copy", "text": "  "})).unwrap(),
            ToolCall::Clipboard(ClipboardCall::Copy("  ".into()))
        );
        assert_eq!(
            rejection(CLIPBOARD_TOOL, json!({"action": "copy"})),
            "Text parameter required for copy"
        );
    }

    #[test]
    fn test_extension_validate_sources() {
        assert!(matches!(
            parse(EXTENSIONS_TOOL, json!({"action": "validate", "manifest": {"name": "x"}})).unwrap(),
            ToolCall::Extensions(ExtensionCall::Validate(ManifestSource::Inline(_)))
        ));
        assert!(matches!(
            parse(EXTENSIONS_TOOL, json!({"action": "validate", "path": "package.json"})).unwrap(),
            ToolCall::Extensions(ExtensionCall::Validate(ManifestSource::File(_)))
        ));
        assert_eq!(
            rejection(EXTENSIONS_TOOL, json!({"action": "validate"})),
            "Manifest or path parameter required for validate"
        );
    }

    #[test]
    fn test_workflow_lookup() {
        assert_eq!(
            parse(WORKFLOWS_TOOL, json!({"action": "run", "workflow": "focus-mode"})).unwrap(),
            ToolCall::Workflows(WorkflowCall::Run(Workflow::FocusMode))
        );
        assert_eq!(
            rejection(WORKFLOWS_TOOL, json!({"action": "run", "workflow": "party"})),
            "Unknown workflow: party"
        );
        assert_eq!(
            rejection(WORKFLOWS_TOOL, json!({"action": "describe"})),
            "Workflow parameter required for describe"
        );
    }

    #[test]
    fn test_labels() {
        let call = parse(SYSTEM_TOOL, json!({"function": "empty-trash"})).unwrap();
        assert_eq!(call.label(), "System empty-trash");
        assert_eq!(call.tool_name(), SYSTEM_TOOL);

        let call = parse(AUTH_TOOL, json!({"action": "oauth", "service": "github"})).unwrap();
        assert_eq!(call.label(), "GitHub OAuth");
    }
}
