//! Command descriptors and execution results
//!
//! A descriptor is the resolved, ready-to-run form of a tool call. It is
//! produced by the resolver, consumed once by an executor and never stored.

use serde::{Deserialize, Serialize};

/// How the payload of a descriptor is delivered to the operating environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Bring an application to the foreground (payload: application name)
    AppActivate,
    /// Open a URL or deeplink (payload: URL)
    UrlTrigger,
    /// Run an AppleScript (payload: script source)
    ScriptedAutomation,
    /// Run a shell command line (payload: command line)
    ShellCommand,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppActivate => "app_activate",
            Self::UrlTrigger => "url_trigger",
            Self::ScriptedAutomation => "scripted_automation",
            Self::ShellCommand => "shell_command",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single automation invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub kind: CommandKind,
    pub payload: String,
    pub requires_confirmation: bool,
    pub destructive_label: Option<String>,
}

impl CommandDescriptor {
    fn new(kind: CommandKind, payload: impl Into<String>) -> Self {
        Self {
            kind,
            payload: payload.into(),
            requires_confirmation: false,
            destructive_label: None,
        }
    }

    pub fn app(name: impl Into<String>) -> Self {
        Self::new(CommandKind::AppActivate, name)
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::new(CommandKind::UrlTrigger, url)
    }

    pub fn script(source: impl Into<String>) -> Self {
        Self::new(CommandKind::ScriptedAutomation, source)
    }

    pub fn shell(command: impl Into<String>) -> Self {
        Self::new(CommandKind::ShellCommand, command)
    }

    /// Mark as destructive; the label completes "Are you sure you want to ..."
    pub fn destructive(mut self, label: impl Into<String>) -> Self {
        self.requires_confirmation = true;
        self.destructive_label = Some(label.into());
        self
    }
}

/// Captured outcome of one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ExecutionResult {
    pub fn completed(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stderr: message.into(),
            ..Default::default()
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            stderr: message.into(),
            timed_out: true,
            ..Default::default()
        }
    }

    /// A failure signal that is not a timeout
    pub fn is_failure(&self) -> bool {
        !self.timed_out && !self.stderr.trim().is_empty()
    }
}
