//! Confirmation Gate
//!
//! Destructive descriptors are shown to the operator as a modal dialog before
//! they reach the executor. Only the exact answer `confirmed` lets a call
//! proceed; every other outcome, including dialog errors, denies it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::command::{CommandDescriptor, CommandKind, ExecutionResult};
use crate::executor::Executor;
use crate::resolver::applescript_string;

const CONFIRMED: &str = "confirmed";

#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    async fn confirm(&self, descriptor: &CommandDescriptor) -> bool;
}

/// Asks through a System Events dialog
pub struct DialogGate {
    executor: Arc<dyn Executor>,
    history: Option<ConfirmationHistory>,
}

impl DialogGate {
    pub fn new(executor: Arc<dyn Executor>, history: Option<ConfirmationHistory>) -> Self {
        Self { executor, history }
    }

    /// Script that returns `confirmed` only when the operator presses Confirm
    pub fn dialog_script(label: &str) -> String {
        let prompt = applescript_string(&format!("Are you sure you want to {}?", label));
        format!(
            "set answer to button returned of (display dialog {} with title \"Raycast MCP\" \
             buttons {{\"Cancel\", \"Confirm\"}} default button \"Cancel\" \
             cancel button \"Cancel\" with icon caution)\n\
             if answer is \"Confirm\" then return \"{}\"\n\
             return \"cancelled\"",
            prompt, CONFIRMED
        )
    }

    fn is_confirmed(result: &ExecutionResult) -> bool {
        !result.timed_out
            && !result.is_failure()
            && result.stdout.trim_end_matches(['\r', '\n']) == CONFIRMED
    }
}

#[async_trait]
impl ConfirmationGate for DialogGate {
    async fn confirm(&self, descriptor: &CommandDescriptor) -> bool {
        let label = descriptor
            .destructive_label
            .as_deref()
            .unwrap_or("run this action");

        let dialog = CommandDescriptor::script(Self::dialog_script(label));
        let result = self.executor.execute(&dialog).await;
        let confirmed = Self::is_confirmed(&result);

        if !confirmed {
            debug!("Dialog answer {:?} (stderr {:?})", result.stdout, result.stderr);
            warn!("Confirmation denied: {}", label);
        }

        if let Some(history) = &self.history {
            if let Err(e) = history.record(descriptor, confirmed) {
                warn!("Failed to log confirmation: {:#}", e);
            }
        }

        confirmed
    }
}

/// One logged gate decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationEvent {
    pub timestamp: DateTime<Utc>,
    pub label: String,
    pub kind: CommandKind,
    pub confirmed: bool,
}

/// Daily JSONL log of gate decisions
#[derive(Debug, Clone)]
pub struct ConfirmationHistory {
    dir: PathBuf,
}

impl ConfirmationHistory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn log_file(&self, timestamp: &DateTime<Utc>) -> PathBuf {
        self.dir
            .join(format!("confirmations-{}.jsonl", timestamp.format("%Y-%m-%d")))
    }

    pub fn record(&self, descriptor: &CommandDescriptor, confirmed: bool) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create history directory: {}", self.dir.display()))?;

        let event = ConfirmationEvent {
            timestamp: Utc::now(),
            label: descriptor.destructive_label.clone().unwrap_or_default(),
            kind: descriptor.kind,
            confirmed,
        };

        let log_file = self.log_file(&event.timestamp);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;

        let json = serde_json::to_string(&event).context("Failed to serialize event")?;
        writeln!(file, "{}", json).context("Failed to write to log file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Answers every dialog with a canned result
    struct ScriptedAnswer {
        result: ExecutionResult,
        scripts: Mutex<Vec<String>>,
    }

    impl ScriptedAnswer {
        fn new(result: ExecutionResult) -> Arc<Self> {
            Arc::new(Self {
                result,
                scripts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Executor for ScriptedAnswer {
        async fn execute(&self, descriptor: &CommandDescriptor) -> ExecutionResult {
            self.scripts.lock().unwrap().push(descriptor.payload.clone());
            self.result.clone()
        }
    }

    fn shutdown() -> CommandDescriptor {
        CommandDescriptor::script("tell application \"System Events\" to shut down")
            .destructive("shut down your Mac")
    }

    async fn answer(result: ExecutionResult) -> bool {
        let executor = ScriptedAnswer::new(result);
        DialogGate::new(executor, None).confirm(&shutdown()).await
    }

    #[tokio::test]
    async fn test_exact_confirmation_proceeds() {
        assert!(answer(ExecutionResult::completed("confirmed\n")).await);
        assert!(answer(ExecutionResult::completed("confirmed")).await);
    }

    #[tokio::test]
    async fn test_anything_else_denies() {
        assert!(!answer(ExecutionResult::completed("Confirmed\n")).await);
        assert!(!answer(ExecutionResult::completed(" confirmed")).await);
        assert!(!answer(ExecutionResult::completed("cancelled\n")).await);
        assert!(!answer(ExecutionResult::completed("")).await);
        assert!(!answer(ExecutionResult::failed("execution error: User canceled. (-128)")).await);
        assert!(!answer(ExecutionResult::timeout("Command timed out")).await);
    }

    #[tokio::test]
    async fn test_dialog_names_the_action() {
        let executor = ScriptedAnswer::new(ExecutionResult::completed("cancelled"));
        let gate = DialogGate::new(executor.clone(), None);
        gate.confirm(&shutdown()).await;

        let scripts = executor.scripts.lock().unwrap();
        assert_eq!(scripts.len(), 1);
        assert!(scripts[0].contains("\"Are you sure you want to shut down your Mac?\""));
        assert!(scripts[0].contains("cancel button \"Cancel\""));
    }

    #[test]
    fn test_label_is_escaped() {
        let script = DialogGate::dialog_script("remove \"Backups\"");
        assert!(script.contains(r#""Are you sure you want to remove \"Backups\"?""#));
    }

    #[tokio::test]
    async fn test_decisions_are_logged() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let history = ConfirmationHistory::new(dir.path().join("history"));

        let executor = ScriptedAnswer::new(ExecutionResult::completed("confirmed"));
        let gate = DialogGate::new(executor, Some(history.clone()));
        assert!(gate.confirm(&shutdown()).await);

        let log_file = history.log_file(&Utc::now());
        let content = fs::read_to_string(&log_file)?;
        let events: Vec<ConfirmationEvent> = content
            .lines()
            .map(serde_json::from_str)
            .collect::<Result<_, _>>()?;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].label, "shut down your Mac");
        assert_eq!(events[0].kind, CommandKind::ScriptedAutomation);
        assert!(events[0].confirmed);
        Ok(())
    }
}
