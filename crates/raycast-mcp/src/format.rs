//! Response Formatter
//!
//! Every outcome becomes a `ToolResponse` here, so the status markers stay the
//! same across tools.

use crate::command::ExecutionResult;
use crate::error::DispatchError;
use crate::protocol::ToolResponse;

pub const SUCCESS: &str = "✅";
pub const FAILURE: &str = "❌";
pub const TIMEOUT: &str = "⚠️";
pub const CANCELLED: &str = "🚫";
pub const INFO: &str = "ℹ️";

pub fn success(summary: impl AsRef<str>) -> ToolResponse {
    ToolResponse::success(format!("{} {}", SUCCESS, summary.as_ref()))
}

/// Listings and reports
pub fn info(title: &str, body: &str) -> ToolResponse {
    if body.is_empty() {
        ToolResponse::success(format!("{} {}", INFO, title))
    } else {
        ToolResponse::success(format!("{} {}\n\n{}", INFO, title, body))
    }
}

pub fn failure(label: &str, message: &str) -> ToolResponse {
    ToolResponse::error(format!("{} {} failed: {}", FAILURE, label, message))
}

/// Operator declined a destructive action; not an error
pub fn cancelled(label: &str) -> ToolResponse {
    ToolResponse::success(format!("{} {} cancelled by user", CANCELLED, label))
}

/// Not run and not asked; not an error
pub fn skipped(label: &str, reason: &str) -> ToolResponse {
    ToolResponse::success(format!("{} {} skipped: {}", CANCELLED, label, reason))
}

/// Soft outcome: the automation may have partly run
pub fn timeout(label: &str, message: &str) -> ToolResponse {
    ToolResponse::success(format!(
        "{} {} timed out: {}. It may have partially completed; verify the result manually.",
        TIMEOUT, label, message
    ))
}

pub fn rejected(error: &DispatchError) -> ToolResponse {
    match error {
        DispatchError::Execution(message) => ToolResponse::error(format!("{} {}", FAILURE, message)),
        other => ToolResponse::error(other.to_string()),
    }
}

/// Outcome of one external invocation; captured stdout follows the summary
pub fn execution(label: &str, summary: &str, result: &ExecutionResult) -> ToolResponse {
    if result.timed_out {
        return timeout(label, result.stderr.trim());
    }
    if result.is_failure() {
        return failure(label, result.stderr.trim());
    }

    let output = result.stdout.trim_end();
    if output.trim().is_empty() {
        success(summary)
    } else {
        success(format!("{}\n\n{}", summary, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_outcomes() {
        let ok = execution("Shortcut", "Opened calculator", &ExecutionResult::completed(""));
        assert!(!ok.is_error);
        assert_eq!(ok.text(), "✅ Opened calculator");

        let failed = execution("Shortcut", "Opened calculator", &ExecutionResult::failed("no app\n"));
        assert!(failed.is_error);
        assert_eq!(failed.text(), "❌ Shortcut failed: no app");

        let slow = execution("System sleep", "Slept", &ExecutionResult::timeout("Command timed out after 60 seconds"));
        assert!(!slow.is_error);
        assert!(slow.text().starts_with("⚠️ System sleep timed out"));
        assert!(slow.text().contains("verify the result manually"));
    }

    #[test]
    fn test_stdout_is_appended() {
        let response = execution("Clipboard read", "Clipboard contents", &ExecutionResult::completed("hello\n"));
        assert_eq!(response.text(), "✅ Clipboard contents\n\nhello");
    }

    #[test]
    fn test_validation_is_bare() {
        let response = rejected(&DispatchError::missing("service", "validation"));
        assert!(response.is_error);
        assert_eq!(response.text(), "Service parameter required for validation");
    }

    #[test]
    fn test_skipped_names_the_reason() {
        let response = skipped("System restart", "dry run, no confirmation dialog was shown");
        assert!(!response.is_error);
        assert_eq!(
            response.text(),
            "🚫 System restart skipped: dry run, no confirmation dialog was shown"
        );
    }

    #[test]
    fn test_cancelled_is_not_an_error() {
        let response = cancelled("System shutdown");
        assert!(!response.is_error);
        assert!(response.text().contains("cancelled"));
    }
}
