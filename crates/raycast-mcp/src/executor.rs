//! Automation Executor
//!
//! Runs exactly one external invocation per descriptor. Timeouts and failures
//! come back inside the `ExecutionResult`; nothing here returns an error.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::command::{CommandDescriptor, CommandKind, ExecutionResult};

#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, descriptor: &CommandDescriptor) -> ExecutionResult;
}

/// Spawns the platform automation tools
#[derive(Debug, Clone)]
pub struct SystemExecutor {
    timeout: Option<Duration>,
}

impl SystemExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    /// No bound; used for modal dialogs that wait on the operator
    pub fn unbounded() -> Self {
        Self { timeout: None }
    }

    fn command(descriptor: &CommandDescriptor) -> Command {
        let payload = descriptor.payload.as_str();
        let (program, args) = match descriptor.kind {
            CommandKind::AppActivate => ("open", vec!["-a", payload]),
            CommandKind::UrlTrigger => ("open", vec![payload]),
            CommandKind::ScriptedAutomation => ("osascript", vec!["-e", payload]),
            CommandKind::ShellCommand => ("sh", vec!["-c", payload]),
        };

        let mut cmd = Command::new(program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Executor for SystemExecutor {
    async fn execute(&self, descriptor: &CommandDescriptor) -> ExecutionResult {
        debug!("Executing {}: {}", descriptor.kind, descriptor.payload);

        let output = Self::command(descriptor).output();
        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, output).await {
                Ok(output) => output,
                Err(_) => {
                    warn!("{} timed out after {:?}", descriptor.kind, limit);
                    return ExecutionResult::timeout(format!(
                        "Command timed out after {}",
                        describe_duration(limit)
                    ));
                }
            },
            None => output.await,
        };

        match output {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

                if output.status.success() {
                    if !stderr.is_empty() {
                        debug!("Ignoring stderr from successful {}: {}", descriptor.kind, stderr);
                    }
                    ExecutionResult::completed(stdout)
                } else if stderr.is_empty() {
                    ExecutionResult::failed(format!(
                        "exit code {}",
                        output.status.code().unwrap_or(-1)
                    ))
                } else {
                    ExecutionResult::failed(stderr)
                }
            }
            Err(e) => ExecutionResult::failed(format!("Failed to run {}: {}", descriptor.kind, e)),
        }
    }
}

fn describe_duration(duration: Duration) -> String {
    if duration.subsec_millis() == 0 {
        let secs = duration.as_secs();
        format!("{} second{}", secs, if secs == 1 { "" } else { "s" })
    } else {
        format!("{} ms", duration.as_millis())
    }
}

/// Logs descriptors instead of running them
#[derive(Debug, Clone, Default)]
pub struct DryRunExecutor;

#[async_trait]
impl Executor for DryRunExecutor {
    async fn execute(&self, descriptor: &CommandDescriptor) -> ExecutionResult {
        info!("[dry-run] {}: {}", descriptor.kind, descriptor.payload);
        ExecutionResult::completed("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_describe_duration() {
        assert_eq!(describe_duration(Duration::from_secs(60)), "60 seconds");
        assert_eq!(describe_duration(Duration::from_secs(1)), "1 second");
        assert_eq!(describe_duration(Duration::from_millis(250)), "250 ms");
    }

    #[tokio::test]
    async fn test_dry_run_has_no_output() {
        let result = DryRunExecutor.execute(&CommandDescriptor::shell("exit 1")).await;
        assert_eq!(result, ExecutionResult::completed(""));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_output_is_captured() {
        let executor = SystemExecutor::new(Duration::from_secs(10));
        let result = executor
            .execute(&CommandDescriptor::shell("printf hello; echo noise >&2"))
            .await;
        assert_eq!(result.stdout, "hello");
        assert!(!result.is_failure());
        assert!(!result.timed_out);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let executor = SystemExecutor::new(Duration::from_secs(10));

        let result = executor
            .execute(&CommandDescriptor::shell("echo 'no such clipboard' >&2; exit 3"))
            .await;
        assert!(result.is_failure());
        assert_eq!(result.stderr, "no such clipboard");

        let result = executor.execute(&CommandDescriptor::shell("exit 4")).await;
        assert_eq!(result.stderr, "exit code 4");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_command_times_out() {
        let executor = SystemExecutor::new(Duration::from_millis(200));
        let started = Instant::now();

        let result = executor.execute(&CommandDescriptor::shell("sleep 5")).await;

        assert!(result.timed_out);
        assert!(!result.is_failure());
        assert_eq!(result.stderr, "Command timed out after 200 ms");
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
