//! Tool Dispatcher
//!
//! Entry point of the router. A request is parsed into a `ToolCall`, resolved
//! to at most one descriptor, passed through the confirmation gate when it is
//! destructive, executed and formatted. Every branch ends in a `ToolResponse`;
//! no error leaves `dispatch`.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use raycast_core::{process, Auth, Config, Paths, Service};

use crate::command::CommandDescriptor;
use crate::error::DispatchError;
use crate::executor::{DryRunExecutor, Executor, SystemExecutor};
use crate::format;
use crate::gate::{ConfirmationGate, ConfirmationHistory, DialogGate};
use crate::manifest;
use crate::protocol::{ToolRequest, ToolResponse};
use crate::request::{
    AppAction, AuthCall, ClipboardCall, ExtensionCall, ManifestSource, ShortcutCall, ToolCall,
    WorkflowCall,
};
use crate::resolver::{KnownExtension, Resolver, Shortcut};
use crate::workflows::Workflow;

pub struct Dispatcher {
    auth: Arc<dyn Auth>,
    resolver: Resolver,
    executor: Arc<dyn Executor>,
    gate: Arc<dyn ConfirmationGate>,
    confirm_destructive: bool,
    dry_run: bool,
    credentials_file: PathBuf,
}

impl Dispatcher {
    pub fn new(
        auth: Arc<dyn Auth>,
        resolver: Resolver,
        executor: Arc<dyn Executor>,
        gate: Arc<dyn ConfirmationGate>,
    ) -> Self {
        Self {
            auth,
            resolver,
            executor,
            gate,
            confirm_destructive: true,
            dry_run: false,
            credentials_file: Paths::new().credentials_file(),
        }
    }

    /// Wire the system executor (or the dry-run one) and the dialog gate
    pub fn from_config(config: &Config, auth: Arc<dyn Auth>) -> Self {
        let executor: Arc<dyn Executor> = if config.dry_run {
            info!("Dry run: automation invocations are logged, not executed");
            Arc::new(DryRunExecutor)
        } else {
            Arc::new(SystemExecutor::new(config.timeout()))
        };

        let history = config
            .history
            .then(|| ConfirmationHistory::new(Paths::new().history_dir()));
        let gate = Arc::new(DialogGate::new(Arc::new(SystemExecutor::unbounded()), history));

        Self::new(auth, Resolver::from_config(config), executor, gate)
            .with_confirmation(config.confirm_destructive)
            .with_dry_run(config.dry_run)
            .with_credentials_file(config.credentials_path())
    }

    /// Globally enable or disable the confirmation gate
    pub fn with_confirmation(mut self, enabled: bool) -> Self {
        self.confirm_destructive = enabled;
        self
    }

    /// Skip destructive calls that would need a dialog instead of asking
    pub fn with_dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub fn with_credentials_file(mut self, path: PathBuf) -> Self {
        self.credentials_file = path;
        self
    }

    pub async fn dispatch(&self, request: &ToolRequest) -> ToolResponse {
        let call = match ToolCall::parse(request) {
            Ok(call) => call,
            Err(e) => {
                warn!("Rejected {}: {}", request.name, e);
                return format::rejected(&e);
            }
        };

        match self.handle(&call).await {
            Ok(response) => response,
            Err(e) if e.is_rejection() => {
                warn!("Rejected {}: {}", call.tool_name(), e);
                format::rejected(&e)
            }
            Err(e) => {
                warn!("{} failed: {}", call.label(), e);
                format::failure(&call.label(), &e.to_string())
            }
        }
    }

    async fn handle(&self, call: &ToolCall) -> Result<ToolResponse, DispatchError> {
        match self.resolver.resolve(call)? {
            Some(descriptor) => Ok(self.invoke(call, descriptor).await),
            None => self.answer(call).await,
        }
    }

    /// Gate, execute and format a single invocation
    async fn invoke(&self, call: &ToolCall, descriptor: CommandDescriptor) -> ToolResponse {
        let label = call.label();

        if descriptor.requires_confirmation {
            if self.confirm_destructive && call.wants_confirmation() {
                if self.dry_run {
                    info!("[dry-run] {} needs confirmation; not asking", label);
                    return format::skipped(&label, "dry run, no confirmation dialog was shown");
                }
                if !self.gate.confirm(&descriptor).await {
                    return format::cancelled(&label);
                }
            } else {
                debug!("Confirmation skipped for {}", label);
            }
        }

        let result = self.executor.execute(&descriptor).await;
        if result.timed_out {
            warn!("{} timed out: {}", label, result.stderr);
        } else if result.is_failure() {
            warn!("{} failed: {}", label, result.stderr);
        }

        format::execution(&label, &self.summary(call), &result)
    }

    /// Calls that are answered without an external invocation
    async fn answer(&self, call: &ToolCall) -> Result<ToolResponse, DispatchError> {
        match call {
            ToolCall::Auth(AuthCall::Setup(service)) => Ok(self.auth_setup(*service)),
            ToolCall::Auth(AuthCall::Validate(service)) => Ok(self.auth_validate(*service)),
            ToolCall::Auth(AuthCall::Status) => Ok(self.auth_status()),
            ToolCall::Auth(AuthCall::Audit) => Ok(ToolResponse::success(self.auth.audit_all())),
            ToolCall::Extensions(ExtensionCall::List) => Ok(list_extensions()),
            ToolCall::Extensions(ExtensionCall::Validate(source)) => validate_manifest(source),
            ToolCall::Workflows(WorkflowCall::List) => Ok(list_workflows()),
            ToolCall::Workflows(WorkflowCall::Describe(workflow)) => Ok(self.describe_workflow(*workflow)),
            ToolCall::Workflows(WorkflowCall::Run(workflow)) => Ok(self.run_workflow(*workflow).await),
            ToolCall::App {
                action: AppAction::Status,
                app,
            } => Ok(self.app_status(app.as_deref())),
            other => Err(DispatchError::Execution(format!(
                "{} resolved to nothing to run",
                other.label()
            ))),
        }
    }

    fn summary(&self, call: &ToolCall) -> String {
        let app = |app: &Option<String>| {
            app.clone()
                .unwrap_or_else(|| self.resolver.app_name().to_string())
        };

        match call {
            ToolCall::Auth(AuthCall::Oauth(service)) => {
                format!("Opened the {} token page", service.display_name())
            }
            ToolCall::Extensions(ExtensionCall::Open(id)) => format!("Opened extension {}", id),
            ToolCall::Extensions(ExtensionCall::Search(query)) => {
                format!("Searched the Store for \"{}\"", query)
            }
            ToolCall::Extensions(ExtensionCall::Install(id)) => {
                format!("Opened {} in the Raycast Store", id)
            }
            ToolCall::Search { query, scope } => {
                format!("Searched {} for \"{}\"", scope.as_str(), query)
            }
            ToolCall::Shortcut(ShortcutCall::Named(Shortcut::ToggleRaycast)) => {
                format!("Activated {}", self.resolver.app_name())
            }
            ToolCall::Shortcut(ShortcutCall::Named(shortcut)) => format!("Opened {}", shortcut.as_str()),
            ToolCall::Shortcut(ShortcutCall::Keys(combo)) => format!("Pressed {}", combo),
            ToolCall::System { function, .. } => format!("Ran {}", function.as_str()),
            ToolCall::Clipboard(ClipboardCall::Copy(text)) => {
                format!("Copied {} characters to the clipboard", text.chars().count())
            }
            ToolCall::Clipboard(ClipboardCall::Read) => "Clipboard contents".to_string(),
            ToolCall::Clipboard(ClipboardCall::Clear) => "Cleared the clipboard".to_string(),
            ToolCall::Clipboard(ClipboardCall::History) => "Opened clipboard history".to_string(),
            ToolCall::Window { layout } => format!("Applied window layout {}", layout.as_str()),
            ToolCall::App { action, app: name } => match action {
                AppAction::Activate => format!("Activated {}", app(name)),
                AppAction::Quit => format!("Quit {}", app(name)),
                AppAction::Status => format!("Checked {}", app(name)),
            },
            other => other.label(),
        }
    }

    // =========================================================================
    // Auth
    // =========================================================================

    fn auth_setup(&self, service: Service) -> ToolResponse {
        let name = service.display_name();
        if self.auth.has_credential(service) {
            return format::success(format!(
                "{} credential is configured. Use the validate action to check it.",
                name
            ));
        }

        format::info(
            &format!("{} is not configured", name),
            &format!(
                "Set {} or add \"{}\": \"<token>\" to {}\nCreate a token at {}",
                service.env_var(),
                service.as_str(),
                self.credentials_file.display(),
                service.token_url()
            ),
        )
    }

    fn auth_validate(&self, service: Service) -> ToolResponse {
        let validation = self.auth.validate_credential(service);
        let name = service.display_name();

        if validation.valid {
            match validation.user {
                Some(user) => format::success(format!("{} credential is valid (user: {})", name, user)),
                None => format::success(format!("{} credential is valid", name)),
            }
        } else {
            let message = validation
                .error
                .unwrap_or_else(|| "credential rejected".to_string());
            format::failure(&format!("{} validation", name), &message)
        }
    }

    fn auth_status(&self) -> ToolResponse {
        let lines: Vec<String> = Service::all()
            .iter()
            .map(|service| {
                let (marker, state) = if self.auth.has_credential(*service) {
                    (format::SUCCESS, "configured")
                } else {
                    (format::FAILURE, "not configured")
                };
                format!("{} {}: {}", marker, service.display_name(), state)
            })
            .collect();

        format::info("Auth status", &lines.join("\n"))
    }

    // =========================================================================
    // Workflows
    // =========================================================================

    fn describe_workflow(&self, workflow: Workflow) -> ToolResponse {
        let steps: Vec<String> = workflow
            .steps(&self.resolver)
            .iter()
            .enumerate()
            .map(|(i, step)| format!("  {}. {}", i + 1, step.title))
            .collect();

        format::info(
            &format!("Workflow {}: {}", workflow.as_str(), workflow.description()),
            &steps.join("\n"),
        )
    }

    async fn run_workflow(&self, workflow: Workflow) -> ToolResponse {
        let label = format!("Workflow {}", workflow.as_str());
        let steps = workflow.steps(&self.resolver);
        let total = steps.len();
        let mut done = Vec::with_capacity(total);

        info!("Running workflow {} ({} steps)", workflow.as_str(), total);

        for (i, step) in steps.iter().enumerate() {
            let result = self.executor.execute(&step.descriptor).await;
            let position = format!("step {}/{} ({})", i + 1, total, step.title);

            if result.timed_out {
                warn!("{} timed out at {}", label, position);
                return format::timeout(&label, &format!("{}: {}", position, result.stderr.trim()));
            }
            if result.is_failure() {
                warn!("{} failed at {}", label, position);
                return format::failure(&label, &format!("{}: {}", position, result.stderr.trim()));
            }
            done.push(format!("  ✓ {}", step.title));
        }

        format::success(format!(
            "{} completed ({} steps)\n\n{}",
            label,
            total,
            done.join("\n")
        ))
    }

    // =========================================================================
    // Apps
    // =========================================================================

    fn app_status(&self, app: Option<&str>) -> ToolResponse {
        let app = app.unwrap_or(self.resolver.app_name());
        let pids = process::find_pids(app);

        if pids.is_empty() {
            format::info(&format!("{} is not running", app), "")
        } else {
            let pids: Vec<String> = pids.iter().map(|p| p.to_string()).collect();
            format::info(&format!("{} is running (pid {})", app, pids.join(", ")), "")
        }
    }
}

fn list_extensions() -> ToolResponse {
    let lines: Vec<String> = KnownExtension::all()
        .iter()
        .map(|e| format!("  {:<18} {}", e.as_str(), e.title()))
        .collect();
    format::info("Known extensions", &lines.join("\n"))
}

fn list_workflows() -> ToolResponse {
    let lines: Vec<String> = Workflow::all()
        .iter()
        .map(|w| format!("  {:<16} {}", w.as_str(), w.description()))
        .collect();
    format::info("Workflows", &lines.join("\n"))
}

fn validate_manifest(source: &ManifestSource) -> Result<ToolResponse, DispatchError> {
    let report = match source {
        ManifestSource::Inline(value) => manifest::check(value),
        ManifestSource::File(path) => manifest::check(&manifest::load(path)?),
    };

    if report.is_valid() {
        Ok(format::success(report.summary()))
    } else {
        Ok(format::failure("Manifest validation", &report.summary()))
    }
}
