//! Predefined workflows
//!
//! A workflow is a fixed, ordered list of non-destructive automation steps run
//! as one logical operation.

use crate::command::CommandDescriptor;
use crate::resolver::{KnownExtension, Resolver, Shortcut, SystemFunction, WindowLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Workflow {
    MorningRoutine,
    FocusMode,
    MeetingPrep,
    EndOfDay,
}

impl Workflow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MorningRoutine => "morning-routine",
            Self::FocusMode => "focus-mode",
            Self::MeetingPrep => "meeting-prep",
            Self::EndOfDay => "end-of-day",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|w| w.as_str() == s)
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::MorningRoutine,
            Self::FocusMode,
            Self::MeetingPrep,
            Self::EndOfDay,
        ]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::MorningRoutine => "Open Raycast, today's schedule and floating notes",
            Self::FocusMode => "Mute audio, maximize the front window and open floating notes",
            Self::MeetingPrep => "Unmute audio, open today's schedule and center the front window",
            Self::EndOfDay => "Review clipboard history and today's schedule, then mute audio",
        }
    }

    /// Ordered steps, resolved against the configured scheme and application
    pub fn steps(&self, resolver: &Resolver) -> Vec<WorkflowStep> {
        let schedule = || {
            WorkflowStep::new(
                "Open today's schedule",
                resolver.known_extension(KnownExtension::Calendar),
            )
        };
        let notes = || {
            WorkflowStep::new(
                "Open floating notes",
                resolver.known_extension(KnownExtension::FloatingNotes),
            )
        };

        match self {
            Self::MorningRoutine => vec![
                WorkflowStep::new("Activate Raycast", resolver.shortcut(Shortcut::ToggleRaycast)),
                schedule(),
                notes(),
            ],
            Self::FocusMode => vec![
                WorkflowStep::new("Mute audio", resolver.system(SystemFunction::Mute)),
                WorkflowStep::new("Maximize front window", resolver.window(WindowLayout::Maximize)),
                notes(),
            ],
            Self::MeetingPrep => vec![
                WorkflowStep::new("Unmute audio", resolver.system(SystemFunction::Unmute)),
                schedule(),
                WorkflowStep::new("Center front window", resolver.window(WindowLayout::Center)),
            ],
            Self::EndOfDay => vec![
                WorkflowStep::new(
                    "Open clipboard history",
                    resolver.shortcut(Shortcut::ClipboardHistory),
                ),
                schedule(),
                WorkflowStep::new("Mute audio", resolver.system(SystemFunction::Mute)),
            ],
        }
    }
}

/// One step of a workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowStep {
    pub title: &'static str,
    pub descriptor: CommandDescriptor,
}

impl WorkflowStep {
    fn new(title: &'static str, descriptor: CommandDescriptor) -> Self {
        Self { title, descriptor }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_names_roundtrip() {
        for workflow in Workflow::all() {
            assert_eq!(Workflow::from_str(workflow.as_str()), Some(*workflow));
        }
        assert_eq!(Workflow::from_str("Focus-Mode"), None);
    }

    #[test]
    fn test_workflows_never_need_confirmation() {
        let resolver = Resolver::default();
        for workflow in Workflow::all() {
            let steps = workflow.steps(&resolver);
            assert!(!steps.is_empty());
            assert!(steps.iter().all(|s| !s.descriptor.requires_confirmation));
        }
    }

    #[test]
    fn test_steps_follow_configured_scheme() {
        let resolver = Resolver::new("raycastinternal", "Raycast Beta");
        let steps = Workflow::MorningRoutine.steps(&resolver);
        assert_eq!(steps[0].descriptor.payload, "Raycast Beta");
        assert!(steps[1].descriptor.payload.starts_with("raycastinternal://"));
    }
}
