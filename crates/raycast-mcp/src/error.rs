//! Dispatch errors
//!
//! Every variant renders the exact text returned to the caller.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Missing required field or unknown enumerated value
    #[error("{0}")]
    Validation(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Unknown action: {action}")]
    UnknownAction { tool: String, action: String },

    /// Failure while preparing or reading something outside the executor
    #[error("{0}")]
    Execution(String),
}

impl DispatchError {
    /// "<Field> parameter required for <purpose>"
    pub fn missing(field: &str, purpose: &str) -> Self {
        let mut chars = field.chars();
        let field = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        Self::Validation(format!("{} parameter required for {}", field, purpose))
    }

    /// "Unknown <category>: <value>"
    pub fn unknown(category: &str, value: &str) -> Self {
        Self::Validation(format!("Unknown {}: {}", category, value))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Rejected before any external invocation
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Execution(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            DispatchError::missing("service", "validation").to_string(),
            "Service parameter required for validation"
        );
        assert_eq!(
            DispatchError::unknown("shortcut", "teleport").to_string(),
            "Unknown shortcut: teleport"
        );
        assert_eq!(
            DispatchError::UnknownTool("nope".into()).to_string(),
            "Unknown tool: nope"
        );
        assert_eq!(
            DispatchError::UnknownAction {
                tool: "raycast_auth".into(),
                action: "revoke".into()
            }
            .to_string(),
            "Unknown action: revoke"
        );
    }

    #[test]
    fn test_rejection_classification() {
        assert!(DispatchError::invalid("x").is_rejection());
        assert!(!DispatchError::Execution("x".into()).is_rejection());
    }
}
