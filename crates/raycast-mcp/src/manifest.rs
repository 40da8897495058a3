//! Shallow extension manifest checks
//!
//! Only field presence and the command modes are checked; nothing is built or
//! published.

use serde_json::Value;
use std::path::Path;

use crate::error::DispatchError;

const REQUIRED_STRINGS: &[&str] = &["name", "title", "description", "author"];
const COMMAND_STRINGS: &[&str] = &["name", "title"];
const COMMAND_MODES: &[&str] = &["view", "no-view", "menu-bar"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestReport {
    /// Manifest `name`, when present
    pub name: Option<String>,
    pub commands: usize,
    pub problems: Vec<String>,
}

impl ManifestReport {
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn summary(&self) -> String {
        let name = self.name.as_deref().unwrap_or("extension");
        if self.is_valid() {
            format!(
                "Manifest for {} is valid ({} command{})",
                name,
                self.commands,
                if self.commands == 1 { "" } else { "s" }
            )
        } else {
            let lines: Vec<String> = self.problems.iter().map(|p| format!("  - {}", p)).collect();
            format!(
                "Manifest for {} has {} problem{}:\n{}",
                name,
                self.problems.len(),
                if self.problems.len() == 1 { "" } else { "s" },
                lines.join("\n")
            )
        }
    }
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
}

pub fn check(manifest: &Value) -> ManifestReport {
    let mut problems = Vec::new();

    if !manifest.is_object() {
        return ManifestReport {
            name: None,
            commands: 0,
            problems: vec!["manifest must be a JSON object".to_string()],
        };
    }

    for key in REQUIRED_STRINGS {
        if non_empty_str(manifest, key).is_none() {
            problems.push(format!("missing or empty \"{}\"", key));
        }
    }
    if manifest.get("license").map_or(true, Value::is_null) {
        problems.push("missing \"license\"".to_string());
    }

    let commands: &[Value] = match manifest.get("commands").and_then(|v| v.as_array()) {
        Some(commands) if !commands.is_empty() => commands.as_slice(),
        _ => {
            problems.push("\"commands\" must be a non-empty array".to_string());
            &[]
        }
    };

    for (i, command) in commands.iter().enumerate() {
        let id = non_empty_str(command, "name")
            .map(|n| format!("command \"{}\"", n))
            .unwrap_or_else(|| format!("command #{}", i + 1));

        for key in COMMAND_STRINGS {
            if non_empty_str(command, key).is_none() {
                problems.push(format!("{}: missing or empty \"{}\"", id, key));
            }
        }
        match command.get("mode").and_then(|v| v.as_str()) {
            Some(mode) if COMMAND_MODES.contains(&mode) => {}
            Some(mode) => problems.push(format!(
                "{}: unknown mode \"{}\" (expected {})",
                id,
                mode,
                COMMAND_MODES.join(", ")
            )),
            None => problems.push(format!("{}: missing \"mode\"", id)),
        }
    }

    ManifestReport {
        name: non_empty_str(manifest, "name").map(str::to_string),
        commands: commands.len(),
        problems,
    }
}

/// Read a `package.json`; unreadable or malformed files are execution errors
pub fn load(path: &Path) -> Result<Value, DispatchError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        DispatchError::Execution(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        DispatchError::Execution(format!("Failed to parse {}: {}", path.display(), e))
    })
}
