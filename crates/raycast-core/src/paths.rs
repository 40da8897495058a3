//! Standard paths used by raycast-mcp

use std::path::PathBuf;

/// Standard raycast-mcp paths
#[derive(Debug, Clone)]
pub struct Paths {
    /// Data directory (~/.local/share/raycast-mcp)
    pub data: PathBuf,
    /// Config directory (~/.config/raycast-mcp)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("raycast-mcp");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("raycast-mcp");

        Self { data, config }
    }

    /// Main configuration file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }

    /// Default location of the `service -> token` credentials file
    pub fn credentials_file(&self) -> PathBuf {
        self.config.join("credentials.json")
    }

    /// Directory holding the daily confirmation logs
    pub fn history_dir(&self) -> PathBuf {
        self.data.join("history")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_under_their_dirs() {
        let paths = Paths::new();
        assert!(paths.config_file().starts_with(&paths.config));
        assert!(paths.credentials_file().starts_with(&paths.config));
        assert!(paths.history_dir().starts_with(&paths.data));
        assert!(paths.config.ends_with("raycast-mcp"));
    }
}
