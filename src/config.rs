use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use graph::git_backend::DEFAULT_EXCLUDED_REFS;

/// Settings read from an optional TOML file; command-line flags win over them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    /// Maximum number of commits to lay out
    pub max_count: Option<usize>,
    /// Ref prefixes whose commits stay out of the history
    pub exclude_refs: Vec<String>,
    /// Show the uncommitted-changes row even when there is nothing pending
    pub show_clean_working_directory: bool,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            max_count: Some(500),
            exclude_refs: DEFAULT_EXCLUDED_REFS.iter().map(|r| r.to_string()).collect(),
            show_clean_working_directory: false,
        }
    }
}

impl WorkbenchConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = WorkbenchConfig::parse("max_count = 20\n").unwrap();
        assert_eq!(
            config,
            WorkbenchConfig {
                max_count: Some(20),
                ..WorkbenchConfig::default()
            }
        );
    }

    #[test]
    fn parses_every_key() {
        let config = WorkbenchConfig::parse(
            r#"
            max_count = 5
            exclude_refs = ["refs/stash", "refs/notes"]
            show_clean_working_directory = true
            "#,
        )
        .unwrap();

        assert_eq!(config.max_count, Some(5));
        assert_eq!(config.exclude_refs, vec!["refs/stash", "refs/notes"]);
        assert!(config.show_clean_working_directory);
    }

    #[test]
    fn rejects_malformed_file() {
        assert!(WorkbenchConfig::parse("max_count = \"many\"").is_err());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("workbench.toml");
        std::fs::write(&path, "exclude_refs = []\n").unwrap();

        let config = WorkbenchConfig::load_or_default(Some(&path)).unwrap();
        assert!(config.exclude_refs.is_empty());
        assert_eq!(
            WorkbenchConfig::load_or_default(None).unwrap(),
            WorkbenchConfig::default()
        );
        assert!(WorkbenchConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
