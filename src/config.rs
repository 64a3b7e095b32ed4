//! Editor-side configuration
//!
//! Loaded from a camelCase JSON file:
//!
//! ```json
//! {
//!   "schemaPath": "engine/schema.yaml",
//!   "defaultsPath": "engine/defaults.yaml",
//!   "outputDir": "content/components",
//!   "commit": { "batchWindowMs": 50 }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::commit::DirectoryCommitSink;
use crate::schema::FileSchemaProvider;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {message}")]
    IoError { path: String, message: String },

    #[error("Invalid configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Policy governing when queued commits are pushed to the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitPolicy {
    /// Edits arriving within this window (in millis) of the first queued
    /// edit are pushed together.
    pub batch_window_ms: u64,
}

impl Default for CommitPolicy {
    fn default() -> Self {
        Self {
            batch_window_ms: 50,
        }
    }
}

impl CommitPolicy {
    pub fn batch_window(&self) -> Duration {
        Duration::from_millis(self.batch_window_ms)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiggingConfig {
    pub schema_path: PathBuf,
    #[serde(default)]
    pub defaults_path: Option<PathBuf>,
    /// Where committed component documents are written, if anywhere.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub commit: CommitPolicy,
}

impl RiggingConfig {
    pub fn new<P: AsRef<Path>>(schema_path: P) -> Self {
        Self {
            schema_path: schema_path.as_ref().to_path_buf(),
            defaults_path: None,
            output_dir: None,
            commit: CommitPolicy::default(),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut config: RiggingConfig = serde_json::from_str(&text)?;

        // Relative paths are relative to the config file
        if let Some(base) = path.parent() {
            config.schema_path = base.join(&config.schema_path);
            config.defaults_path = config.defaults_path.map(|p| base.join(p));
            config.output_dir = config.output_dir.map(|p| base.join(p));
        }
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn schema_provider(&self) -> FileSchemaProvider {
        let provider = FileSchemaProvider::new(&self.schema_path);
        match &self.defaults_path {
            Some(defaults) => provider.with_defaults(defaults),
            None => provider,
        }
    }

    pub fn commit_sink(&self) -> Option<DirectoryCommitSink> {
        self.output_dir.as_ref().map(DirectoryCommitSink::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_commit_policy_default() {
        let policy = CommitPolicy::default();
        assert_eq!(policy.batch_window(), Duration::from_millis(50));
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("rigging.json");
        fs::write(
            &config_path,
            r#"{"schemaPath": "schema.yaml", "outputDir": "out", "commit": {"batchWindowMs": 10}}"#,
        )
        .unwrap();

        let config = RiggingConfig::load(&config_path).unwrap();
        assert_eq!(config.schema_path, temp_dir.path().join("schema.yaml"));
        assert_eq!(config.output_dir, Some(temp_dir.path().join("out")));
        assert_eq!(config.defaults_path, None);
        assert_eq!(config.commit.batch_window_ms, 10);
        assert!(config.commit_sink().is_some());
    }

    #[test]
    fn test_commit_section_is_optional() {
        let config: RiggingConfig = serde_json::from_str(r#"{"schemaPath": "s.yaml"}"#).unwrap();
        assert_eq!(config.commit, CommitPolicy::default());
        assert!(config.commit_sink().is_none());
    }

    #[test]
    fn test_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("rigging.json");
        fs::write(&config_path, "{ not json").unwrap();
        assert!(matches!(
            RiggingConfig::load(&config_path),
            Err(ConfigError::ParseError(_))
        ));
    }
}
