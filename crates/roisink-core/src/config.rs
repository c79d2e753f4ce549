//! `config/camera_config.json` (spec.md §6). Unreadable or missing config
//! is a warn-and-proceed-with-defaults condition, never fatal.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error("could not parse {path} as JSON: {source}")]
    Parse { path: String, #[source] source: serde_json::Error },
}

#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    #[serde(rename = "MaxParallelTasks")]
    max_parallel_tasks: Option<usize>,
    #[serde(rename = "Timeout")]
    timeout_ms: Option<u64>,
    listen_host: Option<String>,
    camera_node_ip: Option<String>,
}

/// Resolved configuration, after defaults are applied. Unknown JSON keys
/// are ignored by `serde`'s default (non-`deny_unknown_fields`) behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub max_parallel_tasks: usize,
    pub timeout_ms: u64,
    pub listen_host: Option<String>,
    pub camera_node_ip: Option<String>,
}

impl Config {
    pub const DEFAULT_MAX_PARALLEL_TASKS: usize = 8;
    pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
    pub const DEFAULT_LISTEN_HOST: &'static str = "0.0.0.0";
    pub const DEFAULT_CAMERA_NODE_IP: &'static str = "192.168.0.176";

    /// Load and validate `path`, falling back to defaults field-by-field
    /// for anything absent. Returns `ConfigError` if `path` exists but
    /// can't be read or parsed — callers are expected to log it at `warn`
    /// and proceed with [`Config::default`] rather than treat it as fatal.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let path_display = path.display().to_string();
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path_display.clone(), source })?;
        let raw: RawConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse { path: path_display, source })?;

        Ok(Self {
            max_parallel_tasks: raw.max_parallel_tasks.unwrap_or(Self::DEFAULT_MAX_PARALLEL_TASKS),
            timeout_ms: raw.timeout_ms.unwrap_or(Self::DEFAULT_TIMEOUT_MS),
            listen_host: raw.listen_host,
            camera_node_ip: raw.camera_node_ip,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_parallel_tasks: Self::DEFAULT_MAX_PARALLEL_TASKS,
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            listen_host: None,
            camera_node_ip: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("camera_config.json");
        std::fs::write(&path, r#"{"MaxParallelTasks": 4, "SomeFutureKey": true}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.max_parallel_tasks, 4);
        assert_eq!(config.timeout_ms, Config::DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn missing_file_is_a_config_error_not_a_panic() {
        let err = Config::load(Path::new("/nonexistent/camera_config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("camera_config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(Config::load(&path).unwrap_err(), ConfigError::Parse { .. }));
    }
}
