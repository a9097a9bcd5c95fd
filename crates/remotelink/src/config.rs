//! Configuration resolution for `rlink`.
//!
//! Values come from three sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. Project config (`rlink.json` in the working directory, or `--config`)
//! 3. CLI flags
//!
//! Every resolved value records its source.

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use remotelink_core::error::LinkError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// File name of the project config.
pub const CONFIG_FILE_NAME: &str = "rlink.json";

/// Snapshot path used when nothing else is configured.
pub const DEFAULT_SNAPSHOT: &str = "rlink-snapshot.json";

// ============================================================================
// Configuration Sources
// ============================================================================

/// Configuration value source (for precedence tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From `rlink.json`.
    ProjectConfig = 1,
    /// From CLI flag (highest precedence).
    CliFlag = 2,
}

/// A configuration value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue<T> {
    /// The actual value.
    pub value: T,
    /// Where the value came from.
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    /// Create a new config value with the given source.
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }

    /// Merge with another value, preferring higher precedence.
    pub fn merge(self, other: Self) -> Self {
        if other.source >= self.source {
            other
        } else {
            self
        }
    }
}

/// Response rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// One line per result.
    Text,
}

// ============================================================================
// Project Config
// ============================================================================

/// Errors reading the project config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON or has unknown keys.
    #[error("cannot parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<ConfigError> for LinkError {
    fn from(err: ConfigError) -> Self {
        LinkError::ConfigError {
            message: err.to_string(),
        }
    }
}

/// Contents of `rlink.json`.
///
/// ```json
/// { "snapshot": "build/model.json", "scope": ["src/**", "!**/gen/**"], "format": "text" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Snapshot path, relative to the config file.
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
    /// Default usage-search filter patterns.
    #[serde(default)]
    pub scope: Vec<String>,
    /// Default output format.
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

impl ProjectConfig {
    /// Read a config file.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ============================================================================
// Configuration Resolution
// ============================================================================

/// CLI configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// --snapshot flag.
    pub snapshot: Option<PathBuf>,
    /// --config flag.
    pub config: Option<PathBuf>,
    /// --format flag.
    pub format: Option<OutputFormat>,
    /// Filter patterns after `--`.
    pub scope: Vec<String>,
}

/// Resolved configuration with precedence information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Snapshot to load.
    pub snapshot: ConfigValue<PathBuf>,
    /// Output format.
    pub format: ConfigValue<OutputFormat>,
    /// Usage-search filter patterns (empty means no restriction).
    pub scope: ConfigValue<Vec<String>>,
    /// The project config file that was applied, if any.
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Resolve configuration from all sources.
    ///
    /// An explicit `--config` file must exist. Without one, `rlink.json` in
    /// `workspace_root` is applied when present.
    pub fn resolve(
        workspace_root: &Path,
        cli_overrides: &CliOverrides,
    ) -> Result<Self, ConfigError> {
        let mut config = ResolvedConfig::defaults(workspace_root);

        let config_path = match &cli_overrides.config {
            Some(path) => Some(path.clone()),
            None => {
                let path = workspace_root.join(CONFIG_FILE_NAME);
                path.is_file().then_some(path)
            }
        };
        if let Some(path) = config_path {
            let project = ProjectConfig::read(&path)?;
            let base = path.parent().unwrap_or(workspace_root).to_path_buf();
            config.apply_project_config(&project, &base);
            debug!(config = %path.display(), "applied project config");
            config.config_file = Some(path);
        }

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn defaults(workspace_root: &Path) -> Self {
        ResolvedConfig {
            snapshot: ConfigValue::new(
                workspace_root.join(DEFAULT_SNAPSHOT),
                ConfigSource::Default,
            ),
            format: ConfigValue::new(OutputFormat::default(), ConfigSource::Default),
            scope: ConfigValue::new(Vec::new(), ConfigSource::Default),
            config_file: None,
        }
    }

    fn apply_project_config(&mut self, project: &ProjectConfig, base: &Path) {
        if let Some(snapshot) = &project.snapshot {
            let snapshot = ConfigValue::new(base.join(snapshot), ConfigSource::ProjectConfig);
            self.snapshot = self.snapshot.clone().merge(snapshot);
        }
        if let Some(format) = project.format {
            self.format = self
                .format
                .clone()
                .merge(ConfigValue::new(format, ConfigSource::ProjectConfig));
        }
        if !project.scope.is_empty() {
            self.scope = self
                .scope
                .clone()
                .merge(ConfigValue::new(project.scope.clone(), ConfigSource::ProjectConfig));
        }
    }

    fn apply_cli_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(ref snapshot) = overrides.snapshot {
            self.snapshot = ConfigValue::new(snapshot.clone(), ConfigSource::CliFlag);
        }
        if let Some(format) = overrides.format {
            self.format = ConfigValue::new(format, ConfigSource::CliFlag);
        }
        if !overrides.scope.is_empty() {
            self.scope = ConfigValue::new(overrides.scope.clone(), ConfigSource::CliFlag);
        }
    }
}
