//! Evaluation options and the optional `logix.yaml` project file
//!
//! ```yaml
//! eval:
//!   trace: false
//!   max_depth: 256
//! merge:
//!   dedup: true
//!   recursive: true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::merge::MergeOptions;

/// File name looked up when a directory is given
pub const CONFIG_FILE_NAME: &str = "logix.yaml";

/// Options for one evaluation call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvalOptions {
    /// Emit indented trace events through `tracing`
    #[serde(default)]
    pub trace: bool,

    /// Maximum nesting depth before evaluation gives up
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            trace: false,
            max_depth: default_max_depth(),
        }
    }
}

impl EvalOptions {
    /// Same options with tracing switched on or off
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

fn default_max_depth() -> usize {
    256
}

/// Contents of `logix.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogixConfig {
    /// Defaults for `evaluate`
    #[serde(default)]
    pub eval: EvalOptions,

    /// Defaults for standalone merges
    #[serde(default)]
    pub merge: MergeOptions,
}

impl LogixConfig {
    /// Load configuration from a directory or file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to a directory containing `logix.yaml`, or the file itself
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_path = if path.is_dir() {
            path.join(CONFIG_FILE_NAME)
        } else {
            path.to_path_buf()
        };

        if !config_path.exists() {
            return Err(Error::ConfigNotFound {
                path: config_path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(&config_path)?;
        Self::from_yaml_str(&contents)
    }

    /// Load `logix.yaml` from `dir` if present, otherwise defaults
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let config_path = dir.as_ref().join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load(config_path)
        } else {
            tracing::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, dir.as_ref().display());
            Ok(Self::default())
        }
    }

    /// Parse configuration text
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        // An empty file is a valid, all-defaults configuration
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: LogixConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.eval.max_depth == 0 {
            return Err(Error::ConfigInvalid {
                message: "eval.max_depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
