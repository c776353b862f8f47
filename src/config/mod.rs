use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::constants::{MAX_COMMANDS, MIN_COMMANDS};
use crate::error::ConfigError;

/// What a commit does when the active prefix is already at capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// Refuse the commit and hand the command back to the caller
    #[default]
    Reject,
    /// Merge the oldest edit into the base snapshot to make room.
    /// Falls back to rejecting while the base is the clear command.
    FlattenOldest,
}

/// History configuration persisted to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of active commands, base command included
    #[serde(default = "default_max_commands")]
    pub max_commands: usize,

    /// Behaviour of a commit once `max_commands` is reached
    #[serde(default)]
    pub capacity_policy: CapacityPolicy,
}

fn default_max_commands() -> usize {
    MAX_COMMANDS
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_commands: MAX_COMMANDS,
            capacity_policy: CapacityPolicy::default(),
        }
    }
}

impl HistoryConfig {
    pub fn new(max_commands: usize, capacity_policy: CapacityPolicy) -> Self {
        Self {
            max_commands,
            capacity_policy,
        }
    }

    /// `max_commands` clamped between the smallest usable history and `MAX_COMMANDS`
    pub fn effective_max_commands(&self) -> usize {
        self.max_commands.clamp(MIN_COMMANDS, MAX_COMMANDS)
    }
}

/// Result of loading config from disk
#[derive(Debug)]
pub struct LoadConfigResult {
    pub config: HistoryConfig,
    /// Error message if config was reset to defaults due to an error
    pub reset_reason: Option<String>,
}

/// Load configuration from the platform config file, falling back to defaults
pub fn load_config() -> LoadConfigResult {
    load_config_at(&crate::paths::config_file())
}

/// Load configuration from `path`, falling back to defaults on any error
pub fn load_config_at(path: &Path) -> LoadConfigResult {
    if !path.exists() {
        info!("No config file found, using defaults");
        return LoadConfigResult {
            config: HistoryConfig::default(),
            reset_reason: None,
        };
    }

    match load_config_from(path) {
        Ok(config) => {
            info!("Loaded config from {:?}", path);
            LoadConfigResult {
                config,
                reset_reason: None,
            }
        }
        Err(e) => {
            warn!("Failed to load config file: {}", e);
            LoadConfigResult {
                config: HistoryConfig::default(),
                reset_reason: Some(e.to_string()),
            }
        }
    }
}

/// Read and parse the config file at `path`
pub fn load_config_from(path: &Path) -> Result<HistoryConfig, ConfigError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Save configuration to `path` as pretty JSON
pub fn save_config(config: &HistoryConfig, path: &Path) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    info!("Config saved to {:?}", path);
    Ok(())
}
