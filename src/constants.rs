//! Centralized constants used across the crate.
//!
//! This module contains magic numbers and configuration values that are used
//! in multiple places or would benefit from being named constants.

/// Maximum number of commands (base snapshot included) the history keeps active
pub const MAX_COMMANDS: usize = 256;

/// Smallest usable history: the base command plus one edit
pub const MIN_COMMANDS: usize = 2;

/// Side length of the blank canvas the demo binary uses when no image is given
pub const DEFAULT_CANVAS_SIZE: u32 = 256;

/// Name of the config file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.json";
