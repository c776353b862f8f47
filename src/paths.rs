//! Where the history config and session logs live.
//!
//! Debug builds and `cargo run` use the working directory for both. Installed
//! builds use the user's config and data directories under `canvas-history/`.

use std::path::PathBuf;

use crate::constants::CONFIG_FILE_NAME;

const APP_DIR_NAME: &str = "canvas-history";

/// Debug build, or launched through cargo
pub fn is_dev_mode() -> bool {
    std::env::var("CARGO").is_ok() || cfg!(debug_assertions)
}

/// Directory holding `config.json`. Outside Linux this is the data directory.
pub fn config_dir() -> Option<PathBuf> {
    if is_dev_mode() {
        return Some(PathBuf::from("."));
    }

    #[cfg(target_os = "linux")]
    {
        dirs::config_dir().map(|p| p.join(APP_DIR_NAME))
    }

    #[cfg(not(target_os = "linux"))]
    {
        data_dir()
    }
}

/// Directory holding the `logs/` folder
pub fn data_dir() -> Option<PathBuf> {
    if is_dev_mode() {
        return Some(PathBuf::from("."));
    }

    dirs::data_dir().map(|p| p.join(APP_DIR_NAME))
}

/// Full path of the history config file
pub fn config_file() -> PathBuf {
    config_dir()
        .map(|p| p.join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// Directory the binary writes its session log into
pub fn logs_dir() -> PathBuf {
    data_dir()
        .map(|p| p.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Ensure the config and log directories exist.
pub fn ensure_directories() -> std::io::Result<()> {
    if is_dev_mode() {
        return Ok(());
    }

    if let Some(config) = config_dir() {
        std::fs::create_dir_all(&config)?;
    }
    std::fs::create_dir_all(logs_dir())?;
    Ok(())
}
