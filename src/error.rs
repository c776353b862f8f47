//! Error types for the history engine and its config layer.

use thiserror::Error;

/// Errors reported by [`CommandHistory`](crate::history::CommandHistory) operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// The active prefix already holds the maximum number of commands
    #[error("command history is full ({capacity} commands)")]
    HistoryFull { capacity: usize },

    /// The base bitmap has no pixels to copy
    #[error("base bitmap is not readable ({width}x{height})")]
    InvalidBitmap { width: u32, height: u32 },
}

/// Errors reading or writing the history config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file is corrupted: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_full_message_names_capacity() {
        let err = HistoryError::HistoryFull { capacity: 256 };
        assert_eq!(err.to_string(), "command history is full (256 commands)");
    }

    #[test]
    fn test_invalid_bitmap_message_names_size() {
        let err = HistoryError::InvalidBitmap {
            width: 0,
            height: 12,
        };
        assert!(err.to_string().contains("0x12"));
    }

    #[test]
    fn test_config_error_from_parse_failure() {
        let parse = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err = ConfigError::from(parse);
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("config file is corrupted"));
    }
}
