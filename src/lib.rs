//! Command history engine for raster canvas editing.
//!
//! Every mutation applied to a canvas is recorded as a replayable [`Command`].
//! [`CommandHistory`] keeps them in a capped linear queue with undo/redo and a
//! replay cursor, and owns every committed command until it releases it.

pub mod canvas;
pub mod config;
pub mod constants;
pub mod error;
pub mod history;
pub mod paths;

// Re-export commonly used types for convenience
pub use canvas::Canvas;
pub use config::{CapacityPolicy, HistoryConfig};
pub use error::{ConfigError, HistoryError};
pub use history::{
    BitmapCommand, ClearCommand, Command, CommandHistory, CommitError, NextCommand, StampCommand,
};
