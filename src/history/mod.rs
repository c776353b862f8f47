//! Undo/Redo history for canvas edits.
//!
//! Every mutation applied to the canvas is recorded as a [`Command`] and kept in
//! a linear queue. Slot 0 always holds the base of the canvas: either a
//! [`BitmapCommand`] wrapping the history's private copy of the original
//! bitmap, or a [`ClearCommand`] for an empty canvas.
//!
//! ## Cursors
//!
//! - `counter` - length of the active prefix (the commands currently applied)
//! - `index` - next slot a replay pass reads through
//!   [`CommandHistory::get_next_command`]
//!
//! ```text
//! commit A, B, C          [base, A, B, C]   counter 4
//! undo x2                 [base, A, B, C]   counter 2, index 0
//! commit D                [base, A, D]      counter 3, B and C released
//! ```
//!
//! Undo forces a full replay from the base; redo only replays the reactivated
//! command on top of the canvas the caller already has.
//!
//! ## Module Structure
//!
//! - [`command`] - Command trait and the slot that releases commands
//! - [`commands`] - Clear, bitmap snapshot and stamp commands
//! - [`command_history`] - CommandHistory and its lock-guarded state

pub mod command;
pub mod command_history;
pub mod commands;


// Re-exports
pub use command::Command;
pub use command_history::{CommandHistory, CommitError, NextCommand};
pub use commands::{BitmapCommand, ClearCommand, StampCommand};
