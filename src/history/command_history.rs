//! Command history tracking the active prefix and the replay cursor.

use std::fmt;
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard, PoisonError};

use image::DynamicImage;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::canvas::{Canvas, blank_canvas, normalized_copy};
use crate::config::{CapacityPolicy, HistoryConfig};
use crate::constants::{MAX_COMMANDS, MIN_COMMANDS};
use crate::error::HistoryError;

use super::command::{Command, CommandSlot};
use super::commands::{BitmapCommand, ClearCommand};

/// Queue and cursors, only reachable through the history's lock
struct HistoryState {
    /// Slot 0 is always the base snapshot or the clear command
    queue: Vec<CommandSlot>,
    /// Length of the active prefix
    counter: usize,
    /// Next slot a replay pass reads
    index: usize,
}

impl HistoryState {
    fn seeded() -> Self {
        Self {
            queue: vec![CommandSlot::new(Box::new(ClearCommand))],
            counter: 1,
            index: 1,
        }
    }

    /// Merge slot 1 into a new base snapshot. Returns false when the base has
    /// no known canvas size.
    fn flatten_oldest(&mut self) -> bool {
        let Some((width, height)) = self.queue[0].command().snapshot_size() else {
            return false;
        };
        if self.queue.len() < 2 {
            return false;
        }

        let mut flattened = blank_canvas(width, height);
        self.queue[0].command().apply(&mut flattened);
        self.queue[1].command().apply(&mut flattened);

        let merged = self.queue.remove(1);
        debug!("Flattening {} into the base snapshot", merged.command().name());
        drop(merged);
        self.queue[0] = CommandSlot::new(Box::new(BitmapCommand::new(flattened)));

        self.counter -= 1;
        // The canvas has not seen the merged edit yet unless index was past it
        self.index = if self.index >= 2 { self.index - 1 } else { 0 };
        true
    }
}

/// A commit refused by the history.
///
/// The command was never taken over by the history and is handed back
/// through [`CommitError::into_command`].
#[derive(Error)]
#[error("{reason}")]
pub struct CommitError {
    reason: HistoryError,
    command: Box<dyn Command>,
}

impl CommitError {
    pub fn reason(&self) -> &HistoryError {
        &self.reason
    }

    pub fn into_command(self) -> Box<dyn Command> {
        self.command
    }
}

impl fmt::Debug for CommitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitError")
            .field("reason", &self.reason)
            .field("command", &self.command.name())
            .finish()
    }
}

/// Command handed out by [`CommandHistory::get_next_command`].
///
/// Holds the history's lock while alive, so the command cannot be released
/// underneath the caller. Drop it before calling into the history again from
/// the same thread.
pub struct NextCommand<'a> {
    state: MutexGuard<'a, HistoryState>,
    position: usize,
}

impl NextCommand<'_> {
    /// Queue slot the command was read from
    pub fn position(&self) -> usize {
        self.position
    }
}

impl Deref for NextCommand<'_> {
    type Target = dyn Command;

    fn deref(&self) -> &Self::Target {
        self.state.queue[self.position].command()
    }
}

/// Linear, capped history of canvas commands with undo/redo.
///
/// Every operation runs under one mutex, so a control thread issuing
/// undo/redo/commit and a render thread draining commands can share the
/// history behind an `Arc`.
pub struct CommandHistory {
    state: Mutex<HistoryState>,
    capacity: usize,
    capacity_policy: CapacityPolicy,
}

impl fmt::Debug for CommandHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("CommandHistory")
            .field("len", &state.queue.len())
            .field("counter", &state.counter)
            .field("index", &state.index)
            .field("capacity", &self.capacity)
            .field("capacity_policy", &self.capacity_policy)
            .finish()
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl CommandHistory {
    /// Create a history seeded with the clear command
    pub fn new(config: HistoryConfig) -> Self {
        let capacity = config.effective_max_commands();
        if capacity != config.max_commands {
            warn!(
                "max_commands {} is outside {}..={}, using {}",
                config.max_commands, MIN_COMMANDS, MAX_COMMANDS, capacity
            );
        }

        Self {
            state: Mutex::new(HistoryState::seeded()),
            capacity,
            capacity_policy: config.capacity_policy,
        }
    }

    // Every operation leaves the state consistent, so a poisoned lock is still usable
    fn lock(&self) -> MutexGuard<'_, HistoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace slot 0 with a snapshot of a private RGBA copy of `bitmap`.
    ///
    /// The previous base command is released. Fails without touching the
    /// history when the bitmap has no pixels.
    pub fn set_base_bitmap(&self, bitmap: &DynamicImage) -> Result<(), HistoryError> {
        let (width, height) = (bitmap.width(), bitmap.height());
        if width == 0 || height == 0 {
            return Err(HistoryError::InvalidBitmap { width, height });
        }

        let snapshot = normalized_copy(bitmap);
        let previous_name = self.replace_base(Box::new(BitmapCommand::new(snapshot)));

        info!(
            "Base bitmap set to {}x{} (replaced {})",
            width, height, previous_name
        );
        Ok(())
    }

    /// Swap `command` into slot 0, releasing the previous base command.
    /// Returns the previous base command's name.
    pub(super) fn replace_base(&self, command: Box<dyn Command>) -> &'static str {
        let mut state = self.lock();
        let previous = std::mem::replace(&mut state.queue[0], CommandSlot::new(command));
        let previous_name = previous.command().name();
        drop(previous);
        previous_name
    }

    /// Release every queued command and return to the freshly seeded state
    pub fn reset_and_clear(&self) {
        let mut state = self.lock();
        let released = state.queue.len();
        *state = HistoryState::seeded();
        info!("History reset, released {} commands", released);
    }

    /// Next command of the active prefix for a replay pass, or `None` once
    /// the pass reached the end of the prefix
    ///
    /// # Deadlocks
    ///
    /// The returned handle keeps the history locked until it is dropped.
    /// Calling any other method on this history from the same thread while
    /// holding it, `Debug` formatting included, deadlocks.
    pub fn get_next_command(&self) -> Option<NextCommand<'_>> {
        let mut state = self.lock();
        if state.index < state.counter {
            let position = state.index;
            state.index += 1;
            debug!(
                "Replaying {} (index {} -> {})",
                state.queue[position].command().name(),
                position,
                state.index
            );
            Some(NextCommand { state, position })
        } else {
            None
        }
    }

    /// Append `command` to the active branch.
    ///
    /// Commands beyond the active prefix (the redo branch) are discarded
    /// first, newest to oldest. At capacity the command is handed back in
    /// the error, unless the flatten policy can make room.
    pub fn commit_command(&self, command: Box<dyn Command>) -> Result<(), CommitError> {
        let mut state = self.lock();

        while state.queue.len() > state.counter {
            if let Some(discarded) = state.queue.pop() {
                debug!("Discarding redo entry {}", discarded.command().name());
            }
        }

        if state.counter >= self.capacity {
            let made_room = self.capacity_policy == CapacityPolicy::FlattenOldest
                && state.flatten_oldest();
            if !made_room {
                warn!(
                    "History full ({} commands), rejecting {}",
                    self.capacity,
                    command.name()
                );
                return Err(CommitError {
                    reason: HistoryError::HistoryFull {
                        capacity: self.capacity,
                    },
                    command,
                });
            }
        }

        debug!(
            "Committed {} (counter {} -> {})",
            command.name(),
            state.counter,
            state.counter + 1
        );
        state.counter += 1;
        state.queue.push(CommandSlot::new(command));
        Ok(())
    }

    /// Deactivate the newest command and force the next replay to start from
    /// the base. No-op when only the base is active.
    pub fn undo(&self) {
        let mut state = self.lock();
        if state.counter > 1 {
            state.counter -= 1;
            state.index = 0;
            debug!("Undo (counter {})", state.counter);
        }
    }

    /// Reactivate the next command of the redo branch. The replay cursor is
    /// placed on that command only, since the canvas already shows the prefix.
    pub fn redo(&self) {
        let mut state = self.lock();
        if state.counter < state.queue.len() {
            state.index = state.counter;
            state.counter += 1;
            debug!("Redo (counter {})", state.counter);
        }
    }

    /// Apply every pending command of the active prefix onto `canvas`.
    /// Returns how many commands were applied.
    pub fn redraw(&self, canvas: &mut Canvas) -> usize {
        let mut applied = 0;
        while let Some(command) = self.get_next_command() {
            command.apply(canvas);
            applied += 1;
        }
        applied
    }

    /// Length of the active prefix, base command included
    pub fn counter(&self) -> usize {
        self.lock().counter
    }

    /// Next slot a replay pass reads
    pub fn index(&self) -> usize {
        self.lock().index
    }

    /// Number of queued commands, redo branch included
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Always false: the base command is never removed
    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn can_undo(&self) -> bool {
        self.lock().counter > 1
    }

    pub fn can_redo(&self) -> bool {
        let state = self.lock();
        state.counter < state.queue.len()
    }

    pub fn is_full(&self) -> bool {
        self.lock().counter >= self.capacity
    }

    /// Name of the command in slot 0
    pub fn base_name(&self) -> &'static str {
        self.lock().queue[0].command().name()
    }
}
