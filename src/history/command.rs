//! Command trait and the owning slot that releases it.

use crate::canvas::Canvas;

/// An encapsulated, replayable canvas mutation.
///
/// Commands are immutable once committed: the history only ever replays them
/// through [`Command::apply`]. Large buffers a command owns are released through
/// [`Command::free_resources`], which the history invokes exactly once when the
/// command leaves the queue.
pub trait Command: Send {
    /// Replay this command's effect onto the canvas
    fn apply(&self, canvas: &mut Canvas);

    /// Release large owned buffers.
    ///
    /// Must tolerate being called on a command that was never applied.
    fn free_resources(&mut self) {}

    /// Short label used in log lines
    fn name(&self) -> &'static str;

    /// Size of the canvas this command fully defines on its own, if any.
    ///
    /// Only base snapshots report a size; the history uses it to flatten old
    /// commands into a new snapshot.
    fn snapshot_size(&self) -> Option<(u32, u32)> {
        None
    }
}

/// Queue entry owning a committed command.
///
/// Dropping the slot releases the command's resources, so every command that
/// leaves the queue is released exactly once.
pub(crate) struct CommandSlot {
    command: Box<dyn Command>,
}

impl CommandSlot {
    pub(crate) fn new(command: Box<dyn Command>) -> Self {
        Self { command }
    }

    pub(crate) fn command(&self) -> &(dyn Command + 'static) {
        self.command.as_ref()
    }
}

impl Drop for CommandSlot {
    fn drop(&mut self) {
        self.command.free_resources();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCommand {
        freed: Arc<AtomicUsize>,
    }

    impl Command for CountingCommand {
        fn apply(&self, _canvas: &mut Canvas) {}

        fn free_resources(&mut self) {
            self.freed.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[test]
    fn test_slot_releases_on_drop() {
        let freed = Arc::new(AtomicUsize::new(0));
        let slot = CommandSlot::new(Box::new(CountingCommand {
            freed: Arc::clone(&freed),
        }));
        assert_eq!(freed.load(Ordering::SeqCst), 0);

        drop(slot);
        assert_eq!(freed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_slot_exposes_command() {
        let freed = Arc::new(AtomicUsize::new(0));
        let slot = CommandSlot::new(Box::new(CountingCommand { freed }));
        assert_eq!(slot.command().name(), "counting");
        assert!(slot.command().snapshot_size().is_none());
    }
}
