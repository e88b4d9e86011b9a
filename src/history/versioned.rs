use tracing::{debug, trace};

use super::buffer::HistoryBuffer;
use super::DEFAULT_CAPACITY;
use crate::error::{HistoryError, HistoryResult};

/// A value with commit/undo/redo semantics and an uncommitted "virtual" layer.
///
/// `current_state()` is what readers see. Committing (`set_state`,
/// `update_state`, `commit_virtual_state`) writes a new history entry right
/// after the cursor. Virtual updates only change what readers see, so a
/// multi-event gesture can be previewed and then committed as one step.
#[derive(Debug, Clone)]
pub struct VersionedState<T> {
    history: HistoryBuffer<T>,
    virtual_state: T,
    /// Logical index of the committed cursor
    index: usize,
    /// Logical index of the newest entry on the live branch
    head: usize,
    /// A virtual update is outstanding
    pending: bool,
}

impl<T: Clone> VersionedState<T> {
    /// Create a versioned state with the default history capacity
    pub fn new(initial: T) -> Self {
        Self::seeded(HistoryBuffer::seeded(DEFAULT_CAPACITY, initial.clone()), initial)
    }

    /// Create a versioned state keeping at most `capacity` entries
    pub fn with_capacity(initial: T, capacity: usize) -> HistoryResult<Self> {
        let history = HistoryBuffer::new(capacity, vec![initial.clone()])?;
        Ok(Self::seeded(history, initial))
    }

    fn seeded(history: HistoryBuffer<T>, initial: T) -> Self {
        Self {
            history,
            virtual_state: initial,
            index: 0,
            head: 0,
            pending: false,
        }
    }

    /// The value readers observe, including uncommitted virtual edits
    pub fn current_state(&self) -> &T {
        &self.virtual_state
    }

    /// The committed value under the cursor
    pub fn committed_state(&self) -> HistoryResult<&T> {
        self.history.get(self.index)
    }

    /// Commit `value` as a new history step, dropping any redo branch
    pub fn set_state(&mut self, value: T) -> HistoryResult<()> {
        let next = self.index + 1;
        let evicting = self.history.len() >= self.history.capacity()
            && self.history.last_index() == Some(self.index);
        self.history.set(next, value.clone())?;

        if evicting {
            debug!(
                start = ?self.history.start_index(),
                "oldest history entry evicted"
            );
        }

        self.index = next;
        self.head = next;
        self.virtual_state = value;
        self.pending = false;
        debug!(index = self.index, "state committed");
        Ok(())
    }

    /// Commit a value derived from the current (possibly virtual) state
    pub fn update_state<F>(&mut self, f: F) -> HistoryResult<()>
    where
        F: FnOnce(&T) -> T,
    {
        let value = f(&self.virtual_state);
        self.set_state(value)
    }

    /// Replace what readers see without touching history
    pub fn set_virtual_state(&mut self, value: T) {
        self.virtual_state = value;
        self.pending = true;
        trace!(index = self.index, "virtual state updated");
    }

    /// Derive a new virtual value from the current one
    pub fn update_virtual_state<F>(&mut self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let value = f(&self.virtual_state);
        self.set_virtual_state(value);
    }

    /// Commit whatever readers currently see as one history step
    pub fn commit_virtual_state(&mut self) -> HistoryResult<()> {
        self.set_state(self.virtual_state.clone())
    }

    /// Drop outstanding virtual edits, restoring the committed value
    pub fn discard_virtual_state(&mut self) -> HistoryResult<()> {
        self.virtual_state = self.committed_state()?.clone();
        if self.pending {
            debug!(index = self.index, "virtual state discarded");
        }
        self.pending = false;
        Ok(())
    }

    pub fn undo(&mut self) -> HistoryResult<()> {
        if !self.can_undo() {
            return Err(HistoryError::NothingToUndo);
        }
        self.index -= 1;
        self.virtual_state = self.history.get(self.index)?.clone();
        self.pending = false;
        debug!(index = self.index, "undo");
        Ok(())
    }

    pub fn redo(&mut self) -> HistoryResult<()> {
        if !self.can_redo() {
            return Err(HistoryError::NothingToRedo);
        }
        self.index = (self.index + 1).min(self.head);
        self.virtual_state = self.history.get(self.index)?.clone();
        self.pending = false;
        debug!(index = self.index, "redo");
        Ok(())
    }

    /// Throw away all history and start over from `initial`
    pub fn reset(&mut self, initial: T) {
        let capacity = self.history.capacity();
        *self = Self::seeded(HistoryBuffer::seeded(capacity, initial.clone()), initial);
        debug!(capacity, "history reset");
    }
}

impl<T> VersionedState<T> {
    pub fn can_undo(&self) -> bool {
        self.history
            .start_index()
            .is_some_and(|start| self.index > start)
    }

    pub fn can_redo(&self) -> bool {
        !self.is_latest_change() && self.index < self.history.len() - 1
    }

    /// No redo-able future exists beyond the cursor
    pub fn is_latest_change(&self) -> bool {
        self.index == self.head
    }

    /// A virtual edit is visible but not committed
    pub fn has_pending_changes(&self) -> bool {
        self.pending
    }

    /// Number of undo steps currently available
    pub fn undo_depth(&self) -> usize {
        self.history
            .start_index()
            .map_or(0, |start| self.index - start)
    }

    /// Number of redo steps currently available
    pub fn redo_depth(&self) -> usize {
        self.head - self.index
    }

    pub fn capacity(&self) -> usize {
        self.history.capacity()
    }

    /// Logical index of the committed cursor
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn history(&self) -> &HistoryBuffer<T> {
        &self.history
    }
}
