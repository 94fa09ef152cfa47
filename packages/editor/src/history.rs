//! # History Stack
//!
//! Bounded undo/redo history over whole-state snapshots.
//!
//! ## Design
//!
//! - `record` appends a snapshot and discards any redo-able future
//! - Undo/redo move a pointer into the entry list; entries are never mutated
//! - Structurally equal snapshots are never recorded twice in a row, so
//!   re-renders and no-op interactions cannot pollute history
//! - After undo/redo, exactly one subsequent `record` call is suppressed:
//!   a reactive view layer re-reports the reverted state as if it were a new
//!   edit, and recording that echo would corrupt the redo tail

/// Default bound on stored snapshots.
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Bounded snapshot history with pointer-based undo/redo.
///
/// Generic over the snapshot type; the builder instantiates it with
/// `ContentTree`. Invariant: `pointer < entries.len()` and `entries` is never
/// empty.
#[derive(Debug, Clone)]
pub struct HistoryStack<T> {
    entries: Vec<T>,
    pointer: usize,
    suppress_next: bool,
    max_entries: usize,
}

impl<T: Clone + PartialEq> HistoryStack<T> {
    /// Single-entry stack holding `initial`, bounded to [`DEFAULT_MAX_ENTRIES`].
    pub fn new(initial: T) -> Self {
        Self::with_capacity(initial, DEFAULT_MAX_ENTRIES)
    }

    /// Single-entry stack with a custom bound (minimum 1).
    pub fn with_capacity(initial: T, max_entries: usize) -> Self {
        Self {
            entries: vec![initial],
            pointer: 0,
            suppress_next: false,
            max_entries: max_entries.max(1),
        }
    }

    /// The snapshot the pointer currently rests on.
    pub fn current(&self) -> &T {
        &self.entries[self.pointer]
    }

    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    pub fn can_redo(&self) -> bool {
        self.pointer + 1 < self.entries.len()
    }

    /// Number of stored snapshots.
    pub fn total_steps(&self) -> usize {
        self.entries.len()
    }

    /// Current pointer position.
    pub fn position(&self) -> usize {
        self.pointer
    }

    /// Record a new snapshot. Returns whether it was actually recorded.
    ///
    /// Skipped (returning `false`) when the one-shot suppression flag is
    /// armed, or when `snapshot` is structurally equal to the current entry.
    /// Otherwise the redo tail is truncated, the snapshot appended, and the
    /// oldest entries evicted past the bound with the pointer shifted so it
    /// still references the same logical snapshot.
    pub fn record(&mut self, snapshot: T) -> bool {
        if self.suppress_next {
            self.suppress_next = false;
            return false;
        }

        if snapshot == self.entries[self.pointer] {
            return false;
        }

        self.entries.truncate(self.pointer + 1);
        self.entries.push(snapshot);
        self.pointer = self.entries.len() - 1;

        while self.entries.len() > self.max_entries {
            self.entries.remove(0);
            self.pointer -= 1;
        }

        true
    }

    /// Step the pointer back. Arms suppression for the next `record`.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.pointer -= 1;
        self.suppress_next = true;
        true
    }

    /// Step the pointer forward. Arms suppression for the next `record`.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.pointer += 1;
        self.suppress_next = true;
        true
    }

    /// Replace the whole stack with a single-entry stack at `snapshot`.
    ///
    /// Used when loading a different entity into the same session or when a
    /// starting layout wholesale-replaces the document.
    pub fn reset(&mut self, snapshot: T) {
        self.entries = vec![snapshot];
        self.pointer = 0;
        self.suppress_next = false;
    }
}
