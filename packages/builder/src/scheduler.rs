//! # Autosave Scheduler
//!
//! Dirty-state machine per edit session: `Clean → Dirty → Saving → Clean`,
//! or back to `Dirty` on failure so the content gets resaved.
//!
//! ## Design
//!
//! - Every accepted edit (re)arms a quiet-period deadline
//! - `due` fires at most once per armed deadline, so timer jitter cannot
//!   start two saves
//! - One save in flight at a time, enforced by the state alone, not a queue;
//!   edits arriving mid-save are remembered and the session returns to
//!   `Dirty` on completion so the next cycle picks them up
//!
//! Callers pass `Instant`s in rather than the scheduler reading the clock,
//! which keeps the machine deterministic under test.

use std::time::{Duration, Instant};
use tracing::trace;

/// Quiet period between the last edit and an automatic save.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Clean,
    Dirty,
    Saving,
}

/// Per-session autosave gate.
#[derive(Debug)]
pub struct SaveScheduler {
    state: SaveState,
    quiet_period: Duration,
    deadline: Option<Instant>,
    edited_while_saving: bool,
}

impl SaveScheduler {
    pub fn new() -> Self {
        Self::with_quiet_period(DEFAULT_QUIET_PERIOD)
    }

    pub fn with_quiet_period(quiet_period: Duration) -> Self {
        Self {
            state: SaveState::Clean,
            quiet_period,
            deadline: None,
            edited_while_saving: false,
        }
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    /// The armed autosave deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// An edit was accepted at `now`.
    ///
    /// Transitions `Clean`/`Dirty` to `Dirty` and restarts the quiet-period
    /// deadline. During a save the edit is only noted; it becomes the next
    /// save's input once the in-flight one completes.
    pub fn note_edit(&mut self, now: Instant) {
        match self.state {
            SaveState::Saving => self.edited_while_saving = true,
            SaveState::Clean | SaveState::Dirty => {
                self.state = SaveState::Dirty;
                self.deadline = Some(now + self.quiet_period);
            }
        }
    }

    /// Poll the quiet-period timer.
    ///
    /// Returns `true` exactly once per elapsed deadline, transitioning to
    /// `Saving`; the caller must then perform the save and call
    /// [`complete`](Self::complete). Returns `false` while clean, still
    /// within the quiet period, or already saving.
    pub fn due(&mut self, now: Instant) -> bool {
        if self.state != SaveState::Dirty {
            return false;
        }
        match self.deadline {
            Some(deadline) if now >= deadline => {
                trace!("quiet period elapsed, starting autosave");
                self.state = SaveState::Saving;
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// A manual save was requested.
    ///
    /// Cancels any pending deadline and transitions to `Saving`. Returns
    /// `false` while a save is already in flight; the request is ignored and
    /// the next cycle picks up the latest content.
    pub fn begin_manual(&mut self) -> bool {
        if self.state == SaveState::Saving {
            return false;
        }
        self.state = SaveState::Saving;
        self.deadline = None;
        true
    }

    /// The in-flight save finished.
    ///
    /// Success returns to `Clean` unless edits arrived mid-save; failure (or
    /// mid-save edits) returns to `Dirty` with the deadline re-armed from
    /// `now`. Calling this without a save in flight is a no-op.
    pub fn complete(&mut self, now: Instant, success: bool) {
        if self.state != SaveState::Saving {
            return;
        }
        if success && !self.edited_while_saving {
            self.state = SaveState::Clean;
            self.deadline = None;
        } else {
            self.state = SaveState::Dirty;
            self.deadline = Some(now + self.quiet_period);
        }
        self.edited_while_saving = false;
    }
}

impl Default for SaveScheduler {
    fn default() -> Self {
        Self::new()
    }
}
