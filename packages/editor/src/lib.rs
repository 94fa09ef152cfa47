//! # Pagewright Editor
//!
//! In-memory editing state for the visual builder.
//!
//! ## Core Principles
//!
//! 1. **Snapshots, not inverses**: history stores whole-tree snapshots with a
//!    pointer; undo/redo are pointer moves and never mutate stored entries
//! 2. **The view layer echoes**: a reactive host re-reports the tree after a
//!    programmatic revert, so the stack suppresses exactly one record call
//!    after each undo/redo
//! 3. **Sessions own their state**: one [`EditSession`] exclusively owns its
//!    tree and history; persistence only ever borrows a snapshot
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagewright_editor::EditSession;
//! use pagewright_model::{Block, ContentTree};
//!
//! let mut session = EditSession::new();
//! let next = session
//!     .tree()
//!     .replace_top_level(vec![Block::new("Section", "a1")]);
//! session.apply_edit(next);
//!
//! session.undo();
//! assert!(session.can_redo());
//! ```

mod history;
mod metadata;
mod session;

pub use history::{HistoryStack, DEFAULT_MAX_ENTRIES};
pub use metadata::{slugify, LifecycleStatus, PageMetadata};
pub use session::EditSession;
