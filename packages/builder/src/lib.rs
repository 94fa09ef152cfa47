//! # Pagewright Builder
//!
//! Persistence side of the visual composition engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ editor: tree + history + session            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ builder: routing + scheduling               │
//! │  - ContentRouter: mode → storage contract   │
//! │  - SaveScheduler: dirty/quiet-period gate   │
//! │  - BuilderController: wires it all together │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ collaborators: storage, permissions,        │
//! │ notifications, liveness                     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Modes are disjoint**: each entity type has its own table and tree
//!    field; a payload never crosses into another mode's contract
//! 2. **The router is stateless**: create/update disambiguation comes from
//!    the caller-held target id, and tenant scope is an explicit parameter
//!    on every call, never ambient state
//! 3. **One save in flight**: a boolean gate, not a queue; edits accepted
//!    during a save become the next save's input

mod collaborators;
mod controller;
mod router;
mod scheduler;
mod storage;

pub use collaborators::{
    AllowAll, AlwaysOnline, Liveness, LogNotifier, Notice, NoticeLevel, Notifier, PermissionGate,
};
pub use controller::{BuilderController, BuilderError};
pub use router::{ContentRouter, EditorMode, RouterError, SaveOutcome, SaveRequest};
pub use scheduler::{SaveScheduler, SaveState, DEFAULT_QUIET_PERIOD};
pub use storage::{MemoryStorage, StorageClient, StorageError, StoredRow};
