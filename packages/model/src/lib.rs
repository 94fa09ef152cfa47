//! # Pagewright Model
//!
//! Canonical data shape for the visual composition engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: content tree + zones                 │
//! │  - Block: {type, props} with id in props    │
//! │  - ContentTree: top-level blocks + zone map │
//! │  - sweep: prune zones with unreachable owner│
//! │  - registry: kind → descriptor lookup       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: history + edit session              │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ builder: persistence routing + autosave     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Props are opaque**: the tree never interprets block props beyond the
//!    `id` key; each block kind owns its own prop shape
//! 2. **Producers return new trees**: tree operations are total and
//!    side-effect-free
//! 3. **Orphans are pruned, not errors**: a zone whose owner block is gone is
//!    silently dropped by the sweep before anything persists

mod registry;
mod sweep;
mod tree;

pub use registry::{BlockDescriptor, BlockRegistry};
pub use sweep::{reachable_ids, sweep};
pub use tree::{zone_key, zone_owner, Block, ContentTree, PropMap};
