//! # Block Kind Registry
//!
//! Maps kind names to descriptors (label, palette category, default props).
//!
//! The registry is looked up at block-construction time only. Tree, sweep,
//! and history code stay agnostic to it and operate on the generic
//! `{type, props}` shape.

use crate::tree::{Block, PropMap};
use serde_json::Value;
use std::collections::BTreeMap;

/// Descriptor for one block kind.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDescriptor {
    /// Human-readable name shown in the block palette.
    pub label: String,

    /// Palette grouping, e.g. `layout` or `content`.
    pub category: String,

    /// Props a freshly inserted block starts with.
    pub default_props: PropMap,
}

impl BlockDescriptor {
    pub fn new(label: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            category: category.into(),
            default_props: PropMap::new(),
        }
    }

    pub fn with_default(mut self, key: impl Into<String>, value: Value) -> Self {
        self.default_props.insert(key.into(), value);
        self
    }
}

/// Kind name → descriptor lookup.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    kinds: BTreeMap<String, BlockDescriptor>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind, replacing any previous descriptor under that name.
    pub fn register(&mut self, kind: impl Into<String>, descriptor: BlockDescriptor) {
        self.kinds.insert(kind.into(), descriptor);
    }

    pub fn get(&self, kind: &str) -> Option<&BlockDescriptor> {
        self.kinds.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Registered kind names in a stable order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    /// Build a block of `kind` seeded with the descriptor's default props.
    ///
    /// Returns `None` for unregistered kinds. The caller-assigned id is
    /// written into the props after the defaults, so a descriptor can never
    /// shadow it.
    pub fn instantiate(&self, kind: &str, id: impl Into<String>) -> Option<Block> {
        let descriptor = self.kinds.get(kind)?;
        let mut block = Block {
            kind: kind.to_string(),
            props: descriptor.default_props.clone(),
        };
        block
            .props
            .insert("id".to_string(), Value::String(id.into()));
        Some(block)
    }
}
