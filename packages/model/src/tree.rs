//! # Content Tree
//!
//! The document shape edited by the visual builder: an ordered top-level
//! sequence of blocks plus a map from zone key to ordered child sequences.
//!
//! ## Wire format
//!
//! ```json
//! {
//!   "root": { "props": { "title": "Home" } },
//!   "content": [ { "type": "Section", "props": { "id": "s1" } } ],
//!   "zones": { "s1:content": [ { "type": "Text", "props": { "id": "t1" } } ] }
//! }
//! ```
//!
//! The block id lives inside `props`, not as a sibling field. All zone and
//! reachability logic reads it from there via [`Block::id`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Opaque property bag carried by blocks and the document root.
pub type PropMap = Map<String, Value>;

/// A single node in the content tree.
///
/// `kind` selects which renderer/editor interprets `props`; this crate never
/// inspects `props` beyond the `id` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Kind tag, serialized as `type` on the wire.
    #[serde(rename = "type")]
    pub kind: String,

    /// Kind-specific props. Holds the block id under the `id` key.
    #[serde(default)]
    pub props: PropMap,
}

impl Block {
    /// Create a block of `kind` with the given caller-assigned id.
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        let mut props = PropMap::new();
        props.insert("id".to_string(), Value::String(id.into()));
        Self {
            kind: kind.into(),
            props,
        }
    }

    /// The block id, read from `props.id`.
    ///
    /// Returns `None` for malformed blocks that carry no id; such blocks can
    /// never own a zone.
    pub fn id(&self) -> Option<&str> {
        self.props.get("id").and_then(Value::as_str)
    }

    /// Builder-style prop assignment.
    pub fn with_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.props.insert(key.into(), value);
        self
    }
}

/// Build the zone key addressing `zone_name` owned by `owner_id`.
///
/// Zone keys follow the `ownerId:zoneName` convention.
pub fn zone_key(owner_id: &str, zone_name: &str) -> String {
    format!("{owner_id}:{zone_name}")
}

/// Extract the owner block id from a zone key.
pub fn zone_owner(key: &str) -> &str {
    key.split(':').next().unwrap_or(key)
}

/// The full document: root props, top-level blocks, and the zone map.
///
/// Invariant upheld by producers (not enforced here): block ids are unique
/// across the whole tree. Zones whose owner is unreachable from `content`
/// are orphaned and must be swept before persisting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentTree {
    /// Document-level props, serialized as `root` on the wire.
    #[serde(rename = "root", default)]
    pub root_props: PropMap,

    /// Ordered top-level block sequence.
    #[serde(default)]
    pub content: Vec<Block>,

    /// Zone key → ordered child blocks.
    #[serde(default)]
    pub zones: BTreeMap<String, Vec<Block>>,
}

impl ContentTree {
    /// An empty document: `{ content: [], root: {}, zones: {} }`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a new tree with `zones[key]` replaced.
    ///
    /// Does not validate that the owner block exists; orphan detection is the
    /// sweep's job.
    pub fn set_zone_content(&self, key: impl Into<String>, blocks: Vec<Block>) -> Self {
        let mut next = self.clone();
        next.zones.insert(key.into(), blocks);
        next
    }

    /// Return a new tree with the top-level sequence replaced.
    ///
    /// Removing a block here does not cascade into its zones; descendant
    /// zones become orphaned and are removed by the next sweep.
    pub fn replace_top_level(&self, blocks: Vec<Block>) -> Self {
        let mut next = self.clone();
        next.content = blocks;
        next
    }

    /// True when the tree holds no blocks at all.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.zones.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_id_lives_in_props() {
        let block = Block::new("Section", "s1");
        assert_eq!(block.id(), Some("s1"));
        assert_eq!(block.props.get("id"), Some(&json!("s1")));
    }

    #[test]
    fn test_block_without_id() {
        let block = Block {
            kind: "Text".to_string(),
            props: PropMap::new(),
        };
        assert_eq!(block.id(), None);
    }

    #[test]
    fn test_block_wire_format_uses_type_tag() {
        let block = Block::new("Hero", "h1").with_prop("title", json!("Welcome"));
        let wire = serde_json::to_value(&block).unwrap();
        assert_eq!(
            wire,
            json!({ "type": "Hero", "props": { "id": "h1", "title": "Welcome" } })
        );
    }

    #[test]
    fn test_zone_key_roundtrip() {
        let key = zone_key("s1", "content");
        assert_eq!(key, "s1:content");
        assert_eq!(zone_owner(&key), "s1");
    }

    #[test]
    fn test_zone_owner_of_bare_key() {
        assert_eq!(zone_owner("no-separator"), "no-separator");
    }

    #[test]
    fn test_set_zone_content_returns_new_tree() {
        let tree = ContentTree::new();
        let next = tree.set_zone_content(zone_key("s1", "content"), vec![Block::new("Text", "t1")]);

        assert!(tree.zones.is_empty());
        assert_eq!(next.zones["s1:content"].len(), 1);
    }

    #[test]
    fn test_replace_top_level_does_not_cascade() {
        let tree = ContentTree::new()
            .replace_top_level(vec![Block::new("Section", "s1")])
            .set_zone_content(zone_key("s1", "content"), vec![Block::new("Text", "t1")]);

        // Removing s1 leaves its zone in place; the sweep cleans it up later.
        let next = tree.replace_top_level(vec![]);
        assert!(next.content.is_empty());
        assert_eq!(next.zones.len(), 1);
    }

    #[test]
    fn test_tree_deserializes_with_missing_fields() {
        let tree: ContentTree = serde_json::from_value(json!({ "content": [] })).unwrap();
        assert!(tree.is_empty());
        assert!(tree.root_props.is_empty());
    }

    #[test]
    fn test_structural_equality_ignores_nothing() {
        let a = ContentTree::new().replace_top_level(vec![Block::new("Section", "s1")]);
        let b = ContentTree::new().replace_top_level(vec![Block::new("Section", "s1")]);
        assert_eq!(a, b);

        let c = b.replace_top_level(vec![Block::new("Section", "s2")]);
        assert_ne!(a, c);
    }
}
