//! # Zone Reachability Sweep
//!
//! Prunes zone entries whose owning block is no longer present in the tree.
//!
//! Deleting a block from the top level (or from a parent zone) does not
//! cascade automatically, so its zones linger as orphans. The sweep is the
//! single place that removes them, and it must run before any persist so
//! unreachable subtrees never silently reach storage.

use crate::tree::{zone_owner, ContentTree};
use std::borrow::Cow;
use std::collections::BTreeSet;

/// Remove zones whose owner block id is unreachable from `tree.content`.
///
/// Returns `Cow::Borrowed` when nothing needed removal, so downstream
/// consumers can use that to decide whether the tree actually changed.
pub fn sweep(tree: &ContentTree) -> Cow<'_, ContentTree> {
    if tree.zones.is_empty() {
        return Cow::Borrowed(tree);
    }

    let reachable = reachable_ids(tree);

    if tree
        .zones
        .keys()
        .all(|key| reachable.contains(zone_owner(key)))
    {
        return Cow::Borrowed(tree);
    }

    let mut next = tree.clone();
    next.zones
        .retain(|key, _| reachable.contains(zone_owner(key)));
    Cow::Owned(next)
}

/// The set of block ids reachable from the top level.
///
/// Seeded with every id in `content` (the top level is always reachable),
/// then extended through zones of the form `owner:*`. The reachable set
/// doubles as the visited set, so a malformed tree containing a zone cycle
/// cannot loop the traversal.
pub fn reachable_ids(tree: &ContentTree) -> BTreeSet<String> {
    let mut reachable = BTreeSet::new();
    let mut worklist: Vec<&str> = Vec::new();

    for block in &tree.content {
        if let Some(id) = block.id() {
            if reachable.insert(id.to_string()) {
                worklist.push(id);
            }
        }
    }

    while let Some(owner) = worklist.pop() {
        let prefix = format!("{owner}:");
        for (key, blocks) in &tree.zones {
            if !key.starts_with(&prefix) {
                continue;
            }
            for block in blocks {
                if let Some(id) = block.id() {
                    if reachable.insert(id.to_string()) {
                        worklist.push(id);
                    }
                }
            }
        }
    }

    reachable
}
