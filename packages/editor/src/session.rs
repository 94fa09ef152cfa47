//! # Edit Session
//!
//! The transient, in-memory unit combining one content tree, one history
//! stack, one metadata record, a dirty flag, and the target entity identity.
//!
//! Created when the builder opens and discarded when it closes; never
//! persisted as a whole. Only its tree and metadata are written out, and the
//! persistence layer borrows those read-only at save time.

use crate::history::HistoryStack;
use crate::metadata::PageMetadata;
use pagewright_model::{sweep, ContentTree};

/// One open editing session.
#[derive(Debug, Clone)]
pub struct EditSession {
    tree: ContentTree,
    history: HistoryStack<ContentTree>,
    metadata: PageMetadata,
    dirty: bool,
    last_saved_at: Option<String>,
    target_id: Option<String>,
}

impl EditSession {
    /// Fresh session over an empty document (creating a new entity).
    pub fn new() -> Self {
        let tree = ContentTree::new();
        Self {
            history: HistoryStack::new(tree.clone()),
            tree,
            metadata: PageMetadata::default(),
            dirty: false,
            last_saved_at: None,
            target_id: None,
        }
    }

    /// Load an existing entity into this session.
    ///
    /// Replaces tree, metadata, and target identity; history restarts at the
    /// loaded snapshot and the session is clean.
    pub fn load(&mut self, tree: ContentTree, metadata: PageMetadata, target_id: Option<String>) {
        let tree = sweep(&tree).into_owned();
        self.history.reset(tree.clone());
        self.tree = tree;
        self.metadata = metadata;
        self.dirty = false;
        self.last_saved_at = None;
        self.target_id = target_id;
    }

    /// Accept a candidate tree from the view layer.
    ///
    /// The candidate is swept, then offered to history. Returns whether it
    /// was accepted as a genuine new edit; echoes of a programmatic revert
    /// and structural no-ops are rejected and leave the session untouched.
    pub fn apply_edit(&mut self, candidate: ContentTree) -> bool {
        let cleaned = sweep(&candidate).into_owned();
        if self.history.record(cleaned.clone()) {
            self.tree = cleaned;
            self.dirty = true;
            true
        } else {
            false
        }
    }

    /// Wholesale replacement with a starting layout.
    ///
    /// History restarts at the new snapshot (the previous document is not
    /// undo-reachable) and the session is marked dirty.
    pub fn apply_template(&mut self, tree: ContentTree) {
        let tree = sweep(&tree).into_owned();
        self.history.reset(tree.clone());
        self.tree = tree;
        self.dirty = true;
    }

    /// Mutate metadata through `f`; any metadata change dirties the session.
    pub fn update_metadata(&mut self, f: impl FnOnce(&mut PageMetadata)) {
        f(&mut self.metadata);
        self.dirty = true;
    }

    /// Step back in history and refresh the working tree.
    pub fn undo(&mut self) -> bool {
        if self.history.undo() {
            self.tree = self.history.current().clone();
            self.dirty = true;
            true
        } else {
            false
        }
    }

    /// Step forward in history and refresh the working tree.
    pub fn redo(&mut self) -> bool {
        if self.history.redo() {
            self.tree = self.history.current().clone();
            self.dirty = true;
            true
        } else {
            false
        }
    }

    /// A save of the current tree+metadata succeeded at `saved_at`.
    pub fn mark_saved(&mut self, saved_at: impl Into<String>) {
        self.dirty = false;
        self.last_saved_at = Some(saved_at.into());
    }

    /// Capture the id assigned by an insert so subsequent saves update.
    pub fn set_target_id(&mut self, id: impl Into<String>) {
        self.target_id = Some(id.into());
    }

    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    pub fn metadata(&self) -> &PageMetadata {
        &self.metadata
    }

    pub fn history(&self) -> &HistoryStack<ContentTree> {
        &self.history
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn last_saved_at(&self) -> Option<&str> {
        self.last_saved_at.as_deref()
    }

    pub fn target_id(&self) -> Option<&str> {
        self.target_id.as_deref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewright_model::{zone_key, Block};

    fn one_section(tree: &ContentTree) -> ContentTree {
        tree.replace_top_level(vec![Block::new("Section", "a1")])
    }

    #[test]
    fn test_basic_edit_history() {
        let mut session = EditSession::new();
        let tree1 = one_section(session.tree());

        assert!(session.apply_edit(tree1));
        assert_eq!(session.history().total_steps(), 2);
        assert_eq!(session.history().position(), 1);
        assert!(session.can_undo());
        assert!(!session.can_redo());
        assert!(session.is_dirty());
    }

    #[test]
    fn test_noop_edit_not_recorded() {
        let mut session = EditSession::new();
        let tree1 = one_section(session.tree());
        session.apply_edit(tree1.clone());

        assert!(!session.apply_edit(tree1));
        assert_eq!(session.history().total_steps(), 2);
    }

    #[test]
    fn test_edits_are_swept_before_recording() {
        let mut session = EditSession::new();
        let tree1 = one_section(session.tree())
            .set_zone_content(zone_key("a1", "content"), vec![Block::new("Text", "b1")]);
        session.apply_edit(tree1.clone());

        // Clear the top level; the candidate still carries a1's zone.
        let cleared = tree1.replace_top_level(vec![]);
        assert!(session.apply_edit(cleared));
        assert!(session.tree().zones.is_empty());
    }

    #[test]
    fn test_undo_refreshes_tree_and_swallows_echo() {
        let mut session = EditSession::new();
        let tree1 = one_section(session.tree());
        session.apply_edit(tree1.clone());

        assert!(session.undo());
        assert!(session.tree().is_empty());
        assert!(session.can_redo());

        // The reactive host re-reports the reverted tree; redo must survive.
        let echo = session.tree().clone();
        assert!(!session.apply_edit(echo));
        assert!(session.can_redo());

        assert!(session.redo());
        assert_eq!(session.tree(), &tree1);
        assert!(!session.can_redo());
    }

    #[test]
    fn test_load_resets_session() {
        let mut session = EditSession::new();
        session.apply_edit(one_section(session.tree()));

        let loaded_tree = one_section(&ContentTree::new());
        session.load(
            loaded_tree.clone(),
            PageMetadata::new("Landing"),
            Some("pg-1".to_string()),
        );

        assert_eq!(session.tree(), &loaded_tree);
        assert!(!session.is_dirty());
        assert!(!session.can_undo());
        assert_eq!(session.target_id(), Some("pg-1"));
        assert_eq!(session.metadata().title, "Landing");
    }

    #[test]
    fn test_apply_template_restarts_history_dirty() {
        let mut session = EditSession::new();
        session.apply_edit(one_section(session.tree()));

        let layout = ContentTree::new().replace_top_level(vec![Block::new("Hero", "h1")]);
        session.apply_template(layout.clone());

        assert_eq!(session.tree(), &layout);
        assert!(session.is_dirty());
        assert!(!session.can_undo());
    }

    #[test]
    fn test_metadata_change_dirties() {
        let mut session = EditSession::new();
        assert!(!session.is_dirty());

        session.update_metadata(|m| m.title = "New title".to_string());
        assert!(session.is_dirty());
        assert_eq!(session.metadata().title, "New title");
    }

    #[test]
    fn test_mark_saved_clears_dirty() {
        let mut session = EditSession::new();
        session.apply_edit(one_section(session.tree()));
        session.mark_saved("2026-08-30T12:00:00Z");

        assert!(!session.is_dirty());
        assert_eq!(session.last_saved_at(), Some("2026-08-30T12:00:00Z"));
    }
}
