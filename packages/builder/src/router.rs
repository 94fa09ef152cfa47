//! # Persistence Router
//!
//! Maps {mode, target id, tree, metadata, tenant scope} onto exactly one
//! storage write.
//!
//! ## Routing table
//!
//! | mode     | table            | tree field        |
//! |----------|------------------|-------------------|
//! | page     | `pages`          | `content_draft`   |
//! | template | `templates`      | `data`            |
//! | part     | `template_parts` | `content`         |
//! | article  | `articles`       | `content`         |
//!
//! The rows of different modes share no discriminant column, so the router
//! must never write one mode's payload under another mode's contract.
//!
//! The router is stateless: an insert returns the assigned id and it is the
//! caller's job to carry it into subsequent saves. Tenant scope is an
//! explicit field on every request, never read from ambient state, so a
//! context swap mid-session cannot redirect a write.

use crate::storage::{StorageClient, StorageError};
use chrono::{SecondsFormat, Utc};
use pagewright_editor::PageMetadata;
use pagewright_model::ContentTree;
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Which backing entity type a session's tree is persisted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorMode {
    Page,
    Template,
    Part,
    Article,
}

impl EditorMode {
    pub const ALL: [EditorMode; 4] = [
        EditorMode::Page,
        EditorMode::Template,
        EditorMode::Part,
        EditorMode::Article,
    ];

    /// Storage table this mode writes to.
    pub fn table(self) -> &'static str {
        match self {
            EditorMode::Page => "pages",
            EditorMode::Template => "templates",
            EditorMode::Part => "template_parts",
            EditorMode::Article => "articles",
        }
    }

    /// Row field the serialized tree is written under.
    pub fn content_field(self) -> &'static str {
        match self {
            EditorMode::Page => "content_draft",
            EditorMode::Template => "data",
            EditorMode::Part | EditorMode::Article => "content",
        }
    }

    /// Only pages have a draft/published split with a second published copy.
    pub fn supports_publish(self) -> bool {
        matches!(self, EditorMode::Page)
    }

    /// Templates are opened from an existing row; saving one without a
    /// target id is routing misuse, not an insert.
    pub fn requires_existing_target(self) -> bool {
        matches!(self, EditorMode::Template)
    }

    /// Capitalized name for user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            EditorMode::Page => "Page",
            EditorMode::Template => "Template",
            EditorMode::Part => "Part",
            EditorMode::Article => "Article",
        }
    }
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditorMode::Page => "page",
            EditorMode::Template => "template",
            EditorMode::Part => "part",
            EditorMode::Article => "article",
        };
        f.write_str(name)
    }
}

/// Everything one save needs, borrowed from the session at execution time.
#[derive(Debug, Clone, Copy)]
pub struct SaveRequest<'a> {
    pub mode: EditorMode,
    /// Absent for a first save: the router inserts and the caller captures
    /// the assigned id.
    pub target_id: Option<&'a str>,
    pub tree: &'a ContentTree,
    pub metadata: &'a PageMetadata,
    /// Caller-supplied tenant scope, written on every row.
    pub tenant_id: &'a str,
}

/// Result of a routed write.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// Row id: the target id on update, the assigned id on insert.
    pub id: String,
    /// RFC 3339 timestamp written as `updated_at`.
    pub saved_at: String,
}

#[derive(Debug, Error)]
pub enum RouterError {
    /// Routing misuse: required identifying parameters are absent. No write
    /// is attempted.
    #[error("{0} save requires an existing target id")]
    MissingTarget(EditorMode),

    /// Publish requested for a mode without a published contract.
    #[error("publish is not supported for {0} content")]
    PublishUnsupported(EditorMode),

    #[error("failed to serialize content tree: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Storage failure, passed through verbatim. The caller keeps the dirty
    /// flag set; there is no retry here.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The draft write of a publish succeeded but the published copy failed.
    /// The draft is not rolled back.
    #[error("draft saved but publish write failed: {source}")]
    PublishFailed {
        #[source]
        source: StorageError,
    },
}

/// Stateless mapper from save requests to storage writes.
pub struct ContentRouter<S> {
    storage: S,
}

impl<S> ContentRouter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: StorageClient> ContentRouter<S> {
    /// Perform exactly one write for `request`.
    ///
    /// Insert when `target_id` is absent, update otherwise. The caller must
    /// capture `SaveOutcome::id` after an insert; the router remembers
    /// nothing between calls.
    pub async fn save(&self, request: &SaveRequest<'_>) -> Result<SaveOutcome, RouterError> {
        if request.mode.requires_existing_target() && request.target_id.is_none() {
            return Err(RouterError::MissingTarget(request.mode));
        }

        let saved_at = wire_timestamp();
        let row = build_row(request, &saved_at)?;
        let table = request.mode.table();

        let stored = match request.target_id {
            Some(id) => {
                debug!(mode = %request.mode, table, id, "routing update");
                self.storage.update(table, id, row).await?
            }
            None => {
                debug!(mode = %request.mode, table, "routing insert");
                self.storage.insert(table, row).await?
            }
        };

        Ok(SaveOutcome {
            id: stored.id,
            saved_at,
        })
    }

    /// Save the draft, then copy the tree into the published field and flip
    /// lifecycle status. Page mode only.
    ///
    /// Both writes are attempted in that order. When the second fails the
    /// draft write has already landed and is reported as such, not rolled
    /// back; retrying the publish is the caller's decision.
    pub async fn publish(&self, request: &SaveRequest<'_>) -> Result<SaveOutcome, RouterError> {
        if !request.mode.supports_publish() {
            return Err(RouterError::PublishUnsupported(request.mode));
        }
        let target = request
            .target_id
            .ok_or(RouterError::MissingTarget(request.mode))?;

        let draft = self.save(request).await?;

        let published_at = wire_timestamp();
        let row = json!({
            "status": "published",
            "content_published": serde_json::to_value(request.tree)?,
            "published_at": published_at,
        });

        match self.storage.update(request.mode.table(), target, row).await {
            Ok(_) => Ok(SaveOutcome {
                id: draft.id,
                saved_at: published_at,
            }),
            Err(source) => Err(RouterError::PublishFailed { source }),
        }
    }
}

pub(crate) fn wire_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build the mode-specific row. Field names follow each contract; only the
/// metadata meaningful for the contract is written.
fn build_row(request: &SaveRequest<'_>, saved_at: &str) -> Result<Value, RouterError> {
    let tree = serde_json::to_value(request.tree)?;
    let meta = request.metadata;

    let row = match request.mode {
        EditorMode::Page => json!({
            "content_draft": tree,
            "title": meta.title,
            "slug": meta.slug,
            "meta_description": meta.meta_description,
            "category_id": meta.category_id,
            "status": meta.status,
            "published_at": meta.published_at,
            "tenant_id": request.tenant_id,
            "updated_at": saved_at,
        }),
        EditorMode::Template => json!({
            "data": tree,
            "name": meta.title,
            "slug": meta.slug,
            "description": meta.meta_description,
            "is_active": meta.status.is_published(),
            "tenant_id": request.tenant_id,
            "updated_at": saved_at,
        }),
        EditorMode::Part => json!({
            "content": tree,
            "title": meta.title,
            "slug": meta.slug,
            "tenant_id": request.tenant_id,
            "updated_at": saved_at,
        }),
        EditorMode::Article => json!({
            "content": tree,
            "title": meta.title,
            "slug": meta.slug,
            "meta_description": meta.meta_description,
            "category_id": meta.category_id,
            "status": meta.status,
            "tenant_id": request.tenant_id,
            "updated_at": saved_at,
        }),
    };

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use pagewright_editor::LifecycleStatus;
    use pagewright_model::Block;
    use serde_json::json;

    fn sample_tree() -> ContentTree {
        ContentTree::new().replace_top_level(vec![Block::new("Section", "a1")])
    }

    fn request<'a>(
        mode: EditorMode,
        target_id: Option<&'a str>,
        tree: &'a ContentTree,
        metadata: &'a PageMetadata,
    ) -> SaveRequest<'a> {
        SaveRequest {
            mode,
            target_id,
            tree,
            metadata,
            tenant_id: "tenant-1",
        }
    }

    #[test]
    fn test_mode_contracts_are_disjoint() {
        for a in EditorMode::ALL {
            for b in EditorMode::ALL {
                if a != b {
                    assert_ne!(a.table(), b.table());
                }
            }
        }
    }

    #[tokio::test]
    async fn test_insert_then_update_routing() {
        let router = ContentRouter::new(MemoryStorage::new());
        let tree = sample_tree();
        let meta = PageMetadata::new("Breaking news");

        let first = router
            .save(&request(EditorMode::Article, None, &tree, &meta))
            .await
            .unwrap();
        assert_eq!(first.id, "articles-1");

        let second = router
            .save(&request(EditorMode::Article, Some(&first.id), &tree, &meta))
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(router.storage().row_count("articles"), 1);
    }

    #[tokio::test]
    async fn test_template_without_target_is_misuse() {
        let router = ContentRouter::new(MemoryStorage::new());
        let tree = sample_tree();
        let meta = PageMetadata::new("Header");

        let err = router
            .save(&request(EditorMode::Template, None, &tree, &meta))
            .await
            .unwrap_err();

        assert!(matches!(err, RouterError::MissingTarget(EditorMode::Template)));
        assert_eq!(router.storage().row_count("templates"), 0);
    }

    #[tokio::test]
    async fn test_page_row_shape() {
        let router = ContentRouter::new(MemoryStorage::new());
        let tree = sample_tree();
        let mut meta = PageMetadata::new("Landing");
        meta.category_id = Some("cat-7".to_string());

        let outcome = router
            .save(&request(EditorMode::Page, None, &tree, &meta))
            .await
            .unwrap();

        let row = router.storage().row("pages", &outcome.id).unwrap();
        assert_eq!(row["title"], json!("Landing"));
        assert_eq!(row["slug"], json!("landing"));
        assert_eq!(row["status"], json!("draft"));
        assert_eq!(row["category_id"], json!("cat-7"));
        assert_eq!(row["tenant_id"], json!("tenant-1"));
        assert_eq!(row["content_draft"]["content"][0]["type"], json!("Section"));
        assert!(row.get("content").is_none());
        assert!(row.get("data").is_none());
    }

    #[tokio::test]
    async fn test_template_row_maps_metadata() {
        let router = ContentRouter::new(MemoryStorage::new());
        router.storage().seed("templates", "tpl-1", json!({}));
        let tree = sample_tree();
        let mut meta = PageMetadata::new("Global Header");
        meta.status = LifecycleStatus::Published;

        router
            .save(&request(EditorMode::Template, Some("tpl-1"), &tree, &meta))
            .await
            .unwrap();

        let row = router.storage().row("templates", "tpl-1").unwrap();
        assert_eq!(row["name"], json!("Global Header"));
        assert_eq!(row["is_active"], json!(true));
        assert_eq!(row["data"]["content"][0]["props"]["id"], json!("a1"));
        // A template row never carries another mode's tree field.
        assert!(row.get("content_draft").is_none());
        assert!(row.get("published_at").is_none());
    }

    #[tokio::test]
    async fn test_storage_failure_passes_through() {
        let storage = MemoryStorage::new();
        storage.fail_next(StorageError::Unavailable("down".into()));
        let router = ContentRouter::new(storage);
        let tree = sample_tree();
        let meta = PageMetadata::new("Post");

        let err = router
            .save(&request(EditorMode::Article, None, &tree, &meta))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RouterError::Storage(StorageError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_publish_writes_draft_then_published_copy() {
        let router = ContentRouter::new(MemoryStorage::new());
        router.storage().seed("pages", "pg-1", json!({}));
        let tree = sample_tree();
        let meta = PageMetadata::new("Landing");

        router
            .publish(&request(EditorMode::Page, Some("pg-1"), &tree, &meta))
            .await
            .unwrap();

        let row = router.storage().row("pages", "pg-1").unwrap();
        assert_eq!(row["status"], json!("published"));
        assert_eq!(row["content_published"], row["content_draft"]);
        assert!(row["published_at"].is_string());
    }

    #[tokio::test]
    async fn test_publish_second_write_failure_keeps_draft() {
        let storage = MemoryStorage::new();
        storage.seed("pages", "pg-1", json!({}));
        let router = ContentRouter::new(storage);
        let tree = sample_tree();
        let meta = PageMetadata::new("Landing");

        // Let the draft write through, fail the published copy.
        router
            .storage()
            .fail_after(1, StorageError::Backend("constraint".into()));

        let err = router
            .publish(&request(EditorMode::Page, Some("pg-1"), &tree, &meta))
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::PublishFailed { .. }));

        // The draft write landed and stays; status never flipped.
        let row = router.storage().row("pages", "pg-1").unwrap();
        assert_eq!(row["content_draft"]["content"][0]["props"]["id"], json!("a1"));
        assert_eq!(row["status"], json!("draft"));
        assert!(row.get("content_published").is_none());
    }

    #[tokio::test]
    async fn test_publish_rejected_for_other_modes() {
        let router = ContentRouter::new(MemoryStorage::new());
        let tree = sample_tree();
        let meta = PageMetadata::new("Header");

        let err = router
            .publish(&request(EditorMode::Template, Some("tpl-1"), &tree, &meta))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RouterError::PublishUnsupported(EditorMode::Template)
        ));
    }
}
