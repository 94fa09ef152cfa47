//! # Builder Controller
//!
//! Wires one edit session to the router, scheduler, and collaborators. This
//! is the orchestration layer behind the builder surface: it loads an entity
//! into the session, funnels view-layer changes through sweep and history,
//! and decides when writes happen.
//!
//! Tree mutations, sweeps, and history operations are synchronous and run to
//! completion; only the storage write awaits, and the scheduler's boolean
//! gate is the sole concurrency control around it.

use crate::collaborators::{Liveness, Notice, Notifier, PermissionGate};
use crate::router::{wire_timestamp, ContentRouter, EditorMode, RouterError, SaveOutcome, SaveRequest};
use crate::scheduler::{SaveScheduler, SaveState};
use crate::storage::{StorageClient, StorageError};
use pagewright_editor::{EditSession, LifecycleStatus, PageMetadata};
use pagewright_model::ContentTree;
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("content not found: {table}/{id}")]
    NotFound { table: String, id: String },

    #[error("permission denied for {0}")]
    Denied(&'static str),

    #[error("malformed stored content: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Orchestrates one editing session against one target entity.
pub struct BuilderController<S, P, N, L> {
    router: ContentRouter<S>,
    permissions: P,
    notifier: N,
    liveness: L,
    scheduler: SaveScheduler,
    session: EditSession,
    mode: EditorMode,
    tenant_id: String,
}

impl<S, P, N, L> BuilderController<S, P, N, L>
where
    S: StorageClient,
    P: PermissionGate,
    N: Notifier,
    L: Liveness,
{
    /// Controller over a fresh, empty session (creating a new entity).
    pub fn new(
        mode: EditorMode,
        tenant_id: impl Into<String>,
        storage: S,
        permissions: P,
        notifier: N,
        liveness: L,
    ) -> Self {
        Self {
            router: ContentRouter::new(storage),
            permissions,
            notifier,
            liveness,
            scheduler: SaveScheduler::new(),
            session: EditSession::new(),
            mode,
            tenant_id: tenant_id.into(),
        }
    }

    /// Override the autosave quiet period.
    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.scheduler = SaveScheduler::with_quiet_period(quiet_period);
        self
    }

    /// Fetch an existing entity and load it into the session.
    ///
    /// A missing row is surfaced to the user and returned as an error; there
    /// is nothing to edit, so the caller should tear the session down.
    pub async fn load_existing(&mut self, id: &str) -> Result<(), BuilderError> {
        let table = self.mode.table();
        let row = self.router.storage().fetch(table, id).await?;

        let Some(row) = row else {
            self.notifier
                .notify(Notice::error("Error", "Failed to load content."));
            return Err(BuilderError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            });
        };

        let tree = tree_from_row(self.mode, &row.fields)?;
        let metadata = metadata_from_row(self.mode, &row.fields);
        self.session.load(tree, metadata, Some(row.id));
        info!(mode = %self.mode, id, "loaded content into builder");
        Ok(())
    }

    /// Accept a candidate tree from the view layer.
    ///
    /// Sweeps orphaned zones, records history, and arms the autosave timer.
    /// Echoes of a programmatic revert and structural no-ops are dropped.
    pub fn handle_change(&mut self, candidate: ContentTree) -> bool {
        if self.session.apply_edit(candidate) {
            self.scheduler.note_edit(Instant::now());
            true
        } else {
            false
        }
    }

    pub fn undo(&mut self) -> bool {
        if self.session.undo() {
            self.scheduler.note_edit(Instant::now());
            true
        } else {
            false
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.session.redo() {
            self.scheduler.note_edit(Instant::now());
            true
        } else {
            false
        }
    }

    /// Edit metadata fields; any change dirties the session.
    pub fn update_metadata(&mut self, f: impl FnOnce(&mut PageMetadata)) {
        self.session.update_metadata(f);
        self.scheduler.note_edit(Instant::now());
    }

    /// Replace the document with a starting layout.
    pub fn apply_template(&mut self, tree: ContentTree) {
        self.session.apply_template(tree);
        self.scheduler.note_edit(Instant::now());
        self.notifier.notify(Notice::info(
            "Template applied",
            "The template has been applied.",
        ));
    }

    /// Manual save. Cancels any pending autosave timer.
    ///
    /// Returns `Ok(None)` when a save is already in flight; the request is
    /// ignored and the next cycle picks up the latest content.
    pub async fn save_now(&mut self) -> Result<Option<SaveOutcome>, BuilderError> {
        if !self.permissions.can_edit(self.mode) {
            self.notifier.notify(Notice::error(
                "Action Denied",
                "You do not have permission to save changes.",
            ));
            return Err(BuilderError::Denied("save"));
        }
        if !self.scheduler.begin_manual() {
            debug!("save already in flight, manual request ignored");
            return Ok(None);
        }
        self.perform_save(true).await.map(Some)
    }

    /// Poll the autosave timer; saves when the quiet period has elapsed.
    ///
    /// Fires at most once per armed deadline even if the caller polls more
    /// often than the deadline granularity.
    pub async fn maybe_autosave(&mut self, now: Instant) -> Result<Option<SaveOutcome>, BuilderError> {
        if !self.permissions.can_edit(self.mode) {
            return Ok(None);
        }
        if !self.scheduler.due(now) {
            return Ok(None);
        }
        self.perform_save(false).await.map(Some)
    }

    /// Publish the current tree: draft save, then the published copy.
    ///
    /// Page mode only. When the second write fails the draft has already
    /// landed and stays; the failure is surfaced for the user to retry.
    pub async fn publish(&mut self) -> Result<Option<SaveOutcome>, BuilderError> {
        if !self.permissions.can_publish(self.mode) {
            self.notifier.notify(Notice::error(
                "Action Denied",
                "You do not have permission to publish.",
            ));
            return Err(BuilderError::Denied("publish"));
        }
        if !self.scheduler.begin_manual() {
            debug!("save already in flight, publish request ignored");
            return Ok(None);
        }

        let offline = !self.liveness.is_online();
        let request = SaveRequest {
            mode: self.mode,
            target_id: self.session.target_id(),
            tree: self.session.tree(),
            metadata: self.session.metadata(),
            tenant_id: &self.tenant_id,
        };
        let result = self.router.publish(&request).await;

        match result {
            Ok(outcome) => {
                self.session.set_target_id(outcome.id.clone());
                self.session.update_metadata(|meta| {
                    meta.status = LifecycleStatus::Published;
                    meta.published_at = Some(outcome.saved_at.clone());
                });
                self.session.mark_saved(outcome.saved_at.clone());
                self.scheduler.complete(Instant::now(), true);
                self.notifier.notify(Notice::info(
                    "Published Successfully",
                    offline_qualified("Your page is now live.", offline),
                ));
                Ok(Some(outcome))
            }
            Err(RouterError::PublishFailed { source }) => {
                // The draft write landed; only the published copy failed.
                self.session.mark_saved(wire_timestamp());
                self.scheduler.complete(Instant::now(), true);
                warn!(error = %source, "publish write failed after draft save");
                self.notifier.notify(Notice::error(
                    "Publish Failed",
                    offline_qualified(&source.to_string(), offline),
                ));
                Err(RouterError::PublishFailed { source }.into())
            }
            Err(err) => {
                self.scheduler.complete(Instant::now(), false);
                self.notifier.notify(Notice::error(
                    "Publish Failed",
                    offline_qualified(&err.to_string(), offline),
                ));
                Err(err.into())
            }
        }
    }

    /// The single save path. Reads the session's current tree and metadata
    /// at this moment, not a value captured when the timer was scheduled.
    async fn perform_save(&mut self, manual: bool) -> Result<SaveOutcome, BuilderError> {
        let offline = !self.liveness.is_online();
        let request = SaveRequest {
            mode: self.mode,
            target_id: self.session.target_id(),
            tree: self.session.tree(),
            metadata: self.session.metadata(),
            tenant_id: &self.tenant_id,
        };
        let result = self.router.save(&request).await;

        match result {
            Ok(outcome) => {
                self.session.set_target_id(outcome.id.clone());
                self.session.mark_saved(outcome.saved_at.clone());
                self.scheduler.complete(Instant::now(), true);
                if manual {
                    let body = format!("{} saved successfully.", self.mode.label());
                    self.notifier
                        .notify(Notice::info("Saved", offline_qualified(&body, offline)));
                } else {
                    debug!(mode = %self.mode, offline, "autosaved");
                }
                Ok(outcome)
            }
            Err(err) => {
                // Dirty stays set so a later cycle retries; no retry here.
                self.scheduler.complete(Instant::now(), false);
                self.notifier.notify(Notice::error(
                    "Error",
                    offline_qualified(&err.to_string(), offline),
                ));
                Err(err.into())
            }
        }
    }
}

impl<S, P, N, L> BuilderController<S, P, N, L> {
    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn save_state(&self) -> SaveState {
        self.scheduler.state()
    }

    /// The storage collaborator behind the router.
    pub fn router_storage(&self) -> &S {
        self.router.storage()
    }
}

fn offline_qualified(body: &str, offline: bool) -> String {
    if offline {
        format!("{body} (offline)")
    } else {
        body.to_string()
    }
}

/// Pull the tree out of a stored row. A missing or null tree field loads as
/// an empty document.
fn tree_from_row(mode: EditorMode, fields: &Value) -> Result<ContentTree, BuilderError> {
    match fields.get(mode.content_field()) {
        None | Some(Value::Null) => Ok(ContentTree::new()),
        Some(value) => Ok(serde_json::from_value(value.clone())?),
    }
}

/// Map a stored row's columns into session metadata, per mode.
fn metadata_from_row(mode: EditorMode, fields: &Value) -> PageMetadata {
    match mode {
        EditorMode::Template => PageMetadata {
            title: str_field(fields, "name"),
            slug: str_field(fields, "slug"),
            meta_description: str_field(fields, "description"),
            category_id: None,
            status: if bool_field(fields, "is_active") {
                LifecycleStatus::Published
            } else {
                LifecycleStatus::Draft
            },
            published_at: None,
        },
        EditorMode::Part => PageMetadata {
            title: str_field(fields, "title"),
            slug: str_field(fields, "slug"),
            ..PageMetadata::default()
        },
        EditorMode::Page | EditorMode::Article => PageMetadata {
            title: str_field(fields, "title"),
            slug: str_field(fields, "slug"),
            meta_description: str_field(fields, "meta_description"),
            category_id: opt_str_field(fields, "category_id"),
            status: fields
                .get("status")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default(),
            published_at: opt_str_field(fields, "published_at"),
        },
    }
}

fn str_field(fields: &Value, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn opt_str_field(fields: &Value, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn bool_field(fields: &Value, key: &str) -> bool {
    fields.get(key).and_then(Value::as_bool).unwrap_or(false)
}
