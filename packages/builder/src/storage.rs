//! # Storage Collaborator
//!
//! The external row store the router writes through. Each call is atomic on
//! its own; no transaction spans two calls.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Failures surfaced by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("row not found")]
    NotFound,

    /// The write matched no rows, typically a row-level policy rejection.
    #[error("write denied by storage policy")]
    Denied,

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A row as returned by the store after a read or write.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub id: String,
    pub fields: Value,
}

/// Row-store interface consumed by the router and controller.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Insert a new row, returning it with its assigned id.
    async fn insert(&self, table: &str, row: Value) -> Result<StoredRow, StorageError>;

    /// Update the row with `id`, merging `row` into its fields.
    async fn update(&self, table: &str, id: &str, row: Value) -> Result<StoredRow, StorageError>;

    /// Fetch a row by id. `Ok(None)` when the table has no such row.
    async fn fetch(&self, table: &str, id: &str) -> Result<Option<StoredRow>, StorageError>;
}

/// In-memory [`StorageClient`] used by the test suites.
///
/// Assigned ids are `{table}-{n}`. A single queued failure can be injected
/// to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    tables: HashMap<String, BTreeMap<String, Value>>,
    next_id: u64,
    /// Remaining calls to let through, then the error to return once.
    fail_plan: Option<(usize, StorageError)>,
}

impl MemoryInner {
    fn take_failure(&mut self) -> Option<StorageError> {
        match &mut self.fail_plan {
            Some((0, _)) => self.fail_plan.take().map(|(_, err)| err),
            Some((remaining, _)) => {
                *remaining -= 1;
                None
            }
            None => None,
        }
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The store holds plain data, so a panic while the lock was held cannot
    /// leave it half-written; recover rather than propagate the poison.
    fn state(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue an error for the next insert/update/fetch call.
    pub fn fail_next(&self, err: StorageError) {
        self.fail_after(0, err);
    }

    /// Let `skip` calls through, then fail the one after with `err`.
    pub fn fail_after(&self, skip: usize, err: StorageError) {
        self.state().fail_plan = Some((skip, err));
    }

    /// Pre-populate a row, for load tests.
    pub fn seed(&self, table: &str, id: &str, fields: Value) {
        self.state()
            .tables
            .entry(table.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    /// Current contents of a row, if present.
    pub fn row(&self, table: &str, id: &str) -> Option<Value> {
        self.state()
            .tables
            .get(table)
            .and_then(|rows| rows.get(id))
            .cloned()
    }

    /// Number of rows in a table.
    pub fn row_count(&self, table: &str) -> usize {
        self.state()
            .tables
            .get(table)
            .map_or(0, BTreeMap::len)
    }
}

fn merge_fields(existing: &mut Value, incoming: Value) {
    match (existing.as_object_mut(), incoming) {
        (Some(target), Value::Object(source)) => {
            for (key, value) in source {
                target.insert(key, value);
            }
        }
        (_, incoming) => *existing = incoming,
    }
}

#[async_trait]
impl StorageClient for MemoryStorage {
    async fn insert(&self, table: &str, row: Value) -> Result<StoredRow, StorageError> {
        let mut inner = self.state();
        if let Some(err) = inner.take_failure() {
            return Err(err);
        }
        inner.next_id += 1;
        let id = format!("{table}-{}", inner.next_id);
        inner
            .tables
            .entry(table.to_string())
            .or_default()
            .insert(id.clone(), row.clone());
        Ok(StoredRow { id, fields: row })
    }

    async fn update(&self, table: &str, id: &str, row: Value) -> Result<StoredRow, StorageError> {
        let mut inner = self.state();
        if let Some(err) = inner.take_failure() {
            return Err(err);
        }
        let fields = inner
            .tables
            .get_mut(table)
            .and_then(|rows| rows.get_mut(id))
            .ok_or(StorageError::NotFound)?;
        merge_fields(fields, row);
        Ok(StoredRow {
            id: id.to_string(),
            fields: fields.clone(),
        })
    }

    async fn fetch(&self, table: &str, id: &str) -> Result<Option<StoredRow>, StorageError> {
        let mut inner = self.state();
        if let Some(err) = inner.take_failure() {
            return Err(err);
        }
        Ok(inner
            .tables
            .get(table)
            .and_then(|rows| rows.get(id))
            .map(|fields| StoredRow {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }
}
