//! Persisted view-state store
//!
//! A keyed repository of [`PersistedViewState`] records, one per table, over
//! an injected [`StorageBackend`]. Writes merge into the existing record rather
//! than replacing it, records expire after [`StoreConfig::retention`] and
//! unreadable records are treated as absent.
//!
//! # Example
//!
//! ```ignore
//! use datagrid_lib::store::{PersistedViewState, ViewStateStore};
//!
//! let store = ViewStateStore::in_memory();
//! let table = "characters".into();
//!
//! store.set(&table, PersistedViewState {
//!     column_order: Some(vec!["name".into(), "id".into()]),
//!     ..Default::default()
//! }).await?;
//!
//! let record = store.get(&table).await?;
//! ```

mod backend;
mod config;
mod memory;
mod record;
mod sqlite;

pub use backend::*;
pub use config::*;
pub use memory::*;
pub use record::*;
pub use sqlite::*;

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use log::debug;
use log::warn;
use serde::Deserialize;
use serde::Serialize;

use crate::column::TableId;
use crate::error::PersistenceError;

/// What is actually written to the backend.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    saved_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    state: PersistedViewState,
}

impl Envelope {
    fn new(state: PersistedViewState, retention: Option<std::time::Duration>) -> Self {
        let saved_at = Utc::now();
        let expires_at = retention
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .and_then(|ttl| saved_at.checked_add_signed(ttl));
        Self {
            saved_at,
            expires_at,
            state,
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }
}

/// Keyed repository of persisted view state, shared by every table.
///
/// Cheap to clone; clones share the backend. Two tables never touch the same
/// key, so no coordination between tables is needed.
#[derive(Clone)]
pub struct ViewStateStore {
    backend: Arc<dyn StorageBackend>,
    config: StoreConfig,
}

impl ViewStateStore {
    /// Creates a store over the given backend with default configuration.
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self::with_config(backend, StoreConfig::default())
    }

    /// Creates a store over the given backend.
    pub fn with_config(backend: impl StorageBackend + 'static, config: StoreConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            config,
        }
    }

    /// Creates a session-only store.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    fn key(&self, table_id: &TableId) -> String {
        format!("{}{}", self.config.key_prefix, table_id)
    }

    /// Reads the table's record.
    ///
    /// Returns `None` if nothing was stored, the record expired (it is deleted
    /// on the way) or the stored bytes cannot be decoded.
    pub async fn get(&self, table_id: &TableId) -> Result<Option<PersistedViewState>, PersistenceError> {
        let key = self.key(table_id);
        let Some(bytes) = self.backend.get_bytes(&key).await? else {
            return Ok(None);
        };

        let envelope: Envelope = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!("ignoring unreadable view state for table '{}': {}", table_id, err);
                return Ok(None);
            }
        };

        if envelope.is_expired() {
            debug!("view state for table '{}' expired", table_id);
            self.backend.delete(&key).await?;
            return Ok(None);
        }

        Ok(Some(envelope.state))
    }

    /// Merges `patch` into the table's record and returns the merged record.
    ///
    /// A missing (or expired) record is created from the patch alone.
    pub async fn set(
        &self,
        table_id: &TableId,
        patch: PersistedViewState,
    ) -> Result<PersistedViewState, PersistenceError> {
        let mut state = self.get(table_id).await?.unwrap_or_default();
        state.merge(patch);

        let envelope = Envelope::new(state, self.config.retention);
        let bytes = serde_json::to_vec(&envelope)?;
        self.backend.set_bytes(&self.key(table_id), bytes).await?;

        Ok(envelope.state)
    }

    /// Deletes every expired or unreadable record and returns how many went.
    pub async fn prune_expired(&self) -> Result<usize, PersistenceError> {
        let mut removed = 0;
        for key in self.backend.keys_with_prefix(&self.config.key_prefix).await? {
            let Some(bytes) = self.backend.get_bytes(&key).await? else {
                continue;
            };
            let stale = serde_json::from_slice::<Envelope>(&bytes)
                .map(|envelope| envelope.is_expired())
                .unwrap_or(true);
            if stale {
                self.backend.delete(&key).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
