//! SQLite storage backend with an in-memory read cache.

use std::path::Path;

use async_sqlite::Client;
use async_sqlite::ClientBuilder;
use async_sqlite::JournalMode;
use async_sqlite::rusqlite;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::StorageBackend;
use crate::error::PersistenceError;

/// A durable backend backed by SQLite.
///
/// View state survives process restarts. Reads are served from a DashMap
/// cache once a key has been seen; writes go to the database first and only
/// then update the cache, so the cache never holds a value the database
/// rejected.
///
/// # Example
///
/// ```ignore
/// use datagrid_lib::store::SqliteBackend;
///
/// // File-based
/// let backend = SqliteBackend::open("view-state.db").await?;
///
/// // In-memory (for testing)
/// let backend = SqliteBackend::open_in_memory().await?;
/// ```
pub struct SqliteBackend {
    client: Client,
    cache: DashMap<String, Vec<u8>>,
}

impl SqliteBackend {
    /// Opens the database at `path`, creating the file and table if needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let client = ClientBuilder::new()
            .path(path)
            .journal_mode(JournalMode::Wal)
            .open()
            .await?;

        Self::init_schema(&client).await?;

        Ok(Self {
            client,
            cache: DashMap::new(),
        })
    }

    /// Opens an in-memory database. Data is lost when the backend is dropped.
    pub async fn open_in_memory() -> Result<Self, PersistenceError> {
        let client = ClientBuilder::new().path(":memory:").open().await?;

        Self::init_schema(&client).await?;

        Ok(Self {
            client,
            cache: DashMap::new(),
        })
    }

    async fn init_schema(client: &Client) -> Result<(), PersistenceError> {
        client
            .conn(|conn| {
                conn.execute(
                    "CREATE TABLE IF NOT EXISTS view_state (
                        key TEXT PRIMARY KEY,
                        value BLOB NOT NULL,
                        updated_at INTEGER NOT NULL
                    )",
                    [],
                )
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for SqliteBackend {
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        if let Some(value) = self.cache.get(key) {
            return Ok(Some(value.clone()));
        }

        let key_owned = key.to_string();
        let result = self
            .client
            .conn(move |conn| {
                let mut stmt = conn.prepare("SELECT value FROM view_state WHERE key = ?")?;
                let mut rows = stmt.query([&key_owned])?;
                match rows.next()? {
                    Some(row) => Ok(Some(row.get::<_, Vec<u8>>(0)?)),
                    None => Ok(None),
                }
            })
            .await?;

        if let Some(ref value) = result {
            self.cache.insert(key.to_string(), value.clone());
        }

        Ok(result)
    }

    async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), PersistenceError> {
        let key_owned = key.to_string();
        let value_clone = value.clone();
        let updated_at = Utc::now().timestamp();

        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT INTO view_state (key, value, updated_at) VALUES (?, ?, ?)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                    rusqlite::params![&key_owned, &value_clone, updated_at],
                )
            })
            .await?;

        self.cache.insert(key.to_string(), value);

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), PersistenceError> {
        let key_owned = key.to_string();

        self.client
            .conn(move |conn| conn.execute("DELETE FROM view_state WHERE key = ?", [&key_owned]))
            .await?;

        self.cache.remove(key);

        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, PersistenceError> {
        // substr instead of LIKE: table ids may contain '%' or '_'.
        let prefix = prefix.to_string();
        let keys = self
            .client
            .conn(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT key FROM view_state WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
                )?;
                let rows = stmt.query_map([&prefix], |row| row.get(0))?;
                rows.collect::<Result<Vec<String>, _>>()
            })
            .await?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_and_delete() {
        let backend = SqliteBackend::open_in_memory().await.unwrap();
        backend.set_bytes("t:a", b"one".to_vec()).await.unwrap();
        backend.set_bytes("t:a", b"two".to_vec()).await.unwrap();

        assert_eq!(backend.get_bytes("t:a").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(backend.keys_with_prefix("t:").await.unwrap(), vec!["t:a".to_string()]);

        backend.delete("t:a").await.unwrap();
        assert_eq!(backend.get_bytes("t:a").await.unwrap(), None);
        assert!(backend.keys_with_prefix("t:").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prefix_is_literal() {
        let backend = SqliteBackend::open_in_memory().await.unwrap();
        backend.set_bytes("t_1:a", vec![1]).await.unwrap();
        backend.set_bytes("tx1:b", vec![2]).await.unwrap();

        assert_eq!(
            backend.keys_with_prefix("t_1:").await.unwrap(),
            vec!["t_1:a".to_string()]
        );
    }
}
