use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::workout::Workout;

pub const DEFAULT_KEY: &str = "workouts";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stored workouts could not be read: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("workouts could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt(_))
    }
}

/// Key-value blob persistence
pub trait BlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Replace the blob under `key`. Either the new blob is stored or the
    /// previous one remains.
    fn set(&mut self, key: &str, blob: &str) -> Result<(), StoreError>;
    /// Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<B: BlobStore + ?Sized> BlobStore for Box<B> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, blob: &str) -> Result<(), StoreError> {
        (**self).set(key, blob)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// SQLite-backed blob store, one row per key
#[derive(Debug)]
pub struct SqliteBlobStore {
    conn: Connection,
}

impl SqliteBlobStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS blobs (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        Ok(Self { conn })
    }
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM blobs WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, blob: &str) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO blobs (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, blob, Local::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM blobs WHERE key = ?1", [key])?;
        Ok(())
    }
}

/// In-memory blob store. Can be switched to fail every call or only
/// writes, and counts writes so callers can check whether persistence was
/// attempted.
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, String>,
    unavailable: bool,
    read_only: bool,
    writes: usize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(key: &str, blob: &str) -> Self {
        let mut store = Self::default();
        store.blobs.insert(key.to_string(), blob.to_string());
        store
    }

    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// Reads keep working, `set` and `remove` fail.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Number of successful `set` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn contains(&self, key: &str) -> bool {
        self.blobs.contains_key(key)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable {
            Err(StoreError::Unavailable("memory store switched off".into()))
        } else {
            Ok(())
        }
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        self.check()?;
        if self.read_only {
            Err(StoreError::Unavailable("memory store is read-only".into()))
        } else {
            Ok(())
        }
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.blobs.get(key).cloned())
    }

    fn set(&mut self, key: &str, blob: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.blobs.insert(key.to_string(), blob.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.blobs.remove(key);
        Ok(())
    }
}

/// Encodes the workout log as one JSON blob under a fixed key
#[derive(Debug)]
pub struct WorkoutStore<S: BlobStore> {
    blobs: S,
    key: String,
}

impl<S: BlobStore> WorkoutStore<S> {
    pub fn new(blobs: S, key: impl Into<String>) -> Self {
        Self {
            blobs,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn blobs(&self) -> &S {
        &self.blobs
    }

    pub fn blobs_mut(&mut self) -> &mut S {
        &mut self.blobs
    }

    pub fn serialize(log: &[Workout]) -> Result<String, StoreError> {
        serde_json::to_string(log).map_err(StoreError::Encode)
    }

    /// All-or-nothing: one bad record rejects the whole blob.
    pub fn deserialize(blob: &str) -> Result<Vec<Workout>, StoreError> {
        serde_json::from_str(blob).map_err(StoreError::Corrupt)
    }

    /// Restore the persisted log. An absent blob is an empty log.
    pub fn load(&self) -> Result<Vec<Workout>, StoreError> {
        match self.blobs.get(&self.key)? {
            Some(blob) => {
                let log = Self::deserialize(&blob)?;
                debug!(key = %self.key, records = log.len(), "restored workout blob");
                Ok(log)
            }
            None => Ok(Vec::new()),
        }
    }

    pub fn save(&mut self, log: &[Workout]) -> Result<(), StoreError> {
        let blob = Self::serialize(log)?;
        self.blobs.set(&self.key, &blob).inspect_err(|e| {
            warn!(key = %self.key, error = %e, "failed to persist workouts");
        })
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.blobs.remove(&self.key)
    }
}
