//! Generic document store on SQLite
//!
//! A flat `collection/key -> JSON value` table. Everything the bot persists
//! (ban lists, select-menu sessions, per-user exp) goes through this wrapper;
//! callers never see SQL.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Context as _, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlite::State;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    key        TEXT NOT NULL,
    value      TEXT NOT NULL,
    PRIMARY KEY (collection, key)
)";

/// Cheaply cloneable handle to the document store.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<sqlite::Connection>>,
}

impl Database {
    /// Open (or create) the store at `path` and ensure the schema exists.
    pub async fn new(path: &str) -> Result<Self> {
        Self::open(path)
    }

    /// Synchronous open, shared by `new` and the test constructor.
    pub fn open(path: &str) -> Result<Self> {
        let conn = sqlite::open(path)
            .map_err(|e| anyhow!("failed to open database at {path}: {e}"))?;
        conn.execute(SCHEMA)
            .map_err(|e| anyhow!("failed to create document table: {e}"))?;
        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Fresh in-memory store, used by tests.
    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    fn conn(&self) -> Result<MutexGuard<'_, sqlite::Connection>> {
        self.conn.lock().map_err(|_| anyhow!("database lock poisoned"))
    }

    /// Upsert a document.
    pub async fn set<T: Serialize>(&self, collection: &str, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .with_context(|| format!("failed to serialize document {collection}/{key}"))?;
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "INSERT INTO documents (collection, key, value) VALUES (?, ?, ?)
                 ON CONFLICT (collection, key) DO UPDATE SET value = excluded.value",
            )
            .map_err(|e| anyhow!("set: {e}"))?;
        stmt.bind((1, collection)).map_err(|e| anyhow!("set: {e}"))?;
        stmt.bind((2, key)).map_err(|e| anyhow!("set: {e}"))?;
        stmt.bind((3, json.as_str())).map_err(|e| anyhow!("set: {e}"))?;
        stmt.next().map_err(|e| anyhow!("set: {e}"))?;
        Ok(())
    }

    /// Fetch a single typed document. Documents that fail to deserialize are
    /// an error, not a silent `None`.
    pub async fn get_one<T: DeserializeOwned>(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<T>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT value FROM documents WHERE collection = ? AND key = ?")
            .map_err(|e| anyhow!("get_one: {e}"))?;
        stmt.bind((1, collection)).map_err(|e| anyhow!("get_one: {e}"))?;
        stmt.bind((2, key)).map_err(|e| anyhow!("get_one: {e}"))?;
        if let State::Row = stmt.next().map_err(|e| anyhow!("get_one: {e}"))? {
            let raw = stmt
                .read::<String, _>(0)
                .map_err(|e| anyhow!("get_one: {e}"))?;
            let value = serde_json::from_str(&raw)
                .with_context(|| format!("corrupt document {collection}/{key}"))?;
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    /// Fetch every document of a collection as `(key, value)` pairs.
    pub async fn get_all<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<(String, T)>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT key, value FROM documents WHERE collection = ? ORDER BY key")
            .map_err(|e| anyhow!("get_all: {e}"))?;
        stmt.bind((1, collection)).map_err(|e| anyhow!("get_all: {e}"))?;
        let mut rows = Vec::new();
        while let State::Row = stmt.next().map_err(|e| anyhow!("get_all: {e}"))? {
            let key = stmt
                .read::<String, _>(0)
                .map_err(|e| anyhow!("get_all: {e}"))?;
            let raw = stmt
                .read::<String, _>(1)
                .map_err(|e| anyhow!("get_all: {e}"))?;
            let value = serde_json::from_str(&raw)
                .with_context(|| format!("corrupt document {collection}/{key}"))?;
            rows.push((key, value));
        }
        Ok(rows)
    }

    /// Delete one document. Deleting a missing document is not an error.
    pub async fn delete(&self, collection: &str, key: &str) -> Result<()> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("DELETE FROM documents WHERE collection = ? AND key = ?")
            .map_err(|e| anyhow!("delete: {e}"))?;
        stmt.bind((1, collection)).map_err(|e| anyhow!("delete: {e}"))?;
        stmt.bind((2, key)).map_err(|e| anyhow!("delete: {e}"))?;
        stmt.next().map_err(|e| anyhow!("delete: {e}"))?;
        Ok(())
    }

    /// Delete an entire collection.
    pub async fn drop_collection(&self, collection: &str) -> Result<()> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("DELETE FROM documents WHERE collection = ?")
            .map_err(|e| anyhow!("drop_collection: {e}"))?;
        stmt.bind((1, collection)).map_err(|e| anyhow!("drop_collection: {e}"))?;
        stmt.next().map_err(|e| anyhow!("drop_collection: {e}"))?;
        Ok(())
    }
}
