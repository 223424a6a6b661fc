//! Signature Store (spec §4.4): tiered cache of forced-404 signatures keyed
//! by normalized path. A small in-memory LRU front backed by a per-scan
//! SQLite cold tier, grounded on `forge-context`'s `fact_store.rs` (same
//! schema-on-open, `rusqlite::Connection` shape, manual hex/row mapping).

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use rusqlite::{Connection, OptionalExtension, params};
use s404_types::{DocType, FourOhFourResponse, NormalizedPath, Url};

use crate::errors::StoreError;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS signatures (
        normalized_path TEXT PRIMARY KEY,
        url TEXT NOT NULL,
        response_id INTEGER NOT NULL,
        code INTEGER NOT NULL,
        doc_type TEXT NOT NULL,
        body TEXT NOT NULL,
        diff TEXT
    )
";

struct Inner {
    /// Least-recently-used at the front.
    order: Vec<String>,
    hot: HashMap<String, FourOhFourResponse>,
    conn: Connection,
}

/// `MaxInMemory` hot entries plus an unbounded SQLite-backed cold tier,
/// scoped to one scan (spec §4.4, §6). Concurrent `get`/`put` are safe;
/// a `put` on the same key is last-writer-wins (spec §4.4, §5).
pub struct SignatureStore {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl SignatureStore {
    pub fn open(path: &Path, capacity: usize) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self::from_connection(conn, capacity))
    }

    /// For tests and scans that don't need a cold tier to survive process
    /// restarts — the cold tier is per-scan regardless (spec §3).
    pub fn open_in_memory(capacity: usize) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self::from_connection(conn, capacity))
    }

    fn from_connection(conn: Connection, capacity: usize) -> Self {
        Self { inner: Mutex::new(Inner { order: Vec::new(), hot: HashMap::new(), conn }), capacity }
    }

    /// Memory-tier lookup, falling through to disk and promoting on hit.
    /// Backend read failures are treated as misses (spec §7): logged and
    /// swallowed, never surfaced to the classifier.
    #[must_use]
    pub fn get(&self, key: &NormalizedPath) -> Option<FourOhFourResponse> {
        let key = key.as_str();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(sig) = inner.hot.get(key).cloned() {
            touch(&mut inner.order, key);
            return Some(sig);
        }

        match load_from_backend(&inner.conn, key) {
            Ok(Some(sig)) => {
                if let Err(e) = delete_from_backend(&inner.conn, key) {
                    tracing::warn!(error = %e, key, "failed to evict promoted signature from disk tier");
                }
                insert_hot(&mut inner, key.to_string(), sig.clone(), self.capacity);
                Some(sig)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, key, "signature store disk read failed, treating as miss");
                None
            }
        }
    }

    /// Idempotent overwrite (spec §4.4). Always lands in the hot tier;
    /// demotion to disk happens lazily, on the next insert that overflows
    /// capacity.
    pub fn put(&self, key: &NormalizedPath, signature: FourOhFourResponse) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        insert_hot(&mut inner, key.as_str().to_string(), signature, self.capacity);
    }

    /// Entries currently in the in-memory tier (spec §8: bounded by
    /// `MaxInMemory` at all times).
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).hot.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn touch(order: &mut Vec<String>, key: &str) {
    if let Some(pos) = order.iter().position(|k| k == key) {
        let k = order.remove(pos);
        order.push(k);
    }
}

fn insert_hot(inner: &mut Inner, key: String, signature: FourOhFourResponse, capacity: usize) {
    if inner.hot.contains_key(&key) {
        touch(&mut inner.order, &key);
        inner.hot.insert(key, signature);
        return;
    }

    if inner.hot.len() >= capacity
        && !inner.order.is_empty()
    {
        let evict_key = inner.order.remove(0);
        if let Some(evicted) = inner.hot.remove(&evict_key)
            && let Err(e) = persist_to_backend(&inner.conn, &evict_key, &evicted)
        {
            tracing::warn!(error = %e, key = evict_key, "failed to demote signature to disk tier");
        }
    }

    inner.order.push(key.clone());
    inner.hot.insert(key, signature);
}

fn persist_to_backend(conn: &Connection, key: &str, sig: &FourOhFourResponse) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO signatures (normalized_path, url, response_id, code, doc_type, body, diff)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(normalized_path) DO UPDATE SET
            url = excluded.url, response_id = excluded.response_id, code = excluded.code,
            doc_type = excluded.doc_type, body = excluded.body, diff = excluded.diff",
        params![key, sig.url.as_str(), sig.id as i64, i64::from(sig.code), sig.doc_type.as_str(), sig.body, sig.diff],
    )?;
    Ok(())
}

fn load_from_backend(conn: &Connection, key: &str) -> Result<Option<FourOhFourResponse>, StoreError> {
    let row = conn
        .query_row(
            "SELECT url, response_id, code, doc_type, body, diff FROM signatures WHERE normalized_path = ?1",
            params![key],
            |row| {
                let url: String = row.get(0)?;
                let id: i64 = row.get(1)?;
                let code: i64 = row.get(2)?;
                let doc_type: String = row.get(3)?;
                let body: String = row.get(4)?;
                let diff: Option<String> = row.get(5)?;
                Ok((url, id, code, doc_type, body, diff))
            },
        )
        .optional()?;

    let Some((url, id, code, doc_type, body, diff)) = row else {
        return Ok(None);
    };

    let Ok(url) = Url::parse(&url) else {
        return Ok(None);
    };
    let doc_type = doc_type.parse::<DocType>().unwrap_or(DocType::Binary);
    let normalized_path = url.normalized_path();

    let mut sig = FourOhFourResponse::new(url, id as u64, code as u16, doc_type, normalized_path, body);
    sig.diff = diff;
    Ok(Some(sig))
}

fn delete_from_backend(conn: &Connection, key: &str) -> Result<(), StoreError> {
    conn.execute("DELETE FROM signatures WHERE normalized_path = ?1", params![key])?;
    Ok(())
}
