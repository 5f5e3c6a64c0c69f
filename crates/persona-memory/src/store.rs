//! SQLite record store for user memories.
//!
//! Records are append-only: there is no update or delete path. Embeddings are
//! stored as BLOBs of little-endian `f32` values in the `embedding` column.

use crate::migration::run_migrations;
use chrono::{DateTime, SecondsFormat, Utc};
use persona_types::error::{PersonaError, PersonaResult};
use persona_types::memory::{MemoryId, MemoryRecord, MemoryType, NewMemoryRecord, RecordStore};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

const EMBEDDING_DIMENSIONS_KEY: &str = "embedding_dimensions";

/// Record store backed by a single SQLite connection.
#[derive(Clone)]
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// Create a new record store wrapping an already-migrated connection.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Open (or create) the database at `path` and bring its schema up to date.
    pub fn open(path: &Path) -> PersonaResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PersonaError::Persistence(format!(
                    "cannot create data directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        let conn = Connection::open(path).map_err(|e| PersonaError::Persistence(e.to_string()))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
            .map_err(|e| PersonaError::Persistence(e.to_string()))?;
        run_migrations(&conn).map_err(|e| PersonaError::Persistence(e.to_string()))?;
        info!(path = %path.display(), "Opened memory store");
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    /// Open a fresh in-memory database (tests and one-shot tooling).
    pub fn open_in_memory() -> PersonaResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| PersonaError::Persistence(e.to_string()))?;
        run_migrations(&conn).map_err(|e| PersonaError::Persistence(e.to_string()))?;
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    /// Pin the deployment's embedding width.
    ///
    /// The first call records `dimensions`; later calls fail with a config
    /// error if they disagree with the recorded value.
    pub fn ensure_embedding_dimensions(&self, dimensions: usize) -> PersonaResult<()> {
        let conn = self.lock()?;
        let existing = conn.query_row(
            "SELECT value FROM store_meta WHERE key = ?1",
            rusqlite::params![EMBEDDING_DIMENSIONS_KEY],
            |row| row.get::<_, String>(0),
        );
        match existing {
            Ok(value) => {
                let pinned: usize = value.parse().map_err(|_| {
                    PersonaError::Persistence(format!(
                        "corrupt {EMBEDDING_DIMENSIONS_KEY} value '{value}' in store_meta"
                    ))
                })?;
                if pinned != dimensions {
                    return Err(PersonaError::Config(format!(
                        "store was created with {pinned}-dimensional embeddings but the embedding provider is configured for {dimensions}"
                    )));
                }
                Ok(())
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                conn.execute(
                    "INSERT INTO store_meta (key, value) VALUES (?1, ?2)",
                    rusqlite::params![EMBEDDING_DIMENSIONS_KEY, dimensions.to_string()],
                )
                .map_err(|e| PersonaError::Persistence(e.to_string()))?;
                info!(dimensions, "Pinned embedding dimensions for this store");
                Ok(())
            }
            Err(e) => Err(PersonaError::Persistence(e.to_string())),
        }
    }

    fn lock(&self) -> PersonaResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| PersonaError::Internal(e.to_string()))
    }
}

impl RecordStore for SqliteRecordStore {
    fn insert(&self, record: NewMemoryRecord) -> PersonaResult<MemoryRecord> {
        let conn = self.lock()?;
        let created = record
            .created_at
            .to_rfc3339_opts(SecondsFormat::Micros, true);
        conn.execute(
            "INSERT INTO memories (user_id, type, content, embedding, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                record.user_id,
                record.memory_type.as_str(),
                record.content,
                embedding_to_bytes(&record.embedding),
                created,
            ],
        )
        .map_err(|e| PersonaError::Persistence(e.to_string()))?;
        let id = MemoryId(conn.last_insert_rowid());
        debug!(id = %id, user_id = %record.user_id, memory_type = %record.memory_type, "Inserted memory");

        Ok(MemoryRecord {
            id,
            user_id: record.user_id,
            memory_type: record.memory_type,
            content: record.content,
            embedding: record.embedding,
            created_at: record.created_at,
        })
    }

    fn list_by_user(&self, user_id: &str) -> PersonaResult<Vec<MemoryRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, type, content, embedding, created_at
                 FROM memories WHERE user_id = ?1 ORDER BY id ASC",
            )
            .map_err(|e| PersonaError::Persistence(e.to_string()))?;

        let rows = stmt
            .query_map(rusqlite::params![user_id], |row| {
                let id: i64 = row.get(0)?;
                let user_id: String = row.get(1)?;
                let type_str: String = row.get(2)?;
                let content: String = row.get(3)?;
                let embedding_bytes: Vec<u8> = row.get(4)?;
                let created_str: String = row.get(5)?;
                Ok((id, user_id, type_str, content, embedding_bytes, created_str))
            })
            .map_err(|e| PersonaError::Persistence(e.to_string()))?;

        let mut records = Vec::new();
        for row_result in rows {
            let (id, user_id, type_str, content, embedding_bytes, created_str) =
                row_result.map_err(|e| PersonaError::Persistence(e.to_string()))?;

            let memory_type = match type_str.parse::<MemoryType>() {
                Ok(t) => t,
                Err(_) => {
                    warn!(id, memory_type = %type_str, "Skipping memory with unrecognized type");
                    continue;
                }
            };
            let created_at = match DateTime::parse_from_rfc3339(&created_str) {
                Ok(dt) => dt.with_timezone(&Utc),
                Err(e) => {
                    warn!(id, error = %e, "Skipping memory with unparseable created_at");
                    continue;
                }
            };

            records.push(MemoryRecord {
                id: MemoryId(id),
                user_id,
                memory_type,
                content,
                embedding: embedding_from_bytes(&embedding_bytes),
                created_at,
            });
        }

        Ok(records)
    }

    fn count_by_user(&self, user_id: &str) -> PersonaResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM memories WHERE user_id = ?1",
                rusqlite::params![user_id],
                |row| row.get(0),
            )
            .map_err(|e| PersonaError::Persistence(e.to_string()))?;
        Ok(count as u64)
    }
}

/// Serialize embedding to bytes for SQLite BLOB storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &val in embedding {
        bytes.extend_from_slice(&val.to_le_bytes());
    }
    bytes
}

/// Deserialize embedding from bytes.
fn embedding_from_bytes(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
