//! In-memory SQLite snapshot holding one slot's state.

use std::fmt;
use std::ptr::NonNull;

use rusqlite::serialize::OwnedData;
use rusqlite::{ffi, params, Connection, DatabaseName, OptionalExtension};

use crate::error::SaveError;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS game_data (
        key TEXT PRIMARY KEY,
        value_type TEXT NOT NULL,
        value TEXT NOT NULL
    );
";

/// Logical type recorded alongside each `game_data` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Int,
    Float,
    Bool,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(Self::String),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "bool" => Some(Self::Bool),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One slot's relational state: a `metadata` table and a `game_data` table.
pub struct Snapshot {
    conn: Connection,
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot").finish_non_exhaustive()
    }
}

impl Snapshot {
    /// Creates an empty snapshot with the slot schema.
    pub fn create() -> Result<Self, SaveError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Opens a snapshot from a serialized database image.
    ///
    /// # Arguments
    /// * `image` - Bytes produced by [`Snapshot::to_image`]
    /// * `read_only` - Open without write access
    ///
    /// # Returns
    /// `Result<Snapshot, SaveError>`; a `Database` error when the engine rejects the image.
    pub fn from_image(image: &[u8], read_only: bool) -> Result<Self, SaveError> {
        if image.is_empty() {
            return Err(SaveError::Truncated("empty database image".into()));
        }

        let mut conn = Connection::open_in_memory()?;
        conn.deserialize(DatabaseName::Main, sqlite_owned_copy(image)?, read_only)?;

        // Deserialization is lazy; reading the catalogue surfaces a corrupt image.
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })?;

        Ok(Self { conn })
    }

    /// Serializes the whole database to a byte image.
    pub fn to_image(&self) -> Result<Vec<u8>, SaveError> {
        let data = self.conn.serialize(DatabaseName::Main)?;
        Ok(data.to_vec())
    }

    pub fn execute_batch(&self, sql: &str) -> Result<(), SaveError> {
        self.conn.execute_batch(sql).map_err(|e| {
            tracing::error!("SQL error in '{}': {}", sql, e);
            SaveError::Database(e)
        })
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<(), SaveError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn metadata(&self, key: &str) -> Result<Option<String>, SaveError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM metadata WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Returns `(key, value)` rows of the metadata table restricted to `keys`.
    pub fn metadata_rows(&self, keys: &[&str]) -> Result<Vec<(String, String)>, SaveError> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM metadata")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut out = Vec::new();
        for row in rows {
            let (key, value): (String, String) = row?;
            if keys.contains(&key.as_str()) {
                out.push((key, value));
            }
        }
        Ok(out)
    }

    /// Upserts a `game_data` value.
    pub fn set_value(&self, key: &str, kind: ValueKind, value: &str) -> Result<(), SaveError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO game_data (key, value_type, value) VALUES (?1, ?2, ?3)",
            params![key, kind.as_str(), value],
        )?;
        Ok(())
    }

    /// Reads a `game_data` value regardless of its recorded type.
    pub fn value(&self, key: &str) -> Result<Option<String>, SaveError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM game_data WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn value_kind(&self, key: &str) -> Result<Option<ValueKind>, SaveError> {
        let kind: Option<String> = self
            .conn
            .query_row(
                "SELECT value_type FROM game_data WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(kind.as_deref().and_then(ValueKind::parse))
    }

    /// All `game_data` keys in ascending order.
    pub fn keys(&self) -> Result<Vec<String>, SaveError> {
        let mut stmt = self.conn.prepare("SELECT key FROM game_data ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

/// Copies `image` into memory owned by SQLite, as `sqlite3_deserialize` requires.
fn sqlite_owned_copy(image: &[u8]) -> Result<OwnedData, SaveError> {
    let len = image.len();
    // SAFETY: the allocation is checked for null and filled with exactly `len` bytes
    // before ownership moves to `OwnedData`, which frees it with `sqlite3_free`.
    unsafe {
        let ptr = ffi::sqlite3_malloc64(len as u64) as *mut u8;
        let ptr = NonNull::new(ptr).ok_or_else(|| {
            SaveError::Database(rusqlite::Error::SqliteFailure(
                ffi::Error::new(ffi::SQLITE_NOMEM),
                Some(format!("failed to allocate {} bytes for database image", len)),
            ))
        })?;
        std::ptr::copy_nonoverlapping(image.as_ptr(), ptr.as_ptr(), len);
        Ok(OwnedData::from_raw_nonnull(ptr, len))
    }
}
