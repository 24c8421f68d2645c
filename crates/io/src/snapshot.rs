// SQLite-backed snapshot store

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use budgetgrid_extract::snapshot::{Snapshot, SnapshotInfo, SnapshotStore};
use budgetgrid_extract::ExtractionResult;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS snapshots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    stored_at TEXT NOT NULL,      -- RFC 3339, UTC
    payload TEXT NOT NULL         -- ExtractionResult as JSON
);

CREATE INDEX IF NOT EXISTS idx_snapshots_name ON snapshots (name, id);
"#;

#[derive(Debug)]
pub enum SnapshotError {
    Sqlite(rusqlite::Error),
    Serialize(serde_json::Error),
    Io(std::io::Error),
    /// A stored row that cannot be read back.
    Corrupt(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite(e) => write!(f, "snapshot store: {}", e),
            Self::Serialize(e) => write!(f, "snapshot payload: {}", e),
            Self::Io(e) => write!(f, "snapshot store: {}", e),
            Self::Corrupt(msg) => write!(f, "corrupt snapshot: {}", msg),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<rusqlite::Error> for SnapshotError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Sqlite(e)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialize(e)
    }
}

impl From<std::io::Error> for SnapshotError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Append-only store of serialized results. The payload is opaque to SQL.
pub struct SqliteSnapshotStore {
    conn: Connection,
}

impl SqliteSnapshotStore {
    /// Open (or create) a store file, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, SnapshotError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        log::debug!("opening snapshot store {}", path.display());
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, SnapshotError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, SnapshotError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn count(&self) -> Result<usize, SnapshotError> {
        let n: i64 = self.conn.query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Most recent snapshot stored under `name`.
    pub fn latest_named(&self, name: &str) -> Result<Option<Snapshot>, SnapshotError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, stored_at, payload FROM snapshots WHERE name = ?1 ORDER BY id DESC LIMIT 1",
                params![name],
                read_row,
            )
            .optional()?;
        row.map(decode).transpose()
    }
}

type RawRow = (i64, String, String, String);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode((id, name, stored_at, payload): RawRow) -> Result<Snapshot, SnapshotError> {
    let stored_at = DateTime::parse_from_rfc3339(&stored_at)
        .map_err(|e| SnapshotError::Corrupt(format!("snapshot {}: bad timestamp '{}': {}", id, stored_at, e)))?
        .with_timezone(&Utc);
    let result: ExtractionResult = serde_json::from_str(&payload)?;
    Ok(Snapshot { info: SnapshotInfo { id, name, stored_at }, result })
}

impl SnapshotStore for SqliteSnapshotStore {
    type Error = SnapshotError;

    fn save(&mut self, name: &str, result: &ExtractionResult) -> Result<SnapshotInfo, SnapshotError> {
        let payload = serde_json::to_string(result)?;
        let stored_at = Utc::now();
        self.conn.execute(
            "INSERT INTO snapshots (name, stored_at, payload) VALUES (?1, ?2, ?3)",
            params![name, stored_at.to_rfc3339(), payload],
        )?;
        let id = self.conn.last_insert_rowid();
        log::debug!("stored snapshot {} '{}' ({} bytes)", id, name, payload.len());
        Ok(SnapshotInfo { id, name: name.to_string(), stored_at })
    }

    fn latest(&self) -> Result<Option<Snapshot>, SnapshotError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, stored_at, payload FROM snapshots ORDER BY id DESC LIMIT 1",
                [],
                read_row,
            )
            .optional()?;
        row.map(decode).transpose()
    }
}
