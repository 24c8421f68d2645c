//! Persistence seam for extraction results.
//!
//! The core only defines the contract; `budgetgrid-io` ships the SQLite
//! implementation. A store keeps every saved result; `latest` returns the most
//! recently inserted one regardless of name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ExtractionResult;

/// Receipt for a stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub id: i64,
    pub name: String,
    pub stored_at: DateTime<Utc>,
}

/// A stored result plus its receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub info: SnapshotInfo,
    pub result: ExtractionResult,
}

pub trait SnapshotStore {
    type Error: std::error::Error;

    fn save(&mut self, name: &str, result: &ExtractionResult) -> Result<SnapshotInfo, Self::Error>;

    fn latest(&self) -> Result<Option<Snapshot>, Self::Error>;
}
