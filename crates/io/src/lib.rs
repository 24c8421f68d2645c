// Workbook acquisition and result persistence

pub mod csv;
pub mod json;
pub mod snapshot;
pub mod xlsx;

pub use snapshot::{SnapshotError, SqliteSnapshotStore};
pub use xlsx::{extract_bytes, extract_path, CalamineSheet, XlsxWorkbook};
