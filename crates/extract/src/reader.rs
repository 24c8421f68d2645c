// Cell-reader capability.
//
// Both invocation contexts (file on disk, uploaded bytes) supply an adapter
// implementing these traits; the classifier/mapper/aggregator never see how
// the workbook was obtained.

use crate::cell::CellValue;
use crate::error::ExtractError;

/// Read-only access to one worksheet. Rows and columns are 1-indexed.
/// Reads outside the populated area return `CellValue::Empty` / `None`.
pub trait CellReader {
    fn value(&self, row: u32, col: u32) -> CellValue;

    /// Formula source behind the cell, if it has one. Never evaluated.
    fn formula(&self, row: u32, col: u32) -> Option<String>;

    /// Last populated row (0 for an empty sheet).
    fn max_row(&self) -> u32;

    /// Last populated column (0 for an empty sheet).
    fn max_column(&self) -> u32;
}

impl<R: CellReader + ?Sized> CellReader for &R {
    fn value(&self, row: u32, col: u32) -> CellValue {
        (**self).value(row, col)
    }

    fn formula(&self, row: u32, col: u32) -> Option<String> {
        (**self).formula(row, col)
    }

    fn max_row(&self) -> u32 {
        (**self).max_row()
    }

    fn max_column(&self) -> u32 {
        (**self).max_column()
    }
}

/// A workbook: a set of named sheets.
pub trait WorkbookSource {
    type Sheet: CellReader;

    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Open a sheet by exact name. `Ok(None)` when no such sheet exists.
    fn open_sheet(&mut self, name: &str) -> Result<Option<Self::Sheet>, ExtractError>;
}
