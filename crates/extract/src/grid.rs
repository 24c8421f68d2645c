use std::collections::HashMap;

use crate::cell::{normalize_formula, Cell, CellValue};
use crate::error::ExtractError;
use crate::reader::{CellReader, WorkbookSource};

/// Sparse in-memory worksheet. 1-indexed like the sheet it mirrors.
///
/// Any cell that has been set counts toward `max_row`/`max_column`, even when
/// its value is blank, matching how spreadsheet readers report dimensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    cells: HashMap<(u32, u32), Cell>,
    max_row: u32,
    max_col: u32,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, row: u32, col: u32, value: impl Into<CellValue>) -> &mut Self {
        self.insert(row, col, Cell::new(value))
    }

    pub fn set_formula(
        &mut self,
        row: u32,
        col: u32,
        value: impl Into<CellValue>,
        formula: &str,
    ) -> &mut Self {
        self.insert(row, col, Cell::with_formula(value, formula))
    }

    /// Write consecutive values across a row starting at `first_col`.
    pub fn set_row<V: Into<CellValue>>(
        &mut self,
        row: u32,
        first_col: u32,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        for (offset, value) in values.into_iter().enumerate() {
            self.set(row, first_col + offset as u32, value);
        }
        self
    }

    pub fn insert(&mut self, row: u32, col: u32, cell: Cell) -> &mut Self {
        if row == 0 || col == 0 {
            return self;
        }
        self.max_row = self.max_row.max(row);
        self.max_col = self.max_col.max(col);
        self.cells.insert((row, col), cell);
        self
    }

    pub fn get(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

}

impl CellReader for Grid {
    fn value(&self, row: u32, col: u32) -> CellValue {
        self.get(row, col).map(|c| c.value.clone()).unwrap_or_default()
    }

    fn formula(&self, row: u32, col: u32) -> Option<String> {
        self.get(row, col)
            .and_then(|c| c.formula.as_deref())
            .filter(|f| !f.is_empty())
            .map(normalize_formula)
    }

    fn max_row(&self) -> u32 {
        self.max_row
    }

    fn max_column(&self) -> u32 {
        self.max_col
    }
}

/// Named grids in workbook order.
#[derive(Debug, Clone, Default)]
pub struct GridWorkbook {
    sheets: Vec<(String, Grid)>,
}

impl GridWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: impl Into<String>, grid: Grid) -> Self {
        self.add_sheet(name, grid);
        self
    }

    /// Add a sheet, replacing any existing sheet with the same name.
    pub fn add_sheet(&mut self, name: impl Into<String>, grid: Grid) {
        let name = name.into();
        if let Some(slot) = self.sheets.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = grid;
        } else {
            self.sheets.push((name, grid));
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&Grid> {
        self.sheets.iter().find(|(n, _)| n == name).map(|(_, g)| g)
    }
}

impl WorkbookSource for GridWorkbook {
    type Sheet = Grid;

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(n, _)| n.clone()).collect()
    }

    fn open_sheet(&mut self, name: &str) -> Result<Option<Grid>, ExtractError> {
        Ok(self.sheet(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_track_every_set_cell() {
        let mut grid = Grid::new();
        grid.set(2, 5, "x").set(7, 1, CellValue::Empty);
        assert_eq!(grid.max_row(), 7);
        assert_eq!(grid.max_column(), 5);
    }

    #[test]
    fn unset_cells_read_as_blank() {
        let grid = Grid::new();
        assert_eq!(grid.value(3, 12), CellValue::Empty);
        assert_eq!(grid.formula(3, 12), None);
        assert_eq!(grid.max_row(), 0);
    }

    #[test]
    fn zero_index_is_ignored() {
        let mut grid = Grid::new();
        grid.set(0, 1, "x").set(1, 0, "y");
        assert_eq!(grid.max_row(), 0);
        assert_eq!(grid.max_column(), 0);
        assert!(grid.get(0, 1).is_none());
    }

    #[test]
    fn set_row_fills_consecutive_columns() {
        let mut grid = Grid::new();
        grid.set_row(3, 13, [1.0, 2.0, 3.0]);
        assert_eq!(grid.value(3, 13), CellValue::Number(1.0));
        assert_eq!(grid.value(3, 15), CellValue::Number(3.0));
        assert_eq!(grid.max_column(), 15);
    }

    #[test]
    fn workbook_replaces_sheet_with_same_name() {
        let mut first = Grid::new();
        first.set(1, 1, "first");
        let mut second = Grid::new();
        second.set(1, 1, "second");

        let mut wb = GridWorkbook::new().with_sheet("A", first).with_sheet("B", Grid::new());
        wb.add_sheet("A", second);

        assert_eq!(wb.sheet_names(), vec!["A", "B"]);
        let sheet = wb.open_sheet("A").unwrap().unwrap();
        assert_eq!(sheet.value(1, 1).as_text(), "second");
        assert!(wb.open_sheet("C").unwrap().is_none());
    }
}
