// Workbook adapters over calamine (xlsx, xlsm, xls, xlsb, ods)

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};

use budgetgrid_extract::cell::normalize_formula;
use budgetgrid_extract::{
    extract, Annotations, CellReader, CellValue, ExtractError, ExtractOptions, ExtractionResult,
    WorkbookSource,
};

/// A workbook opened through calamine. The format is sniffed from content.
pub struct XlsxWorkbook<RS: Read + Seek> {
    sheets: Sheets<RS>,
}

impl XlsxWorkbook<BufReader<File>> {
    /// Open a workbook file ahead of time.
    pub fn open(path: &Path) -> Result<Self, ExtractError> {
        log::debug!("opening workbook {}", path.display());
        let sheets = open_workbook_auto(path).map_err(|e| {
            ExtractError::Workbook(format!("failed to open {}: {}", path.display(), e))
        })?;
        Ok(Self { sheets })
    }
}

impl XlsxWorkbook<Cursor<Vec<u8>>> {
    /// Open a workbook already held in memory (an uploaded body).
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ExtractError> {
        log::debug!("opening workbook from {} bytes", bytes.len());
        let sheets = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| ExtractError::Workbook(format!("failed to read workbook: {}", e)))?;
        Ok(Self { sheets })
    }
}

impl<RS: Read + Seek> WorkbookSource for XlsxWorkbook<RS> {
    type Sheet = CalamineSheet;

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names().to_vec()
    }

    fn open_sheet(&mut self, name: &str) -> Result<Option<CalamineSheet>, ExtractError> {
        if !self.sheet_names().iter().any(|n| n == name) {
            return Ok(None);
        }

        let values = self
            .sheets
            .worksheet_range(name)
            .map_err(|e| ExtractError::Workbook(format!("failed to read sheet '{}': {}", name, e)))?;

        // Formulas are audit-only; a format without formula support still extracts.
        let formulas = match self.sheets.worksheet_formula(name) {
            Ok(range) => Some(range),
            Err(e) => {
                log::debug!("no formulas for sheet '{}': {}", name, e);
                None
            }
        };

        Ok(Some(CalamineSheet::new(values, formulas)))
    }
}

/// Extract from a workbook file.
pub fn extract_path(
    path: &Path,
    options: &ExtractOptions,
    annotations: &Annotations,
) -> Result<ExtractionResult, ExtractError> {
    let mut workbook = XlsxWorkbook::open(path)?;
    extract(&mut workbook, options, annotations)
}

/// Extract from workbook bytes.
pub fn extract_bytes(
    bytes: Vec<u8>,
    options: &ExtractOptions,
    annotations: &Annotations,
) -> Result<ExtractionResult, ExtractError> {
    let mut workbook = XlsxWorkbook::from_bytes(bytes)?;
    extract(&mut workbook, options, annotations)
}

// ---------------------------------------------------------------------------
// Sheet
// ---------------------------------------------------------------------------

/// One worksheet's cached values plus its formula text.
///
/// calamine positions are 0-indexed and absolute; this reader exposes the
/// 1-indexed coordinates the extraction core works in.
pub struct CalamineSheet {
    values: Range<Data>,
    formulas: Option<Range<String>>,
    max_row: u32,
    max_col: u32,
}

impl CalamineSheet {
    pub fn new(values: Range<Data>, formulas: Option<Range<String>>) -> Self {
        let (mut max_row, mut max_col) = extent(values.end());
        if let Some(f) = &formulas {
            let (r, c) = extent(f.end());
            max_row = max_row.max(r);
            max_col = max_col.max(c);
        }
        Self { values, formulas, max_row, max_col }
    }
}

fn extent(end: Option<(u32, u32)>) -> (u32, u32) {
    end.map(|(r, c)| (r + 1, c + 1)).unwrap_or((0, 0))
}

fn position(row: u32, col: u32) -> Option<(u32, u32)> {
    Some((row.checked_sub(1)?, col.checked_sub(1)?))
}

fn convert(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Float(n) => CellValue::Number(*n),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

impl CellReader for CalamineSheet {
    fn value(&self, row: u32, col: u32) -> CellValue {
        position(row, col)
            .and_then(|pos| self.values.get_value(pos))
            .map(convert)
            .unwrap_or_default()
    }

    fn formula(&self, row: u32, col: u32) -> Option<String> {
        let pos = position(row, col)?;
        let raw = self.formulas.as_ref()?.get_value(pos)?;
        if raw.is_empty() {
            return None;
        }
        // ODS formulas carry an OpenFormula namespace prefix
        let raw = raw.strip_prefix("of:").unwrap_or(raw);
        Some(normalize_formula(raw))
    }

    fn max_row(&self) -> u32 {
        self.max_row
    }

    fn max_column(&self) -> u32 {
        self.max_col
    }
}
