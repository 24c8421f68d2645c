use crate::layout::{COL_CATEGORY, COL_EVENT_TYPE, FIRST_DATA_ROW, TOTALS_LABEL};
use crate::reader::CellReader;

/// Where the totals figures come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsRow {
    /// First row at or below the headers whose category reads "Total".
    Labeled(u32),
    /// No "Total" label anywhere: the last populated row stands in.
    LastPopulated(u32),
}

impl TotalsRow {
    pub fn row(&self) -> u32 {
        match self {
            Self::Labeled(r) | Self::LastPopulated(r) => *r,
        }
    }

    pub fn is_labeled(&self) -> bool {
        matches!(self, Self::Labeled(_))
    }
}

/// Classifier output: the totals row and the rows that become line items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPlan {
    pub totals: TotalsRow,
    pub line_item_rows: Vec<u32>,
}

/// Scan downward from the first data row for the grand-total label.
pub fn find_totals_row<R: CellReader + ?Sized>(sheet: &R) -> TotalsRow {
    let last = sheet.max_row();
    (FIRST_DATA_ROW..=last)
        .find(|&row| is_totals_label(&sheet.value(row, COL_CATEGORY).as_text()))
        .map(TotalsRow::Labeled)
        .unwrap_or(TotalsRow::LastPopulated(last))
}

fn is_totals_label(category: &str) -> bool {
    category.trim().to_lowercase() == TOTALS_LABEL
}

/// A row is a line item iff its event type is non-empty after coercion.
pub fn is_line_item<R: CellReader + ?Sized>(sheet: &R, row: u32) -> bool {
    !sheet.value(row, COL_EVENT_TYPE).as_text().is_empty()
}

/// Decide the totals row and which data rows are line items.
///
/// A labeled totals row closes the data range (`[3, n)`). Without a label the
/// last populated row is both the last candidate line item and the totals
/// source (`[3, n]`).
pub fn classify<R: CellReader + ?Sized>(sheet: &R) -> RowPlan {
    let totals = find_totals_row(sheet);
    let end = match totals {
        TotalsRow::Labeled(r) => r,
        TotalsRow::LastPopulated(r) => r.saturating_add(1),
    };

    let line_item_rows = (FIRST_DATA_ROW..end).filter(|&row| is_line_item(sheet, row)).collect();

    RowPlan { totals, line_item_rows }
}
