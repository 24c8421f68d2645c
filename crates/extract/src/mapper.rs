// Field mapper: one classified row -> one typed record.
//
// Reads the fixed column contract from `layout`. Every monetary cell goes
// through `CellValue::as_number`, every identity cell through `as_text`.
// Nothing here can fail; missing or malformed cells become 0 / "".

use crate::layout::{
    SeriesColumns, ACTUAL, BUDGET, BUDGET_VS_ACTUAL, BUDGET_VS_FORECAST, COL_BUDGET_FY26,
    COL_CATEGORY, COL_COMMITTED_FY26, COL_DESCRIPTION, COL_EVENT_TYPE, COL_EXPENSE_TYPE, COL_ITBO,
    COL_ITBO_LINE, COL_PO, COL_SOURCE_FUND, COL_SOW, COL_VENDOR, FORECAST,
};
use crate::model::{EventType, Figures, LineItem, Monthly, Quarterly};
use crate::reader::CellReader;

fn number<R: CellReader + ?Sized>(sheet: &R, row: u32, col: u32) -> f64 {
    sheet.value(row, col).as_number()
}

fn text<R: CellReader + ?Sized>(sheet: &R, row: u32, col: u32) -> String {
    sheet.value(row, col).as_text()
}

/// `N` consecutive numeric cells starting at `first_col`.
fn span<R: CellReader + ?Sized, const N: usize>(sheet: &R, row: u32, first_col: u32) -> [f64; N] {
    std::array::from_fn(|i| number(sheet, row, first_col + i as u32))
}

struct Series {
    monthly: Monthly,
    quarterly: Quarterly,
    fy: f64,
}

fn series<R: CellReader + ?Sized>(sheet: &R, row: u32, cols: SeriesColumns) -> Series {
    Series {
        monthly: span(sheet, row, cols.monthly),
        quarterly: cols.quarterly.map(|q| span(sheet, row, q)).unwrap_or_default(),
        fy: number(sheet, row, cols.fy),
    }
}

/// Read the monetary block of a row. Used for line items and the totals row.
pub fn read_figures<R: CellReader + ?Sized>(sheet: &R, row: u32) -> Figures {
    let budget = series(sheet, row, BUDGET);
    let forecast = series(sheet, row, FORECAST);
    let actual = series(sheet, row, ACTUAL);
    let bvf = series(sheet, row, BUDGET_VS_FORECAST);
    let bva = series(sheet, row, BUDGET_VS_ACTUAL);

    Figures {
        budget_fy26: number(sheet, row, COL_BUDGET_FY26),
        committed_fy26: number(sheet, row, COL_COMMITTED_FY26),
        budget_monthly: budget.monthly,
        budget_quarterly: budget.quarterly,
        budget_fy: budget.fy,
        forecast_monthly: forecast.monthly,
        forecast_quarterly: forecast.quarterly,
        forecast_fy: forecast.fy,
        actual_monthly: actual.monthly,
        actual_quarterly: actual.quarterly,
        actual_fy: actual.fy,
        bvf_monthly: bvf.monthly,
        bvf_fy: bvf.fy,
        bva_monthly: bva.monthly,
        bva_fy: bva.fy,
    }
}

/// Map one line-item row. The caller has already classified the row.
pub fn map_line_item<R: CellReader + ?Sized>(sheet: &R, row: u32) -> LineItem {
    LineItem {
        row,
        category: text(sheet, row, COL_CATEGORY),
        event_type: EventType::from(text(sheet, row, COL_EVENT_TYPE)),
        source_fund: text(sheet, row, COL_SOURCE_FUND),
        expense_type: text(sheet, row, COL_EXPENSE_TYPE),
        vendor: text(sheet, row, COL_VENDOR),
        description: text(sheet, row, COL_DESCRIPTION),
        itbo_line: text(sheet, row, COL_ITBO_LINE),
        sow: text(sheet, row, COL_SOW),
        itbo: text(sheet, row, COL_ITBO),
        po: text(sheet, row, COL_PO),
        figures: read_figures(sheet, row),
        committed_formula: sheet.formula(row, COL_COMMITTED_FY26).unwrap_or_default(),
    }
}
