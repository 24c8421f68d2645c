//! Fixed column contract of the budget worksheet.
//!
//! Rows 1–2 are headers; data begins on row 3. Columns are 1-indexed and
//! addressed by position only. Reordering the source columns produces
//! wrong-but-valid figures, so these numbers must match the sheet exactly.
//!
//! | Columns | Letters | Content |
//! |---------|---------|---------|
//! | 1–10    | A–J     | Category, Event Type, Source Fund, Expense Type, Vendor, Description, ITBO Line, SOW, ITBO, PO |
//! | 11, 12  | K, L    | Approved FY26, Committed FY26 |
//! | 13–29   | M–AC    | Budget Jan–Dec, Q1–Q4, FY |
//! | 30–46   | AD–AT   | Forecast Jan–Dec, Q1–Q4, FY |
//! | 47–63   | AU–BK   | Actual Jan–Dec, Q1–Q4, FY |
//! | 64–80   | BL–CB   | Budget vs Forecast Jan–Dec, (Q1–Q4 unread), FY |
//! | 81–97   | CC–CS   | Budget vs Actual Jan–Dec, (Q1–Q4 unread), FY |

pub const HEADER_ROWS: u32 = 2;
pub const FIRST_DATA_ROW: u32 = HEADER_ROWS + 1;

/// Column-1 label (trimmed, lowercased) that marks the grand-total row.
pub const TOTALS_LABEL: &str = "total";

pub const COL_CATEGORY: u32 = 1;
pub const COL_EVENT_TYPE: u32 = 2;
pub const COL_SOURCE_FUND: u32 = 3;
pub const COL_EXPENSE_TYPE: u32 = 4;
pub const COL_VENDOR: u32 = 5;
pub const COL_DESCRIPTION: u32 = 6;
pub const COL_ITBO_LINE: u32 = 7;
pub const COL_SOW: u32 = 8;
pub const COL_ITBO: u32 = 9;
pub const COL_PO: u32 = 10;

pub const COL_BUDGET_FY26: u32 = 11;
pub const COL_COMMITTED_FY26: u32 = 12;

pub const MONTHS_PER_YEAR: usize = 12;
pub const QUARTERS_PER_YEAR: usize = 4;

pub const MONTHS: [&str; MONTHS_PER_YEAR] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub const QUARTERS: [&str; QUARTERS_PER_YEAR] = ["Q1", "Q2", "Q3", "Q4"];

/// Where one monthly/quarterly/FY block sits in the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesColumns {
    /// First of twelve consecutive monthly columns (Jan).
    pub monthly: u32,
    /// First of four consecutive quarterly columns (Q1), when the block is read.
    pub quarterly: Option<u32>,
    /// Full-year column.
    pub fy: u32,
}

pub const BUDGET: SeriesColumns = SeriesColumns { monthly: 13, quarterly: Some(25), fy: 29 };
pub const FORECAST: SeriesColumns = SeriesColumns { monthly: 30, quarterly: Some(42), fy: 46 };
pub const ACTUAL: SeriesColumns = SeriesColumns { monthly: 47, quarterly: Some(59), fy: 63 };
pub const BUDGET_VS_FORECAST: SeriesColumns = SeriesColumns { monthly: 64, quarterly: None, fy: 80 };
pub const BUDGET_VS_ACTUAL: SeriesColumns = SeriesColumns { monthly: 81, quarterly: None, fy: 97 };
