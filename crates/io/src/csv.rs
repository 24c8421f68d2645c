// CSV export of line items

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use budgetgrid_extract::LineItem;

/// One flat CSV record. Monthly and quarterly series are left out; the JSON
/// result carries them.
#[derive(Serialize)]
struct LineItemRecord<'a> {
    row: u32,
    category: &'a str,
    event_type: &'a str,
    source_fund: &'a str,
    expense_type: &'a str,
    vendor: &'a str,
    description: &'a str,
    itbo_line: &'a str,
    sow: &'a str,
    itbo: &'a str,
    po: &'a str,
    budget_fy26: f64,
    committed_fy26: f64,
    unallocated: f64,
    budget_fy: f64,
    forecast_fy: f64,
    actual_fy: f64,
    bvf_fy: f64,
    bva_fy: f64,
    committed_formula: &'a str,
}

impl<'a> From<&'a LineItem> for LineItemRecord<'a> {
    fn from(item: &'a LineItem) -> Self {
        let f = &item.figures;
        Self {
            row: item.row,
            category: &item.category,
            event_type: item.event_type.as_str(),
            source_fund: &item.source_fund,
            expense_type: &item.expense_type,
            vendor: &item.vendor,
            description: &item.description,
            itbo_line: &item.itbo_line,
            sow: &item.sow,
            itbo: &item.itbo,
            po: &item.po,
            budget_fy26: f.budget_fy26,
            committed_fy26: f.committed_fy26,
            unallocated: f.unallocated(),
            budget_fy: f.budget_fy,
            forecast_fy: f.forecast_fy,
            actual_fy: f.actual_fy,
            bvf_fy: f.bvf_fy,
            bva_fy: f.bva_fy,
            committed_formula: &item.committed_formula,
        }
    }
}

pub fn write_line_items<W: Write>(writer: W, items: &[LineItem]) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(writer);
    for item in items {
        writer.serialize(LineItemRecord::from(item)).map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())
}

pub fn export_line_items(path: &Path, items: &[LineItem]) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let file = std::fs::File::create(path).map_err(|e| e.to_string())?;
    write_line_items(file, items)
}
