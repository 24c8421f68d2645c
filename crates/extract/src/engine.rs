use chrono::{NaiveDate, Utc};

use crate::aggregate::aggregate;
use crate::annotations::Annotations;
use crate::classify::classify;
use crate::error::ExtractError;
use crate::layout::{MONTHS, QUARTERS};
use crate::mapper::{map_line_item, read_figures};
use crate::model::{ExtractionResult, Metadata};
use crate::reader::{CellReader, WorkbookSource};

/// Which sheet to read and how to label the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub sheet: String,
    pub title: String,
    /// Source file label shown in the metadata.
    pub file: String,
    pub table_name: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            sheet: "2026 Budget".to_string(),
            title: "CDO 2026 Budget".to_string(),
            file: "CDO Budget - 2026-02-08.xlsx".to_string(),
            table_name: "CDOBudget".to_string(),
        }
    }
}

/// Look up the configured sheet and extract it.
///
/// The only hard failure is a missing sheet (or an adapter that cannot read
/// it); every cell-level problem is absorbed by coercion.
pub fn extract<W: WorkbookSource + ?Sized>(
    workbook: &mut W,
    options: &ExtractOptions,
    annotations: &Annotations,
) -> Result<ExtractionResult, ExtractError> {
    let not_found = |available: Vec<String>| ExtractError::SheetNotFound {
        sheet: options.sheet.clone(),
        available,
    };

    let names = workbook.sheet_names();
    if !names.iter().any(|n| *n == options.sheet) {
        return Err(not_found(names));
    }

    let sheet = workbook.open_sheet(&options.sheet)?.ok_or_else(|| not_found(names))?;
    Ok(extract_sheet(&sheet, options, annotations))
}

/// Single-pass transform of one worksheet, stamped with today's UTC date.
pub fn extract_sheet<R: CellReader + ?Sized>(
    sheet: &R,
    options: &ExtractOptions,
    annotations: &Annotations,
) -> ExtractionResult {
    extract_sheet_on(sheet, options, annotations, Utc::now().date_naive())
}

/// As [`extract_sheet`], with an explicit `extracted_at` date.
pub fn extract_sheet_on<R: CellReader + ?Sized>(
    sheet: &R,
    options: &ExtractOptions,
    annotations: &Annotations,
    extracted_at: NaiveDate,
) -> ExtractionResult {
    let plan = classify(sheet);

    let line_items: Vec<_> = plan.line_item_rows.iter().map(|&row| map_line_item(sheet, row)).collect();
    let totals = read_figures(sheet, plan.totals.row());
    let aggs = aggregate(&line_items);

    ExtractionResult {
        metadata: Metadata {
            title: options.title.clone(),
            file: options.file.clone(),
            sheet: options.sheet.clone(),
            table_name: options.table_name.clone(),
            total_columns: sheet.max_column(),
            total_line_items: line_items.len(),
            totals_row: plan.totals.row(),
            extracted_at,
        },
        months: MONTHS.iter().map(|m| m.to_string()).collect(),
        quarters: QUARTERS.iter().map(|q| q.to_string()).collect(),
        line_items,
        totals,
        by_source_fund: aggs.by_source_fund,
        by_expense_type: aggs.by_expense_type,
        by_category: aggs.by_category,
        actuals_detail: aggs.actuals_detail,
        audit_findings: annotations.audit_findings.clone(),
        recommendations: annotations.recommendations.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid, GridWorkbook};

    fn budget_sheet() -> Grid {
        let mut g = Grid::new();
        g.set(1, 1, "CDO 2026 Budget");
        g.set_row(2, 1, ["Category", "Event Type", "Source Fund"]);
        g.set(3, 1, "Labor").set(3, 2, "SOW").set(3, 12, "125000");
        g.set(4, 1, "Labor").set(4, 2, "");
        g.set(5, 1, "Total").set(5, 11, 300000.0).set(5, 12, 125000.0);
        g
    }

    #[test]
    fn missing_sheet_lists_available() {
        let mut wb = GridWorkbook::new()
            .with_sheet("Sheet1", Grid::new())
            .with_sheet("2025 Budget", Grid::new());
        let err = extract(&mut wb, &ExtractOptions::default(), &Annotations::empty()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("2026 Budget"));
        assert!(msg.contains("Sheet1, 2025 Budget"));
        assert!(matches!(err, ExtractError::SheetNotFound { .. }));
    }

    #[test]
    fn sheet_name_must_match_exactly() {
        let mut wb = GridWorkbook::new().with_sheet("2026 budget", budget_sheet());
        assert!(extract(&mut wb, &ExtractOptions::default(), &Annotations::empty()).is_err());
    }

    #[test]
    fn metadata_and_shape() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
        let result = extract_sheet_on(&budget_sheet(), &ExtractOptions::default(), &Annotations::empty(), date);

        assert_eq!(result.metadata.title, "CDO 2026 Budget");
        assert_eq!(result.metadata.sheet, "2026 Budget");
        assert_eq!(result.metadata.table_name, "CDOBudget");
        assert_eq!(result.metadata.total_columns, 12);
        assert_eq!(result.metadata.total_line_items, 1);
        assert_eq!(result.metadata.totals_row, 5);
        assert_eq!(result.metadata.extracted_at, date);
        assert_eq!(result.months.len(), 12);
        assert_eq!(result.months[0], "Jan");
        assert_eq!(result.quarters, vec!["Q1", "Q2", "Q3", "Q4"]);
        assert_eq!(result.totals.budget_fy26, 300000.0);
        assert_eq!(result.by_category.get("Labor"), Some(125000.0));
    }

    #[test]
    fn extracted_at_serializes_as_date() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
        let result = extract_sheet_on(&budget_sheet(), &ExtractOptions::default(), &Annotations::empty(), date);
        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(v["metadata"]["extracted_at"], "2026-02-08");
    }

    #[test]
    fn annotations_attached_verbatim() {
        let set = Annotations::builtin().unwrap();
        let result = extract_sheet(&budget_sheet(), &ExtractOptions::default(), &set);
        assert_eq!(result.audit_findings, set.audit_findings);
        assert_eq!(result.recommendations, set.recommendations);
    }
}
