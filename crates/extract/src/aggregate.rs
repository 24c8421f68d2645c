use crate::model::{ActualDetail, LabelTotals, LineItem};

/// Label used when a line item has no source fund or expense type.
pub const UNSPECIFIED: &str = "Unspecified";
/// Label used when a line item has no category.
pub const OTHER_CATEGORY: &str = "Other";

/// Everything the aggregator derives from the line items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregates {
    pub by_source_fund: LabelTotals,
    pub by_expense_type: LabelTotals,
    pub by_category: LabelTotals,
    pub actuals_detail: Vec<ActualDetail>,
}

fn label_or<'a>(label: &'a str, default: &'a str) -> &'a str {
    if label.is_empty() {
        default
    } else {
        label
    }
}

/// Sum committed spend per fund / expense type / category, and collect every
/// item with booked actuals. Source order is preserved throughout.
pub fn aggregate(items: &[LineItem]) -> Aggregates {
    let mut out = Aggregates::default();

    for item in items {
        let committed = item.figures.committed_fy26;
        out.by_source_fund.add(label_or(&item.source_fund, UNSPECIFIED), committed);
        out.by_expense_type.add(label_or(&item.expense_type, UNSPECIFIED), committed);
        out.by_category.add(label_or(&item.category, OTHER_CATEGORY), committed);

        if item.figures.actual_fy > 0.0 {
            out.actuals_detail.push(ActualDetail {
                category: item.category.clone(),
                vendor: item.vendor.clone(),
                description: item.description.clone(),
                actual_fy: item.figures.actual_fy,
            });
        }
    }

    out
}
