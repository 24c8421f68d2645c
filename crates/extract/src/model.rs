use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::annotations::{AuditFinding, Recommendation};
use crate::layout::{MONTHS_PER_YEAR, QUARTERS_PER_YEAR};

pub type Monthly = [f64; MONTHS_PER_YEAR];
pub type Quarterly = [f64; QUARTERS_PER_YEAR];

// ---------------------------------------------------------------------------
// Event type
// ---------------------------------------------------------------------------

/// Line-item classification from column 2. Unknown labels pass through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Budget,
    Sow,
    UnapprovedBudget,
    UnapprovedSow,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Budget => "Budget",
            Self::Sow => "SOW",
            Self::UnapprovedBudget => "Unapproved Budget",
            Self::UnapprovedSow => "Unapproved SOW",
            Self::Other(s) => s,
        }
    }

    /// Approved allocation or approved statement of work.
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Budget | Self::Sow)
    }

    /// Pending approval; kept out of approved rollups by consumers.
    pub fn is_unapproved(&self) -> bool {
        matches!(self, Self::UnapprovedBudget | Self::UnapprovedSow)
    }

    /// A vendor commitment (SOW) rather than a budget allocation.
    pub fn is_commitment(&self) -> bool {
        matches!(self, Self::Sow | Self::UnapprovedSow)
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Budget" => Self::Budget,
            "SOW" => Self::Sow,
            "Unapproved Budget" => Self::UnapprovedBudget,
            "Unapproved SOW" => Self::UnapprovedSow,
            _ => Self::Other(s),
        }
    }
}

impl From<EventType> for String {
    fn from(e: EventType) -> Self {
        match e {
            EventType::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Figures + line items
// ---------------------------------------------------------------------------

/// The monetary shape shared by every line item and by the totals row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Figures {
    pub budget_fy26: f64,
    pub committed_fy26: f64,
    pub budget_monthly: Monthly,
    pub budget_quarterly: Quarterly,
    pub budget_fy: f64,
    pub forecast_monthly: Monthly,
    pub forecast_quarterly: Quarterly,
    pub forecast_fy: f64,
    pub actual_monthly: Monthly,
    pub actual_quarterly: Quarterly,
    pub actual_fy: f64,
    pub bvf_monthly: Monthly,
    pub bvf_fy: f64,
    pub bva_monthly: Monthly,
    pub bva_fy: f64,
}

impl Figures {
    /// Approved allocation not yet assigned to a statement of work.
    pub fn unallocated(&self) -> f64 {
        self.budget_fy26 - self.committed_fy26
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Source row, for traceability back to the sheet.
    pub row: u32,
    pub category: String,
    pub event_type: EventType,
    pub source_fund: String,
    pub expense_type: String,
    pub vendor: String,
    pub description: String,
    pub itbo_line: String,
    pub sow: String,
    pub itbo: String,
    pub po: String,
    #[serde(flatten)]
    pub figures: Figures,
    /// Formula behind the committed figure, for audit display only.
    pub committed_formula: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualDetail {
    pub category: String,
    pub vendor: String,
    pub description: String,
    pub actual_fy: f64,
}

// ---------------------------------------------------------------------------
// Label totals
// ---------------------------------------------------------------------------

/// Label → amount, iterated in first-seen order. Serializes as a flat object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelTotals {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl LabelTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &str, amount: f64) {
        match self.index.get(label) {
            Some(&i) => self.entries[i].1 += amount,
            None => {
                self.index.insert(label.to_string(), self.entries.len());
                self.entries.push((label.to_string(), amount));
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.index.get(label).map(|&i| self.entries[i].1)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }
}

impl Serialize for LabelTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, amount) in &self.entries {
            map.serialize_entry(label, amount)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LabelTotals {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LabelTotalsVisitor;

        impl<'de> Visitor<'de> for LabelTotalsVisitor {
            type Value = LabelTotals;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of label to amount")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
                let mut totals = LabelTotals::new();
                while let Some((label, amount)) = access.next_entry::<String, f64>()? {
                    totals.add(&label, amount);
                }
                Ok(totals)
            }
        }

        deserializer.deserialize_map(LabelTotalsVisitor)
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub file: String,
    pub sheet: String,
    pub table_name: String,
    pub total_columns: u32,
    pub total_line_items: usize,
    /// Row the totals were read from (labeled or fallback).
    pub totals_row: u32,
    /// UTC date of the run. Display label only.
    pub extracted_at: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub metadata: Metadata,
    pub months: Vec<String>,
    pub quarters: Vec<String>,
    pub line_items: Vec<LineItem>,
    pub totals: Figures,
    pub by_source_fund: LabelTotals,
    pub by_expense_type: LabelTotals,
    pub by_category: LabelTotals,
    pub actuals_detail: Vec<ActualDetail>,
    pub audit_findings: Vec<AuditFinding>,
    pub recommendations: Vec<Recommendation>,
}

/// Headline figures, read from the sheet's own totals row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub line_items: usize,
    pub approved: f64,
    pub committed: f64,
    pub forecast: f64,
    pub actual: f64,
}

impl ExtractionResult {
    pub fn summary(&self) -> Summary {
        Summary {
            line_items: self.line_items.len(),
            approved: self.totals.budget_fy26,
            committed: self.totals.committed_fy26,
            forecast: self.totals.forecast_fy,
            actual: self.totals.actual_fy,
        }
    }
}
