// Raw cell values and the coercion contract.
//
// Every "what does this cell mean as a number / as text" decision lives here.
// The classifier and mapper only ever call `as_number` and `as_text`.

use chrono::{Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A raw cell value as delivered by a workbook adapter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// Spreadsheet date/time serial (1900 date system).
    DateTime(f64),
    /// Error literal such as `#DIV/0!`.
    Error(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric coercion. Always finite; anything that is not a finite number
    /// (blank, text that does not parse, NaN, infinity, dates, errors) is `0`.
    pub fn as_number(&self) -> f64 {
        let n = match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            CellValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            CellValue::Empty | CellValue::DateTime(_) | CellValue::Error(_) => 0.0,
        };
        if n.is_finite() {
            n
        } else {
            0.0
        }
    }

    /// String coercion. Blank is `""`; text is returned verbatim.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::DateTime(serial) => format_serial(*serial),
            CellValue::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
            CellValue::Error(e) => e.clone(),
        }
    }
}

/// Integers print without decimals; everything else uses the shortest
/// round-trip rendering.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Date serials render as `YYYY-MM-DD HH:MM:SS`; a serial outside the
/// calendar falls back to the bare number.
fn format_serial(serial: f64) -> String {
    if !serial.is_finite() || serial < 0.0 {
        return format_number(serial);
    }
    let seconds = (serial * 86_400.0).round() as u64;
    let time = NaiveTime::from_num_seconds_from_midnight_opt((seconds % 86_400) as u32, 0);
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|epoch| epoch.checked_add_days(Days::new(seconds / 86_400)))
        .zip(time)
        .map(|(date, time)| date.and_time(time).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| format_number(serial))
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// A cell: its value plus the formula that produced it, if any.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub value: CellValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl Cell {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self { value: value.into(), formula: None }
    }

    pub fn with_formula(value: impl Into<CellValue>, formula: impl Into<String>) -> Self {
        Self { value: value.into(), formula: Some(normalize_formula(&formula.into())) }
    }
}

/// Formulas are displayed with a leading `=`; some readers strip it.
pub fn normalize_formula(formula: &str) -> String {
    if formula.starts_with('=') {
        formula.to_string()
    } else {
        format!("={}", formula)
    }
}
