use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// The workbook has no sheet with the configured name.
    SheetNotFound { sheet: String, available: Vec<String> },
    /// The workbook could not be opened or a sheet could not be read.
    Workbook(String),
    /// Annotation set TOML parse / validation error.
    Annotations(String),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SheetNotFound { sheet, available } => {
                if available.is_empty() {
                    write!(f, "sheet '{sheet}' not found (workbook has no sheets)")
                } else {
                    write!(f, "sheet '{sheet}' not found (available: {})", available.join(", "))
                }
            }
            Self::Workbook(msg) => write!(f, "workbook error: {msg}"),
            Self::Annotations(msg) => write!(f, "annotations error: {msg}"),
        }
    }
}

impl std::error::Error for ExtractError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_not_found_lists_available_sheets() {
        let err = ExtractError::SheetNotFound {
            sheet: "2026 Budget".into(),
            available: vec!["Sheet1".into(), "2025 Budget".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'2026 Budget'"));
        assert!(msg.contains("Sheet1, 2025 Budget"));
    }

    #[test]
    fn sheet_not_found_in_empty_workbook() {
        let err = ExtractError::SheetNotFound { sheet: "2026 Budget".into(), available: vec![] };
        assert_eq!(err.to_string(), "sheet '2026 Budget' not found (workbook has no sheets)");
    }
}
