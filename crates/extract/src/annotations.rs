use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// Built-in annotation set, authored against the 2026 budget workbook.
const BUILTIN_TOML: &str = include_str!("../assets/annotations.toml");

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
            Self::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// A documented weakness in the source workbook's formula design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFinding {
    pub id: u32,
    pub severity: Severity,
    pub title: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: u32,
    pub priority: Priority,
    pub title: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

// ---------------------------------------------------------------------------
// Set
// ---------------------------------------------------------------------------

/// Versioned, hand-authored annotations attached verbatim to every result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    pub version: String,
    #[serde(default)]
    pub audit_findings: Vec<AuditFinding>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

impl Annotations {
    /// The annotation set shipped with this crate.
    pub fn builtin() -> Result<Self, ExtractError> {
        Self::from_toml(BUILTIN_TOML)
    }

    pub fn from_toml(input: &str) -> Result<Self, ExtractError> {
        let set: Annotations =
            toml::from_str(input).map_err(|e| ExtractError::Annotations(e.to_string()))?;
        set.validate()?;
        Ok(set)
    }

    /// An empty set, for callers that attach no annotations.
    pub fn empty() -> Self {
        Self { version: String::new(), audit_findings: Vec::new(), recommendations: Vec::new() }
    }

    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.version.trim().is_empty() {
            return Err(ExtractError::Annotations("version must not be empty".into()));
        }

        let mut seen = HashSet::new();
        for finding in &self.audit_findings {
            if !seen.insert(finding.id) {
                return Err(ExtractError::Annotations(format!(
                    "duplicate audit finding id {}",
                    finding.id
                )));
            }
        }

        seen.clear();
        for rec in &self.recommendations {
            if !seen.insert(rec.id) {
                return Err(ExtractError::Annotations(format!(
                    "duplicate recommendation id {}",
                    rec.id
                )));
            }
        }

        Ok(())
    }
}
