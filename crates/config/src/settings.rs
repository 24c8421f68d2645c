// Application settings
// Loaded from ~/.config/budgetgrid/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use budgetgrid_extract::{Annotations, ExtractOptions};

/// Which sheet to read and how to label results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractSettings {
    pub sheet: String,
    pub title: String,
    pub table_name: String,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        let defaults = ExtractOptions::default();
        Self {
            sheet: defaults.sheet,
            title: defaults.title,
            table_name: defaults.table_name,
        }
    }
}

impl ExtractSettings {
    /// Build engine options. `file` is the source label; `None` keeps the
    /// engine default.
    pub fn to_options(&self, file: Option<&str>) -> ExtractOptions {
        let defaults = ExtractOptions::default();
        ExtractOptions {
            sheet: self.sheet.clone(),
            title: self.title.clone(),
            file: file.map(str::to_string).unwrap_or(defaults.file),
            table_name: self.table_name.clone(),
        }
    }
}

/// Snapshot store location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotSettings {
    /// SQLite database file. None = platform data directory.
    pub database: Option<PathBuf>,

    /// Name recorded with each stored snapshot. Empty = "budget".
    pub name: String,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self { database: None, name: "budget".to_string() }
    }
}

impl SnapshotSettings {
    pub fn effective_database(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("budgetgrid")
                .join("snapshots.db")
        })
    }

    pub fn effective_name(&self) -> &str {
        if self.name.is_empty() {
            "budget"
        } else {
            &self.name
        }
    }
}

/// Upload gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Environment variable holding the expected bearer token.
    /// The token itself is never stored in this file.
    pub token_env: String,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self { token_env: "BUDGETGRID_UPLOAD_TOKEN".to_string() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub extract: ExtractSettings,

    /// Annotation TOML replacing the built-in set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations_path: Option<PathBuf>,

    pub snapshots: SnapshotSettings,

    pub upload: UploadSettings,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("budgetgrid");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults.
    /// Writes a commented default file on first run.
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            if let Err(e) = write_default_file(&path) {
                log::warn!("could not write default settings to {}: {}", path.display(), e);
            }
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Load an explicit settings file. Errors are returned, not defaulted.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Error reading {}: {}", path.display(), e))?;
        Self::parse(&contents).map_err(|e| format!("Error parsing {}: {}", path.display(), e))
    }

    /// Parse settings JSON, ignoring whole-line `//` comments.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Save settings to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// The annotation set to attach: the configured file, or the built-in one.
    pub fn annotations(&self) -> Result<Annotations, String> {
        load_annotations(self.annotations_path.as_deref())
    }
}

/// Read an annotation TOML file, or the built-in set when `path` is None.
pub fn load_annotations(path: Option<&Path>) -> Result<Annotations, String> {
    match path {
        Some(path) => {
            log::debug!("loading annotations from {}", path.display());
            let contents = fs::read_to_string(path)
                .map_err(|e| format!("Error reading {}: {}", path.display(), e))?;
            Annotations::from_toml(&contents).map_err(|e| format!("{}: {}", path.display(), e))
        }
        None => Annotations::builtin().map_err(|e| e.to_string()),
    }
}

const DEFAULT_FILE: &str = r#"{
    // Workbook layout
    "extract": {
        "sheet": "2026 Budget",
        "title": "CDO 2026 Budget",
        "table_name": "CDOBudget"
    },

    // Snapshot store (null database = platform data directory)
    "snapshots": {
        "database": null,
        "name": "budget"
    },

    // Upload gate: the bearer token is read from this environment variable
    "upload": {
        "token_env": "BUDGETGRID_UPLOAD_TOKEN"
    }
}
"#;

fn write_default_file(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    fs::write(path, DEFAULT_FILE).map_err(|e| e.to_string())
}
