// JSON export of extraction results

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use budgetgrid_extract::ExtractionResult;

/// Write a result as pretty JSON, creating parent directories as needed.
pub fn write_result(path: &Path, result: &ExtractionResult) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }

    let file = File::create(path).map_err(|e| e.to_string())?;
    let mut writer = BufWriter::new(file);
    write_result_to(&mut writer, result)?;
    writer.flush().map_err(|e| e.to_string())
}

/// Pretty JSON to any writer, newline-terminated.
pub fn write_result_to<W: Write>(mut writer: W, result: &ExtractionResult) -> Result<(), String> {
    serde_json::to_writer_pretty(&mut writer, result).map_err(|e| e.to_string())?;
    writer.write_all(b"\n").map_err(|e| e.to_string())
}

pub fn read_result(path: &Path) -> Result<ExtractionResult, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| format!("{}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgetgrid_extract::{extract_sheet, Annotations, ExtractOptions, Grid};
    use tempfile::tempdir;

    fn sample() -> ExtractionResult {
        let mut g = Grid::new();
        g.set(3, 1, "Labor").set(3, 2, "SOW").set(3, 12, 10.0);
        g.set(4, 1, "Total").set(4, 12, 10.0);
        extract_sheet(&g, &ExtractOptions::default(), &Annotations::builtin().unwrap())
    }

    #[test]
    fn write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("public/data/budget.json");

        let result = sample();
        write_result(&path, &result).unwrap();

        let back = read_result(&path).unwrap();
        assert_eq!(back, result);
        assert!(std::fs::read_to_string(&path).unwrap().ends_with("}\n"));
    }

    #[test]
    fn read_reports_path_on_bad_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"metadata\": ").unwrap();
        let err = read_result(&path).unwrap_err();
        assert!(err.contains("broken.json"));
    }

    #[test]
    fn writer_output_is_pretty() {
        let mut buf = Vec::new();
        write_result_to(&mut buf, &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("{\n  \"metadata\""));
    }
}
