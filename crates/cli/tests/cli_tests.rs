// End-to-end tests for the `bgrid` binary.
//
// Every run gets its own settings file and snapshot database in a temp dir,
// so nothing touches the real config or data directories.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use rust_xlsxwriter::{Formula, Workbook};
use tempfile::TempDir;

const TOKEN_ENV: &str = "BUDGETGRID_UPLOAD_TOKEN";

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{\n  // test settings\n}\n").unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn db(&self) -> String {
        self.path("snapshots.db").display().to_string()
    }

    fn bgrid(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_bgrid"));
        cmd.arg("--config")
            .arg(self.path("settings.json"))
            .env_remove("BUDGETGRID_AUTHORIZATION")
            .env_remove("BUDGETGRID_CONFIG")
            .env_remove(TOKEN_ENV)
            .env_remove("RUST_LOG");
        cmd
    }

    /// Write the budget fixture workbook and return its path.
    fn workbook(&self) -> PathBuf {
        let path = self.path("budget.xlsx");
        let mut workbook = Workbook::new();

        let notes = workbook.add_worksheet();
        notes.set_name("Instructions").unwrap();
        notes.write_string(0, 0, "Read me").unwrap();

        let sheet = workbook.add_worksheet();
        sheet.set_name("2026 Budget").unwrap();
        sheet.write_string(0, 0, "CDO 2026 Budget").unwrap();
        sheet.write_string(1, 0, "Category").unwrap();
        sheet.write_string(1, 1, "Event Type").unwrap();

        sheet.write_string(2, 0, "Labor").unwrap();
        sheet.write_string(2, 1, "Budget").unwrap();
        sheet.write_number(2, 10, 300.0).unwrap();
        sheet.write_formula(2, 11, Formula::new("=K3-SUM(L4:L4)").set_result("100")).unwrap();

        sheet.write_string(3, 0, "Labor").unwrap();
        sheet.write_string(3, 1, "SOW").unwrap();
        sheet.write_string(3, 4, "Acme").unwrap();
        sheet.write_number(3, 11, 200.0).unwrap();
        sheet.write_number(3, 62, 50.0).unwrap();

        sheet.write_string(4, 0, "Total").unwrap();
        sheet.write_number(4, 10, 300.0).unwrap();
        sheet.write_number(4, 11, 300.0).unwrap();
        sheet.write_number(4, 62, 50.0).unwrap();

        workbook.save(&path).unwrap();
        path
    }
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn json(out: &Output) -> serde_json::Value {
    serde_json::from_str(stdout(out).trim())
        .unwrap_or_else(|e| panic!("stdout must be one JSON value: {e}\n{}", stdout(out)))
}

fn run_with_stdin(mut cmd: Command, input: &[u8]) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input).unwrap();
    child.wait_with_output().unwrap()
}

// ===========================================================================
// extract
// ===========================================================================

#[test]
fn extract_prints_result_json() {
    let env = Env::new();
    let input = env.workbook();
    let out = env.bgrid().arg("extract").arg(&input).output().unwrap();

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let v = json(&out);
    assert_eq!(v["metadata"]["file"], "budget.xlsx");
    assert_eq!(v["metadata"]["sheet"], "2026 Budget");
    assert_eq!(v["metadata"]["total_line_items"], 2);
    assert_eq!(v["line_items"][0]["committed_formula"], "=K3-SUM(L4:L4)");
    assert_eq!(v["by_category"]["Labor"], 300.0);
    assert_eq!(v["audit_findings"].as_array().unwrap().len(), 7);
    assert!(stderr(&out).contains("note: 2 line items"));
}

#[test]
fn extract_to_file_creates_parent_dirs() {
    let env = Env::new();
    let input = env.workbook();
    let output = env.path("public/data/budget.json");
    let out = env
        .bgrid()
        .args(["extract", "-q"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).is_empty());
    assert!(stderr(&out).is_empty());
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["totals"]["committed_fy26"], 300.0);
}

#[test]
fn extract_summary_and_csv_formats() {
    let env = Env::new();
    let input = env.workbook();

    let out = env.bgrid().args(["extract", "--format", "summary"]).arg(&input).output().unwrap();
    let v = json(&out);
    assert_eq!(v["line_items"], 2);
    assert_eq!(v["approved"], 300.0);
    assert_eq!(v["actual"], 50.0);

    let out = env.bgrid().args(["extract", "-f", "csv"]).arg(&input).output().unwrap();
    let text = stdout(&out);
    assert!(text.starts_with("row,category,event_type,"));
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn missing_sheet_exits_4_with_available_sheets() {
    let env = Env::new();
    let input = env.workbook();
    let out = env
        .bgrid()
        .arg("extract")
        .arg(&input)
        .args(["--sheet", "2027 Budget"])
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(4));
    assert!(stdout(&out).is_empty());
    assert!(stderr(&out)
        .contains("sheet '2027 Budget' not found (available: Instructions, 2026 Budget)"));
}

#[test]
fn missing_input_exits_3() {
    let env = Env::new();
    let out = env.bgrid().arg("extract").arg(env.path("nope.xlsx")).output().unwrap();
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn unreadable_workbook_exits_5() {
    let env = Env::new();
    let input = env.path("budget.xlsx");
    std::fs::write(&input, "not a workbook").unwrap();
    let out = env.bgrid().arg("extract").arg(&input).output().unwrap();
    assert_eq!(out.status.code(), Some(5));
}

#[test]
fn bad_settings_file_exits_2() {
    let env = Env::new();
    std::fs::write(env.path("settings.json"), "{ \"extract\": ").unwrap();
    let input = env.workbook();
    let out = env.bgrid().arg("extract").arg(&input).output().unwrap();
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn settings_choose_the_sheet() {
    let env = Env::new();
    std::fs::write(env.path("settings.json"), r#"{ "extract": { "sheet": "Instructions" } }"#).unwrap();
    let input = env.workbook();
    let out = env.bgrid().arg("extract").arg(&input).output().unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(json(&out)["metadata"]["sheet"], "Instructions");
}

// ===========================================================================
// upload / latest
// ===========================================================================

#[test]
fn upload_without_configured_token_is_refused() {
    let env = Env::new();
    let input = env.workbook();
    let out = env
        .bgrid()
        .args(["upload", "--db", env.db().as_str(), "--authorization", "Bearer anything"])
        .arg(&input)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(7));
    assert!(stderr(&out).contains(TOKEN_ENV));
}

#[test]
fn upload_with_wrong_token_stores_nothing() {
    let env = Env::new();
    let input = env.workbook();
    let out = env
        .bgrid()
        .env(TOKEN_ENV, "s3cret")
        .args(["upload", "--db", env.db().as_str(), "--authorization", "Bearer wrong"])
        .arg(&input)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(7));

    let out = env.bgrid().args(["latest", "--db", env.db().as_str()]).output().unwrap();
    assert_eq!(out.status.code(), Some(8));
}

#[test]
fn upload_then_latest() {
    let env = Env::new();
    let input = env.workbook();
    let out = env
        .bgrid()
        .env(TOKEN_ENV, "s3cret")
        .env("BUDGETGRID_AUTHORIZATION", "Bearer s3cret")
        .args(["upload", "--db", env.db().as_str()])
        .arg(&input)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let receipt = json(&out);
    assert_eq!(receipt["name"], "budget");
    assert_eq!(receipt["summary"]["committed"], 300.0);

    let out = env.bgrid().args(["latest", "--db", env.db().as_str()]).output().unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let v = json(&out);
    assert_eq!(v["metadata"]["file"], "budget.xlsx");
    assert_eq!(v["line_items"].as_array().unwrap().len(), 2);
}

#[test]
fn upload_from_stdin() {
    let env = Env::new();
    let bytes = std::fs::read(env.workbook()).unwrap();
    let mut cmd = env.bgrid();
    cmd.env(TOKEN_ENV, "s3cret")
        .args(["upload", "-", "--name", "q1", "--db", env.db().as_str(), "--authorization", "Bearer s3cret"]);
    let out = run_with_stdin(cmd, &bytes);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(json(&out)["name"], "q1");

    let out = env
        .bgrid()
        .args(["latest", "--name", "q1", "--format", "summary", "--db", env.db().as_str()])
        .output()
        .unwrap();
    assert_eq!(json(&out)["line_items"], 2);
}

#[test]
fn extract_store_feeds_latest() {
    let env = Env::new();
    let input = env.workbook();
    let out = env
        .bgrid()
        .args(["extract", "--store", "--db", env.db().as_str(), "-o"])
        .arg(env.path("out.json"))
        .arg(&input)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let out = env.bgrid().args(["latest", "--db", env.db().as_str(), "-f", "csv"]).output().unwrap();
    assert!(out.status.success());
    assert_eq!(stdout(&out).lines().count(), 3);
}

#[test]
fn extract_store_with_unwritable_output_stores_nothing() {
    let env = Env::new();
    let input = env.workbook();
    let target = env.path("out");
    std::fs::create_dir_all(&target).unwrap();

    let out = env
        .bgrid()
        .args(["extract", "--store", "--db", env.db().as_str(), "-o"])
        .arg(&target)
        .arg(&input)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3), "stderr: {}", stderr(&out));

    let out = env.bgrid().args(["latest", "--db", env.db().as_str()]).output().unwrap();
    assert_eq!(out.status.code(), Some(8));
}

#[test]
fn latest_on_empty_store_exits_8() {
    let env = Env::new();
    let out = env.bgrid().args(["latest", "--db", env.db().as_str()]).output().unwrap();
    assert_eq!(out.status.code(), Some(8));
    assert!(stdout(&out).is_empty());
}

// ===========================================================================
// annotations
// ===========================================================================

#[test]
fn annotations_prints_builtin_set() {
    let env = Env::new();
    let out = env.bgrid().arg("annotations").output().unwrap();
    assert!(out.status.success());
    let v = json(&out);
    assert_eq!(v["version"], "2026-02-08");
    assert_eq!(v["recommendations"].as_array().unwrap().len(), 7);
}

#[test]
fn custom_annotations_replace_builtin() {
    let env = Env::new();
    let notes = env.path("notes.toml");
    std::fs::write(
        &notes,
        "version = \"v2\"\n\n[[audit_findings]]\nid = 1\nseverity = \"info\"\ntitle = \"t\"\ndetail = \"d\"\n",
    )
    .unwrap();
    let input = env.workbook();
    let out = env
        .bgrid()
        .arg("extract")
        .arg(&input)
        .arg("--annotations")
        .arg(&notes)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let v = json(&out);
    assert_eq!(v["audit_findings"].as_array().unwrap().len(), 1);
    assert!(v["recommendations"].as_array().unwrap().is_empty());
}

#[test]
fn invalid_annotations_exit_2() {
    let env = Env::new();
    let notes = env.path("notes.toml");
    std::fs::write(&notes, "version = \"\"\n").unwrap();
    let out = env.bgrid().arg("annotations").arg(&notes).output().unwrap();
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("notes.toml"));
}
