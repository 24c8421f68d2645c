// BudgetGrid CLI - budget workbook extraction, upload and snapshots

mod exit_codes;
mod upload;

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use budgetgrid_config::{load_annotations, Settings};
use budgetgrid_extract::snapshot::{Snapshot, SnapshotStore};
use budgetgrid_extract::{Annotations, ExtractError, ExtractOptions, ExtractionResult};
use budgetgrid_io::{SnapshotError, SqliteSnapshotStore};

use exit_codes::{
    EXIT_ERROR, EXIT_IO, EXIT_NO_SNAPSHOT, EXIT_SHEET_NOT_FOUND, EXIT_SNAPSHOT_STORE,
    EXIT_SUCCESS, EXIT_UNAUTHORIZED, EXIT_USAGE, EXIT_WORKBOOK,
};
use upload::{Refusal, UploadGate};

#[derive(Parser)]
#[command(name = "bgrid")]
#[command(about = "Extract budget workbooks into a normalized JSON data set")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file (default: platform config dir)
    #[arg(long, global = true, env = "BUDGETGRID_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress stderr notes
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that runs an extraction.
#[derive(clap::Args)]
struct ExtractArgs {
    /// Sheet holding the budget table
    #[arg(long)]
    sheet: Option<String>,

    /// Title recorded in the result metadata
    #[arg(long)]
    title: Option<String>,

    /// Table name recorded in the result metadata
    #[arg(long)]
    table_name: Option<String>,

    /// Annotation TOML replacing the built-in audit findings and recommendations
    #[arg(long, value_name = "PATH")]
    annotations: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a budget workbook ahead of time
    #[command(after_help = "\
Examples:
  bgrid extract 'CDO Budget - 2026-02-08.xlsx' -o public/data/budget.json
  bgrid extract budget.xlsx --sheet 'FY27 Budget' --format summary
  bgrid extract budget.xlsx --format csv > line_items.csv")]
    Extract {
        /// Workbook file (xlsx, xlsm, xls, xlsb, ods)
        input: PathBuf,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Also store the result as a snapshot
        #[arg(long)]
        store: bool,

        /// Snapshot database (with --store)
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Accept an uploaded workbook, extract it in memory and store a snapshot
    #[command(after_help = "\
Examples:
  BUDGETGRID_UPLOAD_TOKEN=s3cret bgrid upload budget.xlsx --authorization 'Bearer s3cret'
  curl -s $URL | bgrid upload - --authorization \"$AUTH\"")]
    Upload {
        /// Workbook file, or '-' / omitted for stdin
        input: Option<PathBuf>,

        /// Authorization header value ('Bearer <token>')
        #[arg(long, env = "BUDGETGRID_AUTHORIZATION", hide_env_values = true)]
        authorization: Option<String>,

        /// Snapshot name (default from settings)
        #[arg(long)]
        name: Option<String>,

        /// Snapshot database
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Print the most recently stored snapshot
    Latest {
        /// Only snapshots stored under this name
        #[arg(long)]
        name: Option<String>,

        /// Snapshot database
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,

        /// Output format
        #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Validate and print the annotation set that extractions attach
    Annotations {
        /// Annotation TOML (default: settings, then built-in)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Full extraction result, pretty JSON
    Json,
    /// Line items as flat CSV
    Csv,
    /// Headline totals as JSON
    Summary,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  budgetgrid-extract ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Also installs the `log` bridge, so io/config records land here.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_settings(cli.config.as_deref()).and_then(|settings| {
        let ctx = Context { settings, quiet: cli.quiet };
        match cli.command {
            Commands::Extract { input, output, format, store, db, extract } => {
                cmd_extract(&ctx, &input, output.as_deref(), format, store, db, &extract)
            }
            Commands::Upload { input, authorization, name, db, extract } => {
                cmd_upload(&ctx, input.as_deref(), authorization.as_deref(), name, db, &extract)
            }
            Commands::Latest { name, db, format } => cmd_latest(&ctx, name.as_deref(), db, format),
            Commands::Annotations { path } => cmd_annotations(&ctx, path.as_deref()),
        }
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    pub fn extract(err: ExtractError) -> Self {
        match &err {
            ExtractError::SheetNotFound { .. } => Self::new(EXIT_SHEET_NOT_FOUND, err.to_string())
                .with_hint("pass --sheet or set extract.sheet in settings.json"),
            ExtractError::Workbook(_) => Self::new(EXIT_WORKBOOK, err.to_string()),
            ExtractError::Annotations(_) => Self::usage(err.to_string()),
        }
    }

    pub fn snapshot(err: SnapshotError) -> Self {
        Self::new(EXIT_SNAPSHOT_STORE, err.to_string())
    }

    pub fn refused(refusal: Refusal, token_env: &str) -> Self {
        let err = Self::new(EXIT_UNAUTHORIZED, format!("upload refused: {}", refusal));
        match refusal {
            Refusal::NotConfigured => err.with_hint(format!("set {} to enable uploads", token_env)),
            Refusal::MissingHeader => err.with_hint("pass --authorization or set BUDGETGRID_AUTHORIZATION"),
            _ => err,
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Shared plumbing
// ============================================================================

struct Context {
    settings: Settings,
    quiet: bool,
}

impl Context {
    /// Human-facing progress line on stderr.
    fn note(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            eprintln!("note: {}", msg.as_ref());
        }
    }

    fn options(&self, args: &ExtractArgs, file: Option<&str>) -> ExtractOptions {
        let mut options = self.settings.extract.to_options(file);
        if let Some(sheet) = &args.sheet {
            options.sheet = sheet.clone();
        }
        if let Some(title) = &args.title {
            options.title = title.clone();
        }
        if let Some(table_name) = &args.table_name {
            options.table_name = table_name.clone();
        }
        options
    }

    fn annotations(&self, args: &ExtractArgs) -> Result<Annotations, CliError> {
        let path = args.annotations.as_deref().or(self.settings.annotations_path.as_deref());
        load_annotations(path).map_err(CliError::usage)
    }

    fn open_store(&self, db: Option<PathBuf>) -> Result<SqliteSnapshotStore, CliError> {
        let path = db.unwrap_or_else(|| self.settings.snapshots.effective_database());
        tracing::debug!(path = %path.display(), "opening snapshot store");
        SqliteSnapshotStore::open(&path).map_err(CliError::snapshot)
    }

    fn snapshot_name<'a>(&'a self, name: Option<&'a str>) -> &'a str {
        name.unwrap_or_else(|| self.settings.snapshots.effective_name())
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    match path {
        Some(path) => Settings::load_from(path).map_err(CliError::usage),
        None => Ok(Settings::load()),
    }
}

fn file_label(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Write the payload to a file, or to stdout when no path is given.
fn emit(output: Option<&Path>, write: impl FnOnce(&mut dyn Write) -> Result<(), String>) -> Result<(), CliError> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| CliError::io(format!("{}: {}", parent.display(), e)))?;
            }
            let file = std::fs::File::create(path).map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
            let mut writer = io::BufWriter::new(file);
            write(&mut writer).map_err(CliError::io)?;
            writer.flush().map_err(|e| CliError::io(e.to_string()))
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write(&mut handle).map_err(CliError::io)?;
            handle.flush().map_err(|e| CliError::io(e.to_string()))
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))
}

fn write_result(out: &mut dyn Write, result: &ExtractionResult, format: OutputFormat) -> Result<(), String> {
    match format {
        OutputFormat::Json => budgetgrid_io::json::write_result_to(out, result),
        OutputFormat::Csv => budgetgrid_io::csv::write_line_items(out, &result.line_items),
        OutputFormat::Summary => {
            serde_json::to_writer_pretty(&mut *out, &result.summary()).map_err(|e| e.to_string())?;
            writeln!(out).map_err(|e| e.to_string())
        }
    }
}

fn report(ctx: &Context, result: &ExtractionResult) {
    let s = result.summary();
    ctx.note(format!(
        "{} line items from '{}' (totals row {})",
        s.line_items, result.metadata.sheet, result.metadata.totals_row
    ));
    ctx.note(format!(
        "approved {:.2}, committed {:.2}, forecast {:.2}, actual {:.2}",
        s.approved, s.committed, s.forecast, s.actual
    ));
}

// ============================================================================
// extract
// ============================================================================

fn cmd_extract(
    ctx: &Context,
    input: &Path,
    output: Option<&Path>,
    format: OutputFormat,
    store: bool,
    db: Option<PathBuf>,
    args: &ExtractArgs,
) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::io(format!("{}: no such file", input.display())));
    }

    let options = ctx.options(args, file_label(input).as_deref());
    let annotations = ctx.annotations(args)?;
    tracing::debug!(sheet = %options.sheet, input = %input.display(), "extracting");

    let result = budgetgrid_io::extract_path(input, &options, &annotations).map_err(CliError::extract)?;
    report(ctx, &result);

    // The snapshot is committed only once the output has been written.
    let mut snapshots = if store { Some(ctx.open_store(db)?) } else { None };

    emit(output, |out| write_result(out, &result, format))?;
    if let Some(path) = output {
        ctx.note(format!("wrote {}", path.display()));
    }

    if let Some(snapshots) = snapshots.as_mut() {
        let info = snapshots
            .save(ctx.snapshot_name(None), &result)
            .map_err(CliError::snapshot)?;
        ctx.note(format!("stored snapshot {} '{}'", info.id, info.name));
    }
    Ok(())
}

// ============================================================================
// upload
// ============================================================================

fn read_upload(input: Option<&Path>) -> Result<Vec<u8>, CliError> {
    match input {
        Some(path) if path != Path::new("-") => {
            std::fs::read(path).map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))
        }
        _ => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .map_err(|e| CliError::io(format!("stdin: {}", e)))?;
            Ok(bytes)
        }
    }
}

fn cmd_upload(
    ctx: &Context,
    input: Option<&Path>,
    authorization: Option<&str>,
    name: Option<String>,
    db: Option<PathBuf>,
    args: &ExtractArgs,
) -> Result<(), CliError> {
    let token_env = &ctx.settings.upload.token_env;
    UploadGate::from_env(token_env)
        .authorize(authorization)
        .map_err(|refusal| CliError::refused(refusal, token_env))?;

    let bytes = read_upload(input)?;
    if bytes.is_empty() {
        return Err(CliError::usage("upload body is empty"));
    }
    tracing::debug!(bytes = bytes.len(), "upload accepted");

    let label = input.filter(|p| *p != Path::new("-")).and_then(file_label);
    let options = ctx.options(args, label.as_deref());
    let annotations = ctx.annotations(args)?;

    let result = budgetgrid_io::extract_bytes(bytes, &options, &annotations).map_err(CliError::extract)?;
    report(ctx, &result);

    let mut snapshots = ctx.open_store(db)?;
    let info = snapshots
        .save(ctx.snapshot_name(name.as_deref()), &result)
        .map_err(CliError::snapshot)?;
    ctx.note(format!("stored snapshot {} '{}'", info.id, info.name));

    let receipt = to_json(&serde_json::json!({
        "id": info.id,
        "name": info.name,
        "stored_at": info.stored_at,
        "summary": result.summary(),
    }))?;
    emit(None, |out| writeln!(out, "{}", receipt).map_err(|e| e.to_string()))
}

// ============================================================================
// latest
// ============================================================================

fn cmd_latest(
    ctx: &Context,
    name: Option<&str>,
    db: Option<PathBuf>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let snapshots = ctx.open_store(db)?;
    let latest: Option<Snapshot> = match name {
        Some(name) => snapshots.latest_named(name),
        None => snapshots.latest(),
    }
    .map_err(CliError::snapshot)?;

    let Some(snapshot) = latest else {
        return Err(CliError::new(EXIT_NO_SNAPSHOT, "no snapshot stored yet")
            .with_hint("run `bgrid upload` or `bgrid extract --store` first"));
    };

    ctx.note(format!(
        "snapshot {} '{}' stored {}",
        snapshot.info.id,
        snapshot.info.name,
        snapshot.info.stored_at.to_rfc3339()
    ));
    emit(None, |out| write_result(out, &snapshot.result, format))
}

// ============================================================================
// annotations
// ============================================================================

fn cmd_annotations(ctx: &Context, path: Option<&Path>) -> Result<(), CliError> {
    let path = path.or(ctx.settings.annotations_path.as_deref());
    let annotations = load_annotations(path).map_err(CliError::usage)?;
    ctx.note(format!(
        "annotations {}: {} audit findings, {} recommendations",
        annotations.version,
        annotations.audit_findings.len(),
        annotations.recommendations.len()
    ));
    let json = to_json(&annotations)?;
    emit(None, |out| writeln!(out, "{}", json).map_err(|e| e.to_string()))
}
