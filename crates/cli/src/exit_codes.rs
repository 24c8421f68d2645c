//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `bgrid` exit codes.
//! Exit codes are part of the shell contract: build scripts and CI jobs
//! branch on them.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (unspecified)                        |
//! | 2    | Usage error (bad args, bad settings/annotations)   |
//! | 3    | I/O error (cannot read input or write output)      |
//! | 4    | Configured budget sheet not found in the workbook  |
//! | 5    | Workbook cannot be opened or parsed                |
//! | 6    | Snapshot store error                               |
//! | 7    | Upload refused by the bearer-token gate            |
//! | 8    | No snapshot stored yet                             |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unreadable settings or annotation file.
pub const EXIT_USAGE: u8 = 2;

/// Input file unreadable or output cannot be written.
pub const EXIT_IO: u8 = 3;

/// The workbook has no sheet with the configured name.
pub const EXIT_SHEET_NOT_FOUND: u8 = 4;

/// The input is not a readable workbook.
pub const EXIT_WORKBOOK: u8 = 5;

/// Snapshot database cannot be opened, written or read.
pub const EXIT_SNAPSHOT_STORE: u8 = 6;

/// Missing, malformed or wrong bearer token (or no token configured).
pub const EXIT_UNAUTHORIZED: u8 = 7;

/// `latest` found an empty store.
pub const EXIT_NO_SNAPSHOT: u8 = 8;
