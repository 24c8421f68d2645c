//! `budgetgrid-extract` - Budget workbook extraction engine.
//!
//! Pure engine crate: reads cells through the [`CellReader`] capability,
//! returns a normalized [`ExtractionResult`]. No file, network or logging
//! dependencies; acquisition adapters live in `budgetgrid-io`.

pub mod aggregate;
pub mod annotations;
pub mod cell;
pub mod classify;
pub mod engine;
pub mod error;
pub mod grid;
pub mod layout;
pub mod mapper;
pub mod model;
pub mod reader;
pub mod snapshot;

pub use annotations::Annotations;
pub use cell::{Cell, CellValue};
pub use engine::{extract, extract_sheet, extract_sheet_on, ExtractOptions};
pub use error::ExtractError;
pub use grid::{Grid, GridWorkbook};
pub use model::{ExtractionResult, Figures, LineItem};
pub use reader::{CellReader, WorkbookSource};
