//! # xlsx-ingest
//!
//! Import Office Open XML spreadsheets (`.xlsx`) into a canonical workbook
//! document: ordered sheets, sparse cell grids, a style table, rich text,
//! hyperlinks, merges and freeze panes.
//!
//! ## Quick Start
//!
//! ```no_run
//! use xlsx_ingest::{import_file, render};
//!
//! let workbook = import_file("budget.xlsx")?;
//! println!("Sheets: {}", workbook.sheet_order.len());
//!
//! // Persist the canonical document
//! let json = render::to_json(&workbook, render::JsonFormat::Compact)?;
//! std::fs::write("budget.json", json)?;
//! # Ok::<(), xlsx_ingest::Error>(())
//! ```
//!
//! ## Options
//!
//! ```no_run
//! use xlsx_ingest::{import_bytes_with_options, ImportOptions, Locale};
//!
//! let data = std::fs::read("budget.xlsx")?;
//! let options = ImportOptions::new()
//!     .with_name("Budget 2024")
//!     .with_locale(Locale::FrFr)
//!     .with_hidden_sheets(false);
//! let workbook = import_bytes_with_options(data, &options)?;
//! # Ok::<(), xlsx_ingest::Error>(())
//! ```

pub mod container;
pub mod error;
pub mod model;
pub mod render;
pub mod xlsx;

mod xml;

// Re-exports
pub use container::{OoxmlContainer, Relationship, Relationships, TargetMode};
pub use error::{Error, Result};
pub use model::{
    Border, BorderSide, BorderStyle, Cell, CellValue, ColumnSpec, CustomRange, Decoration,
    Freeze, Locale, Range, RichText, RowSpec, Style, TextRun, TextStyle, Workbook, Worksheet,
};
pub use xlsx::{ImportOptions, XlsxImporter};

use std::io::{Read, Seek};
use std::path::Path;

/// Import a workbook from raw package bytes with default options.
pub fn import_bytes(data: Vec<u8>) -> Result<Workbook> {
    import_bytes_with_options(data, &ImportOptions::default())
}

/// Import a workbook from raw package bytes.
pub fn import_bytes_with_options(data: Vec<u8>, options: &ImportOptions) -> Result<Workbook> {
    XlsxImporter::from_bytes(data)?
        .with_options(options.clone())
        .import()
}

/// Import a workbook file, naming the workbook after the file stem.
///
/// # Example
///
/// ```no_run
/// use xlsx_ingest::import_file;
///
/// let workbook = import_file("budget.xlsx")?;
/// assert_eq!(workbook.name, "budget");
/// # Ok::<(), xlsx_ingest::Error>(())
/// ```
pub fn import_file(path: impl AsRef<Path>) -> Result<Workbook> {
    let path = path.as_ref();
    let mut options = ImportOptions::default();
    if let Some(stem) = path.file_stem() {
        options.name = stem.to_string_lossy().into_owned();
    }
    import_file_with_options(path, &options)
}

/// Import a workbook file with explicit options.
pub fn import_file_with_options(
    path: impl AsRef<Path>,
    options: &ImportOptions,
) -> Result<Workbook> {
    XlsxImporter::open(path)?
        .with_options(options.clone())
        .import()
}

/// Import a workbook from any seekable reader with default options.
pub fn import_reader<R: Read + Seek>(reader: R) -> Result<Workbook> {
    XlsxImporter::from_reader(reader)?.import()
}
