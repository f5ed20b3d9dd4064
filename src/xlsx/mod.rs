//! XLSX (Excel) workbook importer.
//!
//! Reads a SpreadsheetML package and produces the canonical
//! [`Workbook`](crate::model::Workbook) model.
//!
//! # Example
//!
//! ```no_run
//! use xlsx_ingest::xlsx::{ImportOptions, XlsxImporter};
//!
//! let importer = XlsxImporter::open("budget.xlsx")?
//!     .with_options(ImportOptions::new().with_name("Budget"));
//! let workbook = importer.import()?;
//!
//! for sheet in workbook.ordered_sheets() {
//!     println!("Sheet {}: {} cells", sheet.name, sheet.cell_count());
//! }
//! # Ok::<(), xlsx_ingest::Error>(())
//! ```

mod cells;
mod importer;
mod options;
pub mod reference;
mod shared_strings;
mod sheet;
mod styles;
pub mod units;

pub use cells::CellType;
pub use importer::XlsxImporter;
pub use options::{ImportOptions, DEFAULT_WORKBOOK_NAME};
pub use shared_strings::{SharedString, SharedStrings};
pub use sheet::{RawCell, RawHyperlink, SheetScan, MAX_COLUMNS};
pub use styles::{map_text_rotation, StyleTable};
