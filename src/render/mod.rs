//! Output rendering for workbooks.
//!
//! The JSON form is what persistence layers store and what the editing
//! engine loads.
//!
//! # Example
//!
//! ```no_run
//! use xlsx_ingest::{import_file, render::*};
//!
//! let workbook = import_file("budget.xlsx")?;
//! let json = to_json(&workbook, JsonFormat::Pretty)?;
//! # Ok::<(), xlsx_ingest::Error>(())
//! ```

mod json;

pub use json::{from_json, to_json, to_json_default, JsonFormat};
