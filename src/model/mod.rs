//! Canonical workbook document model.
//!
//! These structures are what the importer hands to its consumers: a
//! persistence layer that serializes them to text, and an editing engine
//! that loads them. Field names serialize in camelCase and absent optional
//! attributes are omitted.

mod cell;
mod style;
mod workbook;

pub use cell::*;
pub use style::*;
pub use workbook::*;
