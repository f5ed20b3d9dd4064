//! JSON renderer implementation.

use crate::error::Result;
use crate::model::Workbook;

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Convert a Workbook to JSON.
pub fn to_json(workbook: &Workbook, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(workbook)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(workbook)?,
    };
    Ok(json)
}

/// Convert a Workbook to JSON with default formatting.
pub fn to_json_default(workbook: &Workbook) -> Result<String> {
    to_json(workbook, JsonFormat::default())
}

/// Load a Workbook back from its JSON form.
pub fn from_json(json: &str) -> Result<Workbook> {
    Ok(serde_json::from_str(json)?)
}
