//! Cell value decoding.

use crate::error::{Error, Result};
use crate::model::{Cell, CellValue, RichText};
use std::collections::HashMap;

use super::shared_strings::{SharedString, SharedStrings};
use super::sheet::RawCell;

/// Declared cell type (`t` attribute).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellType {
    /// `n`, also the default
    Number,
    /// `b`
    Boolean,
    /// `e`
    Error,
    /// `s`, an index into the shared strings table
    SharedString,
    /// `str`, a formula's string result
    FormulaString,
    /// `inlineStr`
    InlineString,
    /// `d`, ISO 8601 text
    Date,
}

impl CellType {
    /// Map a type code; unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "n" => CellType::Number,
            "b" => CellType::Boolean,
            "e" => CellType::Error,
            "s" => CellType::SharedString,
            "str" => CellType::FormulaString,
            "inlineStr" => CellType::InlineString,
            "d" => CellType::Date,
            _ => return None,
        })
    }
}

/// Turns raw cells into canonical cells for one worksheet.
pub struct CellDecoder<'a> {
    shared_strings: Option<&'a SharedStrings>,
    styles_declared: bool,
    hyperlinks: &'a HashMap<String, String>,
}

impl<'a> CellDecoder<'a> {
    pub fn new(
        shared_strings: Option<&'a SharedStrings>,
        styles_declared: bool,
        hyperlinks: &'a HashMap<String, String>,
    ) -> Self {
        Self {
            shared_strings,
            styles_declared,
            hyperlinks,
        }
    }

    /// Decode one cell. `Ok(None)` means the cell is dropped.
    pub fn decode(&self, raw: RawCell) -> Result<Option<Cell>> {
        let Some(cell_type) = CellType::from_code(&raw.type_code) else {
            log::warn!(
                "dropping cell {} with unknown type {:?}",
                raw.reference,
                raw.type_code
            );
            return Ok(None);
        };

        if raw.style.is_some() && !self.styles_declared {
            return Err(Error::MissingRelationship("styles".to_string()));
        }

        let formula = raw
            .formula
            .as_deref()
            .filter(|f| !f.is_empty())
            .map(|f| format!("={}", f));
        let value = self.decode_value(cell_type, &raw)?;

        let link = match &formula {
            None => self.hyperlinks.get(&raw.reference),
            Some(_) => None,
        };
        let value = match link {
            Some(url) => linked_value(cell_type, raw.value.as_deref(), value, url),
            None => value,
        };

        Ok(Some(Cell {
            value: value.unwrap_or(CellValue::Empty),
            formula,
            style: raw.style,
        }))
    }

    fn decode_value(&self, cell_type: CellType, raw: &RawCell) -> Result<Option<CellValue>> {
        let text = raw.value.as_deref();
        Ok(match cell_type {
            CellType::Number => text.and_then(|v| match v.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Some(CellValue::Number(n)),
                _ => {
                    log::warn!("cell {} has non-numeric value {:?}", raw.reference, v);
                    None
                }
            }),
            CellType::Boolean => text.map(|v| CellValue::Boolean(v.trim() == "1")),
            CellType::Error => text.map(|v| CellValue::Error(v.to_string())),
            CellType::FormulaString | CellType::Date => {
                text.map(|v| CellValue::String(v.to_string()))
            }
            CellType::InlineString => match &raw.inline {
                Some(item) => Some(shared_value(item.clone())),
                None => text.map(|v| CellValue::String(v.to_string())),
            },
            CellType::SharedString => {
                let table = self
                    .shared_strings
                    .ok_or_else(|| Error::MissingRelationship("sharedStrings".to_string()))?;
                text.and_then(|v| match v.trim().parse::<usize>() {
                    Ok(index) => Some(shared_value(table.get_or_empty(index))),
                    Err(_) => {
                        log::warn!("cell {} has invalid string index {:?}", raw.reference, v);
                        None
                    }
                })
            }
        })
    }
}

fn shared_value(item: SharedString) -> CellValue {
    match item {
        SharedString::Plain(text) => CellValue::String(text),
        SharedString::Rich(rich) => CellValue::RichText(rich),
    }
}

/// Rich text carrying a hyperlink for a cell that has one.
///
/// Strings keep their decoded text and runs. Other values are shown as the
/// raw `<v>` text, booleans as `TRUE`/`FALSE`. A rich table entry is linked
/// over its whole data stream; synthesized text is linked up to the terminator.
fn linked_value(
    cell_type: CellType,
    raw_text: Option<&str>,
    value: Option<CellValue>,
    url: &str,
) -> Option<CellValue> {
    let (mut rich, end_index) = match (cell_type, value) {
        (CellType::SharedString | CellType::InlineString, Some(CellValue::RichText(rich))) => {
            let end = rich.stream_len();
            (rich, end)
        }
        (CellType::SharedString | CellType::InlineString | CellType::Boolean, Some(value)) => {
            let rich = RichText::from_text(&value.to_text());
            let end = rich.text_len();
            (rich, end)
        }
        (CellType::SharedString | CellType::InlineString | CellType::Boolean, None) => {
            return None
        }
        (_, value) => match raw_text {
            Some(text) => {
                let rich = RichText::from_text(text);
                let end = rich.text_len();
                (rich, end)
            }
            None => return value,
        },
    };
    rich.link(uuid::Uuid::new_v4().to_string(), url, end_index);
    Some(CellValue::RichText(rich))
}
