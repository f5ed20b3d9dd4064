//! Cell values and rich text.

use serde::{Deserialize, Serialize};

/// Kind of a text decoration line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecorationKind {
    #[default]
    Single,
    Double,
}

/// An underline or strikethrough decoration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    /// Whether the line is drawn
    pub show: bool,
    #[serde(rename = "type")]
    pub kind: DecorationKind,
}

impl Decoration {
    /// A visible single line.
    pub fn single() -> Self {
        Self {
            show: true,
            kind: DecorationKind::Single,
        }
    }
}

/// Character formatting of a rich-text run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default)]
    pub bold: bool,

    #[serde(default)]
    pub italic: bool,

    /// Font size in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<Decoration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<Decoration>,

    /// `#RRGGBBAA` color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A styled span of a rich-text data stream.
///
/// Offsets count UTF-16 code units, the unit the editing engine indexes by.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub start: usize,
    pub end: usize,
    pub style: TextStyle,
}

/// Kind of a custom range laid over rich text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomRangeType {
    #[default]
    Hyperlink,
}

/// A non-formatting span over rich text, such as a hyperlink.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRange {
    /// Identifier unique within one import
    pub range_id: String,
    pub range_type: CustomRangeType,
    pub start_index: usize,
    pub end_index: usize,
    pub url: String,
}

/// Line terminator every rich-text data stream ends with.
pub const PARAGRAPH_TERMINATOR: &str = "\r\n";

/// A rich-text document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichText {
    /// Concatenated run text followed by [`PARAGRAPH_TERMINATOR`]
    pub data_stream: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_runs: Vec<TextRun>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_ranges: Vec<CustomRange>,
}

impl Default for RichText {
    fn default() -> Self {
        Self::from_text("")
    }
}

impl RichText {
    /// A body holding `text` with no formatting.
    pub fn from_text(text: &str) -> Self {
        Self {
            data_stream: format!("{}{}", text, PARAGRAPH_TERMINATOR),
            text_runs: Vec::new(),
            custom_ranges: Vec::new(),
        }
    }

    /// The text without the trailing terminator.
    pub fn text(&self) -> &str {
        self.data_stream
            .strip_suffix(PARAGRAPH_TERMINATOR)
            .unwrap_or(&self.data_stream)
    }

    /// Length of [`RichText::text`] in UTF-16 code units.
    pub fn text_len(&self) -> usize {
        utf16_len(self.text())
    }

    /// Length of the whole data stream, terminator included, in UTF-16 code units.
    pub fn stream_len(&self) -> usize {
        utf16_len(&self.data_stream)
    }

    /// Lay a hyperlink over `[0, end_index)`.
    pub fn link(
        &mut self,
        range_id: impl Into<String>,
        url: impl Into<String>,
        end_index: usize,
    ) {
        self.custom_ranges.push(CustomRange {
            range_id: range_id.into(),
            range_type: CustomRangeType::Hyperlink,
            start_index: 0,
            end_index,
            url: url.into(),
        });
    }

    /// Target of the first hyperlink range, if any.
    pub fn hyperlink(&self) -> Option<&str> {
        self.custom_ranges
            .iter()
            .find(|r| r.range_type == CustomRangeType::Hyperlink)
            .map(|r| r.url.as_str())
    }
}

/// Length of `text` in UTF-16 code units.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// A typed cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum CellValue {
    Number(f64),
    Boolean(bool),
    String(String),
    RichText(RichText),
    /// An error literal such as `#DIV/0!`
    Error(String),
    /// The cell exists (e.g. it carries a style) but holds no value
    Empty,
}

impl CellValue {
    /// Plain-text rendering of the value.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Number(n) => n.to_string(),
            CellValue::Boolean(true) => "TRUE".to_string(),
            CellValue::Boolean(false) => "FALSE".to_string(),
            CellValue::String(s) | CellValue::Error(s) => s.clone(),
            CellValue::RichText(rt) => rt.text().to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

/// A decoded cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    #[serde(flatten)]
    pub value: CellValue,

    /// Formula text, prefixed with `=`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,

    /// Index into the workbook style table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<usize>,
}

impl Cell {
    /// A cell with a value and nothing else.
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            formula: None,
            style: None,
        }
    }

    /// Hyperlink target, when the value is rich text carrying one.
    pub fn hyperlink(&self) -> Option<&str> {
        match &self.value {
            CellValue::RichText(rt) => rt.hyperlink(),
            _ => None,
        }
    }
}
