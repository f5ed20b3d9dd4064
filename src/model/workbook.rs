//! Workbook and worksheet structures.

use super::{Cell, Style};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Locale tag attached to an imported workbook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "enUS")]
    EnUs,
    #[serde(rename = "frFR")]
    FrFr,
    #[serde(rename = "ruRU")]
    RuRu,
    #[serde(rename = "esES")]
    EsEs,
    #[serde(rename = "zhCN")]
    ZhCn,
    #[serde(rename = "zhTW")]
    ZhTw,
}

impl Locale {
    /// The serialized tag, e.g. `"enUS"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::EnUs => "enUS",
            Locale::FrFr => "frFR",
            Locale::RuRu => "ruRU",
            Locale::EsEs => "esES",
            Locale::ZhCn => "zhCN",
            Locale::ZhTw => "zhTW",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    /// Accepts `enUS`, `en-US` and `en_us` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "enus" => Ok(Locale::EnUs),
            "frfr" => Ok(Locale::FrFr),
            "ruru" => Ok(Locale::RuRu),
            "eses" => Ok(Locale::EsEs),
            "zhcn" => Ok(Locale::ZhCn),
            "zhtw" => Ok(Locale::ZhTw),
            _ => Err(format!("unsupported locale: {}", s)),
        }
    }
}

/// An imported workbook.
///
/// Every id in `sheet_order` has an entry in `sheets` and vice versa. Sheet
/// ids are the package's own `sheetId` values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workbook {
    /// Workbook display name
    pub name: String,

    /// Locale tag
    pub locale: Locale,

    /// Style table, indexed by the cell-format position in the package
    #[serde(default)]
    pub styles: Vec<Style>,

    /// Sheet ids in tab order
    #[serde(default)]
    pub sheet_order: Vec<String>,

    /// Sheets keyed by id
    #[serde(default)]
    pub sheets: BTreeMap<String, Worksheet>,
}

impl Workbook {
    /// Create an empty workbook with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Append a sheet, keeping `sheet_order` and `sheets` in step.
    pub fn add_sheet(&mut self, sheet: Worksheet) {
        if !self.sheets.contains_key(&sheet.id) {
            self.sheet_order.push(sheet.id.clone());
        }
        self.sheets.insert(sheet.id.clone(), sheet);
    }

    /// Look up a sheet by id.
    pub fn sheet(&self, id: &str) -> Option<&Worksheet> {
        self.sheets.get(id)
    }

    /// Look up a sheet by its display name.
    pub fn sheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.values().find(|s| s.name == name)
    }

    /// Sheets in tab order.
    pub fn ordered_sheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.sheet_order.iter().filter_map(|id| self.sheets.get(id))
    }

    /// Style record at `index`.
    pub fn style(&self, index: usize) -> Option<&Style> {
        self.styles.get(index)
    }
}

/// Frozen pane boundary.
///
/// `x_split`/`y_split` are split counts (declared frozen count plus one);
/// `start_column`/`start_row` are the first scrolling index, `-1` when
/// nothing is frozen on that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Freeze {
    pub x_split: i32,
    pub y_split: i32,
    pub start_row: i32,
    pub start_column: i32,
}

impl Default for Freeze {
    fn default() -> Self {
        Self {
            x_split: 0,
            y_split: 0,
            start_row: -1,
            start_column: -1,
        }
    }
}

impl Freeze {
    /// Whether any row or column is frozen.
    pub fn is_frozen(&self) -> bool {
        self.start_row >= 0 || self.start_column >= 0
    }
}

/// A rectangular range, 0-based and inclusive on both ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub start_row: u32,
    pub start_column: u32,
    pub end_row: u32,
    pub end_column: u32,
}

impl Range {
    /// A range covering a single cell.
    pub fn cell(row: u32, column: u32) -> Self {
        Self {
            start_row: row,
            start_column: column,
            end_row: row,
            end_column: column,
        }
    }

    /// Whether `(row, column)` lies inside the range.
    pub fn contains(&self, row: u32, column: u32) -> bool {
        (self.start_row..=self.end_row).contains(&row)
            && (self.start_column..=self.end_column).contains(&column)
    }
}

/// Per-column override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    /// Width in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    #[serde(default)]
    pub hidden: bool,
}

/// Per-row override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSpec {
    /// Height in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,

    #[serde(default)]
    pub hidden: bool,
}

/// An imported worksheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worksheet {
    /// The package `sheetId`
    pub id: String,

    pub name: String,

    /// `#RRGGBBAA` tab color, empty when none is set
    #[serde(default)]
    pub tab_color: String,

    pub hidden: bool,

    pub show_gridlines: bool,

    #[serde(default)]
    pub freeze: Freeze,

    /// Default column width in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_column_width: Option<f64>,

    /// Default row height in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_row_height: Option<f64>,

    /// Sparse column overrides keyed by 0-based column
    #[serde(default)]
    pub column_data: BTreeMap<u32, ColumnSpec>,

    /// Sparse row overrides keyed by 0-based row
    #[serde(default)]
    pub row_data: BTreeMap<u32, RowSpec>,

    #[serde(default)]
    pub merge_data: Vec<Range>,

    /// Sparse cell grid keyed by 0-based row, then 0-based column
    #[serde(default)]
    pub cell_data: BTreeMap<u32, BTreeMap<u32, Cell>>,

    #[serde(default)]
    pub right_to_left: bool,
}

impl Worksheet {
    /// Create an empty, visible worksheet.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tab_color: String::new(),
            hidden: false,
            show_gridlines: true,
            freeze: Freeze::default(),
            default_column_width: None,
            default_row_height: None,
            column_data: BTreeMap::new(),
            row_data: BTreeMap::new(),
            merge_data: Vec::new(),
            cell_data: BTreeMap::new(),
            right_to_left: false,
        }
    }

    /// Cell at 0-based `(row, column)`.
    pub fn cell(&self, row: u32, column: u32) -> Option<&Cell> {
        self.cell_data.get(&row).and_then(|r| r.get(&column))
    }

    /// Store a cell at 0-based `(row, column)`.
    pub fn set_cell(&mut self, row: u32, column: u32, cell: Cell) {
        self.cell_data.entry(row).or_default().insert(column, cell);
    }

    /// Number of stored cells.
    pub fn cell_count(&self) -> usize {
        self.cell_data.values().map(BTreeMap::len).sum()
    }

    /// Bounding range of stored cells, if any.
    pub fn dimension(&self) -> Option<Range> {
        let start_row = *self.cell_data.keys().next()?;
        let end_row = *self.cell_data.keys().next_back()?;
        let columns = self.cell_data.values().flat_map(|r| r.keys().copied());
        let (start_column, end_column) = columns.fold((u32::MAX, 0), |(lo, hi), c| {
            (lo.min(c), hi.max(c))
        });
        Some(Range {
            start_row,
            start_column,
            end_row,
            end_column,
        })
    }

    /// Number of cells carrying a hyperlink.
    pub fn hyperlink_count(&self) -> usize {
        self.cell_data
            .values()
            .flat_map(BTreeMap::values)
            .filter(|c| c.hyperlink().is_some())
            .count()
    }
}
