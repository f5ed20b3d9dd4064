//! Worksheet part scanning.
//!
//! One pass over a worksheet part collects view settings, sizing, merges,
//! hyperlinks and the raw cells. Hyperlinks are declared after the cell
//! data, so cells are only decoded once the scan is complete.

use crate::container::Relationships;
use crate::error::{Error, Result};
use crate::model::{ColumnSpec, Freeze, Range, RowSpec};
use crate::xml::{get_attr, get_relationship_id, parse_number};
use quick_xml::events::{BytesStart, Event};
use std::collections::{BTreeMap, HashMap};

use super::reference::{column_index, format_cell, parse_range};
use super::shared_strings::{SharedString, StringItemBuilder};
use super::units::{argb_to_rgb, column_width_to_px, row_height_to_px};

/// Highest column number a worksheet can address (`XFD`).
pub const MAX_COLUMNS: u32 = 16_384;

/// A `<c>` element before decoding.
#[derive(Debug, Clone, Default)]
pub struct RawCell {
    /// 0-based row
    pub row: u32,
    /// 0-based column
    pub column: u32,
    /// The A1 reference the cell was declared with
    pub reference: String,
    /// Declared type code, `"n"` when absent
    pub type_code: String,
    pub style: Option<usize>,
    /// Text of `<v>`
    pub value: Option<String>,
    /// Text of `<f>`
    pub formula: Option<String>,
    /// Content of `<is>`
    pub inline: Option<SharedString>,
}

/// A `<hyperlink>` element before resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawHyperlink {
    pub reference: String,
    pub location: Option<String>,
    pub rel_id: Option<String>,
}

/// Everything read from one worksheet part.
#[derive(Debug, Clone)]
pub struct SheetScan {
    pub tab_color: Option<String>,
    pub show_gridlines: bool,
    pub right_to_left: bool,
    pub freeze: Freeze,
    pub default_column_width: Option<f64>,
    pub default_row_height: Option<f64>,
    pub columns: BTreeMap<u32, ColumnSpec>,
    pub rows: BTreeMap<u32, RowSpec>,
    pub merges: Vec<Range>,
    pub hyperlinks: Vec<RawHyperlink>,
    pub cells: Vec<RawCell>,
}

impl Default for SheetScan {
    fn default() -> Self {
        Self {
            tab_color: None,
            show_gridlines: true,
            right_to_left: false,
            freeze: Freeze::default(),
            default_column_width: None,
            default_row_height: None,
            columns: BTreeMap::new(),
            rows: BTreeMap::new(),
            merges: Vec::new(),
            hyperlinks: Vec::new(),
            cells: Vec::new(),
        }
    }
}

/// Which `<c>` child is collecting text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellText {
    None,
    Value,
    Formula,
}

/// Event-driven state while reading a worksheet part.
struct SheetReader {
    scan: SheetScan,
    in_sheet_pr: bool,
    sheet_views_seen: usize,
    in_sheet_view: bool,
    pane_seen: bool,
    in_cols: bool,
    in_merge_cells: bool,
    in_hyperlinks: bool,
    in_sheet_data: bool,
    row: Option<u32>,
    last_row: Option<u32>,
    last_column: Option<u32>,
    cell: Option<RawCell>,
    cell_text: CellText,
    inline: Option<StringItemBuilder>,
}

impl SheetReader {
    fn new() -> Self {
        Self {
            scan: SheetScan::default(),
            in_sheet_pr: false,
            sheet_views_seen: 0,
            in_sheet_view: false,
            pane_seen: false,
            in_cols: false,
            in_merge_cells: false,
            in_hyperlinks: false,
            in_sheet_data: false,
            row: None,
            last_row: None,
            last_column: None,
            cell: None,
            cell_text: CellText::None,
            inline: None,
        }
    }

    fn start(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<()> {
        let name = e.local_name();
        let name = name.as_ref();

        if let Some(builder) = self.inline.as_mut() {
            builder.start(e, empty);
            return Ok(());
        }

        if let Some(cell) = self.cell.as_mut() {
            match name {
                b"v" => {
                    cell.value.get_or_insert_with(String::new);
                    self.cell_text = if empty { CellText::None } else { CellText::Value };
                }
                b"f" => {
                    cell.formula.get_or_insert_with(String::new);
                    self.cell_text = if empty { CellText::None } else { CellText::Formula };
                }
                b"is" if empty => cell.inline = Some(SharedString::default()),
                b"is" => self.inline = Some(StringItemBuilder::new()),
                _ => {}
            }
            return Ok(());
        }

        match name {
            b"sheetPr" => self.in_sheet_pr = !empty,
            b"tabColor" if self.in_sheet_pr => {
                self.scan.tab_color = get_attr(e, b"rgb").map(|rgb| argb_to_rgb(&rgb));
            }
            b"sheetView" => {
                self.sheet_views_seen += 1;
                if self.sheet_views_seen == 1 {
                    self.read_sheet_view(e);
                    self.in_sheet_view = !empty;
                }
            }
            b"pane" if self.in_sheet_view && !self.pane_seen => {
                self.pane_seen = true;
                self.read_pane(e)?;
            }
            b"sheetFormatPr" => {
                self.scan.default_column_width = get_attr(e, b"defaultColWidth")
                    .and_then(|v| parse_number(&v, "default column width"))
                    .map(column_width_to_px);
                self.scan.default_row_height = get_attr(e, b"defaultRowHeight")
                    .and_then(|v| parse_number(&v, "default row height"))
                    .map(row_height_to_px);
            }
            b"cols" => self.in_cols = !empty,
            b"col" if self.in_cols => self.read_column(e),
            b"sheetData" => self.in_sheet_data = !empty,
            b"row" if self.in_sheet_data => {
                let row = self.read_row(e);
                if !empty {
                    self.row = Some(row);
                    self.last_column = None;
                }
            }
            b"c" if self.row.is_some() => {
                let cell = self.read_cell(e);
                if empty {
                    self.scan.cells.push(cell);
                } else {
                    self.cell = Some(cell);
                }
            }
            b"mergeCells" => self.in_merge_cells = !empty,
            b"mergeCell" if self.in_merge_cells => {
                if let Some(reference) = get_attr(e, b"ref") {
                    self.scan.merges.push(parse_range(&reference)?);
                }
            }
            b"hyperlinks" => self.in_hyperlinks = !empty,
            b"hyperlink" if self.in_hyperlinks => {
                if let Some(reference) = get_attr(e, b"ref") {
                    self.scan.hyperlinks.push(RawHyperlink {
                        reference,
                        location: get_attr(e, b"location"),
                        rel_id: get_relationship_id(e),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some(builder) = self.inline.as_mut() {
            builder.text(text);
            return;
        }
        let Some(cell) = self.cell.as_mut() else {
            return;
        };
        let target = match self.cell_text {
            CellText::Value => cell.value.get_or_insert_with(String::new),
            CellText::Formula => cell.formula.get_or_insert_with(String::new),
            CellText::None => return,
        };
        target.push_str(text);
    }

    fn end(&mut self, name: &[u8]) {
        if self.inline.is_some() {
            if name == b"is" {
                let item = self.inline.take().map(StringItemBuilder::finish);
                if let Some(cell) = self.cell.as_mut() {
                    cell.inline = item;
                }
            } else if let Some(builder) = self.inline.as_mut() {
                builder.end(name);
            }
            return;
        }

        match name {
            b"v" | b"f" => self.cell_text = CellText::None,
            b"c" => {
                if let Some(cell) = self.cell.take() {
                    self.scan.cells.push(cell);
                }
                self.cell_text = CellText::None;
            }
            b"row" => self.row = None,
            b"sheetPr" => self.in_sheet_pr = false,
            b"sheetView" => self.in_sheet_view = false,
            b"cols" => self.in_cols = false,
            b"sheetData" => self.in_sheet_data = false,
            b"mergeCells" => self.in_merge_cells = false,
            b"hyperlinks" => self.in_hyperlinks = false,
            _ => {}
        }
    }

    fn read_sheet_view(&mut self, e: &BytesStart<'_>) {
        self.scan.show_gridlines = get_attr(e, b"showGridLines").as_deref() != Some("0");
        self.scan.right_to_left = matches!(
            get_attr(e, b"rightToLeft").as_deref(),
            Some("1") | Some("true")
        );
    }

    /// A declared split of `n` becomes split count `n + 1` starting at index `n`.
    fn read_pane(&mut self, e: &BytesStart<'_>) -> Result<()> {
        if let Some(top_left) = get_attr(e, b"topLeftCell") {
            parse_range(&top_left)?;
        }
        let split = |key: &[u8]| {
            get_attr(e, key)
                .and_then(|v| parse_number::<f64>(&v, "pane split"))
                .map(|v| v as i32)
        };
        let freeze = &mut self.scan.freeze;
        if let Some(x) = split(b"xSplit".as_slice()) {
            freeze.x_split = x + 1;
            freeze.start_column = x;
        }
        if let Some(y) = split(b"ySplit".as_slice()) {
            freeze.y_split = y + 1;
            freeze.start_row = y;
        }
        Ok(())
    }

    fn read_column(&mut self, e: &BytesStart<'_>) {
        let bound = |key: &[u8]| get_attr(e, key).and_then(|v| parse_number::<u32>(&v, "column bound"));
        let (Some(min), Some(max)) = (bound(b"min".as_slice()), bound(b"max".as_slice())) else {
            return;
        };
        if min == 0 {
            log::warn!("ignoring column range starting at 0");
            return;
        }

        let width = if get_attr(e, b"customWidth").as_deref() == Some("1") {
            get_attr(e, b"width")
                .and_then(|v| parse_number(&v, "column width"))
                .map(column_width_to_px)
        } else {
            None
        };
        let spec = ColumnSpec {
            width,
            hidden: get_attr(e, b"hidden").as_deref() == Some("1"),
        };
        if spec == ColumnSpec::default() {
            return;
        }

        for column in (min - 1)..max.min(MAX_COLUMNS) {
            self.scan.columns.insert(column, spec);
        }
    }

    /// Returns the 0-based row index.
    fn read_row(&mut self, e: &BytesStart<'_>) -> u32 {
        let row = get_attr(e, b"r")
            .and_then(|v| parse_number::<u32>(&v, "row number"))
            .filter(|r| *r > 0)
            .map(|r| r - 1)
            .unwrap_or_else(|| self.last_row.map_or(0, |r| r + 1));
        self.last_row = Some(row);

        let mut spec = RowSpec::default();
        if get_attr(e, b"customHeight").as_deref() == Some("1") {
            spec.height = get_attr(e, b"ht")
                .and_then(|v| parse_number(&v, "row height"))
                .map(row_height_to_px);
        }
        spec.hidden = get_attr(e, b"hidden").as_deref() == Some("1");
        if spec != RowSpec::default() {
            self.scan.rows.insert(row, spec);
        }
        row
    }

    fn read_cell(&mut self, e: &BytesStart<'_>) -> RawCell {
        let row = self.row.unwrap_or(0);
        let declared = get_attr(e, b"r");
        let column = declared
            .as_deref()
            .and_then(column_index)
            .unwrap_or_else(|| self.last_column.map_or(0, |c| c + 1));
        self.last_column = Some(column);

        RawCell {
            row,
            column,
            reference: declared.unwrap_or_else(|| format_cell(row, column)),
            type_code: get_attr(e, b"t").unwrap_or_else(|| "n".to_string()),
            style: get_attr(e, b"s").and_then(|v| parse_number(&v, "style index")),
            value: None,
            formula: None,
            inline: None,
        }
    }
}

impl SheetScan {
    /// Scan a worksheet part.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = quick_xml::Reader::from_str(xml);
        // Cell values and inline strings keep their whitespace.
        reader.config_mut().trim_text(false);

        let mut state = SheetReader::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => state.start(e, false)?,
                Ok(Event::Empty(ref e)) => state.start(e, true)?,
                Ok(Event::Text(ref e)) => {
                    let text = e.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                    state.text(&text);
                }
                Ok(Event::CData(ref e)) => state.text(&String::from_utf8_lossy(e)),
                Ok(Event::End(ref e)) => state.end(e.local_name().as_ref()),
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        let scan = state.scan;
        log::debug!(
            "scanned worksheet: {} cells, {} merges, {} hyperlinks",
            scan.cells.len(),
            scan.merges.len(),
            scan.hyperlinks.len()
        );
        Ok(scan)
    }

    /// Resolve hyperlinks into a map from cell reference to target.
    ///
    /// `Sheet!Range` locations become `#gid=<sheetId>&range=<range>` using
    /// `sheet_ids` (name -> id); relationship links take the relationship's
    /// target. Locations naming an unknown sheet produce no link.
    pub fn resolve_hyperlinks(
        &self,
        sheet_ids: &HashMap<String, String>,
        relationships: &Relationships,
    ) -> Result<HashMap<String, String>> {
        let mut links = HashMap::new();

        for link in &self.hyperlinks {
            if let Some(location) = link.location.as_deref() {
                match resolve_location(location, sheet_ids) {
                    Some(target) => {
                        links.insert(link.reference.clone(), target);
                    }
                    None => log::debug!("hyperlink location {:?} names no known sheet", location),
                }
                continue;
            }

            if let Some(rel_id) = link.rel_id.as_deref() {
                let rel = relationships
                    .get(rel_id)
                    .ok_or_else(|| Error::MissingRelationship(format!("hyperlink {}", rel_id)))?;
                links.insert(link.reference.clone(), rel.target.clone());
            }
        }

        Ok(links)
    }
}

/// Resolve an in-workbook location such as `Data!B2` or `'My Sheet'!A1:C3`.
fn resolve_location(location: &str, sheet_ids: &HashMap<String, String>) -> Option<String> {
    let (sheet, range) = location.rsplit_once('!')?;
    let sheet = match sheet.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        Some(quoted) => quoted.replace("''", "'"),
        None => sheet.to_string(),
    };
    let id = sheet_ids.get(&sheet)?;
    Some(format!("#gid={}&range={}", id, range))
}
