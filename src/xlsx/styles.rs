//! XLSX style table parsing.
//!
//! `xl/styles.xml` holds four lookup tables (number formats, fonts, fills,
//! borders) and the ordered `cellXfs` records that combine them. Each `xf`
//! becomes one canonical [`Style`] at its declaration index.

use crate::error::{Error, Result};
use crate::model::{
    Border, BorderSide, BorderStyle, Decoration, HorizontalAlign, Style, TextDirection,
    TextRotation, VerticalAlign, WrapStrategy,
};
use crate::xml::{get_attr, parse_number, toggle_on};
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;

use super::shared_strings::underline_decoration;
use super::units::argb_to_rgb;

/// Approximate colors for the hatch pattern fills.
fn pattern_color(pattern: &str) -> Option<&'static str> {
    match pattern {
        "gray0625" | "gray125" | "lightGray" => Some("#D3D3D3"),
        "mediumGray" => Some("#A9A9A9"),
        "darkGray" => Some("#787878"),
        _ => None,
    }
}

/// Map a declared `textRotation` to the canonical rotation.
///
/// `(90, 180]` rotates downward as `r - 90`, anything above 180 (Excel
/// writes 255) is stacked vertical text, everything else becomes `-r`.
/// A resulting angle of 0 means no rotation.
pub fn map_text_rotation(declared: i32) -> Option<TextRotation> {
    let rotation = if declared > 90 && declared <= 180 {
        TextRotation {
            angle: declared - 90,
            vertical: false,
        }
    } else if declared > 180 {
        TextRotation {
            angle: 0,
            vertical: true,
        }
    } else {
        TextRotation {
            angle: -declared,
            vertical: false,
        }
    };

    if rotation.angle == 0 && !rotation.vertical {
        None
    } else {
        Some(rotation)
    }
}

fn horizontal_align(value: &str) -> Option<HorizontalAlign> {
    match value {
        "left" => Some(HorizontalAlign::Left),
        "center" => Some(HorizontalAlign::Center),
        "right" => Some(HorizontalAlign::Right),
        _ => None,
    }
}

fn vertical_align(value: &str) -> Option<VerticalAlign> {
    match value {
        "top" => Some(VerticalAlign::Top),
        "center" => Some(VerticalAlign::Middle),
        "bottom" => Some(VerticalAlign::Bottom),
        _ => None,
    }
}

fn wrap_strategy(value: &str) -> Option<WrapStrategy> {
    match value {
        "0" | "false" => Some(WrapStrategy::Clip),
        "1" | "true" => Some(WrapStrategy::Wrap),
        _ => None,
    }
}

fn text_direction(value: &str) -> Option<TextDirection> {
    match value {
        "0" => Some(TextDirection::Unspecified),
        "1" => Some(TextDirection::LeftToRight),
        "2" => Some(TextDirection::RightToLeft),
        _ => None,
    }
}

/// A `<font>` entry.
#[derive(Debug, Clone, Default)]
struct FontRecord {
    size: Option<f64>,
    color: Option<String>,
    name: Option<String>,
    bold: bool,
    italic: bool,
    underline: Option<Decoration>,
    strikethrough: bool,
}

impl FontRecord {
    fn apply(&mut self, name: &[u8], e: &BytesStart<'_>) {
        match name {
            b"sz" => self.size = get_attr(e, b"val").and_then(|v| parse_number(&v, "font size")),
            b"color" => self.color = get_attr(e, b"rgb").map(|rgb| argb_to_rgb(&rgb)),
            b"name" => self.name = get_attr(e, b"val"),
            b"b" => self.bold = toggle_on(e),
            b"i" => self.italic = toggle_on(e),
            b"u" => self.underline = Some(underline_decoration(get_attr(e, b"val").as_deref())),
            b"strike" => self.strikethrough = toggle_on(e),
            _ => {}
        }
    }
}

/// A `<fill>` entry while its children are read.
#[derive(Debug, Default)]
struct FillBuilder {
    /// Local name of the first child element
    kind: Option<Vec<u8>>,
    pattern: Option<String>,
    fg_color: Option<String>,
    bg_color: Option<String>,
}

impl FillBuilder {
    fn start(&mut self, name: &[u8], e: &BytesStart<'_>) {
        if self.kind.is_none() {
            self.kind = Some(name.to_vec());
            if name == b"patternFill" {
                self.pattern = get_attr(e, b"patternType");
            }
            return;
        }
        if self.kind.as_deref() != Some(b"patternFill".as_slice()) {
            return;
        }
        match name {
            b"fgColor" => self.fg_color = get_attr(e, b"rgb"),
            b"bgColor" => self.bg_color = get_attr(e, b"rgb"),
            _ => {}
        }
    }

    /// Only solid fills resolve to their own color; hatch patterns get a fixed gray.
    fn finish(self) -> Option<String> {
        if self.kind.as_deref() != Some(b"patternFill".as_slice()) {
            return None;
        }
        let pattern = self.pattern?;
        if pattern == "solid" {
            if let Some(rgb) = self.bg_color.or(self.fg_color) {
                return Some(argb_to_rgb(&rgb));
            }
        }
        pattern_color(&pattern).map(str::to_string)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Top,
    Bottom,
    Left,
    Right,
    Diagonal,
}

impl Edge {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"top" => Some(Edge::Top),
            b"bottom" => Some(Edge::Bottom),
            b"left" | b"start" => Some(Edge::Left),
            b"right" | b"end" => Some(Edge::Right),
            b"diagonal" => Some(Edge::Diagonal),
            _ => None,
        }
    }
}

/// A `<border>` entry while its children are read.
#[derive(Debug, Default)]
struct BorderBuilder {
    border: Border,
    diagonal_down: bool,
    /// Edge being read, with its mapped style
    current: Option<(Edge, Option<BorderStyle>, Option<String>)>,
}

impl BorderBuilder {
    fn new(e: &BytesStart<'_>) -> Self {
        Self {
            diagonal_down: get_attr(e, b"diagonalDown").is_some(),
            ..Default::default()
        }
    }

    fn start(&mut self, name: &[u8], e: &BytesStart<'_>, empty: bool) {
        if let Some((_, _, color)) = self.current.as_mut() {
            if name == b"color" {
                *color = get_attr(e, b"rgb").map(|rgb| argb_to_rgb(&rgb));
            }
            return;
        }
        if let Some(edge) = Edge::from_name(name) {
            let style = get_attr(e, b"style").and_then(|s| BorderStyle::from_ooxml(&s));
            self.current = Some((edge, style, None));
            if empty {
                self.close_edge();
            }
        }
    }

    fn end(&mut self, name: &[u8]) {
        if self.current.is_some() && Edge::from_name(name).is_some() {
            self.close_edge();
        }
    }

    fn close_edge(&mut self) {
        let Some((edge, style, color)) = self.current.take() else {
            return;
        };
        let side = style.map(|style| BorderSide { style, color });
        let slot = match edge {
            Edge::Top => &mut self.border.top,
            Edge::Bottom => &mut self.border.bottom,
            Edge::Left => &mut self.border.left,
            Edge::Right => &mut self.border.right,
            Edge::Diagonal if self.diagonal_down => &mut self.border.diagonal_down,
            Edge::Diagonal => &mut self.border.diagonal_up,
        };
        if slot.is_none() {
            *slot = side;
        }
    }

    fn finish(self) -> Border {
        self.border
    }
}

fn id_attr<T: std::str::FromStr>(e: &BytesStart<'_>, key: &[u8]) -> Option<T> {
    get_attr(e, key).and_then(|v| v.trim().parse().ok())
}

/// A `cellXfs/xf` record before resolution.
#[derive(Debug, Clone, Default)]
struct XfRecord {
    num_fmt_id: Option<u32>,
    font_id: Option<usize>,
    fill_id: Option<usize>,
    border_id: Option<usize>,
    alignment: HashMap<String, String>,
}

impl XfRecord {
    fn new(e: &BytesStart<'_>) -> Self {
        Self {
            num_fmt_id: id_attr(e, b"numFmtId"),
            font_id: id_attr(e, b"fontId"),
            fill_id: id_attr(e, b"fillId"),
            border_id: id_attr(e, b"borderId"),
            alignment: HashMap::new(),
        }
    }

    fn read_alignment(&mut self, e: &BytesStart<'_>) {
        for attr in e.attributes().flatten() {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            self.alignment.insert(key, crate::xml::attr_value(&attr));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Other,
    NumFmts,
    Fonts,
    Fills,
    Borders,
    CellXfs,
}

/// Styles parsed from xl/styles.xml.
#[derive(Debug, Default)]
pub struct StyleTable {
    /// Custom number formats: numFmtId -> formatCode
    num_fmts: HashMap<u32, String>,
    fonts: Vec<FontRecord>,
    fills: Vec<Option<String>>,
    borders: Vec<Border>,
    cell_xfs: Vec<XfRecord>,
}

/// Event-driven state while reading xl/styles.xml.
struct StylesReader {
    table: StyleTable,
    section: Section,
    font: Option<FontRecord>,
    fill: Option<FillBuilder>,
    border: Option<BorderBuilder>,
    xf: Option<XfRecord>,
}

impl StylesReader {
    fn new() -> Self {
        Self {
            table: StyleTable::default(),
            section: Section::Other,
            font: None,
            fill: None,
            border: None,
            xf: None,
        }
    }

    fn start(&mut self, e: &BytesStart<'_>, empty: bool) {
        let name = e.local_name();
        let name = name.as_ref();
        match (self.section, name) {
            (_, b"numFmts") if !empty => self.section = Section::NumFmts,
            (_, b"fonts") if !empty => self.section = Section::Fonts,
            (_, b"fills") if !empty => self.section = Section::Fills,
            (_, b"borders") if !empty => self.section = Section::Borders,
            (_, b"cellXfs") if !empty => self.section = Section::CellXfs,
            (Section::NumFmts, b"numFmt") => {
                let id = id_attr(e, b"numFmtId");
                if let (Some(id), Some(code)) = (id, get_attr(e, b"formatCode")) {
                    self.table.num_fmts.insert(id, code);
                }
            }
            (Section::Fonts, b"font") if self.font.is_none() => {
                if empty {
                    self.table.fonts.push(FontRecord::default());
                } else {
                    self.font = Some(FontRecord::default());
                }
            }
            (Section::Fonts, _) => {
                if let Some(record) = self.font.as_mut() {
                    record.apply(name, e);
                }
            }
            (Section::Fills, b"fill") if self.fill.is_none() => {
                if empty {
                    self.table.fills.push(None);
                } else {
                    self.fill = Some(FillBuilder::default());
                }
            }
            (Section::Fills, _) => {
                if let Some(builder) = self.fill.as_mut() {
                    builder.start(name, e);
                }
            }
            (Section::Borders, b"border") if self.border.is_none() => {
                if empty {
                    self.table.borders.push(Border::default());
                } else {
                    self.border = Some(BorderBuilder::new(e));
                }
            }
            (Section::Borders, _) => {
                if let Some(builder) = self.border.as_mut() {
                    builder.start(name, e, empty);
                }
            }
            (Section::CellXfs, b"xf") if self.xf.is_none() => {
                let record = XfRecord::new(e);
                if empty {
                    self.table.cell_xfs.push(record);
                } else {
                    self.xf = Some(record);
                }
            }
            (Section::CellXfs, b"alignment") => {
                if let Some(record) = self.xf.as_mut() {
                    record.read_alignment(e);
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, name: &[u8]) {
        match (self.section, name) {
            (_, b"numFmts" | b"fonts" | b"fills" | b"borders" | b"cellXfs") => {
                self.section = Section::Other;
            }
            (Section::Fonts, b"font") => {
                self.table.fonts.extend(self.font.take());
            }
            (Section::Fills, b"fill") => {
                if let Some(builder) = self.fill.take() {
                    self.table.fills.push(builder.finish());
                }
            }
            (Section::Borders, b"border") => {
                if let Some(builder) = self.border.take() {
                    self.table.borders.push(builder.finish());
                }
            }
            (Section::Borders, _) => {
                if let Some(builder) = self.border.as_mut() {
                    builder.end(name);
                }
            }
            (Section::CellXfs, b"xf") => {
                self.table.cell_xfs.extend(self.xf.take());
            }
            _ => {}
        }
    }
}

impl StyleTable {
    /// Parse styles from xl/styles.xml content.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut state = StylesReader::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => state.start(e, false),
                Ok(Event::Empty(ref e)) => state.start(e, true),
                Ok(Event::End(ref e)) => state.end(e.local_name().as_ref()),
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        let table = state.table;
        log::debug!(
            "parsed styles: {} number formats, {} fonts, {} fills, {} borders, {} cell formats",
            table.num_fmts.len(),
            table.fonts.len(),
            table.fills.len(),
            table.borders.len(),
            table.cell_xfs.len()
        );
        Ok(table)
    }

    /// Number of cell-format records.
    pub fn len(&self) -> usize {
        self.cell_xfs.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.cell_xfs.is_empty()
    }

    /// Resolve every cell-format record into a canonical style, in order.
    pub fn to_styles(&self) -> Vec<Style> {
        self.cell_xfs.iter().map(|xf| self.resolve(xf)).collect()
    }

    fn resolve(&self, xf: &XfRecord) -> Style {
        let font = xf.font_id.and_then(|id| self.fonts.get(id));
        let background = xf
            .fill_id
            .and_then(|id| self.fills.get(id))
            .and_then(Clone::clone);
        let border = xf
            .border_id
            .and_then(|id| self.borders.get(id))
            .filter(|b| !b.is_empty())
            .cloned();
        let align = |key: &str| xf.alignment.get(key).map(String::as_str);

        Style {
            font_size: font.and_then(|f| f.size),
            font_family: font.and_then(|f| f.name.clone()),
            bold: font.is_some_and(|f| f.bold),
            italic: font.is_some_and(|f| f.italic),
            underline: font.and_then(|f| f.underline),
            strikethrough: font
                .filter(|f| f.strikethrough)
                .map(|_| Decoration::single()),
            color: font.and_then(|f| f.color.clone()),
            background,
            border,
            horizontal_align: align("horizontal").and_then(horizontal_align),
            vertical_align: align("vertical").and_then(vertical_align),
            wrap: align("wrapText").and_then(wrap_strategy),
            text_direction: align("readingOrder").and_then(text_direction),
            rotation: align("textRotation")
                .and_then(|r| parse_number::<i32>(r, "text rotation"))
                .and_then(map_text_rotation),
            number_format: xf
                .num_fmt_id
                .and_then(|id| self.num_fmts.get(&id))
                .filter(|code| !code.is_empty())
                .cloned(),
        }
    }
}
