//! XLSX shared strings parsing.

use crate::error::{Error, Result};
use crate::model::{utf16_len, Decoration, DecorationKind, RichText, TextRun, TextStyle};
use crate::xml::{get_attr, parse_number, toggle_on};
use quick_xml::events::{BytesStart, Event};

use super::units::argb_to_rgb;

/// One entry of the shared string table.
#[derive(Debug, Clone, PartialEq)]
pub enum SharedString {
    /// An item holding a single unformatted `<t>`
    Plain(String),
    /// An item built from formatted runs
    Rich(RichText),
}

impl SharedString {
    /// The text of the entry, without any rich-text terminator.
    pub fn text(&self) -> &str {
        match self {
            SharedString::Plain(s) => s,
            SharedString::Rich(rt) => rt.text(),
        }
    }
}

impl Default for SharedString {
    fn default() -> Self {
        SharedString::Plain(String::new())
    }
}

/// Map an underline keyword to a decoration.
///
/// `none` hides the line; unrecognized keywords fall back to single.
pub(crate) fn underline_decoration(val: Option<&str>) -> Decoration {
    let kind = match val {
        Some("double") | Some("doubleAccounting") => DecorationKind::Double,
        _ => DecorationKind::Single,
    };
    Decoration {
        show: val != Some("none"),
        kind,
    }
}

/// A run being collected inside `<r>`.
#[derive(Debug, Default)]
struct RunBuilder {
    style: TextStyle,
    text: Option<String>,
    preserve: bool,
}

/// Accumulates one string item (`<si>` or `<is>`) from XML events.
///
/// The owning parser forwards every event between the item's start and end
/// tags, then calls [`StringItemBuilder::finish`].
#[derive(Debug, Default)]
pub(crate) struct StringItemBuilder {
    /// Direct children of the item, phonetic elements excluded
    child_count: usize,
    /// Text of a direct `<t>` child
    direct_text: Option<String>,
    runs: Vec<RunBuilder>,
    current_run: Option<RunBuilder>,
    in_rpr: bool,
    in_t: bool,
    /// Depth inside `<rPh>`/`<phoneticPr>`; text there is ignored
    phonetic_depth: usize,
}

impl StringItemBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Handle a start (or self-closing, when `empty`) tag inside the item.
    pub(crate) fn start(&mut self, e: &BytesStart<'_>, empty: bool) {
        let name = e.local_name();
        let name = name.as_ref();

        if self.phonetic_depth > 0 {
            if !empty {
                self.phonetic_depth += 1;
            }
            return;
        }

        if self.in_rpr {
            if let Some(run) = self.current_run.as_mut() {
                apply_run_property(&mut run.style, name, e);
            }
            return;
        }

        match name {
            b"rPh" | b"phoneticPr" => {
                if !empty {
                    self.phonetic_depth = 1;
                }
            }
            b"r" if self.current_run.is_none() => {
                self.child_count += 1;
                if !empty {
                    self.current_run = Some(RunBuilder::default());
                }
            }
            b"rPr" if self.current_run.is_some() => {
                self.in_rpr = !empty;
            }
            b"t" => {
                let preserve = get_attr(e, b"xml:space").as_deref() == Some("preserve");
                match self.current_run.as_mut() {
                    Some(run) => {
                        run.preserve = preserve;
                        run.text.get_or_insert_with(String::new);
                    }
                    None => {
                        self.child_count += 1;
                        self.direct_text.get_or_insert_with(String::new);
                    }
                }
                self.in_t = !empty;
            }
            _ => {
                if self.current_run.is_none() {
                    self.child_count += 1;
                }
            }
        }
    }

    /// Handle unescaped character data.
    pub(crate) fn text(&mut self, text: &str) {
        if !self.in_t || self.phonetic_depth > 0 {
            return;
        }
        let target = match self.current_run.as_mut() {
            Some(run) => run.text.get_or_insert_with(String::new),
            None => self.direct_text.get_or_insert_with(String::new),
        };
        target.push_str(text);
    }

    /// Handle an end tag inside the item.
    pub(crate) fn end(&mut self, local_name: &[u8]) {
        if self.phonetic_depth > 0 {
            self.phonetic_depth -= 1;
            return;
        }
        match local_name {
            b"rPr" => self.in_rpr = false,
            b"t" => self.in_t = false,
            b"r" if !self.in_rpr => {
                if let Some(run) = self.current_run.take() {
                    self.runs.push(run);
                }
            }
            _ => {}
        }
    }

    /// Produce the table entry.
    pub(crate) fn finish(self) -> SharedString {
        if self.child_count == 0 {
            return SharedString::default();
        }
        if self.child_count == 1 && self.runs.is_empty() {
            if let Some(text) = self.direct_text {
                return SharedString::Plain(text);
            }
        }

        let mut text = String::new();
        let mut text_runs = Vec::new();
        let mut offset = 0;
        for run in self.runs {
            let Some(raw) = run.text else { continue };
            let part = if run.preserve { raw.as_str() } else { raw.trim() };
            let len = utf16_len(part);
            text_runs.push(TextRun {
                start: offset,
                end: offset + len,
                style: run.style,
            });
            offset += len;
            text.push_str(part);
        }

        let mut rich = RichText::from_text(&text);
        rich.text_runs = text_runs;
        SharedString::Rich(rich)
    }
}

fn apply_run_property(style: &mut TextStyle, name: &[u8], e: &BytesStart<'_>) {
    match name {
        b"b" => style.bold = toggle_on(e),
        b"i" => style.italic = toggle_on(e),
        b"sz" => {
            style.font_size = get_attr(e, b"val").and_then(|v| parse_number(&v, "font size"))
        }
        b"rFont" => style.font_family = get_attr(e, b"val"),
        b"u" => style.underline = Some(underline_decoration(get_attr(e, b"val").as_deref())),
        b"strike" => {
            if toggle_on(e) {
                style.strikethrough = Some(Decoration::single());
            }
        }
        b"color" => style.color = get_attr(e, b"rgb").map(|rgb| argb_to_rgb(&rgb)),
        _ => {}
    }
}

/// Shared strings table.
#[derive(Debug, Clone, Default)]
pub struct SharedStrings {
    /// All entries in declaration order
    strings: Vec<SharedString>,
}

impl SharedStrings {
    /// Parse shared strings from XML content.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut strings = Vec::new();
        let mut reader = quick_xml::Reader::from_str(xml);
        // Whitespace inside <t> is significant; trimming is decided per run.
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut item: Option<StringItemBuilder> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match (e.local_name().as_ref(), item.as_mut()) {
                    (b"si", None) => item = Some(StringItemBuilder::new()),
                    (_, Some(builder)) => builder.start(e, false),
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match (e.local_name().as_ref(), item.as_mut()) {
                    (b"si", None) => strings.push(SharedString::default()),
                    (_, Some(builder)) => builder.start(e, true),
                    _ => {}
                },
                Ok(Event::Text(ref e)) => {
                    if let Some(builder) = item.as_mut() {
                        let text = e.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                        builder.text(&text);
                    }
                }
                Ok(Event::CData(ref e)) => {
                    if let Some(builder) = item.as_mut() {
                        builder.text(&String::from_utf8_lossy(e));
                    }
                }
                Ok(Event::End(ref e)) => {
                    let name = e.local_name();
                    if name.as_ref() == b"si" {
                        if let Some(builder) = item.take() {
                            strings.push(builder.finish());
                        }
                    } else if let Some(builder) = item.as_mut() {
                        builder.end(name.as_ref());
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        log::debug!("parsed {} shared strings", strings.len());
        Ok(Self { strings })
    }

    /// Get an entry by index.
    pub fn get(&self, index: usize) -> Option<&SharedString> {
        self.strings.get(index)
    }

    /// Get an entry by index, yielding an empty string when out of range.
    pub fn get_or_empty(&self, index: usize) -> SharedString {
        match self.strings.get(index) {
            Some(entry) => entry.clone(),
            None => {
                log::warn!(
                    "shared string index {} out of range ({} entries), using empty string",
                    index,
                    self.strings.len()
                );
                SharedString::default()
            }
        }
    }

    /// Get the count of shared strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
