//! XLSX importer implementation.

use crate::container::OoxmlContainer;
use crate::error::{Error, Result};
use crate::model::{Workbook, Worksheet};
use crate::xml::{get_attr, get_relationship_id};
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

use super::cells::CellDecoder;
use super::options::ImportOptions;
use super::shared_strings::SharedStrings;
use super::sheet::SheetScan;
use super::styles::StyleTable;

/// Sheet entry from the workbook part.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SheetInfo {
    name: String,
    sheet_id: String,
    hidden: bool,
    rel_id: Option<String>,
}

/// Importer for XLSX (Excel) workbooks.
///
/// Each call to [`XlsxImporter::import`] reads the package from scratch and
/// either returns a complete workbook or fails.
pub struct XlsxImporter {
    container: OoxmlContainer,
    options: ImportOptions,
}

impl XlsxImporter {
    /// Open an XLSX file for import.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let container = OoxmlContainer::open(path)?;
        Ok(Self::from_container(container))
    }

    /// Create an importer from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let container = OoxmlContainer::from_bytes(data)?;
        Ok(Self::from_container(container))
    }

    /// Create an importer from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let container = OoxmlContainer::from_reader(reader)?;
        Ok(Self::from_container(container))
    }

    /// Create an importer over an opened container.
    pub fn from_container(container: OoxmlContainer) -> Self {
        Self {
            container,
            options: ImportOptions::default(),
        }
    }

    /// Replace the import options.
    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    /// The options this importer applies.
    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Import the package into a workbook.
    pub fn import(&self) -> Result<Workbook> {
        let root = self.container.read_package_relationships()?;
        let office = root
            .find_by_kind("officeDocument")
            .ok_or_else(|| Error::MissingRelationship("officeDocument".to_string()))?;

        let workbook_part = self.container.read_part(&office.target)?;
        let sheets = parse_workbook_sheets(&workbook_part.xml)?;
        let relationships = &workbook_part.relationships;

        let shared_strings = match relationships.find_by_kind("sharedStrings") {
            Some(rel) => Some(SharedStrings::parse(&self.container.read_xml(&rel.target)?)?),
            None => None,
        };
        let style_table = match relationships.find_by_kind("styles") {
            Some(rel) => Some(StyleTable::parse(&self.container.read_xml(&rel.target)?)?),
            None => None,
        };

        let mut workbook = Workbook::new(self.options.name.clone());
        workbook.locale = self.options.locale;
        workbook.styles = style_table
            .as_ref()
            .map(StyleTable::to_styles)
            .unwrap_or_default();

        let sheet_ids: HashMap<String, String> = sheets
            .iter()
            .map(|s| (s.name.clone(), s.sheet_id.clone()))
            .collect();

        for info in &sheets {
            if info.hidden && !self.options.include_hidden_sheets {
                log::debug!("skipping hidden sheet {:?}", info.name);
                continue;
            }

            let missing = || Error::SheetRelationshipMissing {
                sheet: info.name.clone(),
                rel_id: info.rel_id.clone().unwrap_or_default(),
            };
            let rel_id = info.rel_id.as_deref().ok_or_else(missing)?;
            let rel = relationships.get(rel_id).ok_or_else(missing)?;

            let part = self.container.read_part(&rel.target)?;
            let scan = SheetScan::parse(&part.xml)?;
            let links = scan.resolve_hyperlinks(&sheet_ids, &part.relationships)?;
            let decoder =
                CellDecoder::new(shared_strings.as_ref(), style_table.is_some(), &links);

            let worksheet = assemble_sheet(info, scan, &decoder)?;
            log::debug!(
                "imported sheet {:?} (id {}): {} cells",
                worksheet.name,
                worksheet.id,
                worksheet.cell_count()
            );
            workbook.add_sheet(worksheet);
        }

        Ok(workbook)
    }
}

fn assemble_sheet(
    info: &SheetInfo,
    scan: SheetScan,
    decoder: &CellDecoder<'_>,
) -> Result<Worksheet> {
    let mut sheet = Worksheet::new(info.sheet_id.clone(), info.name.clone());
    sheet.hidden = info.hidden;
    sheet.tab_color = scan.tab_color.unwrap_or_default();
    sheet.show_gridlines = scan.show_gridlines;
    sheet.right_to_left = scan.right_to_left;
    sheet.freeze = scan.freeze;
    sheet.default_column_width = scan.default_column_width;
    sheet.default_row_height = scan.default_row_height;
    sheet.column_data = scan.columns;
    sheet.row_data = scan.rows;
    sheet.merge_data = scan.merges;

    for raw in scan.cells {
        let (row, column) = (raw.row, raw.column);
        if let Some(cell) = decoder.decode(raw)? {
            sheet.set_cell(row, column, cell);
        }
    }
    Ok(sheet)
}

/// Read the `<sheet>` entries of the workbook part in declaration order.
fn parse_workbook_sheets(xml: &str) -> Result<Vec<SheetInfo>> {
    let mut sheets = Vec::new();
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.local_name().as_ref() == b"sheet" =>
            {
                // an absent state is the schema default, visible
                match get_attr(e, b"name") {
                    Some(name) => sheets.push(SheetInfo {
                        sheet_id: get_attr(e, b"sheetId").unwrap_or_else(|| name.clone()),
                        name,
                        hidden: get_attr(e, b"state").is_some_and(|state| state != "visible"),
                        rel_id: get_relationship_id(e),
                    }),
                    None => log::warn!("ignoring sheet entry without a name"),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    log::debug!("workbook declares {} sheets", sheets.len());
    Ok(sheets)
}
