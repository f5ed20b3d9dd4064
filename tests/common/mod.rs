//! Synthetic .xlsx packages for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Zip the given `(path, content)` entries.
pub fn zip_package(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default();
        for (name, content) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer
}

/// Wrap `<sheetData>` content and trailing elements into a worksheet part.
pub fn worksheet(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="{}">{}</worksheet>"#,
        REL_NS, body
    )
}

struct SheetDef {
    name: String,
    id: String,
    state: Option<String>,
    xml: String,
    rels: Option<String>,
}

/// Builds a workbook package one part at a time.
#[derive(Default)]
pub struct PackageBuilder {
    sheets: Vec<SheetDef>,
    shared_strings: Option<String>,
    styles: Option<String>,
    root_rels: Option<String>,
    without_root_rels: bool,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a visible sheet.
    pub fn sheet(self, name: &str, id: &str, xml: &str) -> Self {
        self.sheet_with_state(name, id, None, xml)
    }

    /// Add a sheet declared with `state="hidden"`.
    pub fn hidden_sheet(self, name: &str, id: &str, xml: &str) -> Self {
        self.sheet_with_state(name, id, Some("hidden"), xml)
    }

    fn sheet_with_state(mut self, name: &str, id: &str, state: Option<&str>, xml: &str) -> Self {
        self.sheets.push(SheetDef {
            name: name.to_string(),
            id: id.to_string(),
            state: state.map(str::to_string),
            xml: xml.to_string(),
            rels: None,
        });
        self
    }

    /// Relationship entries (`<Relationship .../>` elements) for the last sheet.
    pub fn sheet_rels(mut self, relationships: &str) -> Self {
        if let Some(sheet) = self.sheets.last_mut() {
            sheet.rels = Some(relationships.to_string());
        }
        self
    }

    /// `<si>` items for the shared strings part.
    pub fn shared_strings(mut self, items: &str) -> Self {
        self.shared_strings = Some(format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">{}</sst>"#,
            items
        ));
        self
    }

    /// Body of the styles part.
    pub fn styles(mut self, body: &str) -> Self {
        self.styles = Some(format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">{}</styleSheet>"#,
            body
        ));
        self
    }

    /// Replace the package relationships part.
    pub fn root_rels(mut self, xml: &str) -> Self {
        self.root_rels = Some(xml.to_string());
        self
    }

    /// Leave `_rels/.rels` out of the package.
    pub fn without_root_rels(mut self) -> Self {
        self.without_root_rels = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut files: Vec<(String, String)> = Vec::new();

        if !self.without_root_rels {
            let rels = self.root_rels.clone().unwrap_or_else(|| ROOT_RELS.to_string());
            files.push(("_rels/.rels".to_string(), rels));
        }

        let mut sheet_entries = String::new();
        let mut workbook_rels = String::new();
        for (index, sheet) in self.sheets.iter().enumerate() {
            let n = index + 1;
            let state = sheet
                .state
                .as_deref()
                .map(|s| format!(r#" state="{}""#, s))
                .unwrap_or_default();
            sheet_entries.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}"{} r:id="rId{}"/>"#,
                sheet.name, sheet.id, state, n
            ));
            workbook_rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="{}/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                n, REL_NS, n
            ));
            files.push((format!("xl/worksheets/sheet{}.xml", n), sheet.xml.clone()));
            if let Some(rels) = &sheet.rels {
                files.push((
                    format!("xl/worksheets/_rels/sheet{}.xml.rels", n),
                    relationships(rels),
                ));
            }
        }

        if let Some(xml) = &self.shared_strings {
            workbook_rels.push_str(&format!(
                r#"<Relationship Id="rId100" Type="{}/sharedStrings" Target="sharedStrings.xml"/>"#,
                REL_NS
            ));
            files.push(("xl/sharedStrings.xml".to_string(), xml.clone()));
        }
        if let Some(xml) = &self.styles {
            workbook_rels.push_str(&format!(
                r#"<Relationship Id="rId101" Type="{}/styles" Target="styles.xml"/>"#,
                REL_NS
            ));
            files.push(("xl/styles.xml".to_string(), xml.clone()));
        }

        files.push((
            "xl/workbook.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="{}"><sheets>{}</sheets></workbook>"#,
                REL_NS, sheet_entries
            ),
        ));
        files.push((
            "xl/_rels/workbook.xml.rels".to_string(),
            relationships(&workbook_rels),
        ));

        let entries: Vec<(&str, &str)> = files
            .iter()
            .map(|(name, content)| (name.as_str(), content.as_str()))
            .collect();
        zip_package(&entries)
    }
}

fn relationships(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        body
    )
}
