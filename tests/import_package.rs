//! End-to-end import tests over synthetic packages.

mod common;

use common::{worksheet, zip_package, PackageBuilder, ROOT_RELS};
use std::collections::HashSet;
use std::io::Cursor;
use xlsx_ingest::model::{BorderStyle, HorizontalAlign, TextRotation, VerticalAlign, WrapStrategy};
use xlsx_ingest::render::{to_json, JsonFormat};
use xlsx_ingest::{
    import_bytes, import_bytes_with_options, import_file, import_reader, CellValue, Error,
    Freeze, ImportOptions, Range, Workbook,
};

const STYLES: &str = r#"
  <numFmts count="1"><numFmt numFmtId="164" formatCode="0.00%"/></numFmts>
  <fonts count="2">
    <font><sz val="11"/><name val="Calibri"/></font>
    <font><b/><sz val="14"/><color rgb="FFFF0000"/><name val="Arial"/></font>
  </fonts>
  <fills count="3">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FF00FF00"/><bgColor indexed="64"/></patternFill></fill>
  </fills>
  <borders count="2">
    <border><left/><right/><top/><bottom/><diagonal/></border>
    <border><left style="thin"><color rgb="FF000000"/></left><right/><top/><bottom/><diagonal/></border>
  </borders>
  <cellXfs count="2">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
    <xf numFmtId="164" fontId="1" fillId="2" borderId="1" applyAlignment="1">
      <alignment horizontal="center" vertical="center" wrapText="1" textRotation="45"/>
    </xf>
  </cellXfs>"#;

fn single_sheet(body: &str) -> Vec<u8> {
    PackageBuilder::new()
        .sheet("Sheet1", "1", &worksheet(body))
        .build()
}

/// Clear the per-import hyperlink ids so two imports can be compared.
fn without_range_ids(mut workbook: Workbook) -> Workbook {
    for sheet in workbook.sheets.values_mut() {
        for row in sheet.cell_data.values_mut() {
            for cell in row.values_mut() {
                if let CellValue::RichText(rich) = &mut cell.value {
                    for range in &mut rich.custom_ranges {
                        range.range_id.clear();
                    }
                }
            }
        }
    }
    workbook
}

fn range_ids(workbook: &Workbook) -> Vec<String> {
    workbook
        .sheets
        .values()
        .flat_map(|s| s.cell_data.values())
        .flat_map(|row| row.values())
        .filter_map(|cell| match &cell.value {
            CellValue::RichText(rich) => Some(rich.custom_ranges.iter()),
            _ => None,
        })
        .flatten()
        .map(|range| range.range_id.clone())
        .collect()
}

#[test]
fn test_minimal_numeric_workbook() {
    let data = single_sheet(r#"<sheetData><row r="1"><c r="A1"><v>42</v></c></row></sheetData>"#);
    let workbook = import_bytes(data).unwrap();

    assert_eq!(workbook.name, "Untitled");
    assert_eq!(workbook.sheet_order, vec!["1".to_string()]);
    assert!(workbook.styles.is_empty());

    let sheet = workbook.sheet("1").unwrap();
    assert_eq!(sheet.name, "Sheet1");
    assert_eq!(sheet.cell_count(), 1);
    let cell = sheet.cell(0, 0).unwrap();
    assert_eq!(cell.value, CellValue::Number(42.0));
    assert_eq!(cell.formula, None);
    assert_eq!(cell.style, None);
}

#[test]
fn test_default_sheet_attributes() {
    let workbook = import_bytes(single_sheet("<sheetData/>")).unwrap();
    let sheet = workbook.sheet_by_name("Sheet1").unwrap();
    assert_eq!(sheet.tab_color, "");
    assert!(!sheet.hidden);
    assert!(sheet.show_gridlines);
    assert!(!sheet.right_to_left);
    assert_eq!(sheet.freeze, Freeze::default());
    assert!(sheet.column_data.is_empty());
    assert!(sheet.row_data.is_empty());
    assert!(sheet.merge_data.is_empty());
    assert!(sheet.cell_data.is_empty());
}

#[test]
fn test_missing_package_relationships() {
    let data = PackageBuilder::new()
        .sheet("Sheet1", "1", &worksheet("<sheetData/>"))
        .without_root_rels()
        .build();
    let err = import_bytes(data).unwrap_err();
    assert!(matches!(err, Error::MissingRelationship(ref k) if k == "officeDocument"));
}

#[test]
fn test_root_without_office_document() {
    let rels = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
</Relationships>"#;
    let data = PackageBuilder::new()
        .sheet("Sheet1", "1", &worksheet("<sheetData/>"))
        .root_rels(rels)
        .build();
    let err = import_bytes(data).unwrap_err();
    assert!(matches!(err, Error::MissingRelationship(_)));
}

#[test]
fn test_missing_workbook_part() {
    let data = zip_package(&[("_rels/.rels", ROOT_RELS)]);
    let err = import_bytes(data).unwrap_err();
    assert!(matches!(err, Error::PartNotFound(ref p) if p == "xl/workbook.xml"));
}

#[test]
fn test_sheet_relationship_missing() {
    let workbook = r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Data" sheetId="1" r:id="rId9"/></sheets></workbook>"#;
    let data = zip_package(&[("_rels/.rels", ROOT_RELS), ("xl/workbook.xml", workbook)]);

    let err = import_bytes(data).unwrap_err();
    match err {
        Error::SheetRelationshipMissing { sheet, rel_id } => {
            assert_eq!(sheet, "Data");
            assert_eq!(rel_id, "rId9");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_absolute_sheet_target() {
    let workbook = r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Data" sheetId="7" r:id="rId1"/></sheets></workbook>"#;
    let rels = r#"<Relationships><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/data.xml"/></Relationships>"#;
    let sheet = worksheet(r#"<sheetData><row r="1"><c r="B1" t="b"><v>1</v></c></row></sheetData>"#);
    let data = zip_package(&[
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", rels),
        ("xl/worksheets/data.xml", &sheet),
    ]);

    let workbook = import_bytes(data).unwrap();
    let sheet = workbook.sheet("7").unwrap();
    assert_eq!(sheet.cell(0, 1).unwrap().value, CellValue::Boolean(true));
}

#[test]
fn test_shared_strings_and_styles() {
    let data = PackageBuilder::new()
        .sheet(
            "Sheet1",
            "1",
            &worksheet(
                r#"<sheetData><row r="1">
                  <c r="A1" t="s" s="1"><v>0</v></c>
                  <c r="B1" t="s"><v>1</v></c>
                  <c r="C1" t="s"><v>999</v></c>
                </row></sheetData>"#,
            ),
        )
        .shared_strings(
            r#"<si><t>Revenue</t></si>
               <si><r><rPr><b/><sz val="12"/></rPr><t>Net </t></r><r><rPr><i/></rPr><t xml:space="preserve"> total</t></r></si>"#,
        )
        .styles(STYLES)
        .build();

    let workbook = import_bytes(data).unwrap();
    assert_eq!(workbook.styles.len(), 2);
    assert_eq!(workbook.styles[0].font_family.as_deref(), Some("Calibri"));

    let style = workbook.style(1).unwrap();
    assert!(style.bold);
    assert_eq!(style.font_size, Some(14.0));
    assert_eq!(style.font_family.as_deref(), Some("Arial"));
    assert_eq!(style.color.as_deref(), Some("#FF0000FF"));
    assert_eq!(style.background.as_deref(), Some("#00FF00FF"));
    assert_eq!(style.number_format.as_deref(), Some("0.00%"));
    assert_eq!(style.horizontal_align, Some(HorizontalAlign::Center));
    assert_eq!(style.vertical_align, Some(VerticalAlign::Middle));
    assert_eq!(style.wrap, Some(WrapStrategy::Wrap));
    assert_eq!(
        style.rotation,
        Some(TextRotation {
            angle: -45,
            vertical: false
        })
    );
    let left = style.border.as_ref().and_then(|b| b.left.as_ref()).unwrap();
    assert_eq!(left.style, BorderStyle::Thin);
    assert_eq!(left.color.as_deref(), Some("#000000FF"));

    let sheet = workbook.sheet("1").unwrap();
    let a1 = sheet.cell(0, 0).unwrap();
    assert_eq!(a1.value, CellValue::String("Revenue".to_string()));
    assert_eq!(a1.style, Some(1));

    let CellValue::RichText(rich) = &sheet.cell(0, 1).unwrap().value else {
        panic!("expected rich text");
    };
    assert_eq!(rich.data_stream, "Net total\r\n");
    assert_eq!(rich.text_runs.len(), 2);
    assert_eq!((rich.text_runs[0].start, rich.text_runs[0].end), (0, 3));
    assert!(rich.text_runs[0].style.bold);
    assert_eq!((rich.text_runs[1].start, rich.text_runs[1].end), (3, 9));
    assert!(rich.text_runs[1].style.italic);

    // out-of-range index is an empty string, not a failure
    assert_eq!(
        sheet.cell(0, 2).unwrap().value,
        CellValue::String(String::new())
    );
}

#[test]
fn test_string_cell_without_shared_strings_part() {
    let data = single_sheet(r#"<sheetData><row r="1"><c r="A1" t="s"><v>0</v></c></row></sheetData>"#);
    let err = import_bytes(data).unwrap_err();
    assert!(matches!(err, Error::MissingRelationship(ref k) if k == "sharedStrings"));
}

#[test]
fn test_cell_types_and_formulas() {
    let data = single_sheet(
        r#"<sheetData>
          <row r="1">
            <c r="A1"><f>1+2</f><v>3</v></c>
            <c r="B1" t="str"><f>"a"&amp;"b"</f><v>ab</v></c>
            <c r="C1" t="e"><v>#N/A</v></c>
            <c r="D1" t="inlineStr"><is><t>inline</t></is></c>
            <c r="E1" t="d"><v>2024-01-31T00:00:00</v></c>
            <c r="F1" t="unknown"><v>1</v></c>
          </row>
        </sheetData>"#,
    );
    let workbook = import_bytes(data).unwrap();
    let sheet = workbook.sheet("1").unwrap();

    let a1 = sheet.cell(0, 0).unwrap();
    assert_eq!(a1.value, CellValue::Number(3.0));
    assert_eq!(a1.formula.as_deref(), Some("=1+2"));

    let b1 = sheet.cell(0, 1).unwrap();
    assert_eq!(b1.value, CellValue::String("ab".to_string()));
    assert_eq!(b1.formula.as_deref(), Some(r#"="a"&"b""#));

    assert_eq!(
        sheet.cell(0, 2).unwrap().value,
        CellValue::Error("#N/A".to_string())
    );
    assert_eq!(
        sheet.cell(0, 3).unwrap().value,
        CellValue::String("inline".to_string())
    );
    assert_eq!(
        sheet.cell(0, 4).unwrap().value,
        CellValue::String("2024-01-31T00:00:00".to_string())
    );
    // unknown type codes are dropped
    assert!(sheet.cell(0, 5).is_none());
    assert_eq!(sheet.cell_count(), 5);
}

#[test]
fn test_view_sizing_and_merges() {
    let data = single_sheet(
        r#"<sheetPr><tabColor rgb="FFFF0000"/></sheetPr>
        <sheetViews><sheetView showGridLines="0" workbookViewId="0">
          <pane xSplit="2" ySplit="1" topLeftCell="C2" state="frozen"/>
        </sheetView></sheetViews>
        <sheetFormatPr defaultColWidth="8.43" defaultRowHeight="15"/>
        <cols><col min="1" max="2" width="10" customWidth="1"/></cols>
        <sheetData><row r="4" customHeight="1" ht="20"><c r="A4"><v>1</v></c></row></sheetData>
        <mergeCells count="2"><mergeCell ref="B2:D4"/><mergeCell ref="A1"/></mergeCells>"#,
    );
    let workbook = import_bytes(data).unwrap();
    let sheet = workbook.sheet("1").unwrap();

    assert_eq!(sheet.tab_color, "#FF0000FF");
    assert!(!sheet.show_gridlines);
    assert_eq!(
        sheet.freeze,
        Freeze {
            x_split: 3,
            y_split: 2,
            start_row: 1,
            start_column: 2
        }
    );
    assert_eq!(sheet.default_column_width, Some(58.74));
    assert_eq!(sheet.default_row_height, Some(22.86));
    assert_eq!(sheet.column_data.len(), 2);
    assert_eq!(sheet.column_data[&0].width, Some(69.68));
    assert_eq!(sheet.column_data[&1].width, Some(69.68));
    assert_eq!(sheet.row_data[&3].height, Some(30.48));
    assert_eq!(
        sheet.merge_data,
        vec![
            Range {
                start_row: 1,
                start_column: 1,
                end_row: 3,
                end_column: 3
            },
            Range::cell(0, 0)
        ]
    );
}

#[test]
fn test_invalid_merge_aborts_import() {
    let data = single_sheet(
        r#"<sheetData/><mergeCells count="1"><mergeCell ref="A1:B"/></mergeCells>"#,
    );
    let err = import_bytes(data).unwrap_err();
    assert!(matches!(err, Error::InvalidRangeSyntax(ref r) if r == "A1:B"));
}

#[test]
fn test_hyperlinks() {
    let data = PackageBuilder::new()
        .sheet(
            "Links",
            "1",
            &worksheet(
                r#"<sheetData><row r="1">
                  <c r="A1" t="s"><v>0</v></c>
                  <c r="B1"><v>5</v></c>
                  <c r="C1"><f>1+1</f><v>2</v></c>
                  <c r="D1" t="b"><v>1</v></c>
                  <c r="F1" t="s"><v>1</v></c>
                  <c r="G1"><v>1.50</v></c>
                </row></sheetData>
                <hyperlinks>
                  <hyperlink ref="A1" r:id="rId1"/>
                  <hyperlink ref="B1" location="'Other Data'!B2:C3"/>
                  <hyperlink ref="C1" r:id="rId1"/>
                  <hyperlink ref="D1" r:id="rId1"/>
                  <hyperlink ref="E1" r:id="rId1"/>
                  <hyperlink ref="F1" r:id="rId1"/>
                  <hyperlink ref="G1" r:id="rId1"/>
                </hyperlinks>"#,
            ),
        )
        .sheet_rels(
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/a?b=c" TargetMode="External"/>"#,
        )
        .sheet("Other Data", "9", &worksheet("<sheetData/>"))
        .shared_strings("<si><t>Docs</t></si><si><r><t>ab</t></r><r><rPr><i/></rPr><t>cd</t></r></si>")
        .build();

    let workbook = import_bytes(data).unwrap();
    let sheet = workbook.sheet("1").unwrap();

    let a1 = sheet.cell(0, 0).unwrap();
    let CellValue::RichText(rich) = &a1.value else {
        panic!("expected rich text");
    };
    assert_eq!(rich.data_stream, "Docs\r\n");
    assert_eq!(rich.custom_ranges[0].start_index, 0);
    assert_eq!(rich.custom_ranges[0].end_index, 4);
    assert_eq!(a1.hyperlink(), Some("https://example.com/a?b=c"));

    assert_eq!(sheet.cell(0, 1).unwrap().hyperlink(), Some("#gid=9&range=B2:C3"));

    // formula cells keep their value
    let c1 = sheet.cell(0, 2).unwrap();
    assert_eq!(c1.value, CellValue::Number(2.0));
    assert_eq!(c1.hyperlink(), None);

    let d1 = sheet.cell(0, 3).unwrap();
    let CellValue::RichText(rich) = &d1.value else {
        panic!("expected rich text");
    };
    assert_eq!(rich.text(), "TRUE");

    // a link on a cell without a value creates nothing
    assert!(sheet.cell(0, 4).is_none());

    // rich entries are linked over the whole stream, terminator included
    let f1 = sheet.cell(0, 5).unwrap();
    let CellValue::RichText(rich) = &f1.value else {
        panic!("expected rich text");
    };
    assert_eq!(rich.data_stream, "abcd\r\n");
    assert_eq!(rich.text_runs.len(), 2);
    assert_eq!(rich.custom_ranges[0].end_index, 6);

    // numbers keep the text as written
    let g1 = sheet.cell(0, 6).unwrap();
    let CellValue::RichText(rich) = &g1.value else {
        panic!("expected rich text");
    };
    assert_eq!(rich.data_stream, "1.50\r\n");
    assert_eq!(rich.custom_ranges[0].end_index, 4);

    assert_eq!(sheet.hyperlink_count(), 5);

    let ids = range_ids(&workbook);
    assert_eq!(ids.len(), 5);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 5);
}

#[test]
fn test_dangling_hyperlink_relationship() {
    let data = single_sheet(
        r#"<sheetData><row r="1"><c r="A1"><v>1</v></c></row></sheetData>
        <hyperlinks><hyperlink ref="A1" r:id="rId4"/></hyperlinks>"#,
    );
    let err = import_bytes(data).unwrap_err();
    assert!(matches!(err, Error::MissingRelationship(_)));
}

#[test]
fn test_hidden_sheets() {
    let data = PackageBuilder::new()
        .sheet(
            "Visible",
            "1",
            &worksheet(
                r#"<sheetData><row r="1"><c r="A1"><v>1</v></c></row></sheetData>
                <hyperlinks><hyperlink ref="A1" location="Secret!A1"/></hyperlinks>"#,
            ),
        )
        .hidden_sheet("Secret", "2", &worksheet("<sheetData/>"))
        .build();

    let workbook = import_bytes(data.clone()).unwrap();
    assert_eq!(workbook.sheet_order, vec!["1".to_string(), "2".to_string()]);
    assert!(workbook.sheet("2").unwrap().hidden);

    let options = ImportOptions::new().with_hidden_sheets(false);
    let workbook = import_bytes_with_options(data, &options).unwrap();
    assert_eq!(workbook.sheet_order, vec!["1".to_string()]);
    assert_eq!(workbook.sheets.len(), 1);
    // links into skipped sheets still resolve by id
    assert_eq!(
        workbook.sheet("1").unwrap().cell(0, 0).unwrap().hyperlink(),
        Some("#gid=2&range=A1")
    );
}

#[test]
fn test_sheet_order_follows_declaration() {
    let data = PackageBuilder::new()
        .sheet("Zeta", "10", &worksheet("<sheetData/>"))
        .sheet("Alpha", "2", &worksheet("<sheetData/>"))
        .sheet("Mid", "5", &worksheet("<sheetData/>"))
        .build();
    let workbook = import_bytes(data).unwrap();

    assert_eq!(workbook.sheet_order, vec!["10", "2", "5"]);
    let names: Vec<&str> = workbook.ordered_sheets().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    for id in &workbook.sheet_order {
        assert!(workbook.sheets.contains_key(id));
    }
}

#[test]
fn test_import_is_idempotent() {
    let data = PackageBuilder::new()
        .sheet(
            "Sheet1",
            "1",
            &worksheet(
                r#"<sheetData><row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1"><v>2.5</v></c></row></sheetData>
                <hyperlinks><hyperlink ref="A1" location="Sheet1!B1"/></hyperlinks>"#,
            ),
        )
        .shared_strings("<si><t>Link</t></si>")
        .styles(STYLES)
        .build();

    let first = import_bytes(data.clone()).unwrap();
    let second = import_bytes(data).unwrap();

    let first_ids = range_ids(&first);
    let second_ids = range_ids(&second);
    assert_eq!(first_ids.len(), 1);
    assert_ne!(first_ids, second_ids);

    assert_eq!(without_range_ids(first), without_range_ids(second));
}

#[test]
fn test_import_file_uses_stem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quarterly.xlsx");
    std::fs::write(&path, single_sheet("<sheetData/>")).unwrap();

    let workbook = import_file(&path).unwrap();
    assert_eq!(workbook.name, "quarterly");
    assert_eq!(workbook.sheet_order.len(), 1);
}

#[test]
fn test_import_reader() {
    let data = single_sheet(r#"<sheetData><row r="1"><c r="A1"><v>7</v></c></row></sheetData>"#);
    let workbook = import_reader(Cursor::new(data)).unwrap();
    assert_eq!(
        workbook.sheet("1").unwrap().cell(0, 0).unwrap().value,
        CellValue::Number(7.0)
    );
}

#[test]
fn test_json_output() {
    let data = single_sheet(r#"<sheetData><row r="1"><c r="A1"><v>42</v></c></row></sheetData>"#);
    let options = ImportOptions::new().with_name("Book");
    let workbook = import_bytes_with_options(data, &options).unwrap();

    let json = to_json(&workbook, JsonFormat::Compact).unwrap();
    assert!(json.starts_with(r#"{"name":"Book","locale":"enUS","#));
    assert!(json.contains(r#""sheetOrder":["1"]"#));
    assert!(json.contains(r#""cellData":{"0":{"0":{"type":"number","value":42.0}}}"#));
    assert!(json.contains(r#""freeze":{"xSplit":0,"ySplit":0,"startRow":-1,"startColumn":-1}"#));
}
