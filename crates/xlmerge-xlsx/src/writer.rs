//! XLSX writer
//!
//! Produces a minimal valid package: content types, relationships, workbook,
//! one styles part, one worksheet part per sheet, and a comments part for
//! each sheet that carries comments. Strings are written inline rather than
//! through a shared strings table.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use crate::error::XlsxResult;
use crate::styles::XlsxStyleTable;
use xlmerge_core::{CellAddress, CellValue, Workbook, Worksheet};

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        Self::write(workbook, BufWriter::new(file))
    }

    /// Write a workbook to a writer
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default();

        let style_table = XlsxStyleTable::build(workbook);

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(Self::content_types_xml(workbook).as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(Self::root_rels_xml().as_bytes())?;

        zip.start_file("xl/workbook.xml", options)?;
        zip.write_all(Self::workbook_xml(workbook).as_bytes())?;

        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(Self::workbook_rels_xml(workbook).as_bytes())?;

        zip.start_file("xl/styles.xml", options)?;
        zip.write_all(style_table.to_styles_xml().as_bytes())?;

        for (idx, sheet) in workbook.worksheets().enumerate() {
            zip.start_file(format!("xl/worksheets/sheet{}.xml", idx + 1), options)?;
            zip.write_all(Self::worksheet_xml(sheet, idx, &style_table).as_bytes())?;

            if sheet.comment_count() > 0 {
                zip.start_file(
                    format!("xl/worksheets/_rels/sheet{}.xml.rels", idx + 1),
                    options,
                )?;
                zip.write_all(Self::sheet_rels_xml(idx).as_bytes())?;

                zip.start_file(format!("xl/comments{}.xml", idx + 1), options)?;
                zip.write_all(Self::comments_xml(sheet).as_bytes())?;
            }
        }

        zip.finish()?;
        Ok(())
    }

    fn content_types_xml(workbook: &Workbook) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
"#,
        );

        for (idx, sheet) in workbook.worksheets().enumerate() {
            xml.push_str(&format!(
                "<Override PartName=\"/xl/worksheets/sheet{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>\n",
                idx + 1
            ));
            if sheet.comment_count() > 0 {
                xml.push_str(&format!(
                    "<Override PartName=\"/xl/comments{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.comments+xml\"/>\n",
                    idx + 1
                ));
            }
        }

        xml.push_str("</Types>");
        xml
    }

    fn root_rels_xml() -> String {
        String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#,
        )
    }

    fn workbook_xml(workbook: &Workbook) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
"#,
        );

        if workbook.date_1904() {
            xml.push_str("<workbookPr date1904=\"1\"/>\n");
        }

        xml.push_str("<sheets>\n");
        for (idx, sheet) in workbook.worksheets().enumerate() {
            xml.push_str(&format!(
                "<sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>\n",
                escape_xml(sheet.name()),
                idx + 1,
                idx + 1
            ));
        }
        xml.push_str("</sheets>\n</workbook>");
        xml
    }

    fn workbook_rels_xml(workbook: &Workbook) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
        );

        let sheet_count = workbook.worksheet_count();
        for idx in 0..sheet_count {
            xml.push_str(&format!(
                "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet{}.xml\"/>\n",
                idx + 1,
                idx + 1
            ));
        }
        xml.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles\" Target=\"styles.xml\"/>\n",
            sheet_count + 1
        ));
        xml.push_str("</Relationships>");
        xml
    }

    fn sheet_rels_xml(sheet_index: usize) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments" Target="../comments{}.xml"/>
</Relationships>"#,
            sheet_index + 1
        )
    }

    fn worksheet_xml(sheet: &Worksheet, sheet_index: usize, styles: &XlsxStyleTable) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
"#,
        );

        Self::write_cols(&mut xml, sheet);

        let row_heights: BTreeMap<u32, f64> = sheet.custom_row_heights().collect();

        xml.push_str("<sheetData>\n");
        let mut current_row: Option<u32> = None;
        for (row, col, cell) in sheet.iter_cells() {
            if current_row != Some(row) {
                if current_row.is_some() {
                    xml.push_str("</row>\n");
                }
                match row_heights.get(&row) {
                    Some(ht) => xml.push_str(&format!(
                        "<row r=\"{}\" ht=\"{}\" customHeight=\"1\">",
                        row + 1,
                        ht
                    )),
                    None => xml.push_str(&format!("<row r=\"{}\">", row + 1)),
                }
                current_row = Some(row);
            }

            let xf_id = styles.xf_id_for(sheet_index, cell.style_index);
            Self::write_cell(&mut xml, row, col, &cell.value, xf_id);
        }
        if current_row.is_some() {
            xml.push_str("</row>\n");
        }
        xml.push_str("</sheetData>\n</worksheet>");
        xml
    }

    /// Emit the `<cols>` section from width overrides and hidden columns
    fn write_cols(xml: &mut String, sheet: &Worksheet) {
        let mut cols: BTreeMap<u16, (Option<f64>, bool)> = BTreeMap::new();
        for (col, width) in sheet.custom_column_widths() {
            cols.entry(col).or_insert((None, false)).0 = Some(width);
        }
        for col in sheet.hidden_columns() {
            cols.entry(col).or_insert((None, false)).1 = true;
        }
        if cols.is_empty() {
            return;
        }

        xml.push_str("<cols>\n");
        for (col, (width, hidden)) in cols {
            let n = col as u32 + 1;
            xml.push_str(&format!("<col min=\"{}\" max=\"{}\"", n, n));
            match width {
                Some(w) => xml.push_str(&format!(" width=\"{}\" customWidth=\"1\"", w)),
                None => xml.push_str(" width=\"8.43\""),
            }
            if hidden {
                xml.push_str(" hidden=\"1\"");
            }
            xml.push_str("/>\n");
        }
        xml.push_str("</cols>\n");
    }

    fn write_cell(xml: &mut String, row: u32, col: u16, value: &CellValue, xf_id: u32) {
        let cell_ref = CellAddress { row, col }.to_a1();
        let style_attr = if xf_id != 0 {
            format!(" s=\"{}\"", xf_id)
        } else {
            String::new()
        };

        match value {
            CellValue::Empty => {
                // Only worth a record when it carries a style
                if xf_id != 0 {
                    xml.push_str(&format!("<c r=\"{}\"{}/>", cell_ref, style_attr));
                }
            }
            CellValue::Number(n) => {
                xml.push_str(&format!(
                    "<c r=\"{}\"{}><v>{}</v></c>",
                    cell_ref, style_attr, n
                ));
            }
            CellValue::String(s) => {
                xml.push_str(&format!(
                    "<c r=\"{}\"{} t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
                    cell_ref,
                    style_attr,
                    escape_xml(s.as_str())
                ));
            }
            CellValue::Boolean(b) => {
                xml.push_str(&format!(
                    "<c r=\"{}\"{} t=\"b\"><v>{}</v></c>",
                    cell_ref,
                    style_attr,
                    if *b { 1 } else { 0 }
                ));
            }
            CellValue::Error(e) => {
                xml.push_str(&format!(
                    "<c r=\"{}\"{} t=\"e\"><v>{}</v></c>",
                    cell_ref,
                    style_attr,
                    e.as_str()
                ));
            }
            CellValue::Formula { text, cached_value } => {
                Self::write_formula_cell(xml, &cell_ref, &style_attr, text, cached_value.as_deref());
            }
        }
    }

    fn write_formula_cell(
        xml: &mut String,
        cell_ref: &str,
        style_attr: &str,
        text: &str,
        cached: Option<&CellValue>,
    ) {
        let formula = escape_xml(text);
        match cached {
            Some(CellValue::Number(n)) => xml.push_str(&format!(
                "<c r=\"{}\"{}><f>{}</f><v>{}</v></c>",
                cell_ref, style_attr, formula, n
            )),
            Some(CellValue::Boolean(b)) => xml.push_str(&format!(
                "<c r=\"{}\"{} t=\"b\"><f>{}</f><v>{}</v></c>",
                cell_ref,
                style_attr,
                formula,
                if *b { 1 } else { 0 }
            )),
            Some(CellValue::Error(e)) => xml.push_str(&format!(
                "<c r=\"{}\"{} t=\"e\"><f>{}</f><v>{}</v></c>",
                cell_ref,
                style_attr,
                formula,
                e.as_str()
            )),
            Some(CellValue::String(s)) => xml.push_str(&format!(
                "<c r=\"{}\"{} t=\"str\"><f>{}</f><v>{}</v></c>",
                cell_ref,
                style_attr,
                formula,
                escape_xml(s.as_str())
            )),
            _ => xml.push_str(&format!(
                "<c r=\"{}\"{}><f>{}</f></c>",
                cell_ref, style_attr, formula
            )),
        }
    }

    fn comments_xml(sheet: &Worksheet) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<comments xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<authors>
"#,
        );

        let authors = sheet.comment_authors();
        if authors.is_empty() {
            xml.push_str("<author></author>\n");
        } else {
            for author in authors {
                xml.push_str(&format!("<author>{}</author>\n", escape_xml(author)));
            }
        }
        xml.push_str("</authors>\n<commentList>\n");

        for (row, col, comment) in sheet.comments() {
            let cell_ref = CellAddress { row, col }.to_a1();
            let author_id = authors
                .iter()
                .position(|a| a == &comment.author)
                .unwrap_or(0);
            xml.push_str(&format!(
                "<comment ref=\"{}\" authorId=\"{}\"><text><r><t xml:space=\"preserve\">{}</t></r></text></comment>\n",
                cell_ref,
                author_id,
                escape_xml(&comment.text)
            ));
        }

        xml.push_str("</commentList>\n</comments>");
        xml
    }
}
