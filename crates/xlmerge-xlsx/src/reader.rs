//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use log::warn;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::read_styles_xml;
use xlmerge_core::{
    CellAddress, CellComment, CellError, CellValue, Style, Workbook, Worksheet,
};

/// Decode Excel's `_xHHHH_` escape sequences.
///
/// Excel encodes control characters in XML text this way:
/// `_x000d_` is CR, `_x000a_` is LF, `_x0009_` is tab, `_x005f_` is a
/// literal underscore.
fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '_' {
            result.push(c);
            continue;
        }

        let mut hex = String::new();
        let mut decoded = false;
        if chars.peek() == Some(&'x') {
            chars.next();
            for _ in 0..4 {
                match chars.peek() {
                    Some(&ch) if ch.is_ascii_hexdigit() => {
                        hex.push(ch);
                        chars.next();
                    }
                    _ => break,
                }
            }
            if hex.len() == 4 && chars.peek() == Some(&'_') {
                chars.next();
                if let Some(ch) = u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                {
                    result.push(ch);
                    decoded = true;
                }
            }
        }

        if !decoded {
            result.push('_');
            if !hex.is_empty() {
                result.push('x');
                result.push_str(&hex);
            }
        }
    }

    result
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let cell_styles = Self::read_styles(&mut archive)?;
        let (sheet_info, date_1904) = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::empty();
        workbook.set_date_1904(date_1904);

        for (idx, (name, r_id)) in sheet_info.iter().enumerate() {
            let path = match sheet_paths.get(r_id) {
                Some(p) => p,
                None => {
                    warn!("sheet '{}' has no worksheet part, skipping", name);
                    continue;
                }
            };
            let sheet_idx = workbook.add_worksheet(name.as_str())?;
            let sheet = workbook
                .worksheet_mut(sheet_idx)
                .ok_or_else(|| XlsxError::Parse("worksheet vanished after insert".into()))?;
            Self::read_worksheet(&mut archive, path, sheet, &shared_strings, &cell_styles)?;
            Self::read_worksheet_comments(&mut archive, idx, sheet)?;
        }

        if workbook.worksheet_count() == 0 {
            workbook.add_worksheet("Sheet1")?;
        }

        Ok(workbook)
    }

    /// Read the shared strings table, if the part exists
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"t" if in_si => in_t = true,
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current));
                        current.clear();
                        in_si = false;
                    }
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    if let Ok(text) = e.unescape() {
                        current.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<Style>> {
        let file = match archive.by_name("xl/styles.xml") {
            Ok(f) => f,
            Err(_) => return Ok(vec![Style::default()]),
        };
        read_styles_xml(file)
    }

    /// Read workbook.xml: sheet (name, rId) pairs plus the date epoch flag
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<(Vec<(String, String)>, bool)> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();
        let mut date_1904 = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"sheet" => {
                        let mut name = None;
                        let mut r_id = None;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"name" => {
                                    name = attr.unescape_value().ok().map(|s| s.to_string())
                                }
                                b"r:id" => {
                                    r_id = attr.unescape_value().ok().map(|s| s.to_string())
                                }
                                _ => {}
                            }
                        }
                        if let (Some(name), Some(r_id)) = (name, r_id) {
                            sheets.push((name, r_id));
                        }
                    }
                    b"workbookPr" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"date1904" {
                                date_1904 = attr
                                    .unescape_value()
                                    .ok()
                                    .map_or(false, |v| v == "1" || v == "true");
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok((sheets, date_1904))
    }

    /// Read workbook.xml.rels: rId -> worksheet part path
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = attr.unescape_value().ok().map(|s| s.to_string()),
                            b"Target" => {
                                target = attr.unescape_value().ok().map(|s| s.to_string())
                            }
                            b"Type" => {
                                rel_type = attr.unescape_value().ok().map(|s| s.to_string())
                            }
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Targets are relative to xl/ unless rooted
                            let full_path = match target.strip_prefix('/') {
                                Some(rooted) => rooted.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read one worksheet part into the sheet
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        cell_styles: &[Style],
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();

        let mut current_cell_ref: Option<String> = None;
        let mut current_cell_type: Option<String> = None;
        let mut current_cell_style: Option<u32> = None;
        let mut current_value: Option<String> = None;
        let mut current_formula: Option<String> = None;
        let mut in_cell = false;
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"row" => Self::apply_row_attrs(&e, worksheet),
                    b"c" => {
                        in_cell = true;
                        current_cell_ref = None;
                        current_cell_type = None;
                        current_cell_style = None;
                        current_value = None;
                        current_formula = None;
                        Self::parse_cell_attrs(
                            &e,
                            &mut current_cell_ref,
                            &mut current_cell_type,
                            &mut current_cell_style,
                        );
                    }
                    b"v" if in_cell => in_value = true,
                    b"f" if in_cell => in_formula = true,
                    b"is" if in_cell => in_inline_str = true,
                    b"t" if in_inline_str => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(cell_ref) = current_cell_ref.take() {
                            Self::process_cell(
                                worksheet,
                                &cell_ref,
                                current_cell_type.as_deref(),
                                current_value.as_deref(),
                                current_formula.as_deref(),
                                current_cell_style,
                                shared_strings,
                                cell_styles,
                            )?;
                        }
                        in_cell = false;
                    }
                    b"v" => in_value = false,
                    b"f" => in_formula = false,
                    b"is" => in_inline_str = false,
                    b"t" if in_inline_str => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if in_value {
                        if let Ok(text) = e.unescape() {
                            current_value = Some(text.to_string());
                        }
                    } else if in_formula {
                        if let Ok(text) = e.unescape() {
                            current_formula = Some(text.to_string());
                        }
                    } else if in_inline_text {
                        if let Ok(text) = e.unescape() {
                            current_value = Some(text.to_string());
                            current_cell_type = Some("inlineStr".to_string());
                        }
                    }
                }
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"row" => Self::apply_row_attrs(&e, worksheet),
                    b"col" => Self::apply_col_attrs(&e, worksheet),
                    b"c" => {
                        // Self-closing cell, possibly style-only
                        let mut cell_ref = None;
                        let mut cell_type = None;
                        let mut cell_style = None;
                        Self::parse_cell_attrs(&e, &mut cell_ref, &mut cell_type, &mut cell_style);
                        if let Some(cell_ref) = cell_ref {
                            Self::process_cell(
                                worksheet,
                                &cell_ref,
                                cell_type.as_deref(),
                                None,
                                None,
                                cell_style,
                                shared_strings,
                                cell_styles,
                            )?;
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    fn parse_cell_attrs(
        e: &quick_xml::events::BytesStart,
        cell_ref: &mut Option<String>,
        cell_type: &mut Option<String>,
        cell_style: &mut Option<u32>,
    ) {
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => *cell_ref = attr.unescape_value().ok().map(|s| s.to_string()),
                b"t" => *cell_type = attr.unescape_value().ok().map(|s| s.to_string()),
                b"s" => {
                    *cell_style = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<u32>().ok())
                }
                _ => {}
            }
        }
    }

    /// Row dimension overrides: custom height and hidden flag
    fn apply_row_attrs(e: &quick_xml::events::BytesStart, worksheet: &mut Worksheet) {
        let mut row_num: Option<u32> = None;
        let mut ht: Option<f64> = None;
        let mut custom_height = false;
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    row_num = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<u32>().ok())
                }
                b"ht" => {
                    ht = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<f64>().ok())
                }
                b"customHeight" => {
                    custom_height = attr
                        .unescape_value()
                        .ok()
                        .map_or(false, |s| s.as_ref() == "1" || s.as_ref() == "true")
                }
                _ => {}
            }
        }
        if let (Some(r), Some(h), true) = (row_num, ht, custom_height) {
            // 1-based in the file
            worksheet.set_row_height(r.saturating_sub(1), h);
        }
    }

    /// Column dimension overrides: custom width and hidden flag
    fn apply_col_attrs(e: &quick_xml::events::BytesStart, worksheet: &mut Worksheet) {
        let mut col_min: Option<u16> = None;
        let mut col_max: Option<u16> = None;
        let mut width: Option<f64> = None;
        let mut custom_width = false;
        let mut hidden = false;
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"min" => {
                    col_min = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<u16>().ok())
                }
                b"max" => {
                    col_max = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<u16>().ok())
                }
                b"width" => {
                    width = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<f64>().ok())
                }
                b"customWidth" => {
                    custom_width = attr
                        .unescape_value()
                        .ok()
                        .map_or(false, |s| s.as_ref() == "1" || s.as_ref() == "true")
                }
                b"hidden" => {
                    hidden = attr
                        .unescape_value()
                        .ok()
                        .map_or(false, |s| s.as_ref() == "1" || s.as_ref() == "true")
                }
                _ => {}
            }
        }
        if let (Some(min), Some(max)) = (col_min, col_max) {
            for col in min..=max {
                let col_idx = col.saturating_sub(1);
                if custom_width {
                    if let Some(w) = width {
                        worksheet.set_column_width(col_idx, w);
                    }
                }
                if hidden {
                    worksheet.set_column_hidden(col_idx, true);
                }
            }
        }
    }

    /// Turn one parsed `<c>` element into a stored cell
    #[allow(clippy::too_many_arguments)]
    fn process_cell(
        worksheet: &mut Worksheet,
        cell_ref: &str,
        cell_type: Option<&str>,
        value: Option<&str>,
        formula: Option<&str>,
        style_idx: Option<u32>,
        shared_strings: &[String],
        styles: &[Style],
    ) -> XlsxResult<()> {
        let addr = CellAddress::parse(cell_ref)
            .map_err(|e| XlsxError::Parse(format!("invalid cell reference '{}': {}", cell_ref, e)))?;

        if let Some(f) = formula {
            let cached = value.and_then(|v| Self::typed_value(cell_type, v, shared_strings));
            let text = f.strip_prefix('=').unwrap_or(f).to_string();
            worksheet.set_value_at(
                addr.row,
                addr.col,
                CellValue::Formula {
                    text,
                    cached_value: cached.map(Box::new),
                },
            )?;
        } else if let Some(v) = value {
            let cell_value = Self::typed_value(cell_type, v, shared_strings)
                .unwrap_or_else(|| CellValue::from(v));
            worksheet.set_value_at(addr.row, addr.col, cell_value)?;
        }

        if let Some(s) = style_idx {
            if s != 0 {
                let style = styles
                    .get(s as usize)
                    .ok_or_else(|| XlsxError::Parse(format!("style index {} out of bounds", s)))?;
                worksheet.set_style_at(addr.row, addr.col, style.clone())?;
            }
        }

        Ok(())
    }

    /// Interpret a raw `<v>` text according to the cell's `t` attribute
    fn typed_value(
        cell_type: Option<&str>,
        value: &str,
        shared_strings: &[String],
    ) -> Option<CellValue> {
        match cell_type {
            Some("s") => {
                let idx: usize = value.parse().ok()?;
                shared_strings.get(idx).map(|s| CellValue::from(s.as_str()))
            }
            Some("b") => Some(CellValue::Boolean(
                value == "1" || value.eq_ignore_ascii_case("true"),
            )),
            Some("e") => CellError::parse(value).map(CellValue::Error),
            Some("inlineStr") | Some("str") => {
                Some(CellValue::from(decode_excel_escapes(value)))
            }
            None | Some("n") => match value.parse::<f64>() {
                Ok(n) => Some(CellValue::Number(n)),
                Err(_) => Some(CellValue::from(value)),
            },
            Some(_) => Some(CellValue::from(value)),
        }
    }

    /// Read the comments part for a worksheet, if present
    fn read_worksheet_comments<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        sheet_index: usize,
        worksheet: &mut Worksheet,
    ) -> XlsxResult<()> {
        let comments_path = format!("xl/comments{}.xml", sheet_index + 1);
        let file = match archive.by_name(&comments_path) {
            Ok(f) => f,
            Err(_) => return Ok(()),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut authors: Vec<String> = Vec::new();

        let mut in_author = false;
        let mut in_comment = false;
        let mut in_text = false;
        let mut in_t = false;
        let mut current_ref: Option<String> = None;
        let mut current_author_id: Option<usize> = None;
        let mut current_text = String::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"author" => in_author = true,
                    b"comment" => {
                        in_comment = true;
                        current_ref = None;
                        current_author_id = None;
                        current_text.clear();
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"ref" => {
                                    current_ref =
                                        attr.unescape_value().ok().map(|s| s.to_string())
                                }
                                b"authorId" => {
                                    current_author_id =
                                        attr.unescape_value().ok().and_then(|s| s.parse().ok())
                                }
                                _ => {}
                            }
                        }
                    }
                    b"text" if in_comment => in_text = true,
                    b"t" if in_text => in_t = true,
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"author" => in_author = false,
                    b"comment" => {
                        if let Some(ref cell_ref) = current_ref {
                            match CellAddress::parse(cell_ref) {
                                Ok(addr) => {
                                    let author = current_author_id
                                        .and_then(|id| authors.get(id))
                                        .cloned()
                                        .unwrap_or_default();
                                    let comment = CellComment::new(author, current_text.trim());
                                    worksheet.set_comment_at(addr.row, addr.col, comment)?;
                                }
                                Err(_) => {
                                    warn!("skipping comment with bad ref '{}'", cell_ref);
                                }
                            }
                        }
                        in_comment = false;
                        current_text.clear();
                    }
                    b"text" => in_text = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if in_author {
                        if let Ok(text) = e.unescape() {
                            authors.push(text.to_string());
                        }
                    } else if in_t {
                        if let Ok(text) = e.unescape() {
                            current_text.push_str(&text);
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    if e.name().as_ref() == b"author" {
                        authors.push(String::new());
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};

    #[test]
    fn escapes_decode() {
        assert_eq!(decode_excel_escapes("a_x000d_b"), "a\rb");
        assert_eq!(decode_excel_escapes("a_x000a_b"), "a\nb");
        assert_eq!(decode_excel_escapes("c1_x0009_c2"), "c1\tc2");
        assert_eq!(decode_excel_escapes("l1_x000d__x000a_l2"), "l1\r\nl2");
        assert_eq!(decode_excel_escapes("under_x005f_score"), "under_score");
        assert_eq!(decode_excel_escapes("_x000D_"), "\r");
        assert_eq!(decode_excel_escapes("plain"), "plain");
        // Incomplete sequences stay as-is
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_x000d"), "_x000d");
    }

    #[test]
    fn typed_values() {
        let shared = vec!["alpha".to_string()];
        assert_eq!(
            XlsxReader::typed_value(Some("s"), "0", &shared),
            Some(CellValue::from("alpha"))
        );
        assert_eq!(XlsxReader::typed_value(Some("s"), "9", &shared), None);
        assert_eq!(
            XlsxReader::typed_value(Some("b"), "1", &shared),
            Some(CellValue::Boolean(true))
        );
        assert_eq!(
            XlsxReader::typed_value(Some("e"), "#REF!", &shared),
            Some(CellValue::Error(CellError::Ref))
        );
        assert_eq!(
            XlsxReader::typed_value(None, "2.5", &shared),
            Some(CellValue::Number(2.5))
        );
        assert_eq!(
            XlsxReader::typed_value(None, "not a number", &shared),
            Some(CellValue::from("not a number"))
        );
    }

    #[test]
    fn read_minimal_package() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();

            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#).unwrap();

            zip.start_file("_rels/.rels", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#).unwrap();

            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Data" sheetId="1" r:id="rId1"/></sheets></workbook>"#).unwrap();

            zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#).unwrap();

            zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>name</t></is></c><c r="B1"><v>3.5</v></c></row></sheetData></worksheet>"#).unwrap();

            zip.finish().unwrap();
        }

        let workbook = XlsxReader::read(Cursor::new(buf)).unwrap();
        assert_eq!(workbook.worksheet_count(), 1);
        let sheet = workbook.worksheet(0).unwrap();
        assert_eq!(sheet.name(), "Data");
        assert_eq!(sheet.value_at(0, 0), Some(&CellValue::from("name")));
        assert_eq!(sheet.value_at(0, 1), Some(&CellValue::Number(3.5)));
    }

    #[test]
    fn missing_content_types_is_invalid() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();
            zip.start_file("random.txt", options).unwrap();
            zip.write_all(b"nope").unwrap();
            zip.finish().unwrap();
        }
        let err = XlsxReader::read(Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, XlsxError::InvalidFormat(_)));
    }
}
