//! XLS (BIFF8) reader.
//!
//! Opens a Compound File Binary (CFB/OLE2) container, reads the `Workbook`
//! stream, parses BIFF8 records, and populates a core [`Workbook`].
//!
//! Formula cells keep their cached result; the token stream of the formula
//! itself is not decoded.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use xlmerge_core::{CellError, CellValue, Style, Workbook, Worksheet};

use crate::biff::primitives::{read_f64, read_rk, read_u16, read_u32};
use crate::biff::strings::{parse_sst, read_short_string, read_unicode_string};
use crate::biff::{self, BiffRecord};
use crate::error::{XlsError, XlsResult};
use crate::styles::{self, StyleContext};

/// XLS file reader
pub struct XlsReader;

/// Sheet metadata from a BOUNDSHEET record
#[derive(Debug)]
struct SheetInfo {
    /// 0 = worksheet, 2 = chart, 6 = macro
    sheet_type: u8,
    name: String,
}

impl XlsReader {
    /// Read an XLS file from a filesystem path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsResult<Workbook> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::read(file)
    }

    /// Read an XLS file from any `Read + Seek` source
    pub fn read<R: Read + Seek>(reader: R) -> XlsResult<Workbook> {
        let mut cfb = cfb::CompoundFile::open(reader)?;

        // BIFF5 files call the stream "Book"
        let stream_path = if cfb.exists("/Workbook") {
            "/Workbook"
        } else if cfb.exists("/Book") {
            "/Book"
        } else {
            return Err(XlsError::InvalidFormat(
                "no Workbook or Book stream found in CFB container".into(),
            ));
        };

        let mut stream_data = Vec::new();
        cfb.open_stream(stream_path)?
            .read_to_end(&mut stream_data)?;

        let records = biff::read_records(&mut Cursor::new(&stream_data))?;

        // First pass: workbook globals up to the first EOF
        let mut sst: Vec<String> = Vec::new();
        let mut sheets: Vec<SheetInfo> = Vec::new();
        let mut date_1904 = false;
        let mut in_globals = false;
        let mut globals_end_idx = 0;
        let mut style_ctx = StyleContext::new();

        for (idx, rec) in records.iter().enumerate() {
            match rec.record_type {
                biff::BOF => {
                    let (version, dt) = biff::parse_bof(&rec.data)?;
                    if dt == biff::BOF_WORKBOOK_GLOBALS {
                        if version != biff::BIFF8_VERSION {
                            return Err(XlsError::UnsupportedVersion(format!(
                                "expected BIFF8 (0x0600), got 0x{version:04X}"
                            )));
                        }
                        in_globals = true;
                    }
                }
                biff::EOF if in_globals => {
                    globals_end_idx = idx;
                    break;
                }
                biff::SST if in_globals => {
                    sst = parse_sst(&rec.data)?;
                }
                biff::BOUNDSHEET if in_globals => {
                    sheets.push(Self::parse_boundsheet(&rec.data)?);
                }
                biff::DATEMODE if in_globals => {
                    if rec.data.len() >= 2 {
                        date_1904 = u16::from_le_bytes([rec.data[0], rec.data[1]]) == 1;
                    }
                }
                biff::FONT if in_globals => {
                    if let Ok(font) = styles::parse_font(&rec.data) {
                        style_ctx.fonts.push(font);
                    }
                }
                biff::FORMAT if in_globals => {
                    if let Ok((id, code)) = styles::parse_format(&rec.data) {
                        style_ctx.formats.insert(id, code);
                    }
                }
                biff::XF if in_globals => {
                    if let Ok(xf) = styles::parse_xf(&rec.data) {
                        style_ctx.xfs.push(xf);
                    }
                }
                biff::PALETTE if in_globals => {
                    let _ = styles::apply_palette(&rec.data, &mut style_ctx.palette);
                }
                _ => {}
            }
        }

        if !in_globals {
            return Err(XlsError::InvalidFormat(
                "no workbook globals BOF found".into(),
            ));
        }

        let style_table = style_ctx.build_style_table();

        let mut workbook = Workbook::empty();
        workbook.set_date_1904(date_1904);

        // Second pass: each BOF..EOF pair after the globals is one sheet
        // substream, in BOUNDSHEET order
        let sheet_record_groups = Self::split_sheet_records(&records[globals_end_idx + 1..]);

        let mut wb_sheet_idx = 0usize;
        for (biff_idx, info) in sheets.iter().enumerate() {
            // Skip charts and macro sheets
            if info.sheet_type != 0 {
                continue;
            }

            workbook.add_worksheet(info.name.as_str())?;
            let sheet = workbook
                .worksheet_mut(wb_sheet_idx)
                .ok_or_else(|| XlsError::Parse("worksheet vanished after insert".into()))?;

            if let Some(sheet_records) = sheet_record_groups.get(biff_idx) {
                Self::parse_sheet_records(sheet_records, sheet, &sst, &style_table)?;
            }

            wb_sheet_idx += 1;
        }

        if workbook.worksheet_count() == 0 {
            workbook.add_worksheet("Sheet1")?;
        }

        Ok(workbook)
    }

    /// BOUNDSHEET: stream_offset(4) + visibility(1) + type(1) + short name
    fn parse_boundsheet(data: &[u8]) -> XlsResult<SheetInfo> {
        let mut offset = 0;
        let _stream_offset = read_u32(data, &mut offset)?;
        let _visibility = data.get(offset).copied().unwrap_or(0);
        offset += 1;
        let sheet_type = data.get(offset).copied().unwrap_or(0);
        offset += 1;
        let name = read_short_string(data, &mut offset)?;

        Ok(SheetInfo { sheet_type, name })
    }

    /// Group the records following the globals into one group per
    /// BOF..EOF substream
    fn split_sheet_records(records: &[BiffRecord]) -> Vec<Vec<&BiffRecord>> {
        let mut groups: Vec<Vec<&BiffRecord>> = Vec::new();
        let mut current: Option<Vec<&BiffRecord>> = None;
        let mut depth = 0i32;

        for rec in records {
            match rec.record_type {
                biff::BOF => {
                    if depth == 0 {
                        current = Some(Vec::new());
                    }
                    depth += 1;
                }
                biff::EOF => {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(group) = current.take() {
                            groups.push(group);
                        }
                    }
                }
                _ => {
                    if let Some(ref mut group) = current {
                        group.push(rec);
                    }
                }
            }
        }

        groups
    }

    fn parse_sheet_records(
        records: &[&BiffRecord],
        sheet: &mut Worksheet,
        sst: &[String],
        styles: &[Style],
    ) -> XlsResult<()> {
        // A STRING record carries the cached text of the preceding FORMULA
        let mut pending_formula_cell: Option<(u32, u16)> = None;

        for rec in records {
            if rec.record_type != biff::STRING {
                pending_formula_cell = None;
            }
            match rec.record_type {
                biff::LABELSST => Self::parse_labelsst(&rec.data, sheet, sst, styles)?,
                biff::LABEL => Self::parse_label(&rec.data, sheet, styles)?,
                biff::NUMBER => Self::parse_number(&rec.data, sheet, styles)?,
                biff::RK => Self::parse_rk(&rec.data, sheet, styles)?,
                biff::MULRK => Self::parse_mulrk(&rec.data, sheet, styles)?,
                biff::BLANK => Self::parse_blank(&rec.data, sheet, styles)?,
                biff::MULBLANK => Self::parse_mulblank(&rec.data, sheet, styles)?,
                biff::BOOLERR => Self::parse_boolerr(&rec.data, sheet, styles)?,
                biff::FORMULA => {
                    pending_formula_cell = Self::parse_formula(&rec.data, sheet, styles)?;
                }
                biff::STRING => {
                    if let Some((row, col)) = pending_formula_cell.take() {
                        Self::parse_formula_string(&rec.data, sheet, row, col)?;
                    }
                }
                biff::ROW => Self::parse_row(&rec.data, sheet)?,
                biff::COLINFO => Self::parse_colinfo(&rec.data, sheet)?,
                _ => {}
            }
        }

        Ok(())
    }

    /// Apply an XF table entry to a cell; index 0 and default styles are
    /// left off the sheet's pool
    fn apply_style(
        sheet: &mut Worksheet,
        row: u32,
        col: u16,
        xf_idx: u16,
        styles: &[Style],
    ) -> XlsResult<()> {
        if xf_idx == 0 {
            return Ok(());
        }
        if let Some(style) = styles.get(xf_idx as usize) {
            if *style != Style::default() {
                sheet.set_style_at(row, col, style.clone())?;
            }
        }
        Ok(())
    }

    /// LABELSST: row(2) + col(2) + xf(2) + sst_index(4)
    fn parse_labelsst(
        data: &[u8],
        sheet: &mut Worksheet,
        sst: &[String],
        styles: &[Style],
    ) -> XlsResult<()> {
        let mut off = 0;
        let row = read_u16(data, &mut off)? as u32;
        let col = read_u16(data, &mut off)?;
        let xf_idx = read_u16(data, &mut off)?;
        let sst_idx = read_u32(data, &mut off)? as usize;

        if let Some(s) = sst.get(sst_idx) {
            sheet.set_value_at(row, col, s.as_str())?;
        }
        Self::apply_style(sheet, row, col, xf_idx, styles)
    }

    /// LABEL: row(2) + col(2) + xf(2) + inline unicode string
    fn parse_label(data: &[u8], sheet: &mut Worksheet, styles: &[Style]) -> XlsResult<()> {
        let mut off = 0;
        let row = read_u16(data, &mut off)? as u32;
        let col = read_u16(data, &mut off)?;
        let xf_idx = read_u16(data, &mut off)?;
        let text = read_unicode_string(data, &mut off)?;

        sheet.set_value_at(row, col, text)?;
        Self::apply_style(sheet, row, col, xf_idx, styles)
    }

    /// NUMBER: row(2) + col(2) + xf(2) + f64(8)
    fn parse_number(data: &[u8], sheet: &mut Worksheet, styles: &[Style]) -> XlsResult<()> {
        let mut off = 0;
        let row = read_u16(data, &mut off)? as u32;
        let col = read_u16(data, &mut off)?;
        let xf_idx = read_u16(data, &mut off)?;
        let value = read_f64(data, &mut off)?;

        sheet.set_value_at(row, col, value)?;
        Self::apply_style(sheet, row, col, xf_idx, styles)
    }

    /// RK: row(2) + col(2) + xf(2) + rk(4)
    fn parse_rk(data: &[u8], sheet: &mut Worksheet, styles: &[Style]) -> XlsResult<()> {
        let mut off = 0;
        let row = read_u16(data, &mut off)? as u32;
        let col = read_u16(data, &mut off)?;
        let xf_idx = read_u16(data, &mut off)?;
        let value = read_rk(data, &mut off)?;

        sheet.set_value_at(row, col, value)?;
        Self::apply_style(sheet, row, col, xf_idx, styles)
    }

    /// MULRK: row(2) + first_col(2) + [xf(2) + rk(4)]* + last_col(2)
    fn parse_mulrk(data: &[u8], sheet: &mut Worksheet, styles: &[Style]) -> XlsResult<()> {
        if data.len() < 6 {
            return Err(XlsError::Parse("MULRK record too short".into()));
        }
        let mut off = 0;
        let row = read_u16(data, &mut off)? as u32;
        let first_col = read_u16(data, &mut off)?;
        let last_col = u16::from_le_bytes([data[data.len() - 2], data[data.len() - 1]]);
        let rk_data_end = data.len() - 2;

        let mut col = first_col;
        while off + 6 <= rk_data_end && col <= last_col {
            let xf_idx = read_u16(data, &mut off)?;
            let value = read_rk(data, &mut off)?;
            sheet.set_value_at(row, col, value)?;
            Self::apply_style(sheet, row, col, xf_idx, styles)?;
            col += 1;
        }

        Ok(())
    }

    /// BLANK: row(2) + col(2) + xf(2), an empty cell that carries formatting
    fn parse_blank(data: &[u8], sheet: &mut Worksheet, styles: &[Style]) -> XlsResult<()> {
        if data.len() < 6 {
            return Ok(());
        }
        let mut off = 0;
        let row = read_u16(data, &mut off)? as u32;
        let col = read_u16(data, &mut off)?;
        let xf_idx = read_u16(data, &mut off)?;
        Self::apply_style(sheet, row, col, xf_idx, styles)
    }

    /// MULBLANK: row(2) + first_col(2) + [xf(2)]* + last_col(2)
    fn parse_mulblank(data: &[u8], sheet: &mut Worksheet, styles: &[Style]) -> XlsResult<()> {
        if data.len() < 6 {
            return Ok(());
        }
        let mut off = 0;
        let row = read_u16(data, &mut off)? as u32;
        let first_col = read_u16(data, &mut off)?;
        let last_col = u16::from_le_bytes([data[data.len() - 2], data[data.len() - 1]]);
        let xf_data_end = data.len() - 2;

        let mut col = first_col;
        while off + 2 <= xf_data_end && col <= last_col {
            let xf_idx = read_u16(data, &mut off)?;
            Self::apply_style(sheet, row, col, xf_idx, styles)?;
            col += 1;
        }
        Ok(())
    }

    /// BOOLERR: row(2) + col(2) + xf(2) + value(1) + is_error(1)
    fn parse_boolerr(data: &[u8], sheet: &mut Worksheet, styles: &[Style]) -> XlsResult<()> {
        let mut off = 0;
        let row = read_u16(data, &mut off)? as u32;
        let col = read_u16(data, &mut off)?;
        let xf_idx = read_u16(data, &mut off)?;
        let val = data.get(off).copied().unwrap_or(0);
        let is_error = data.get(off + 1).copied().unwrap_or(0);

        let value = if is_error != 0 {
            CellValue::Error(CellError::from_biff_code(val).unwrap_or(CellError::Value))
        } else {
            CellValue::Boolean(val != 0)
        };

        sheet.set_value_at(row, col, value)?;
        Self::apply_style(sheet, row, col, xf_idx, styles)
    }

    /// FORMULA: row(2) + col(2) + xf(2) + result(8) + options(2) +
    /// reserved(4) + token stream.
    ///
    /// Returns the cell position when the cached result is a string, in
    /// which case a STRING record follows.
    fn parse_formula(
        data: &[u8],
        sheet: &mut Worksheet,
        styles: &[Style],
    ) -> XlsResult<Option<(u32, u16)>> {
        if data.len() < 20 {
            return Err(XlsError::Parse("FORMULA record too short".into()));
        }

        let mut off = 0;
        let row = read_u16(data, &mut off)? as u32;
        let col = read_u16(data, &mut off)?;
        let xf_idx = read_u16(data, &mut off)?;
        let result = &data[off..off + 8];

        // Bytes 6-7 == 0xFFFF marks a non-numeric cached result; byte 0
        // then gives its type
        let mut pending_string = false;
        let cached = if result[6] == 0xFF && result[7] == 0xFF {
            match result[0] {
                0x00 => {
                    pending_string = true;
                    None
                }
                0x01 => Some(CellValue::Boolean(result[2] != 0)),
                0x02 => Some(CellValue::Error(
                    CellError::from_biff_code(result[2]).unwrap_or(CellError::Value),
                )),
                _ => None,
            }
        } else {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(result);
            Some(CellValue::Number(f64::from_le_bytes(bytes)))
        };

        sheet.set_value_at(
            row,
            col,
            CellValue::Formula {
                text: String::new(),
                cached_value: cached.map(Box::new),
            },
        )?;
        Self::apply_style(sheet, row, col, xf_idx, styles)?;

        Ok(pending_string.then_some((row, col)))
    }

    /// STRING: the cached text of the preceding FORMULA
    fn parse_formula_string(
        data: &[u8],
        sheet: &mut Worksheet,
        row: u32,
        col: u16,
    ) -> XlsResult<()> {
        let mut off = 0;
        let text = read_unicode_string(data, &mut off)?;

        sheet.set_value_at(
            row,
            col,
            CellValue::Formula {
                text: String::new(),
                cached_value: Some(Box::new(CellValue::from(text))),
            },
        )?;
        Ok(())
    }

    /// ROW: index(2) + first_col(2) + last_col+1(2) + height(2) + ... +
    /// options(4 at byte 12)
    fn parse_row(data: &[u8], sheet: &mut Worksheet) -> XlsResult<()> {
        if data.len() < 16 {
            return Ok(());
        }
        let mut off = 0;
        let row_index = read_u16(data, &mut off)? as u32;
        let _first_col = read_u16(data, &mut off)?;
        let _last_col_plus1 = read_u16(data, &mut off)?;
        let raw_height = read_u16(data, &mut off)?;

        let height_pt = (raw_height & 0x7FFF) as f64 / 20.0;

        let mut opt_off = 12;
        let options = read_u32(data, &mut opt_off)?;
        let custom_height = (options & 0x40) != 0;

        if custom_height && height_pt > 0.0 {
            sheet.set_row_height(row_index, height_pt);
        }

        Ok(())
    }

    /// COLINFO: first_col(2) + last_col(2) + width(2) + xf(2) + options(2)
    fn parse_colinfo(data: &[u8], sheet: &mut Worksheet) -> XlsResult<()> {
        if data.len() < 10 {
            return Ok(());
        }
        let mut off = 0;
        let first_col = read_u16(data, &mut off)?;
        let last_col = read_u16(data, &mut off)?;
        let raw_width = read_u16(data, &mut off)?;
        let _xf = read_u16(data, &mut off)?;
        let options = read_u16(data, &mut off)?;

        let hidden = (options & 0x0001) != 0;
        // Width is stored in 1/256ths of a character
        let width_chars = raw_width as f64 / 256.0;

        for col in first_col..=last_col {
            if hidden {
                sheet.set_column_hidden(col, true);
            }
            if width_chars > 0.0 {
                sheet.set_column_width(col, width_chars);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn push_record(stream: &mut Vec<u8>, record_type: u16, body: &[u8]) {
        stream.extend_from_slice(&record_type.to_le_bytes());
        stream.extend_from_slice(&(body.len() as u16).to_le_bytes());
        stream.extend_from_slice(body);
    }

    fn bof_body(dt: u16) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&biff::BIFF8_VERSION.to_le_bytes());
        body.extend_from_slice(&dt.to_le_bytes());
        body.extend_from_slice(&[0u8; 12]);
        body
    }

    fn boundsheet_body(name: &str) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&0u32.to_le_bytes()); // stream offset, unused here
        body.push(0); // visible
        body.push(0); // worksheet
        body.push(name.len() as u8);
        body.push(0x00); // compressed
        body.extend_from_slice(name.as_bytes());
        body
    }

    fn number_body(row: u16, col: u16, value: f64) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&row.to_le_bytes());
        body.extend_from_slice(&col.to_le_bytes());
        body.extend_from_slice(&0u16.to_le_bytes());
        body.extend_from_slice(&value.to_le_bytes());
        body
    }

    fn labelsst_body(row: u16, col: u16, sst_idx: u32) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&row.to_le_bytes());
        body.extend_from_slice(&col.to_le_bytes());
        body.extend_from_slice(&0u16.to_le_bytes());
        body.extend_from_slice(&sst_idx.to_le_bytes());
        body
    }

    fn boolerr_body(row: u16, col: u16, val: u8, is_error: u8) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&row.to_le_bytes());
        body.extend_from_slice(&col.to_le_bytes());
        body.extend_from_slice(&0u16.to_le_bytes());
        body.push(val);
        body.push(is_error);
        body
    }

    /// Build an in-memory .xls with one sheet of mixed cell records
    fn sample_xls() -> Cursor<Vec<u8>> {
        let mut stream = Vec::new();

        // Globals
        push_record(&mut stream, biff::BOF, &bof_body(biff::BOF_WORKBOOK_GLOBALS));
        push_record(&mut stream, biff::DATEMODE, &1u16.to_le_bytes());
        push_record(&mut stream, biff::BOUNDSHEET, &boundsheet_body("Data"));
        let mut sst = Vec::new();
        sst.extend_from_slice(&1u32.to_le_bytes());
        sst.extend_from_slice(&1u32.to_le_bytes());
        sst.extend_from_slice(&[0x05, 0x00, 0x00]);
        sst.extend_from_slice(b"hello");
        push_record(&mut stream, biff::SST, &sst);
        push_record(&mut stream, biff::EOF, &[]);

        // Sheet substream
        push_record(&mut stream, biff::BOF, &bof_body(biff::BOF_WORKSHEET));
        push_record(&mut stream, biff::LABELSST, &labelsst_body(0, 0, 0));
        push_record(&mut stream, biff::NUMBER, &number_body(1, 0, 2.5));
        let mut rk = Vec::new();
        rk.extend_from_slice(&2u16.to_le_bytes());
        rk.extend_from_slice(&0u16.to_le_bytes());
        rk.extend_from_slice(&0u16.to_le_bytes());
        rk.extend_from_slice(&(((42u32) << 2) | 0x02).to_le_bytes());
        push_record(&mut stream, biff::RK, &rk);
        push_record(&mut stream, biff::BOOLERR, &boolerr_body(3, 0, 1, 0));
        push_record(&mut stream, biff::BOOLERR, &boolerr_body(3, 1, 0x17, 1));
        push_record(&mut stream, biff::EOF, &[]);

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut cfb = cfb::CompoundFile::create(&mut cursor).unwrap();
            let mut ws = cfb.create_stream("/Workbook").unwrap();
            ws.write_all(&stream).unwrap();
            ws.flush().unwrap();
        }
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn reads_mixed_cell_records() {
        let workbook = XlsReader::read(sample_xls()).unwrap();
        assert!(workbook.date_1904());
        assert_eq!(workbook.worksheet_count(), 1);

        let sheet = workbook.worksheet(0).unwrap();
        assert_eq!(sheet.name(), "Data");
        assert_eq!(sheet.value_at(0, 0), Some(&CellValue::from("hello")));
        assert_eq!(sheet.value_at(1, 0), Some(&CellValue::Number(2.5)));
        assert_eq!(sheet.value_at(2, 0), Some(&CellValue::Number(42.0)));
        assert_eq!(sheet.value_at(3, 0), Some(&CellValue::Boolean(true)));
        assert_eq!(
            sheet.value_at(3, 1),
            Some(&CellValue::Error(CellError::Ref))
        );
    }

    #[test]
    fn container_without_workbook_stream_is_rejected() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut cfb = cfb::CompoundFile::create(&mut cursor).unwrap();
            let mut s = cfb.create_stream("/Other").unwrap();
            s.write_all(b"irrelevant").unwrap();
        }
        cursor.set_position(0);
        let err = XlsReader::read(cursor).unwrap_err();
        assert!(matches!(err, XlsError::InvalidFormat(_)));
    }

    #[test]
    fn boundsheet_names_decode() {
        let info = XlsReader::parse_boundsheet(&boundsheet_body("Sales")).unwrap();
        assert_eq!(info.name, "Sales");
        assert_eq!(info.sheet_type, 0);
    }
}
