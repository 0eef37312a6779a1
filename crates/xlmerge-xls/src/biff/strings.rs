//! BIFF8 string decoding.
//!
//! BIFF8 strings carry a length prefix (1 or 2 bytes) and a flags byte:
//! bit 0 selects UTF-16LE over compressed Latin-1, bit 2 marks trailing
//! Asian phonetic data, bit 3 marks a rich-text run array. Rich runs and
//! phonetic data are skipped; only the character data is kept.

use super::primitives::{read_u16, read_u32, read_u8};
use crate::error::{XlsError, XlsResult};

/// Read a short string (1-byte length prefix, used in BOUNDSHEET and FONT)
pub fn read_short_string(data: &[u8], offset: &mut usize) -> XlsResult<String> {
    let char_count = read_u8(data, offset)? as u16;
    let flags = read_u8(data, offset)?;
    read_character_data(data, offset, char_count, flags)
}

/// Read a Unicode string (2-byte length prefix, used in SST, LABEL, FORMAT)
pub fn read_unicode_string(data: &[u8], offset: &mut usize) -> XlsResult<String> {
    let char_count = read_u16(data, offset)?;
    let flags = read_u8(data, offset)?;

    let is_rich = (flags & 0x08) != 0;
    let has_ext = (flags & 0x04) != 0;

    let run_count = if is_rich { read_u16(data, offset)? } else { 0 };
    let ext_size = if has_ext { read_u32(data, offset)? } else { 0 };

    let text = read_character_data(data, offset, char_count, flags)?;

    // Rich runs are 4 bytes each (char position + font index)
    if is_rich {
        *offset += run_count as usize * 4;
    }
    if has_ext {
        *offset += ext_size as usize;
    }

    Ok(text)
}

fn read_character_data(
    data: &[u8],
    offset: &mut usize,
    char_count: u16,
    flags: u8,
) -> XlsResult<String> {
    let is_wide = (flags & 0x01) != 0;
    let count = char_count as usize;

    if is_wide {
        let byte_len = count * 2;
        if *offset + byte_len > data.len() {
            return Err(XlsError::Parse(format!(
                "string data truncated: need {} bytes at offset {}",
                byte_len, *offset
            )));
        }
        let mut units = Vec::with_capacity(count);
        for i in 0..count {
            units.push(u16::from_le_bytes([
                data[*offset + i * 2],
                data[*offset + i * 2 + 1],
            ]));
        }
        *offset += byte_len;
        String::from_utf16(&units)
            .map_err(|e| XlsError::Parse(format!("invalid UTF-16 string: {e}")))
    } else {
        if *offset + count > data.len() {
            return Err(XlsError::Parse(format!(
                "string data truncated: need {} bytes at offset {}",
                count, *offset
            )));
        }
        // Compressed form is Latin-1, one byte per character
        let s: String = data[*offset..*offset + count]
            .iter()
            .map(|&b| b as char)
            .collect();
        *offset += count;
        Ok(s)
    }
}

/// Parse a full SST body (with CONTINUE bodies already concatenated):
/// total ref count (u32), unique count (u32), then the strings.
pub fn parse_sst(data: &[u8]) -> XlsResult<Vec<String>> {
    let mut offset = 0;

    let _total_refs = read_u32(data, &mut offset)?;
    let unique_count = read_u32(data, &mut offset)? as usize;

    let mut strings = Vec::with_capacity(unique_count);

    for i in 0..unique_count {
        match read_unicode_string(data, &mut offset) {
            Ok(s) => strings.push(s),
            Err(e) => {
                // Some writers pad or truncate the SST tail
                log::warn!("SST parse error at string {i}/{unique_count}: {e}");
                break;
            }
        }
    }

    Ok(strings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn compressed_string() {
        let data = [0x03, 0x00, 0x00, b'A', b'B', b'C'];
        let mut offset = 0;
        assert_eq!(read_unicode_string(&data, &mut offset).unwrap(), "ABC");
        assert_eq!(offset, 6);
    }

    #[test]
    fn wide_string() {
        let data = [0x02, 0x00, 0x01, b'H', 0x00, b'i', 0x00];
        let mut offset = 0;
        assert_eq!(read_unicode_string(&data, &mut offset).unwrap(), "Hi");
        assert_eq!(offset, 7);
    }

    #[test]
    fn rich_runs_are_skipped() {
        // 2 chars, rich flag, 1 run (4 bytes after the text)
        let data = [
            0x02, 0x00, 0x08, 0x01, 0x00, b'o', b'k', 0xAA, 0xBB, 0xCC, 0xDD,
        ];
        let mut offset = 0;
        assert_eq!(read_unicode_string(&data, &mut offset).unwrap(), "ok");
        assert_eq!(offset, data.len());
    }

    #[test]
    fn short_string() {
        let data = [0x02, 0x00, b'O', b'K'];
        let mut offset = 0;
        assert_eq!(read_short_string(&data, &mut offset).unwrap(), "OK");
    }

    #[test]
    fn sst_with_two_strings() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&[0x01, 0x00, 0x00, b'A']);
        buf.extend_from_slice(&[0x02, 0x00, 0x00, b'B', b'C']);

        assert_eq!(parse_sst(&buf).unwrap(), vec!["A", "BC"]);
    }

    #[test]
    fn truncated_sst_keeps_complete_strings() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&[0x01, 0x00, 0x00, b'A']);
        buf.extend_from_slice(&[0x05, 0x00, 0x00, b'B']); // claims 5 chars, has 1

        assert_eq!(parse_sst(&buf).unwrap(), vec!["A"]);
    }
}
