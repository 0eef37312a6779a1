//! BIFF8 record-level parsing.
//!
//! A BIFF8 stream is a sequence of records, each with a 4-byte header
//! (2 bytes record type + 2 bytes body length) followed by the body.
//! CONTINUE records (0x003C) extend the preceding record's body past the
//! 8224-byte per-record limit and are merged here.

pub mod primitives;
pub mod strings;

use std::io::Read;

use crate::error::{XlsError, XlsResult};

// Record type constants, per [MS-XLS] §2.3.

// Stream structure
pub const BOF: u16 = 0x0809;
pub const EOF: u16 = 0x000A;
pub const CONTINUE: u16 = 0x003C;

// Workbook globals
pub const BOUNDSHEET: u16 = 0x0085;
pub const SST: u16 = 0x00FC;
pub const DATEMODE: u16 = 0x0022;
pub const PALETTE: u16 = 0x0092;
pub const FONT: u16 = 0x0031;
pub const FORMAT: u16 = 0x041E;
pub const XF: u16 = 0x00E0;

// Cell records
pub const LABELSST: u16 = 0x00FD;
pub const LABEL: u16 = 0x0204;
pub const NUMBER: u16 = 0x0203;
pub const RK: u16 = 0x027E;
pub const MULRK: u16 = 0x00BD;
pub const BLANK: u16 = 0x0201;
pub const MULBLANK: u16 = 0x00BE;
pub const BOOLERR: u16 = 0x0205;
pub const FORMULA: u16 = 0x0006;
pub const STRING: u16 = 0x0207;

// Sheet structure
pub const ROW: u16 = 0x0208;
pub const COLINFO: u16 = 0x007D;

// BOF substream types (the `dt` field)
pub const BOF_WORKBOOK_GLOBALS: u16 = 0x0005;
pub const BOF_WORKSHEET: u16 = 0x0010;

/// The only BIFF version this crate reads
pub const BIFF8_VERSION: u16 = 0x0600;

/// One BIFF8 record with CONTINUE bodies already merged
#[derive(Debug)]
pub struct BiffRecord {
    pub record_type: u16,
    pub data: Vec<u8>,
}

/// Read every record from a BIFF8 stream, merging CONTINUE records into
/// their parent
pub fn read_records<R: Read>(stream: &mut R) -> XlsResult<Vec<BiffRecord>> {
    let mut records: Vec<BiffRecord> = Vec::new();
    let mut header = [0u8; 4];

    loop {
        match stream.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(XlsError::Io(e)),
        }

        let record_type = u16::from_le_bytes([header[0], header[1]]);
        let body_len = u16::from_le_bytes([header[2], header[3]]) as usize;

        let mut body = vec![0u8; body_len];
        if body_len > 0 {
            stream.read_exact(&mut body)?;
        }

        if record_type == CONTINUE {
            // Orphaned CONTINUE records are dropped
            if let Some(prev) = records.last_mut() {
                prev.data.extend_from_slice(&body);
            }
        } else {
            records.push(BiffRecord { record_type, data: body });
        }
    }

    Ok(records)
}

/// Extract `(version, substream_type)` from a BOF record body
pub fn parse_bof(data: &[u8]) -> XlsResult<(u16, u16)> {
    if data.len() < 4 {
        return Err(XlsError::InvalidFormat("BOF record too short".into()));
    }
    let version = u16::from_le_bytes([data[0], data[1]]);
    let dt = u16::from_le_bytes([data[2], data[3]]);
    Ok((version, dt))
}
