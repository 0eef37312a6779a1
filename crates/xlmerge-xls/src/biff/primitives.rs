//! Little-endian field readers for BIFF8 record bodies.

use crate::error::{XlsError, XlsResult};

fn need(data: &[u8], offset: usize, len: usize) -> XlsResult<()> {
    if offset + len > data.len() {
        return Err(XlsError::Parse(format!(
            "unexpected end of record at offset {}, need {} bytes",
            offset, len
        )));
    }
    Ok(())
}

#[inline]
pub fn read_u8(data: &[u8], offset: &mut usize) -> XlsResult<u8> {
    need(data, *offset, 1)?;
    let v = data[*offset];
    *offset += 1;
    Ok(v)
}

#[inline]
pub fn read_u16(data: &[u8], offset: &mut usize) -> XlsResult<u16> {
    need(data, *offset, 2)?;
    let v = u16::from_le_bytes([data[*offset], data[*offset + 1]]);
    *offset += 2;
    Ok(v)
}

#[inline]
pub fn read_u32(data: &[u8], offset: &mut usize) -> XlsResult<u32> {
    need(data, *offset, 4)?;
    let v = u32::from_le_bytes([
        data[*offset],
        data[*offset + 1],
        data[*offset + 2],
        data[*offset + 3],
    ]);
    *offset += 4;
    Ok(v)
}

#[inline]
pub fn read_f64(data: &[u8], offset: &mut usize) -> XlsResult<f64> {
    need(data, *offset, 8)?;
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[*offset..*offset + 8]);
    *offset += 8;
    Ok(f64::from_le_bytes(bytes))
}

/// Decode an RK-encoded number.
///
/// Bit 0 set means divide the decoded value by 100. Bit 1 selects the
/// payload in bits 2..31: a signed 30-bit integer when set, otherwise the
/// upper 30 bits of an IEEE 754 double with the rest zeroed.
#[inline]
pub fn decode_rk(rk: u32) -> f64 {
    let div100 = (rk & 0x01) != 0;
    let is_integer = (rk & 0x02) != 0;

    let value = if is_integer {
        ((rk as i32) >> 2) as f64
    } else {
        let bits = ((rk & 0xFFFF_FFFC) as u64) << 32;
        f64::from_bits(bits)
    };

    if div100 {
        value / 100.0
    } else {
        value
    }
}

/// Read and decode a 4-byte RK value
#[inline]
pub fn read_rk(data: &[u8], offset: &mut usize) -> XlsResult<f64> {
    read_u32(data, offset).map(decode_rk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rk_integer() {
        assert_eq!(decode_rk((42u32 << 2) | 0x02), 42.0);
        assert_eq!(decode_rk(((-5i32 << 2) as u32) | 0x02), -5.0);
    }

    #[test]
    fn rk_integer_scaled() {
        assert_eq!(decode_rk((4200u32 << 2) | 0x03), 42.0);
    }

    #[test]
    fn rk_float() {
        let upper = ((1.5_f64.to_bits() >> 32) as u32) & 0xFFFF_FFFC;
        assert_eq!(decode_rk(upper), 1.5);
    }

    #[test]
    fn rk_known_encodings() {
        // Values produced by LibreOffice
        assert_eq!(decode_rk(0x0000_00AA), 42.0);
        assert!((decode_rk(0x0000_04EB) - 3.14).abs() < f64::EPSILON);
        assert_eq!(decode_rk(0xFFFF_FE72), -100.0);
        assert_eq!(decode_rk(0x0000_0002), 0.0);
    }

    #[test]
    fn field_readers_advance_offset() {
        let data = [0x34, 0x12, 0x78, 0x56, 0x00, 0x00];
        let mut off = 0;
        assert_eq!(read_u16(&data, &mut off).unwrap(), 0x1234);
        assert_eq!(read_u32(&data, &mut off).unwrap(), 0x0000_5678);
        assert_eq!(off, 6);
        assert!(read_u8(&data, &mut off).is_err());
    }

    #[test]
    fn f64_round_trips() {
        let bytes = 3.14_f64.to_le_bytes();
        let mut off = 0;
        assert!((read_f64(&bytes, &mut off).unwrap() - 3.14).abs() < f64::EPSILON);
    }
}
