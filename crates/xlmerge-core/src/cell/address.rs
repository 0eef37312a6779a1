//! A1-notation cell addresses and ranges

use std::fmt;

use crate::error::{CoreError, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// A zero-based cell location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    /// Row index (0-based)
    pub row: u32,
    /// Column index (0-based)
    pub col: u16,
}

impl CellAddress {
    /// Create an address from row/column indices
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse an A1-notation reference such as `B7` or `$AA$12`
    ///
    /// Absolute markers (`$`) are accepted and discarded; the model does not
    /// track reference anchoring.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || CoreError::InvalidAddress(s.to_string());

        let mut chars = s.chars().peekable();
        if chars.peek() == Some(&'$') {
            chars.next();
        }

        let mut letters = String::new();
        while let Some(c) = chars.peek() {
            if c.is_ascii_alphabetic() {
                letters.push(c.to_ascii_uppercase());
                chars.next();
            } else {
                break;
            }
        }

        if chars.peek() == Some(&'$') {
            chars.next();
        }
        let digits: String = chars.collect();

        if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let col = letters_to_column(&letters).ok_or_else(invalid)?;
        let row_1based: u32 = digits.parse().map_err(|_| invalid())?;
        if row_1based == 0 || row_1based > MAX_ROWS {
            return Err(invalid());
        }

        Ok(Self {
            row: row_1based - 1,
            col,
        })
    }

    /// Format as an A1-notation reference
    pub fn to_a1(&self) -> String {
        format!("{}{}", column_to_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// A rectangular cell range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Top-left corner
    pub start: CellAddress,
    /// Bottom-right corner (inclusive)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a range from two corners, normalizing the orientation
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddress::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    /// Parse a range like `A1:C10`; a bare address parses as a 1x1 range
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((a, b)) => {
                let start = CellAddress::parse(a)
                    .map_err(|_| CoreError::InvalidRange(s.to_string()))?;
                let end = CellAddress::parse(b)
                    .map_err(|_| CoreError::InvalidRange(s.to_string()))?;
                Ok(Self::new(start, end))
            }
            None => {
                let addr =
                    CellAddress::parse(s).map_err(|_| CoreError::InvalidRange(s.to_string()))?;
                Ok(Self::new(addr, addr))
            }
        }
    }

    /// Format as `A1:C10` (or a single address for a 1x1 range)
    pub fn to_a1(&self) -> String {
        if self.start == self.end {
            self.start.to_a1()
        } else {
            format!("{}:{}", self.start.to_a1(), self.end.to_a1())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Convert a 0-based column index to letters (0 -> "A", 27 -> "AB")
pub fn column_to_letters(col: u16) -> String {
    let mut n = col as u32 + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        out.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    out.reverse();
    // Only ASCII uppercase bytes are pushed above
    String::from_utf8(out).unwrap_or_default()
}

/// Convert column letters to a 0-based index ("A" -> 0, "XFD" -> 16383)
///
/// Returns `None` for empty input, non-letters, or columns past the sheet
/// limit.
pub fn letters_to_column(letters: &str) -> Option<u16> {
    if letters.is_empty() {
        return None;
    }
    let mut n: u32 = 0;
    for c in letters.chars() {
        let c = c.to_ascii_uppercase();
        if !c.is_ascii_uppercase() {
            return None;
        }
        n = n.checked_mul(26)?.checked_add(c as u32 - 'A' as u32 + 1)?;
        if n > MAX_COLS as u32 {
            return None;
        }
    }
    Some((n - 1) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn column_letter_conversion() {
        assert_eq!(column_to_letters(0), "A");
        assert_eq!(column_to_letters(25), "Z");
        assert_eq!(column_to_letters(26), "AA");
        assert_eq!(column_to_letters(701), "ZZ");
        assert_eq!(column_to_letters(702), "AAA");
        assert_eq!(column_to_letters(16383), "XFD");

        assert_eq!(letters_to_column("A"), Some(0));
        assert_eq!(letters_to_column("Z"), Some(25));
        assert_eq!(letters_to_column("AA"), Some(26));
        assert_eq!(letters_to_column("XFD"), Some(16383));
        assert_eq!(letters_to_column("XFE"), None);
        assert_eq!(letters_to_column(""), None);
        assert_eq!(letters_to_column("A1"), None);
    }

    #[test]
    fn parse_addresses() {
        assert_eq!(CellAddress::parse("A1").unwrap(), CellAddress::new(0, 0));
        assert_eq!(CellAddress::parse("B7").unwrap(), CellAddress::new(6, 1));
        assert_eq!(
            CellAddress::parse("$AA$12").unwrap(),
            CellAddress::new(11, 26)
        );
        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse("123").is_err());
        assert!(CellAddress::parse("A1B").is_err());
    }

    #[test]
    fn address_round_trip() {
        for s in ["A1", "Z99", "AA100", "XFD1048576"] {
            assert_eq!(CellAddress::parse(s).unwrap().to_a1(), s);
        }
    }

    #[test]
    fn parse_ranges() {
        let r = CellRange::parse("A1:C10").unwrap();
        assert_eq!(r.start, CellAddress::new(0, 0));
        assert_eq!(r.end, CellAddress::new(9, 2));
        assert_eq!(r.to_a1(), "A1:C10");

        // Reversed corners normalize
        assert_eq!(CellRange::parse("C10:A1").unwrap().to_a1(), "A1:C10");

        // Single cell
        assert_eq!(CellRange::parse("B2").unwrap().to_a1(), "B2");

        assert!(CellRange::parse("A1:").is_err());
        assert!(CellRange::parse(":B2").is_err());
    }
}
