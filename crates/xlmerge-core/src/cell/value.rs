//! Cell values and interned strings

use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// The value held by a cell
///
/// Formula cells carry their source text plus the last value the producing
/// application calculated for them; this crate never evaluates formulas.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// No value (blank cell, possibly styled)
    #[default]
    Empty,
    /// Boolean
    Boolean(bool),
    /// Floating-point number (also dates, stored as serial numbers)
    Number(f64),
    /// Text, interned through the worksheet's [`StringPool`]
    String(SharedString),
    /// Error value such as `#DIV/0!`
    Error(CellError),
    /// Formula text with an optional cached result
    Formula {
        /// Formula source without the leading `=`
        text: String,
        /// Last calculated value, if the producing file recorded one
        cached_value: Option<Box<CellValue>>,
    },
}

impl CellValue {
    /// Create a formula value with no cached result
    pub fn formula(text: impl Into<String>) -> Self {
        CellValue::Formula {
            text: text.into(),
            cached_value: None,
        }
    }

    /// Create a formula value with a cached result
    pub fn formula_with_value(text: impl Into<String>, value: CellValue) -> Self {
        CellValue::Formula {
            text: text.into(),
            cached_value: Some(Box::new(value)),
        }
    }

    /// True for [`CellValue::Empty`]
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The value this cell presents: for formulas the cached result (or
    /// `Empty` when none was recorded), otherwise the value itself.
    pub fn effective_value(&self) -> &CellValue {
        match self {
            CellValue::Formula {
                cached_value: Some(v),
                ..
            } => v,
            CellValue::Formula {
                cached_value: None, ..
            } => &CellValue::Empty,
            other => other,
        }
    }

    /// Numeric interpretation, if there is one
    pub fn as_number(&self) -> Option<f64> {
        match self.effective_value() {
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Short type tag, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Boolean(_) => "boolean",
            CellValue::Number(_) => "number",
            CellValue::String(_) => "string",
            CellValue::Error(_) => "error",
            CellValue::Formula { .. } => "formula",
        }
    }
}

impl fmt::Display for CellValue {
    /// Renders the value the way a spreadsheet UI shows it: blanks as the
    /// empty string, booleans as `TRUE`/`FALSE`, numbers minimally, and
    /// formulas by their cached result.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Error(e) => write!(f, "{}", e.as_str()),
            CellValue::Formula { cached_value, .. } => match cached_value {
                Some(v) => write!(f, "{}", v),
                None => Ok(()),
            },
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(SharedString::new(s))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(SharedString::new(s))
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}

/// Spreadsheet error values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    /// #NULL!
    Null,
    /// #DIV/0!
    Div0,
    /// #VALUE!
    Value,
    /// #REF!
    Ref,
    /// #NAME?
    Name,
    /// #NUM!
    Num,
    /// #N/A
    Na,
    /// #GETTING_DATA
    GettingData,
}

impl CellError {
    /// Display string as it appears in a cell
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Null => "#NULL!",
            CellError::Div0 => "#DIV/0!",
            CellError::Value => "#VALUE!",
            CellError::Ref => "#REF!",
            CellError::Name => "#NAME?",
            CellError::Num => "#NUM!",
            CellError::Na => "#N/A",
            CellError::GettingData => "#GETTING_DATA",
        }
    }

    /// Parse a display string back to an error value
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "#NULL!" => Some(CellError::Null),
            "#DIV/0!" => Some(CellError::Div0),
            "#VALUE!" => Some(CellError::Value),
            "#REF!" => Some(CellError::Ref),
            "#NAME?" => Some(CellError::Name),
            "#NUM!" => Some(CellError::Num),
            "#N/A" => Some(CellError::Na),
            "#GETTING_DATA" => Some(CellError::GettingData),
            _ => None,
        }
    }

    /// BIFF error code, as stored in BOOLERR and FORMULA records
    pub fn biff_code(&self) -> u8 {
        match self {
            CellError::Null => 0x00,
            CellError::Div0 => 0x07,
            CellError::Value => 0x0F,
            CellError::Ref => 0x17,
            CellError::Name => 0x1D,
            CellError::Num => 0x24,
            CellError::Na => 0x2A,
            CellError::GettingData => 0x2B,
        }
    }

    /// Inverse of [`CellError::biff_code`]
    pub fn from_biff_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(CellError::Null),
            0x07 => Some(CellError::Div0),
            0x0F => Some(CellError::Value),
            0x17 => Some(CellError::Ref),
            0x1D => Some(CellError::Name),
            0x24 => Some(CellError::Num),
            0x2A => Some(CellError::Na),
            0x2B => Some(CellError::GettingData),
            _ => None,
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cheaply cloneable interned string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SharedString(Arc<str>);

impl SharedString {
    /// Create a shared string (uninterned; see [`StringPool::intern`])
    pub fn new(s: impl AsRef<str>) -> Self {
        SharedString(Arc::from(s.as_ref()))
    }

    /// Borrow the underlying text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for SharedString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SharedString {
    fn from(s: &str) -> Self {
        SharedString::new(s)
    }
}

/// Deduplicating string pool
///
/// Repeated cell texts (common in tabular data) share one allocation.
#[derive(Debug, Clone, Default)]
pub struct StringPool {
    strings: HashMap<Arc<str>, SharedString>,
}

impl StringPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning a shared handle
    pub fn intern(&mut self, s: &str) -> SharedString {
        if let Some(existing) = self.strings.get(s) {
            return existing.clone();
        }
        let arc: Arc<str> = Arc::from(s);
        let shared = SharedString(arc.clone());
        self.strings.insert(arc, shared.clone());
        shared
    }

    /// Number of distinct strings in the pool
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// True when the pool holds no strings
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_matches_spreadsheet_rendering() {
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::Boolean(true).to_string(), "TRUE");
        assert_eq!(CellValue::Boolean(false).to_string(), "FALSE");
        assert_eq!(CellValue::Number(42.0).to_string(), "42");
        assert_eq!(CellValue::Number(3.25).to_string(), "3.25");
        assert_eq!(CellValue::from("hi").to_string(), "hi");
        assert_eq!(CellValue::Error(CellError::Div0).to_string(), "#DIV/0!");
    }

    #[test]
    fn formula_displays_cached_value() {
        let f = CellValue::formula_with_value("A1+A2", CellValue::Number(7.0));
        assert_eq!(f.to_string(), "7");
        assert_eq!(CellValue::formula("A1+A2").to_string(), "");
    }

    #[test]
    fn effective_value_unwraps_formulas() {
        let f = CellValue::formula_with_value("1+1", CellValue::Number(2.0));
        assert_eq!(f.effective_value(), &CellValue::Number(2.0));
        assert_eq!(f.as_number(), Some(2.0));
        assert_eq!(
            CellValue::formula("1+1").effective_value(),
            &CellValue::Empty
        );
    }

    #[test]
    fn error_codes_round_trip() {
        for e in [
            CellError::Null,
            CellError::Div0,
            CellError::Value,
            CellError::Ref,
            CellError::Name,
            CellError::Num,
            CellError::Na,
        ] {
            assert_eq!(CellError::from_biff_code(e.biff_code()), Some(e));
            assert_eq!(CellError::parse(e.as_str()), Some(e));
        }
    }

    #[test]
    fn string_pool_shares_allocations() {
        let mut pool = StringPool::new();
        let a = pool.intern("alpha");
        let b = pool.intern("alpha");
        assert!(Arc::ptr_eq(&a.0, &b.0));
        assert_eq!(pool.len(), 1);
        pool.intern("beta");
        assert_eq!(pool.len(), 2);
    }
}
