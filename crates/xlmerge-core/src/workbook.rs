//! Workbooks

use crate::error::{CoreError, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// An in-memory workbook: an ordered list of worksheets with unique names
///
/// Name uniqueness is case-insensitive, matching Excel. The `date_1904`
/// flag records which date epoch the file declared; serial numbers are kept
/// as read and the flag is forwarded on write.
#[derive(Debug, Clone)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
    date_1904: bool,
}

impl Workbook {
    /// Create a workbook with a single sheet named "Sheet1"
    pub fn new() -> Self {
        Self {
            worksheets: vec![Worksheet::new("Sheet1")],
            date_1904: false,
        }
    }

    /// Create a workbook with no sheets (for readers to populate)
    pub fn empty() -> Self {
        Self {
            worksheets: Vec::new(),
            date_1904: false,
        }
    }

    /// Whether the workbook uses the 1904 date epoch
    pub fn date_1904(&self) -> bool {
        self.date_1904
    }

    /// Set the date epoch flag
    pub fn set_date_1904(&mut self, date_1904: bool) {
        self.date_1904 = date_1904;
    }

    /// Number of worksheets
    pub fn worksheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a worksheet by index, mutably
    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Find a worksheet by exact name
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.name() == name)
    }

    /// Find a worksheet by exact name, mutably
    pub fn worksheet_by_name_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.worksheets.iter_mut().find(|ws| ws.name() == name)
    }

    /// Iterate worksheets in tab order
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Iterate worksheets mutably
    pub fn worksheets_mut(&mut self) -> impl Iterator<Item = &mut Worksheet> {
        self.worksheets.iter_mut()
    }

    /// Sheet names in tab order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.worksheets.iter().map(|ws| ws.name()).collect()
    }

    /// Append a new empty worksheet, returning its index
    pub fn add_worksheet(&mut self, name: impl Into<String>) -> Result<usize> {
        let name = name.into();
        self.check_new_name(&name)?;
        self.worksheets.push(Worksheet::new(name));
        Ok(self.worksheets.len() - 1)
    }

    /// Append an already-built worksheet (used by readers), returning its index
    pub fn push_worksheet(&mut self, worksheet: Worksheet) -> Result<usize> {
        self.check_new_name(worksheet.name())?;
        self.worksheets.push(worksheet);
        Ok(self.worksheets.len() - 1)
    }

    /// Rename a worksheet, enforcing uniqueness against its siblings
    pub fn rename_worksheet(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        validate_sheet_name(&name)?;
        let lower = name.to_lowercase();
        let clash = self
            .worksheets
            .iter()
            .enumerate()
            .any(|(i, ws)| i != index && ws.name().to_lowercase() == lower);
        if clash {
            return Err(CoreError::DuplicateSheetName(name));
        }
        match self.worksheets.get_mut(index) {
            Some(ws) => {
                ws.set_name(name);
                Ok(())
            }
            None => Err(CoreError::SheetNotFound(format!("index {}", index))),
        }
    }

    fn check_new_name(&self, name: &str) -> Result<()> {
        validate_sheet_name(name)?;
        let lower = name.to_lowercase();
        if self
            .worksheets
            .iter()
            .any(|ws| ws.name().to_lowercase() == lower)
        {
            return Err(CoreError::DuplicateSheetName(name.to_string()));
        }
        Ok(())
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a sheet name against Excel's rules
///
/// Names must be 1..=31 characters and may not contain `: \ / ? * [ ]`.
pub fn validate_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CoreError::InvalidSheetName("empty name".to_string()));
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(CoreError::InvalidSheetName(name.to_string()));
    }
    if name.contains([':', '\\', '/', '?', '*', '[', ']']) {
        return Err(CoreError::InvalidSheetName(name.to_string()));
    }
    Ok(())
}
