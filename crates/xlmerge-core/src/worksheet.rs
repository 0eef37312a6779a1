//! Worksheets

use std::collections::BTreeMap;

use crate::cell::{CellData, CellStorage, CellValue};
use crate::comment::CellComment;
use crate::error::{CoreError, Result};
use crate::style::{Style, StylePool};
use crate::{MAX_COLS, MAX_ROWS};

/// A single worksheet: a named sparse cell grid with comments
///
/// Cell styles are owned by this sheet's [`StylePool`]; cells reference them
/// by index. Comments are keyed by position, and the sheet tracks the
/// distinct comment authors in first-seen order (the XLSX comment part
/// stores authors as a table).
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    cells: CellStorage,
    comments: BTreeMap<(u32, u16), CellComment>,
    comment_authors: Vec<String>,
}

impl Worksheet {
    /// Create an empty worksheet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
            comments: BTreeMap::new(),
            comment_authors: Vec::new(),
        }
    }

    /// The sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the sheet
    ///
    /// Uniqueness against sibling sheets is the workbook's concern; renaming
    /// through [`crate::Workbook`] is checked there.
    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    fn check_position(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(CoreError::RowOutOfBounds {
                row,
                max: MAX_ROWS - 1,
            });
        }
        if col >= MAX_COLS {
            return Err(CoreError::ColumnOutOfBounds {
                col,
                max: MAX_COLS - 1,
            });
        }
        Ok(())
    }

    /// Get the cell stored at a position, if any
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(row, col)
    }

    /// Get a cell's value, if a cell is stored at the position
    pub fn value_at(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.cells.get(row, col).map(|c| &c.value)
    }

    /// Set a cell's value, preserving any style already on the cell
    ///
    /// String values are interned through the sheet's string pool.
    pub fn set_value_at(&mut self, row: u32, col: u16, value: impl Into<CellValue>) -> Result<()> {
        self.check_position(row, col)?;
        let value = self.intern_value(value.into());
        self.cells.set_value(row, col, value);
        Ok(())
    }

    /// Store a complete cell (value plus style index)
    ///
    /// The style index must already refer to this sheet's pool.
    pub fn set_cell_at(&mut self, row: u32, col: u16, data: CellData) -> Result<()> {
        self.check_position(row, col)?;
        if self.cells.style_pool().get(data.style_index).is_none() {
            return Err(CoreError::InvalidStyleIndex(data.style_index));
        }
        let data = CellData {
            value: self.intern_value(data.value),
            style_index: data.style_index,
        };
        self.cells.set(row, col, data);
        Ok(())
    }

    fn intern_value(&mut self, value: CellValue) -> CellValue {
        match value {
            CellValue::String(s) => {
                let interned = self.cells.string_pool_mut().intern(&s);
                CellValue::String(interned)
            }
            other => other,
        }
    }

    /// Register a style in this sheet's pool and apply it to a cell
    ///
    /// A blank cell is created if the position was empty. Returns the style
    /// index the pool assigned.
    pub fn set_style_at(&mut self, row: u32, col: u16, style: Style) -> Result<u32> {
        self.check_position(row, col)?;
        let index = self.cells.style_pool_mut().get_or_insert(style);
        self.cells.set_style_index(row, col, index);
        Ok(index)
    }

    /// A cell's style index (0 when the cell is absent or unstyled)
    pub fn style_index_at(&self, row: u32, col: u16) -> u32 {
        self.cells.get(row, col).map(|c| c.style_index).unwrap_or(0)
    }

    /// Resolve a style index against this sheet's pool
    pub fn style(&self, index: u32) -> Option<&Style> {
        self.cells.style_pool().get(index)
    }

    /// This sheet's style pool
    pub fn style_pool(&self) -> &StylePool {
        self.cells.style_pool()
    }

    /// Mutable access to the style pool
    pub fn style_pool_mut(&mut self) -> &mut StylePool {
        self.cells.style_pool_mut()
    }

    /// Iterate stored cells in row-major order as (row, col, cell)
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.cells.iter()
    }

    /// Iterate the stored cells of one row as (col, cell)
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.cells.iter_row(row)
    }

    /// Indices of rows holding at least one cell, ascending
    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.cells.row_indices()
    }

    /// Bounding box of stored cells, or `None` for an empty sheet
    pub fn used_range(&self) -> Option<((u32, u16), (u32, u16))> {
        self.cells.used_bounds()
    }

    /// Index of the last populated row, or `None` for an empty sheet
    pub fn last_row(&self) -> Option<u32> {
        self.used_range().map(|(_, (max_row, _))| max_row)
    }

    /// Index of the last populated column in a row
    pub fn last_col_in_row(&self, row: u32) -> Option<u16> {
        self.cells.iter_row(row).map(|(col, _)| col).last()
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.cell_count()
    }

    /// Attach a comment to a cell, tracking its author
    pub fn set_comment_at(&mut self, row: u32, col: u16, comment: CellComment) -> Result<()> {
        self.check_position(row, col)?;
        if comment.has_author() && !self.comment_authors.contains(&comment.author) {
            self.comment_authors.push(comment.author.clone());
        }
        self.comments.insert((row, col), comment);
        Ok(())
    }

    /// The comment on a cell, if any
    pub fn comment_at(&self, row: u32, col: u16) -> Option<&CellComment> {
        self.comments.get(&(row, col))
    }

    /// Iterate comments in position order as (row, col, comment)
    pub fn comments(&self) -> impl Iterator<Item = (u32, u16, &CellComment)> {
        self.comments
            .iter()
            .map(|(&(row, col), comment)| (row, col, comment))
    }

    /// Number of comments on this sheet
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// Distinct comment authors in first-seen order
    pub fn comment_authors(&self) -> &[String] {
        &self.comment_authors
    }

    /// A column's width in character units
    pub fn column_width(&self, col: u16) -> f64 {
        self.cells.column_width(col)
    }

    /// Override a column's width
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.cells.set_column_width(col, width);
    }

    /// Columns with explicit widths, ascending
    pub fn custom_column_widths(&self) -> impl Iterator<Item = (u16, f64)> + '_ {
        self.cells.custom_column_widths()
    }

    /// Whether a column is hidden
    pub fn is_column_hidden(&self, col: u16) -> bool {
        self.cells.is_column_hidden(col)
    }

    /// Hide or show a column
    pub fn set_column_hidden(&mut self, col: u16, hidden: bool) {
        self.cells.set_column_hidden(col, hidden);
    }

    /// Hidden column indices, ascending
    pub fn hidden_columns(&self) -> impl Iterator<Item = u16> + '_ {
        self.cells.hidden_columns()
    }

    /// A row's height in points
    pub fn row_height(&self, row: u32) -> f64 {
        self.cells.row_height(row)
    }

    /// Override a row's height
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.cells.set_row_height(row, height);
    }

    /// Rows with explicit heights, ascending
    pub fn custom_row_heights(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.cells.custom_row_heights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;
    use pretty_assertions::assert_eq;

    #[test]
    fn values_round_trip() {
        let mut sheet = Worksheet::new("Data");
        sheet.set_value_at(0, 0, "title").unwrap();
        sheet.set_value_at(1, 0, 42.0).unwrap();
        assert_eq!(sheet.value_at(0, 0), Some(&CellValue::from("title")));
        assert_eq!(sheet.value_at(1, 0), Some(&CellValue::Number(42.0)));
        assert_eq!(sheet.value_at(5, 5), None);
    }

    #[test]
    fn out_of_bounds_positions_are_rejected() {
        let mut sheet = Worksheet::new("S");
        assert!(matches!(
            sheet.set_value_at(MAX_ROWS, 0, 1.0),
            Err(CoreError::RowOutOfBounds { .. })
        ));
        assert!(matches!(
            sheet.set_value_at(0, MAX_COLS, 1.0),
            Err(CoreError::ColumnOutOfBounds { .. })
        ));
    }

    #[test]
    fn styles_are_pooled_per_sheet() {
        let mut sheet = Worksheet::new("S");
        sheet.set_value_at(0, 0, "a").unwrap();
        sheet.set_value_at(0, 1, "b").unwrap();
        let i = sheet.set_style_at(0, 0, Style::new().bold()).unwrap();
        let j = sheet.set_style_at(0, 1, Style::new().bold()).unwrap();
        assert_eq!(i, j);
        assert_eq!(sheet.style_index_at(0, 0), i);
        assert!(sheet.style(i).unwrap().font.bold);
    }

    #[test]
    fn styling_an_empty_position_creates_a_blank_cell() {
        let mut sheet = Worksheet::new("S");
        let idx = sheet
            .set_style_at(3, 3, Style::new().fill_color(Color::rgb(0, 0, 255)))
            .unwrap();
        let cell = sheet.cell_at(3, 3).unwrap();
        assert!(cell.value.is_empty());
        assert_eq!(cell.style_index, idx);
    }

    #[test]
    fn set_cell_rejects_unknown_style_index() {
        let mut sheet = Worksheet::new("S");
        let result = sheet.set_cell_at(0, 0, CellData::with_style(CellValue::from("x"), 99));
        assert!(matches!(result, Err(CoreError::InvalidStyleIndex(99))));
    }

    #[test]
    fn used_range_and_last_row() {
        let mut sheet = Worksheet::new("S");
        assert_eq!(sheet.used_range(), None);
        assert_eq!(sheet.last_row(), None);
        sheet.set_value_at(2, 1, 1.0).unwrap();
        sheet.set_value_at(7, 4, 2.0).unwrap();
        assert_eq!(sheet.used_range(), Some(((2, 1), (7, 4))));
        assert_eq!(sheet.last_row(), Some(7));
        assert_eq!(sheet.last_col_in_row(7), Some(4));
        assert_eq!(sheet.last_col_in_row(3), None);
    }

    #[test]
    fn comments_track_unique_authors() {
        let mut sheet = Worksheet::new("S");
        sheet
            .set_comment_at(0, 0, CellComment::new("Ana", "first"))
            .unwrap();
        sheet
            .set_comment_at(1, 0, CellComment::new("Ben", "second"))
            .unwrap();
        sheet
            .set_comment_at(2, 0, CellComment::new("Ana", "third"))
            .unwrap();
        sheet
            .set_comment_at(3, 0, CellComment::text_only("no author"))
            .unwrap();
        assert_eq!(sheet.comment_count(), 4);
        assert_eq!(sheet.comment_authors(), &["Ana", "Ben"]);
        assert_eq!(sheet.comment_at(1, 0).unwrap().text, "second");
    }
}
