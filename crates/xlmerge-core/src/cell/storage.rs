//! Sparse cell storage
//!
//! Cells live in nested `BTreeMap`s keyed by row then column, so iteration
//! is always in row-major order and untouched regions cost nothing. The
//! storage also owns the worksheet's string pool, style pool, and dimension
//! overrides.

use std::collections::BTreeMap;

use crate::cell::value::{CellValue, StringPool};
use crate::style::StylePool;

/// Default column width in character units (Calibri 11)
pub const DEFAULT_COLUMN_WIDTH: f64 = 8.43;

/// Default row height in points
pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// A cell's stored value and its style pool index
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellData {
    /// The cell's value
    pub value: CellValue,
    /// Index into the owning worksheet's style pool (0 = default style)
    pub style_index: u32,
}

impl CellData {
    /// Create a cell with the default style
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            style_index: 0,
        }
    }

    /// Create a cell with an explicit style index
    pub fn with_style(value: CellValue, style_index: u32) -> Self {
        Self { value, style_index }
    }

    /// A blank, default-styled cell
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the cell carries neither a value nor a non-default style
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.style_index == 0
    }
}

/// Sparse row-major cell grid with per-sheet pools and dimension overrides
#[derive(Debug, Clone, Default)]
pub struct CellStorage {
    rows: BTreeMap<u32, BTreeMap<u16, CellData>>,
    string_pool: StringPool,
    style_pool: StylePool,
    column_widths: BTreeMap<u16, f64>,
    hidden_columns: BTreeMap<u16, bool>,
    row_heights: BTreeMap<u32, f64>,
}

impl CellStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cell, if one is stored at the position
    pub fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    /// Store a cell; storing an empty cell removes the position instead
    pub fn set(&mut self, row: u32, col: u16, data: CellData) {
        if data.is_empty() {
            self.remove(row, col);
            return;
        }
        self.rows.entry(row).or_default().insert(col, data);
    }

    /// Set a cell's value, preserving any existing style index
    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        let style_index = self.get(row, col).map(|c| c.style_index).unwrap_or(0);
        self.set(row, col, CellData::with_style(value, style_index));
    }

    /// Set a cell's style index, creating a styled blank cell if needed
    pub fn set_style_index(&mut self, row: u32, col: u16, style_index: u32) {
        let value = self
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default();
        self.set(row, col, CellData::with_style(value, style_index));
    }

    /// Remove a cell, dropping its row map when it empties
    pub fn remove(&mut self, row: u32, col: u16) {
        if let Some(r) = self.rows.get_mut(&row) {
            r.remove(&col);
            if r.is_empty() {
                self.rows.remove(&row);
            }
        }
    }

    /// Iterate stored cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.rows
            .iter()
            .flat_map(|(&row, cols)| cols.iter().map(move |(&col, data)| (row, col, data)))
    }

    /// Iterate the stored cells of one row in column order
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.rows
            .get(&row)
            .into_iter()
            .flat_map(|cols| cols.iter().map(|(&col, data)| (col, data)))
    }

    /// Indices of rows that hold at least one cell, ascending
    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.keys().copied()
    }

    /// Bounding box of stored cells as ((min_row, min_col), (max_row, max_col))
    pub fn used_bounds(&self) -> Option<((u32, u16), (u32, u16))> {
        let min_row = *self.rows.keys().next()?;
        let max_row = *self.rows.keys().next_back()?;
        let mut min_col = u16::MAX;
        let mut max_col = 0u16;
        for cols in self.rows.values() {
            if let (Some(&first), Some(&last)) = (cols.keys().next(), cols.keys().next_back()) {
                min_col = min_col.min(first);
                max_col = max_col.max(last);
            }
        }
        Some(((min_row, min_col), (max_row, max_col)))
    }

    /// Total number of stored cells
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    /// The worksheet's string pool
    pub fn string_pool(&self) -> &StringPool {
        &self.string_pool
    }

    /// Mutable access to the string pool
    pub fn string_pool_mut(&mut self) -> &mut StringPool {
        &mut self.string_pool
    }

    /// The worksheet's style pool
    pub fn style_pool(&self) -> &StylePool {
        &self.style_pool
    }

    /// Mutable access to the style pool
    pub fn style_pool_mut(&mut self) -> &mut StylePool {
        &mut self.style_pool
    }

    /// A column's width, falling back to the sheet default
    pub fn column_width(&self, col: u16) -> f64 {
        self.column_widths
            .get(&col)
            .copied()
            .unwrap_or(DEFAULT_COLUMN_WIDTH)
    }

    /// Override a column's width (character units)
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.column_widths.insert(col, width);
    }

    /// Columns with explicit widths, ascending
    pub fn custom_column_widths(&self) -> impl Iterator<Item = (u16, f64)> + '_ {
        self.column_widths.iter().map(|(&c, &w)| (c, w))
    }

    /// Whether a column is hidden
    pub fn is_column_hidden(&self, col: u16) -> bool {
        self.hidden_columns.get(&col).copied().unwrap_or(false)
    }

    /// Hide or show a column
    pub fn set_column_hidden(&mut self, col: u16, hidden: bool) {
        if hidden {
            self.hidden_columns.insert(col, true);
        } else {
            self.hidden_columns.remove(&col);
        }
    }

    /// Hidden column indices, ascending
    pub fn hidden_columns(&self) -> impl Iterator<Item = u16> + '_ {
        self.hidden_columns.keys().copied()
    }

    /// A row's height, falling back to the sheet default
    pub fn row_height(&self, row: u32) -> f64 {
        self.row_heights
            .get(&row)
            .copied()
            .unwrap_or(DEFAULT_ROW_HEIGHT)
    }

    /// Override a row's height (points)
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    /// Rows with explicit heights, ascending
    pub fn custom_row_heights(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.row_heights.iter().map(|(&r, &h)| (r, h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_and_get() {
        let mut storage = CellStorage::new();
        storage.set(2, 3, CellData::new(CellValue::Number(1.5)));
        assert_eq!(
            storage.get(2, 3),
            Some(&CellData::new(CellValue::Number(1.5)))
        );
        assert_eq!(storage.get(0, 0), None);
        assert_eq!(storage.cell_count(), 1);
    }

    #[test]
    fn storing_empty_removes() {
        let mut storage = CellStorage::new();
        storage.set(0, 0, CellData::new(CellValue::from("x")));
        storage.set(0, 0, CellData::empty());
        assert_eq!(storage.get(0, 0), None);
        assert_eq!(storage.cell_count(), 0);
        assert_eq!(storage.used_bounds(), None);
    }

    #[test]
    fn styled_blank_cells_are_kept() {
        let mut storage = CellStorage::new();
        storage.set(1, 1, CellData::with_style(CellValue::Empty, 3));
        assert_eq!(storage.get(1, 1).map(|c| c.style_index), Some(3));
    }

    #[test]
    fn set_value_preserves_style() {
        let mut storage = CellStorage::new();
        storage.set(0, 0, CellData::with_style(CellValue::from("a"), 5));
        storage.set_value(0, 0, CellValue::from("b"));
        let cell = storage.get(0, 0).unwrap();
        assert_eq!(cell.value, CellValue::from("b"));
        assert_eq!(cell.style_index, 5);
    }

    #[test]
    fn iteration_is_row_major() {
        let mut storage = CellStorage::new();
        storage.set(1, 2, CellData::new(CellValue::Number(3.0)));
        storage.set(0, 5, CellData::new(CellValue::Number(1.0)));
        storage.set(1, 0, CellData::new(CellValue::Number(2.0)));

        let order: Vec<(u32, u16)> = storage.iter().map(|(r, c, _)| (r, c)).collect();
        assert_eq!(order, vec![(0, 5), (1, 0), (1, 2)]);
    }

    #[test]
    fn used_bounds_spans_all_cells() {
        let mut storage = CellStorage::new();
        storage.set(3, 7, CellData::new(CellValue::Number(1.0)));
        storage.set(10, 2, CellData::new(CellValue::Number(2.0)));
        assert_eq!(storage.used_bounds(), Some(((3, 2), (10, 7))));
    }

    #[test]
    fn dimension_overrides() {
        let mut storage = CellStorage::new();
        assert_eq!(storage.column_width(0), DEFAULT_COLUMN_WIDTH);
        storage.set_column_width(0, 20.0);
        assert_eq!(storage.column_width(0), 20.0);

        assert_eq!(storage.row_height(5), DEFAULT_ROW_HEIGHT);
        storage.set_row_height(5, 30.0);
        assert_eq!(storage.row_height(5), 30.0);

        storage.set_column_hidden(2, true);
        assert!(storage.is_column_hidden(2));
        storage.set_column_hidden(2, false);
        assert!(!storage.is_column_hidden(2));
    }
}
