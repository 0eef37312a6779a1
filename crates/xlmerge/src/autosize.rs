//! Column auto-sizing.
//!
//! Resizes the columns named by each sheet's header row to fit the widest
//! rendered value in that column. Columns populated only in body rows
//! beyond the header's width are left alone, as are sheets whose header
//! row renders entirely empty. Widths depend only on cell content, so
//! running the pass twice changes nothing.

use std::collections::BTreeMap;

use xlmerge_core::{Workbook, Worksheet};

/// Extra character units beyond the widest value
const WIDTH_PADDING: f64 = 2.0;

/// Resize the header-indexed columns of every sheet in the workbook
pub fn auto_size_columns(workbook: &mut Workbook) {
    for sheet in workbook.worksheets_mut() {
        auto_size_sheet(sheet);
    }
}

fn auto_size_sheet(sheet: &mut Worksheet) {
    let header_cols: Vec<u16> = sheet.iter_row(0).map(|(col, _)| col).collect();
    let has_header = sheet
        .iter_row(0)
        .any(|(_, cell)| !cell.value.to_string().is_empty());
    if !has_header {
        return;
    }

    // One pass over the sheet to find the widest rendered value per column
    let mut widest: BTreeMap<u16, usize> = BTreeMap::new();
    for (_, col, cell) in sheet.iter_cells() {
        let chars = cell.value.to_string().chars().count();
        let entry = widest.entry(col).or_insert(0);
        if chars > *entry {
            *entry = chars;
        }
    }

    for col in header_cols {
        if let Some(&chars) = widest.get(&col) {
            sheet.set_column_width(col, chars as f64 + WIDTH_PADDING);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sheet_with_header() -> Worksheet {
        let mut sheet = Worksheet::new("S");
        sheet.set_value_at(0, 0, "name").unwrap();
        sheet.set_value_at(0, 1, "qty").unwrap();
        sheet.set_value_at(1, 0, "a fairly long value").unwrap();
        sheet.set_value_at(1, 1, 5.0).unwrap();
        sheet.set_value_at(1, 2, "beyond the header").unwrap();
        sheet
    }

    #[test]
    fn header_columns_fit_their_widest_value() {
        let mut sheet = sheet_with_header();
        auto_size_sheet(&mut sheet);
        assert_eq!(sheet.column_width(0), 19.0 + WIDTH_PADDING);
        assert_eq!(sheet.column_width(1), 3.0 + WIDTH_PADDING);
    }

    #[test]
    fn columns_beyond_the_header_are_untouched() {
        let mut sheet = sheet_with_header();
        let before = sheet.column_width(2);
        auto_size_sheet(&mut sheet);
        assert_eq!(sheet.column_width(2), before);
    }

    #[test]
    fn sheets_without_a_rendered_header_are_skipped() {
        let mut sheet = Worksheet::new("S");
        sheet.set_value_at(1, 0, "body only").unwrap();
        let before = sheet.column_width(0);
        auto_size_sheet(&mut sheet);
        assert_eq!(sheet.column_width(0), before);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let mut sheet = sheet_with_header();
        auto_size_sheet(&mut sheet);
        let widths: Vec<f64> = (0..3).map(|c| sheet.column_width(c)).collect();
        auto_size_sheet(&mut sheet);
        let again: Vec<f64> = (0..3).map(|c| sheet.column_width(c)).collect();
        assert_eq!(widths, again);
    }
}
