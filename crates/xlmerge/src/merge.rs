//! The merge engine.
//!
//! Four cooperating pieces, leaves first: cell transcription (one cell,
//! with style and comment, into the output's own pools), row
//! synchronization (one sheet's body rows appended after the output's
//! current last row), sheet registration (create missing output sheets and
//! seed their headers), and the orchestrator that drives them across all
//! sources and serializes the result.

use std::path::{Path, PathBuf};

use log::debug;
use xlmerge_core::{CellData, CellValue, Workbook, Worksheet};
use xlmerge_xls::XlsReader;
use xlmerge_xlsx::{XlsxReader, XlsxWriter};

use crate::autosize::auto_size_columns;
use crate::error::{FormatError, MergeError};
use crate::output;
use crate::source::{SourceDescriptor, SourceFormat};

/// Merge the given sources, in order, into a timestamped `.xlsx` in
/// `output_dir`. Returns the path of the written file.
///
/// Fails with [`MergeError::InsufficientInputs`] before opening anything
/// when fewer than two sources are supplied. Any per-source failure aborts
/// the whole run; nothing is written on failure.
pub fn merge_files(
    sources: &[SourceDescriptor],
    auto_size: bool,
    output_dir: &Path,
) -> Result<PathBuf, MergeError> {
    if sources.len() < 2 {
        return Err(MergeError::InsufficientInputs(sources.len()));
    }

    let mut merged = Workbook::empty();

    for descriptor in sources {
        debug!("merging {}", descriptor.path().display());
        // The input workbook lives only for this source's merge step
        let input = open_source(descriptor)?;
        merge_workbook(&mut merged, &input, descriptor.path())?;
    }

    if auto_size {
        auto_size_columns(&mut merged);
    }

    let path = output::output_path(output_dir);
    XlsxWriter::write_file(&merged, &path).map_err(|source| MergeError::Serialization {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

fn open_source(descriptor: &SourceDescriptor) -> Result<Workbook, MergeError> {
    let result = match descriptor.format() {
        SourceFormat::Xls => XlsReader::read_file(descriptor.path()).map_err(FormatError::from),
        SourceFormat::Xlsx => XlsxReader::read_file(descriptor.path()).map_err(FormatError::from),
    };
    result.map_err(|source| MergeError::UnreadableSource {
        path: descriptor.path().to_path_buf(),
        source,
    })
}

/// Merge one opened input workbook into the output.
///
/// Registers missing sheets (seeding each header from this input), then
/// appends every input sheet's body rows to its output counterpart.
/// `source_path` is only used in error messages.
pub fn merge_workbook(
    output: &mut Workbook,
    input: &Workbook,
    source_path: &Path,
) -> Result<(), MergeError> {
    register_sheets(output, input, source_path)?;

    for sheet in input.worksheets() {
        let target_idx = find_sheet(output, sheet.name()).ok_or_else(|| {
            // register_sheets just ensured the sheet exists
            MergeError::MissingHeader {
                sheet: sheet.name().to_string(),
                path: source_path.to_path_buf(),
            }
        })?;
        let target = match output.worksheet_mut(target_idx) {
            Some(t) => t,
            None => continue,
        };
        append_body_rows(target, sheet)?;
    }

    Ok(())
}

/// Output sheet names are unique case-insensitively, so the join key is too
fn find_sheet(workbook: &Workbook, name: &str) -> Option<usize> {
    workbook
        .sheet_names()
        .iter()
        .position(|n| n.eq_ignore_ascii_case(name))
}

/// Ensure every input sheet has an output counterpart.
///
/// A new output sheet gets the input's header row copied as values only.
/// Existing output sheets keep their header: the first file to introduce a
/// sheet name owns it, and later differing headers are ignored. An input
/// sheet with nothing in row 0 fails the run, even when later rows hold
/// data.
fn register_sheets(
    output: &mut Workbook,
    input: &Workbook,
    source_path: &Path,
) -> Result<(), MergeError> {
    for sheet in input.worksheets() {
        if sheet.iter_row(0).next().is_none() {
            return Err(MergeError::MissingHeader {
                sheet: sheet.name().to_string(),
                path: source_path.to_path_buf(),
            });
        }

        if find_sheet(output, sheet.name()).is_some() {
            continue;
        }

        let idx = output.add_worksheet(sheet.name())?;
        let target = match output.worksheet_mut(idx) {
            Some(t) => t,
            None => continue,
        };
        // Headers are self-describing labels: values only, no style or
        // comment
        for (col, cell) in sheet.iter_row(0) {
            target.set_value_at(0, col, transcribe_value(&cell.value))?;
        }
    }

    Ok(())
}

/// Append the source sheet's body rows (1..=last populated) after the
/// target's current last row.
///
/// Source row positions are not preserved; rows concatenate in visitation
/// order. A wholly blank source row within range still advances the target
/// position by one, keeping per-source row-count parity.
fn append_body_rows(target: &mut Worksheet, source: &Worksheet) -> Result<(), MergeError> {
    let last = match source.last_row() {
        Some(last) if last > 0 => last,
        _ => return Ok(()),
    };

    let mut next = target.last_row().map_or(1, |r| r + 1);
    for src_row in 1..=last {
        for (col, cell) in source.iter_row(src_row) {
            transcribe_cell(target, next, col, cell, source, src_row)?;
        }
        next += 1;
    }

    Ok(())
}

/// Copy one cell into the target sheet: normalized value, a deep copy of
/// the style registered in the target's own pool, and any comment.
fn transcribe_cell(
    target: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellData,
    source: &Worksheet,
    source_row: u32,
) -> Result<(), MergeError> {
    target.set_value_at(row, col, transcribe_value(&cell.value))?;

    if cell.style_index != 0 {
        if let Some(style) = source.style(cell.style_index) {
            target.set_style_at(row, col, style.clone())?;
        }
    }

    if let Some(comment) = source.comment_at(source_row, col) {
        target.set_comment_at(row, col, comment.clone())?;
    }

    Ok(())
}

/// Collapse a source value to the form the output carries.
///
/// Formula cells contribute their cached result. Numbers pass through the
/// same decimal rendering used for display, so callers must not assume a
/// binary-exact round-trip for computed values.
fn transcribe_value(value: &CellValue) -> CellValue {
    match value {
        CellValue::Formula { .. } => transcribe_value(value.effective_value()),
        CellValue::Number(n) => {
            let rendered = n.to_string();
            CellValue::Number(rendered.parse().unwrap_or(*n))
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xlmerge_core::{CellComment, CellError, Color, Style};

    fn workbook_with(name: &str, rows: &[&[&str]]) -> Workbook {
        let mut wb = Workbook::empty();
        let idx = wb.add_worksheet(name).unwrap();
        let sheet = wb.worksheet_mut(idx).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    sheet.set_value_at(r as u32, c as u16, *value).unwrap();
                }
            }
        }
        wb
    }

    #[test]
    fn first_file_owns_the_header() {
        let a = workbook_with("Data", &[&["id", "name"], &["1", "ann"]]);
        let b = workbook_with("Data", &[&["key", "label"], &["2", "ben"]]);

        let mut merged = Workbook::empty();
        merge_workbook(&mut merged, &a, Path::new("a.xlsx")).unwrap();
        merge_workbook(&mut merged, &b, Path::new("b.xlsx")).unwrap();

        let sheet = merged.worksheet_by_name("Data").unwrap();
        assert_eq!(sheet.value_at(0, 0), Some(&CellValue::from("id")));
        assert_eq!(sheet.value_at(0, 1), Some(&CellValue::from("name")));
        assert_eq!(sheet.value_at(1, 0), Some(&CellValue::from("1")));
        assert_eq!(sheet.value_at(2, 1), Some(&CellValue::from("ben")));
    }

    #[test]
    fn sheet_names_join_case_insensitively() {
        let a = workbook_with("Data", &[&["h"], &["a1"]]);
        let b = workbook_with("DATA", &[&["h"], &["b1"]]);

        let mut merged = Workbook::empty();
        merge_workbook(&mut merged, &a, Path::new("a.xlsx")).unwrap();
        merge_workbook(&mut merged, &b, Path::new("b.xlsx")).unwrap();

        assert_eq!(merged.worksheet_count(), 1);
        let sheet = merged.worksheet(0).unwrap();
        assert_eq!(sheet.value_at(2, 0), Some(&CellValue::from("b1")));
    }

    #[test]
    fn blank_rows_in_range_keep_their_slot() {
        let mut wb = Workbook::empty();
        let idx = wb.add_worksheet("S").unwrap();
        let sheet = wb.worksheet_mut(idx).unwrap();
        sheet.set_value_at(0, 0, "h").unwrap();
        sheet.set_value_at(1, 0, "first").unwrap();
        // row 2 is blank, row 3 populated
        sheet.set_value_at(3, 0, "third").unwrap();

        let mut merged = Workbook::empty();
        merge_workbook(&mut merged, &wb, Path::new("a.xlsx")).unwrap();

        let out = merged.worksheet(0).unwrap();
        assert_eq!(out.value_at(1, 0), Some(&CellValue::from("first")));
        assert_eq!(out.value_at(2, 0), None);
        assert_eq!(out.value_at(3, 0), Some(&CellValue::from("third")));
        assert_eq!(out.last_row(), Some(3));
    }

    #[test]
    fn empty_sheet_fails_with_missing_header() {
        let mut wb = Workbook::empty();
        wb.add_worksheet("Empty").unwrap();

        let mut merged = Workbook::empty();
        let err = merge_workbook(&mut merged, &wb, Path::new("bad.xlsx")).unwrap_err();
        match err {
            MergeError::MissingHeader { sheet, path } => {
                assert_eq!(sheet, "Empty");
                assert_eq!(path, Path::new("bad.xlsx"));
            }
            other => panic!("expected MissingHeader, got {other}"),
        }
    }

    #[test]
    fn headerless_sheet_with_body_rows_fails_too() {
        let mut wb = Workbook::empty();
        let idx = wb.add_worksheet("Orphans").unwrap();
        let sheet = wb.worksheet_mut(idx).unwrap();
        // data from row 3 on, nothing in row 0
        sheet.set_value_at(3, 0, "orphan").unwrap();

        let mut merged = Workbook::empty();
        let err = merge_workbook(&mut merged, &wb, Path::new("bad.xlsx")).unwrap_err();
        assert!(matches!(err, MergeError::MissingHeader { ref sheet, .. } if sheet == "Orphans"));
        assert_eq!(merged.worksheet_count(), 0);
    }

    #[test]
    fn styles_are_deep_copied_into_the_target_pool() {
        let mut wb = Workbook::empty();
        let idx = wb.add_worksheet("S").unwrap();
        let sheet = wb.worksheet_mut(idx).unwrap();
        sheet.set_value_at(0, 0, "h").unwrap();
        sheet.set_value_at(1, 0, "styled").unwrap();
        let style = Style::new().bold().fill_color(Color::rgb(200, 10, 10));
        sheet.set_style_at(1, 0, style.clone()).unwrap();

        let mut merged = Workbook::empty();
        merge_workbook(&mut merged, &wb, Path::new("a.xlsx")).unwrap();

        let out = merged.worksheet(0).unwrap();
        let out_idx = out.style_index_at(1, 0);
        assert_ne!(out_idx, 0);
        assert_eq!(out.style(out_idx), Some(&style));
    }

    #[test]
    fn comments_travel_with_their_cells() {
        let mut wb = Workbook::empty();
        let idx = wb.add_worksheet("S").unwrap();
        let sheet = wb.worksheet_mut(idx).unwrap();
        sheet.set_value_at(0, 0, "h").unwrap();
        sheet.set_value_at(1, 0, "x").unwrap();
        sheet
            .set_comment_at(1, 0, CellComment::new("QA", "verify me"))
            .unwrap();

        let mut merged = Workbook::empty();
        merge_workbook(&mut merged, &wb, Path::new("a.xlsx")).unwrap();

        let out = merged.worksheet(0).unwrap();
        let comment = out.comment_at(1, 0).unwrap();
        assert_eq!(comment.author, "QA");
        assert_eq!(comment.text, "verify me");
    }

    #[test]
    fn values_collapse_through_transcription() {
        assert_eq!(
            transcribe_value(&CellValue::formula_with_value(
                "A1*2",
                CellValue::Number(4.0)
            )),
            CellValue::Number(4.0)
        );
        assert_eq!(
            transcribe_value(&CellValue::formula("A1*2")),
            CellValue::Empty
        );
        assert_eq!(
            transcribe_value(&CellValue::Boolean(true)),
            CellValue::Boolean(true)
        );
        assert_eq!(
            transcribe_value(&CellValue::Error(CellError::Na)),
            CellValue::Error(CellError::Na)
        );
        assert_eq!(
            transcribe_value(&CellValue::Number(2.5)),
            CellValue::Number(2.5)
        );
    }

    #[test]
    fn too_few_sources_fail_before_any_io() {
        let err = merge_files(&[], false, Path::new(".")).unwrap_err();
        assert!(matches!(err, MergeError::InsufficientInputs(0)));

        let one = SourceDescriptor::from_path("only.xlsx").unwrap();
        let err = merge_files(&[one], false, Path::new(".")).unwrap_err();
        assert!(matches!(err, MergeError::InsufficientInputs(1)));
    }
}
