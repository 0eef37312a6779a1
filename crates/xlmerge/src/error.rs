//! Merge error taxonomy
//!
//! Every variant is fatal to a run; nothing is written on failure.

use std::path::PathBuf;

use thiserror::Error;

/// A format reader's error, unified across the two input formats
#[derive(Debug, Error)]
pub enum FormatError {
    #[error(transparent)]
    Xls(#[from] xlmerge_xls::XlsError),

    #[error(transparent)]
    Xlsx(#[from] xlmerge_xlsx::XlsxError),
}

/// Errors that can abort a merge run
#[derive(Debug, Error)]
pub enum MergeError {
    /// Fewer than two input files were supplied
    #[error("need at least two input files, got {0}")]
    InsufficientInputs(usize),

    /// An input file could not be opened or parsed
    #[error("cannot read source '{path}': {source}")]
    UnreadableSource {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    /// An input sheet has no header row
    #[error("sheet '{sheet}' in '{path}' has no header row")]
    MissingHeader { sheet: String, path: PathBuf },

    /// The merged workbook could not be written
    #[error("cannot write output '{path}': {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: xlmerge_xlsx::XlsxError,
    },

    /// A model-level failure while building the output workbook
    #[error("merge failed: {0}")]
    Core(#[from] xlmerge_core::CoreError),
}
