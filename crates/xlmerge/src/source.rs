//! Input source descriptors and extension-based format detection.

use std::fmt;
use std::path::{Path, PathBuf};

/// Input spreadsheet format, detected from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Legacy binary format (.xls)
    Xls,
    /// Office Open XML (.xlsx)
    Xlsx,
}

impl SourceFormat {
    /// Detect the format from a path's extension, case-insensitively
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("xls") {
            Some(SourceFormat::Xls)
        } else if ext.eq_ignore_ascii_case("xlsx") {
            Some(SourceFormat::Xlsx)
        } else {
            None
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Xls => write!(f, "xls"),
            SourceFormat::Xlsx => write!(f, "xlsx"),
        }
    }
}

/// A validated input file: its path plus the detected format.
///
/// Existence is the caller's concern; construction only requires a
/// recognized extension.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    path: PathBuf,
    format: SourceFormat,
}

impl SourceDescriptor {
    /// Build a descriptor, or `None` if the extension is not a supported
    /// spreadsheet format
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let format = SourceFormat::from_path(&path)?;
        Some(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extension_detection() {
        assert_eq!(
            SourceFormat::from_path(Path::new("a.xls")),
            Some(SourceFormat::Xls)
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("b.XLSX")),
            Some(SourceFormat::Xlsx)
        );
        assert_eq!(SourceFormat::from_path(Path::new("c.csv")), None);
        assert_eq!(SourceFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn descriptor_rejects_unknown_extensions() {
        assert!(SourceDescriptor::from_path("report.xlsx").is_some());
        assert!(SourceDescriptor::from_path("report.ods").is_none());
        let desc = SourceDescriptor::from_path("data/report.xls").unwrap();
        assert_eq!(desc.format(), SourceFormat::Xls);
        assert_eq!(desc.path(), Path::new("data/report.xls"));
    }
}
