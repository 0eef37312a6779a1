//! Text alignment

/// Text alignment settings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Alignment {
    /// Horizontal alignment
    pub horizontal: HorizontalAlignment,
    /// Vertical alignment
    pub vertical: VerticalAlignment,
    /// Wrap text
    pub wrap_text: bool,
    /// Shrink text to fit the cell
    pub shrink_to_fit: bool,
    /// Indent level
    pub indent: u8,
    /// Rotation in degrees (-90..=90, or 255 for stacked vertical text)
    pub rotation: i16,
}

/// Horizontal alignment, matching the OOXML values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlignment {
    /// General (text left, numbers right)
    #[default]
    General,
    /// Left aligned
    Left,
    /// Centered
    Center,
    /// Right aligned
    Right,
    /// Repeat content to fill the cell
    Fill,
    /// Justified
    Justify,
    /// Centered across the selection
    CenterContinuous,
    /// Distributed
    Distributed,
}

/// Vertical alignment, matching the OOXML values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAlignment {
    /// Top aligned
    Top,
    /// Centered
    Center,
    /// Bottom aligned (Excel's default)
    #[default]
    Bottom,
    /// Justified
    Justify,
    /// Distributed
    Distributed,
}
