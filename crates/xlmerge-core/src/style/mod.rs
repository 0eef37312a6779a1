//! Cell styles
//!
//! A [`Style`] bundles font, fill, border, alignment, number format, and
//! protection. Worksheets never store styles on cells directly; cells carry
//! an index into a [`StylePool`], which deduplicates identical styles.

mod alignment;
mod border;
mod color;
mod fill;
mod font;
mod number_format;
mod pool;

pub use alignment::{Alignment, HorizontalAlignment, VerticalAlignment};
pub use border::{BorderEdge, BorderLineStyle, BorderStyle, DiagonalDirection};
pub use color::Color;
pub use fill::{FillStyle, PatternType};
pub use font::{FontStyle, Underline};
pub use number_format::NumberFormat;
pub use pool::StylePool;

/// A complete cell style
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Style {
    /// Font settings
    pub font: FontStyle,
    /// Background fill
    pub fill: FillStyle,
    /// Cell borders
    pub border: BorderStyle,
    /// Text alignment
    pub alignment: Alignment,
    /// Number format
    pub number_format: NumberFormat,
    /// Cell protection flags
    pub protection: Protection,
}

impl Style {
    /// Create the default style
    pub fn new() -> Self {
        Self::default()
    }

    /// True when every component is at its default
    pub fn is_default(&self) -> bool {
        *self == Style::default()
    }

    /// Set bold
    pub fn bold(mut self) -> Self {
        self.font.bold = true;
        self
    }

    /// Set italic
    pub fn italic(mut self) -> Self {
        self.font.italic = true;
        self
    }

    /// Set the font size in points
    pub fn font_size(mut self, size: f64) -> Self {
        self.font.size = size;
        self
    }

    /// Set the font family name
    pub fn font_name(mut self, name: impl Into<String>) -> Self {
        self.font.name = name.into();
        self
    }

    /// Set the font color
    pub fn font_color(mut self, color: Color) -> Self {
        self.font.color = color;
        self
    }

    /// Set a solid background fill
    pub fn fill_color(mut self, color: Color) -> Self {
        self.fill = FillStyle::Solid { color };
        self
    }

    /// Set a custom number format string
    pub fn number_format(mut self, format: impl Into<String>) -> Self {
        self.number_format = NumberFormat::Custom(format.into());
        self
    }

    /// Set horizontal alignment
    pub fn horizontal_alignment(mut self, align: HorizontalAlignment) -> Self {
        self.alignment.horizontal = align;
        self
    }

    /// Set vertical alignment
    pub fn vertical_alignment(mut self, align: VerticalAlignment) -> Self {
        self.alignment.vertical = align;
        self
    }

    /// Enable text wrapping
    pub fn wrap_text(mut self) -> Self {
        self.alignment.wrap_text = true;
        self
    }
}

/// Cell protection flags (effective only when the sheet is protected)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Protection {
    /// Cell is locked against editing
    pub locked: bool,
    /// Formula is hidden from the formula bar
    pub hidden: bool,
}

impl Default for Protection {
    fn default() -> Self {
        // Excel's default: locked, not hidden
        Self {
            locked: true,
            hidden: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_style_is_default() {
        assert!(Style::new().is_default());
        assert!(!Style::new().bold().is_default());
    }

    #[test]
    fn builder_composes() {
        let style = Style::new()
            .bold()
            .font_size(14.0)
            .fill_color(Color::rgb(255, 255, 0))
            .number_format("0.00");
        assert!(style.font.bold);
        assert_eq!(style.font.size, 14.0);
        assert_eq!(
            style.fill,
            FillStyle::Solid {
                color: Color::rgb(255, 255, 0)
            }
        );
        assert_eq!(
            style.number_format,
            NumberFormat::Custom("0.00".to_string())
        );
    }
}
