//! Color representation

/// A color as the file formats express it
///
/// Indexed and theme colors are preserved as written rather than resolved
/// to RGB, so styles round-trip without forcing a palette interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Automatic/default color
    #[default]
    Auto,

    /// RGB color
    Rgb { r: u8, g: u8, b: u8 },

    /// ARGB color with alpha channel
    Argb { a: u8, r: u8, g: u8, b: u8 },

    /// Theme color with a tint, stored as an integer percentage (-100..=100)
    Theme { index: u8, tint: i8 },

    /// Indexed color from the legacy palette
    Indexed(u8),
}

impl Color {
    /// Black (RGB 0,0,0)
    pub const BLACK: Color = Color::Rgb { r: 0, g: 0, b: 0 };

    /// White (RGB 255,255,255)
    pub const WHITE: Color = Color::Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Create an RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Parse a 6-digit (RGB) or 8-digit (ARGB) hex string, `#` optional
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Color::Rgb { r, g, b })
            }
            8 => {
                let a = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let r = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let g = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let b = u8::from_str_radix(&hex[6..8], 16).ok()?;
                Some(Color::Argb { a, r, g, b })
            }
            _ => None,
        }
    }

    /// Format as the 8-digit ARGB hex string XLSX uses for `rgb` attributes
    ///
    /// Non-RGB variants fall back to opaque black; callers that need to
    /// preserve indexed or theme colors emit those attributes instead.
    pub fn to_argb_hex(&self) -> String {
        match self {
            Color::Rgb { r, g, b } => format!("FF{:02X}{:02X}{:02X}", r, g, b),
            Color::Argb { a, r, g, b } => format!("{:02X}{:02X}{:02X}{:02X}", a, r, g, b),
            Color::Auto | Color::Theme { .. } | Color::Indexed(_) => "FF000000".to_string(),
        }
    }

    /// True for the automatic color
    pub fn is_auto(&self) -> bool {
        matches!(self, Color::Auto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_parses_both_widths() {
        assert_eq!(Color::from_hex("#FF0000"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::from_hex("00FF00"), Some(Color::rgb(0, 255, 0)));
        assert_eq!(
            Color::from_hex("80FFFFFF"),
            Some(Color::Argb {
                a: 128,
                r: 255,
                g: 255,
                b: 255
            })
        );
        assert_eq!(Color::from_hex("F00"), None);
    }

    #[test]
    fn argb_hex_is_always_eight_digits() {
        assert_eq!(Color::rgb(255, 0, 0).to_argb_hex(), "FFFF0000");
        assert_eq!(
            Color::Argb {
                a: 0x80,
                r: 1,
                g: 2,
                b: 3
            }
            .to_argb_hex(),
            "80010203"
        );
    }
}
