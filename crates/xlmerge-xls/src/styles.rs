//! BIFF8 style record parsing.
//!
//! FONT, FORMAT, XF, and PALETTE records from the workbook globals are
//! collected into a [`StyleContext`] and resolved into one core
//! [`Style`] per XF entry.

use std::collections::HashMap;

use xlmerge_core::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, DiagonalDirection, FillStyle,
    FontStyle, HorizontalAlignment, NumberFormat, PatternType, Protection, Style, Underline,
    VerticalAlignment,
};

use crate::biff::primitives::{read_u16, read_u32};
use crate::biff::strings::{read_short_string, read_unicode_string};
use crate::error::{XlsError, XlsResult};

/// The standard BIFF8 palette. Workbook color indices 8..=63 map to entries
/// 0..=55; a PALETTE record can override individual entries.
pub(crate) const DEFAULT_PALETTE: [(u8, u8, u8); 56] = [
    (0, 0, 0),
    (255, 255, 255),
    (255, 0, 0),
    (0, 255, 0),
    (0, 0, 255),
    (255, 255, 0),
    (255, 0, 255),
    (0, 255, 255),
    (128, 0, 0),
    (0, 128, 0),
    (0, 0, 128),
    (128, 128, 0),
    (128, 0, 128),
    (0, 128, 128),
    (192, 192, 192),
    (128, 128, 128),
    (153, 153, 255),
    (153, 51, 102),
    (255, 255, 204),
    (204, 255, 255),
    (102, 0, 102),
    (255, 128, 128),
    (0, 102, 204),
    (204, 204, 255),
    (0, 0, 128),
    (255, 0, 255),
    (255, 255, 0),
    (0, 255, 255),
    (128, 0, 128),
    (128, 0, 0),
    (0, 128, 128),
    (0, 0, 255),
    (0, 204, 255),
    (204, 255, 255),
    (204, 255, 204),
    (255, 255, 153),
    (153, 204, 255),
    (255, 153, 204),
    (204, 153, 255),
    (255, 204, 153),
    (51, 102, 255),
    (51, 204, 204),
    (153, 204, 0),
    (255, 204, 0),
    (255, 153, 0),
    (255, 102, 0),
    (102, 102, 153),
    (150, 150, 150),
    (0, 51, 102),
    (51, 153, 102),
    (0, 51, 0),
    (51, 51, 0),
    (153, 51, 0),
    (153, 51, 51),
    (51, 51, 153),
    (51, 51, 51),
];

/// Parsed FONT record
#[derive(Debug, Clone)]
pub(crate) struct BiffFont {
    /// Height in twips (1/20 point)
    pub height_twips: u16,
    pub bold: bool,
    pub italic: bool,
    pub underline: u8,
    pub strikethrough: bool,
    pub color_index: u16,
    pub name: String,
}

/// Parsed XF record (20 bytes in BIFF8)
#[derive(Debug, Clone, Default)]
pub(crate) struct BiffXf {
    pub font_index: u16,
    pub format_index: u16,
    pub locked: bool,
    pub hidden: bool,
    pub hor_align: u8,
    pub vert_align: u8,
    pub wrap_text: bool,
    pub shrink_to_fit: bool,
    pub indent: u8,
    pub rotation: u8,
    // Border line codes (0..=13) and palette color indices per edge
    pub border_left: u8,
    pub border_right: u8,
    pub border_top: u8,
    pub border_bottom: u8,
    pub border_diag: u8,
    pub icv_left: u16,
    pub icv_right: u16,
    pub icv_top: u16,
    pub icv_bottom: u16,
    pub icv_diag: u16,
    pub diagonal_dir: u8,
    pub fill_pattern: u8,
    pub icv_fore: u16,
    pub icv_back: u16,
}

/// Style data collected from the workbook globals stream
pub(crate) struct StyleContext {
    pub fonts: Vec<BiffFont>,
    pub formats: HashMap<u16, String>,
    pub xfs: Vec<BiffXf>,
    pub palette: [(u8, u8, u8); 56],
}

impl StyleContext {
    pub fn new() -> Self {
        Self {
            fonts: Vec::new(),
            formats: HashMap::new(),
            xfs: Vec::new(),
            palette: DEFAULT_PALETTE,
        }
    }

    /// Resolve every XF record into a core style, in XF order
    pub fn build_style_table(&self) -> Vec<Style> {
        self.xfs.iter().map(|xf| self.resolve_xf(xf)).collect()
    }

    fn resolve_xf(&self, xf: &BiffXf) -> Style {
        Style {
            font: self.resolve_font(xf.font_index),
            fill: self.resolve_fill(xf),
            border: self.resolve_border(xf),
            alignment: self.resolve_alignment(xf),
            number_format: self.resolve_number_format(xf.format_index),
            protection: Protection {
                locked: xf.locked,
                hidden: xf.hidden,
            },
        }
    }

    fn resolve_font(&self, font_index: u16) -> FontStyle {
        // Font index 4 does not exist in the file: 0..=3 map directly,
        // index 5 means fonts[4], and so on.
        let actual = if font_index >= 5 {
            (font_index - 1) as usize
        } else {
            font_index as usize
        };

        let bf = match self.fonts.get(actual) {
            Some(f) => f,
            None => return FontStyle::default(),
        };

        FontStyle {
            name: bf.name.clone(),
            size: bf.height_twips as f64 / 20.0,
            bold: bf.bold,
            italic: bf.italic,
            underline: match bf.underline {
                0x01 => Underline::Single,
                0x02 => Underline::Double,
                0x21 => Underline::SingleAccounting,
                0x22 => Underline::DoubleAccounting,
                _ => Underline::None,
            },
            strikethrough: bf.strikethrough,
            color: self.resolve_color(bf.color_index),
        }
    }

    fn resolve_fill(&self, xf: &BiffXf) -> FillStyle {
        match pattern_from_biff(xf.fill_pattern) {
            PatternType::None => FillStyle::None,
            PatternType::Solid => {
                let color = self.resolve_color(xf.icv_fore);
                if color.is_auto() {
                    FillStyle::None
                } else {
                    FillStyle::Solid { color }
                }
            }
            pattern => FillStyle::Pattern {
                pattern,
                foreground: self.resolve_color(xf.icv_fore),
                background: self.resolve_color(xf.icv_back),
            },
        }
    }

    fn resolve_border(&self, xf: &BiffXf) -> BorderStyle {
        let make_edge = |line_code: u8, icv: u16| -> Option<BorderEdge> {
            let style = border_line_from_biff(line_code);
            if matches!(style, BorderLineStyle::None) {
                None
            } else {
                Some(BorderEdge::new(style, self.resolve_color(icv)))
            }
        };

        BorderStyle {
            left: make_edge(xf.border_left, xf.icv_left),
            right: make_edge(xf.border_right, xf.icv_right),
            top: make_edge(xf.border_top, xf.icv_top),
            bottom: make_edge(xf.border_bottom, xf.icv_bottom),
            diagonal: make_edge(xf.border_diag, xf.icv_diag),
            diagonal_direction: match xf.diagonal_dir {
                1 => DiagonalDirection::Down,
                2 => DiagonalDirection::Up,
                3 => DiagonalDirection::Both,
                _ => DiagonalDirection::None,
            },
        }
    }

    fn resolve_alignment(&self, xf: &BiffXf) -> Alignment {
        let horizontal = match xf.hor_align {
            1 => HorizontalAlignment::Left,
            2 => HorizontalAlignment::Center,
            3 => HorizontalAlignment::Right,
            4 => HorizontalAlignment::Fill,
            5 => HorizontalAlignment::Justify,
            6 => HorizontalAlignment::CenterContinuous,
            7 => HorizontalAlignment::Distributed,
            _ => HorizontalAlignment::General,
        };

        let vertical = match xf.vert_align {
            0 => VerticalAlignment::Top,
            1 => VerticalAlignment::Center,
            3 => VerticalAlignment::Justify,
            4 => VerticalAlignment::Distributed,
            _ => VerticalAlignment::Bottom,
        };

        // BIFF rotation: 1..=90 counter-clockwise, 91..=180 clockwise as
        // -(value - 90), 255 = stacked text
        let rotation = match xf.rotation {
            r @ 1..=90 => r as i16,
            r @ 91..=180 => -((r as i16) - 90),
            255 => 255,
            _ => 0,
        };

        Alignment {
            horizontal,
            vertical,
            wrap_text: xf.wrap_text,
            shrink_to_fit: xf.shrink_to_fit,
            indent: xf.indent,
            rotation,
        }
    }

    fn resolve_number_format(&self, fmt_id: u16) -> NumberFormat {
        if fmt_id == 0 {
            return NumberFormat::General;
        }
        if let Some(code) = self.formats.get(&fmt_id) {
            return NumberFormat::Custom(code.clone());
        }
        NumberFormat::BuiltIn(fmt_id as u32)
    }

    pub(crate) fn resolve_color(&self, icv: u16) -> Color {
        match icv {
            8..=63 => {
                let (r, g, b) = self.palette[(icv - 8) as usize];
                Color::Rgb { r, g, b }
            }
            // System window text / window background
            0x0040 => Color::BLACK,
            0x0041 => Color::WHITE,
            0x7FFF => Color::Auto,
            // EGA colors, same values as palette entries 8..=15
            0..=7 => {
                let (r, g, b) = DEFAULT_PALETTE[icv as usize];
                Color::Rgb { r, g, b }
            }
            _ => Color::Auto,
        }
    }
}

/// Parse a FONT record (0x0031): height, flag word, color index, bold
/// weight, script, underline, then the name as a short string.
pub(crate) fn parse_font(data: &[u8]) -> XlsResult<BiffFont> {
    if data.len() < 15 {
        return Err(XlsError::Parse("FONT record too short".into()));
    }

    let mut off = 0;
    let height = read_u16(data, &mut off)?;
    let grbit = read_u16(data, &mut off)?;
    let icv = read_u16(data, &mut off)?;
    let bls = read_u16(data, &mut off)?;
    let _sss = read_u16(data, &mut off)?;
    let uls = data[off];
    // family, charset, reserved
    off += 4;

    let name = if off < data.len() {
        read_short_string(data, &mut off).unwrap_or_default()
    } else {
        String::new()
    };

    Ok(BiffFont {
        height_twips: height,
        italic: (grbit & 0x0002) != 0,
        strikethrough: (grbit & 0x0008) != 0,
        bold: bls >= 700,
        underline: uls,
        color_index: icv,
        name,
    })
}

/// Parse a FORMAT record (0x041E): format index plus the format string
pub(crate) fn parse_format(data: &[u8]) -> XlsResult<(u16, String)> {
    let mut off = 0;
    let ifmt = read_u16(data, &mut off)?;
    let code = read_unicode_string(data, &mut off)?;
    Ok((ifmt, code))
}

/// Parse an XF record (0x00E0, 20 bytes), per [MS-XLS] §2.4.353
pub(crate) fn parse_xf(data: &[u8]) -> XlsResult<BiffXf> {
    if data.len() < 20 {
        return Err(XlsError::Parse(format!(
            "XF record too short: {} bytes",
            data.len()
        )));
    }

    let mut off = 0;
    let font_index = read_u16(data, &mut off)?;
    let format_index = read_u16(data, &mut off)?;
    let type_prot = read_u16(data, &mut off)?;

    let align1 = data[off];
    off += 1;
    let rotation = data[off];
    off += 1;
    let align2 = data[off];
    // skip used-attribute byte
    off += 2;

    let border1 = read_u32(data, &mut off)?;
    let border2 = read_u32(data, &mut off)?;
    let fill_colors = read_u16(data, &mut off)?;

    Ok(BiffXf {
        font_index,
        format_index,
        locked: (type_prot & 0x0001) != 0,
        hidden: (type_prot & 0x0002) != 0,
        hor_align: align1 & 0x07,
        wrap_text: (align1 & 0x08) != 0,
        vert_align: (align1 >> 4) & 0x07,
        rotation,
        indent: align2 & 0x0F,
        shrink_to_fit: (align2 & 0x10) != 0,
        border_left: (border1 & 0x0F) as u8,
        border_right: ((border1 >> 4) & 0x0F) as u8,
        border_top: ((border1 >> 8) & 0x0F) as u8,
        border_bottom: ((border1 >> 12) & 0x0F) as u8,
        icv_left: ((border1 >> 16) & 0x7F) as u16,
        icv_right: ((border1 >> 23) & 0x7F) as u16,
        diagonal_dir: ((border1 >> 30) & 0x03) as u8,
        icv_top: (border2 & 0x7F) as u16,
        icv_bottom: ((border2 >> 7) & 0x7F) as u16,
        icv_diag: ((border2 >> 14) & 0x7F) as u16,
        border_diag: ((border2 >> 21) & 0x0F) as u8,
        fill_pattern: ((border2 >> 26) & 0x3F) as u8,
        icv_fore: fill_colors & 0x7F,
        icv_back: (fill_colors >> 7) & 0x7F,
    })
}

/// Apply a PALETTE record (0x0092): color count then 4-byte RGB0 entries
pub(crate) fn apply_palette(data: &[u8], palette: &mut [(u8, u8, u8); 56]) -> XlsResult<()> {
    let mut off = 0;
    let count = read_u16(data, &mut off)? as usize;

    for entry in palette.iter_mut().take(count.min(56)) {
        if off + 4 > data.len() {
            break;
        }
        *entry = (data[off], data[off + 1], data[off + 2]);
        off += 4;
    }

    Ok(())
}

fn border_line_from_biff(code: u8) -> BorderLineStyle {
    match code {
        1 => BorderLineStyle::Thin,
        2 => BorderLineStyle::Medium,
        3 => BorderLineStyle::Dashed,
        4 => BorderLineStyle::Dotted,
        5 => BorderLineStyle::Thick,
        6 => BorderLineStyle::Double,
        7 => BorderLineStyle::Hair,
        8 => BorderLineStyle::MediumDashed,
        9 => BorderLineStyle::DashDot,
        10 => BorderLineStyle::MediumDashDot,
        11 => BorderLineStyle::DashDotDot,
        12 => BorderLineStyle::MediumDashDotDot,
        13 => BorderLineStyle::SlantDashDot,
        _ => BorderLineStyle::None,
    }
}

fn pattern_from_biff(code: u8) -> PatternType {
    match code {
        1 => PatternType::Solid,
        2 => PatternType::MediumGray,
        3 => PatternType::DarkGray,
        4 => PatternType::LightGray,
        5 => PatternType::DarkHorizontal,
        6 => PatternType::DarkVertical,
        7 => PatternType::DarkDown,
        8 => PatternType::DarkUp,
        9 => PatternType::DarkGrid,
        10 => PatternType::DarkTrellis,
        11 => PatternType::LightHorizontal,
        12 => PatternType::LightVertical,
        13 => PatternType::LightDown,
        14 => PatternType::LightUp,
        15 => PatternType::LightGrid,
        16 => PatternType::LightTrellis,
        17 => PatternType::Gray125,
        18 => PatternType::Gray0625,
        _ => PatternType::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn palette_color_resolution() {
        let ctx = StyleContext::new();
        assert_eq!(ctx.resolve_color(8), Color::BLACK);
        assert_eq!(ctx.resolve_color(10), Color::Rgb { r: 255, g: 0, b: 0 });
        assert_eq!(
            ctx.resolve_color(63),
            Color::Rgb {
                r: 51,
                g: 51,
                b: 51
            }
        );
        assert_eq!(ctx.resolve_color(0x0040), Color::BLACK);
        assert_eq!(ctx.resolve_color(0x0041), Color::WHITE);
        assert_eq!(ctx.resolve_color(0x7FFF), Color::Auto);
        assert_eq!(ctx.resolve_color(2), Color::Rgb { r: 255, g: 0, b: 0 });
    }

    #[test]
    fn font_record_parsing() {
        let mut data = Vec::new();
        data.extend_from_slice(&220u16.to_le_bytes()); // 11pt in twips
        data.extend_from_slice(&0x0002u16.to_le_bytes()); // italic
        data.extend_from_slice(&10u16.to_le_bytes()); // palette red
        data.extend_from_slice(&700u16.to_le_bytes()); // bold weight
        data.extend_from_slice(&0u16.to_le_bytes()); // script
        data.push(0x01); // single underline
        data.extend_from_slice(&[0, 0, 0]); // family, charset, reserved
        data.push(5);
        data.push(0x00);
        data.extend_from_slice(b"Arial");

        let font = parse_font(&data).unwrap();
        assert_eq!(font.height_twips, 220);
        assert!(font.bold);
        assert!(font.italic);
        assert!(!font.strikethrough);
        assert_eq!(font.underline, 0x01);
        assert_eq!(font.color_index, 10);
        assert_eq!(font.name, "Arial");
    }

    #[test]
    fn xf_record_parsing() {
        let mut data = [0u8; 20];
        data[4] = 0x01; // locked
        data[6] = 0x02 | 0x08 | (0x01 << 4); // center, wrap, vertical center
        data[7] = 45; // rotation

        let xf = parse_xf(&data).unwrap();
        assert!(xf.locked);
        assert!(!xf.hidden);
        assert_eq!(xf.hor_align, 2);
        assert_eq!(xf.vert_align, 1);
        assert!(xf.wrap_text);
        assert_eq!(xf.rotation, 45);
        assert_eq!(xf.fill_pattern, 0);
        assert!(parse_xf(&[0u8; 10]).is_err());
    }

    #[test]
    fn rotation_resolution() {
        let ctx = StyleContext::new();
        let aligned = |rot: u8| {
            ctx.resolve_alignment(&BiffXf {
                rotation: rot,
                vert_align: 2,
                ..BiffXf::default()
            })
            .rotation
        };
        assert_eq!(aligned(0), 0);
        assert_eq!(aligned(45), 45);
        assert_eq!(aligned(90), 90);
        assert_eq!(aligned(91), -1);
        assert_eq!(aligned(180), -90);
        assert_eq!(aligned(255), 255);
    }

    #[test]
    fn font_index_four_is_skipped() {
        let mut ctx = StyleContext::new();
        for i in 0..5 {
            ctx.fonts.push(BiffFont {
                height_twips: 200,
                bold: false,
                italic: false,
                underline: 0,
                strikethrough: false,
                color_index: 0x7FFF,
                name: format!("Font{}", i),
            });
        }
        assert_eq!(ctx.resolve_font(0).name, "Font0");
        assert_eq!(ctx.resolve_font(3).name, "Font3");
        assert_eq!(ctx.resolve_font(5).name, "Font4");
        // Past the table falls back to the default font
        assert_eq!(ctx.resolve_font(6).name, "Calibri");
    }

    #[test]
    fn number_format_resolution() {
        let mut ctx = StyleContext::new();
        ctx.formats.insert(164, "yyyy-mm-dd".into());

        assert_eq!(ctx.resolve_number_format(0), NumberFormat::General);
        assert_eq!(ctx.resolve_number_format(14), NumberFormat::BuiltIn(14));
        assert_eq!(
            ctx.resolve_number_format(164),
            NumberFormat::Custom("yyyy-mm-dd".into())
        );
    }

    #[test]
    fn palette_override() {
        let mut palette = DEFAULT_PALETTE;
        let mut data = Vec::new();
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&[0xAA, 0xBB, 0xCC, 0x00]);
        data.extend_from_slice(&[0x11, 0x22, 0x33, 0x00]);

        apply_palette(&data, &mut palette).unwrap();
        assert_eq!(palette[0], (0xAA, 0xBB, 0xCC));
        assert_eq!(palette[1], (0x11, 0x22, 0x33));
        assert_eq!(palette[2], DEFAULT_PALETTE[2]);
    }

    #[test]
    fn solid_fill_with_auto_foreground_is_no_fill() {
        let ctx = StyleContext::new();
        let style = ctx.resolve_xf(&BiffXf {
            fill_pattern: 1,
            icv_fore: 0x7F, // masked form of automatic
            vert_align: 2,
            ..BiffXf::default()
        });
        assert_eq!(style.fill, FillStyle::None);
    }
}
