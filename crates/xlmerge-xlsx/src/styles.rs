//! styles.xml handling
//!
//! Writing: cell styles from every worksheet's pool are deduplicated into a
//! single workbook-wide `cellXfs` table, and each sheet keeps a map from its
//! local style indices to the global xf ids. Reading: the component tables
//! (numFmts, fonts, fills, borders) are parsed first, then each `cellXfs`
//! entry is resolved into a composed [`Style`].

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use xlmerge_core::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, DiagonalDirection, FillStyle,
    FontStyle, HorizontalAlignment, NumberFormat, PatternType, Protection, Style, Underline,
    VerticalAlignment, Workbook,
};

/// Workbook-wide style table built for writing
pub(crate) struct XlsxStyleTable {
    styles: Vec<Style>,
    sheet_maps: Vec<HashMap<u32, u32>>,
}

impl XlsxStyleTable {
    /// Collect the styles actually referenced by cells across all sheets
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut styles = vec![Style::default()];
        let mut global: HashMap<Style, u32> = HashMap::new();
        global.insert(Style::default(), 0);

        let mut sheet_maps = Vec::new();
        for sheet in workbook.worksheets() {
            let mut map: HashMap<u32, u32> = HashMap::new();
            for (_, _, cell) in sheet.iter_cells() {
                let local = cell.style_index;
                if map.contains_key(&local) {
                    continue;
                }
                let style = sheet.style(local).cloned().unwrap_or_default();
                let global_id = match global.get(&style) {
                    Some(&id) => id,
                    None => {
                        let id = styles.len() as u32;
                        styles.push(style.clone());
                        global.insert(style, id);
                        id
                    }
                };
                map.insert(local, global_id);
            }
            sheet_maps.push(map);
        }

        Self { styles, sheet_maps }
    }

    /// Map a sheet-local style index to its global xf id
    pub(crate) fn xf_id_for(&self, sheet_index: usize, local_index: u32) -> u32 {
        self.sheet_maps
            .get(sheet_index)
            .and_then(|m| m.get(&local_index))
            .copied()
            .unwrap_or(0)
    }

    /// Render the full styles.xml part
    pub(crate) fn to_styles_xml(&self) -> String {
        // Deduplicate component tables across the style list
        let mut fonts: Vec<&FontStyle> = Vec::new();
        let mut fills: Vec<FillStyle> = vec![
            FillStyle::None,
            FillStyle::Pattern {
                pattern: PatternType::Gray125,
                foreground: Color::Auto,
                background: Color::Auto,
            },
        ];
        let mut borders: Vec<&BorderStyle> = Vec::new();
        let mut custom_formats: Vec<&str> = Vec::new();

        let mut font_ids = Vec::with_capacity(self.styles.len());
        let mut fill_ids = Vec::with_capacity(self.styles.len());
        let mut border_ids = Vec::with_capacity(self.styles.len());
        let mut numfmt_ids = Vec::with_capacity(self.styles.len());

        for style in &self.styles {
            let font_id = match fonts.iter().position(|f| **f == style.font) {
                Some(i) => i,
                None => {
                    fonts.push(&style.font);
                    fonts.len() - 1
                }
            };
            font_ids.push(font_id);

            let fill_id = match fills.iter().position(|f| *f == style.fill) {
                Some(i) => i,
                None => {
                    fills.push(style.fill);
                    fills.len() - 1
                }
            };
            fill_ids.push(fill_id);

            let border_id = match borders.iter().position(|b| **b == style.border) {
                Some(i) => i,
                None => {
                    borders.push(&style.border);
                    borders.len() - 1
                }
            };
            border_ids.push(border_id);

            let numfmt_id = match &style.number_format {
                NumberFormat::General => 0,
                NumberFormat::BuiltIn(id) => *id,
                NumberFormat::Custom(code) => {
                    // Custom format ids start at 164
                    match custom_formats.iter().position(|c| *c == code) {
                        Some(i) => 164 + i as u32,
                        None => {
                            custom_formats.push(code);
                            164 + (custom_formats.len() - 1) as u32
                        }
                    }
                }
            };
            numfmt_ids.push(numfmt_id);
        }

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !custom_formats.is_empty() {
            xml.push_str(&format!(
                "\n    <numFmts count=\"{}\">",
                custom_formats.len()
            ));
            for (i, code) in custom_formats.iter().enumerate() {
                xml.push_str(&format!(
                    "\n        <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    164 + i,
                    escape_xml_attr(code)
                ));
            }
            xml.push_str("\n    </numFmts>");
        }

        xml.push_str(&format!("\n    <fonts count=\"{}\">", fonts.len()));
        for font in &fonts {
            write_font(&mut xml, font);
        }
        xml.push_str("\n    </fonts>");

        xml.push_str(&format!("\n    <fills count=\"{}\">", fills.len()));
        for fill in &fills {
            write_fill(&mut xml, fill);
        }
        xml.push_str("\n    </fills>");

        xml.push_str(&format!("\n    <borders count=\"{}\">", borders.len()));
        for border in &borders {
            write_border(&mut xml, border);
        }
        xml.push_str("\n    </borders>");

        xml.push_str(
            r#"
    <cellStyleXfs count="1">
        <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
    </cellStyleXfs>"#,
        );

        xml.push_str(&format!("\n    <cellXfs count=\"{}\">", self.styles.len()));
        for (i, style) in self.styles.iter().enumerate() {
            write_xf(
                &mut xml,
                style,
                numfmt_ids[i],
                font_ids[i],
                fill_ids[i],
                border_ids[i],
            );
        }
        xml.push_str("\n    </cellXfs>");

        xml.push_str(
            r#"
    <cellStyles count="1">
        <cellStyle name="Normal" xfId="0" builtinId="0"/>
    </cellStyles>
</styleSheet>"#,
        );

        xml
    }
}

fn escape_xml_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn write_color(xml: &mut String, tag: &str, color: &Color) {
    match color {
        Color::Auto => xml.push_str(&format!("<{} indexed=\"64\"/>", tag)),
        Color::Rgb { .. } | Color::Argb { .. } => {
            xml.push_str(&format!("<{} rgb=\"{}\"/>", tag, color.to_argb_hex()))
        }
        Color::Theme { index, tint } => {
            if *tint == 0 {
                xml.push_str(&format!("<{} theme=\"{}\"/>", tag, index));
            } else {
                xml.push_str(&format!(
                    "<{} theme=\"{}\" tint=\"{}\"/>",
                    tag,
                    index,
                    *tint as f64 / 100.0
                ));
            }
        }
        Color::Indexed(i) => xml.push_str(&format!("<{} indexed=\"{}\"/>", tag, i)),
    }
}

fn write_font(xml: &mut String, font: &FontStyle) {
    xml.push_str("\n        <font>");
    if font.bold {
        xml.push_str("<b/>");
    }
    if font.italic {
        xml.push_str("<i/>");
    }
    if font.strikethrough {
        xml.push_str("<strike/>");
    }
    match font.underline {
        Underline::None => {}
        Underline::Single => xml.push_str("<u/>"),
        Underline::Double => xml.push_str("<u val=\"double\"/>"),
        Underline::SingleAccounting => xml.push_str("<u val=\"singleAccounting\"/>"),
        Underline::DoubleAccounting => xml.push_str("<u val=\"doubleAccounting\"/>"),
    }
    xml.push_str(&format!("<sz val=\"{}\"/>", font.size));
    if !font.color.is_auto() {
        write_color(xml, "color", &font.color);
    }
    xml.push_str(&format!(
        "<name val=\"{}\"/>",
        escape_xml_attr(&font.name)
    ));
    xml.push_str("</font>");
}

fn pattern_type_to_str(pattern: PatternType) -> &'static str {
    match pattern {
        PatternType::None => "none",
        PatternType::Solid => "solid",
        PatternType::MediumGray => "mediumGray",
        PatternType::DarkGray => "darkGray",
        PatternType::LightGray => "lightGray",
        PatternType::DarkHorizontal => "darkHorizontal",
        PatternType::DarkVertical => "darkVertical",
        PatternType::DarkDown => "darkDown",
        PatternType::DarkUp => "darkUp",
        PatternType::DarkGrid => "darkGrid",
        PatternType::DarkTrellis => "darkTrellis",
        PatternType::LightHorizontal => "lightHorizontal",
        PatternType::LightVertical => "lightVertical",
        PatternType::LightDown => "lightDown",
        PatternType::LightUp => "lightUp",
        PatternType::LightGrid => "lightGrid",
        PatternType::LightTrellis => "lightTrellis",
        PatternType::Gray125 => "gray125",
        PatternType::Gray0625 => "gray0625",
    }
}

fn str_to_pattern_type(s: &str) -> PatternType {
    match s {
        "solid" => PatternType::Solid,
        "mediumGray" => PatternType::MediumGray,
        "darkGray" => PatternType::DarkGray,
        "lightGray" => PatternType::LightGray,
        "darkHorizontal" => PatternType::DarkHorizontal,
        "darkVertical" => PatternType::DarkVertical,
        "darkDown" => PatternType::DarkDown,
        "darkUp" => PatternType::DarkUp,
        "darkGrid" => PatternType::DarkGrid,
        "darkTrellis" => PatternType::DarkTrellis,
        "lightHorizontal" => PatternType::LightHorizontal,
        "lightVertical" => PatternType::LightVertical,
        "lightDown" => PatternType::LightDown,
        "lightUp" => PatternType::LightUp,
        "lightGrid" => PatternType::LightGrid,
        "lightTrellis" => PatternType::LightTrellis,
        "gray125" => PatternType::Gray125,
        "gray0625" => PatternType::Gray0625,
        _ => PatternType::None,
    }
}

fn write_fill(xml: &mut String, fill: &FillStyle) {
    xml.push_str("\n        <fill>");
    match fill {
        FillStyle::None => xml.push_str("<patternFill patternType=\"none\"/>"),
        FillStyle::Solid { color } => {
            xml.push_str("<patternFill patternType=\"solid\">");
            write_color(xml, "fgColor", color);
            xml.push_str("<bgColor indexed=\"64\"/>");
            xml.push_str("</patternFill>");
        }
        FillStyle::Pattern {
            pattern,
            foreground,
            background,
        } => {
            xml.push_str(&format!(
                "<patternFill patternType=\"{}\">",
                pattern_type_to_str(*pattern)
            ));
            if !foreground.is_auto() {
                write_color(xml, "fgColor", foreground);
            }
            if !background.is_auto() {
                write_color(xml, "bgColor", background);
            }
            xml.push_str("</patternFill>");
        }
    }
    xml.push_str("</fill>");
}

fn border_style_to_str(style: BorderLineStyle) -> Option<&'static str> {
    match style {
        BorderLineStyle::None => None,
        BorderLineStyle::Thin => Some("thin"),
        BorderLineStyle::Medium => Some("medium"),
        BorderLineStyle::Thick => Some("thick"),
        BorderLineStyle::Dashed => Some("dashed"),
        BorderLineStyle::Dotted => Some("dotted"),
        BorderLineStyle::Double => Some("double"),
        BorderLineStyle::Hair => Some("hair"),
        BorderLineStyle::MediumDashed => Some("mediumDashed"),
        BorderLineStyle::DashDot => Some("dashDot"),
        BorderLineStyle::MediumDashDot => Some("mediumDashDot"),
        BorderLineStyle::DashDotDot => Some("dashDotDot"),
        BorderLineStyle::MediumDashDotDot => Some("mediumDashDotDot"),
        BorderLineStyle::SlantDashDot => Some("slantDashDot"),
    }
}

fn str_to_border_style(s: &str) -> BorderLineStyle {
    match s {
        "thin" => BorderLineStyle::Thin,
        "medium" => BorderLineStyle::Medium,
        "thick" => BorderLineStyle::Thick,
        "dashed" => BorderLineStyle::Dashed,
        "dotted" => BorderLineStyle::Dotted,
        "double" => BorderLineStyle::Double,
        "hair" => BorderLineStyle::Hair,
        "mediumDashed" => BorderLineStyle::MediumDashed,
        "dashDot" => BorderLineStyle::DashDot,
        "mediumDashDot" => BorderLineStyle::MediumDashDot,
        "dashDotDot" => BorderLineStyle::DashDotDot,
        "mediumDashDotDot" => BorderLineStyle::MediumDashDotDot,
        "slantDashDot" => BorderLineStyle::SlantDashDot,
        _ => BorderLineStyle::None,
    }
}

fn write_border_edge(xml: &mut String, tag: &str, edge: &Option<BorderEdge>) {
    match edge {
        Some(edge) => match border_style_to_str(edge.style) {
            Some(style) => {
                xml.push_str(&format!("<{} style=\"{}\">", tag, style));
                write_color(xml, "color", &edge.color);
                xml.push_str(&format!("</{}>", tag));
            }
            None => xml.push_str(&format!("<{}/>", tag)),
        },
        None => xml.push_str(&format!("<{}/>", tag)),
    }
}

fn write_border(xml: &mut String, border: &BorderStyle) {
    let diag_attrs = match border.diagonal_direction {
        DiagonalDirection::None => "",
        DiagonalDirection::Down => " diagonalDown=\"1\"",
        DiagonalDirection::Up => " diagonalUp=\"1\"",
        DiagonalDirection::Both => " diagonalUp=\"1\" diagonalDown=\"1\"",
    };
    xml.push_str(&format!("\n        <border{}>", diag_attrs));
    write_border_edge(xml, "left", &border.left);
    write_border_edge(xml, "right", &border.right);
    write_border_edge(xml, "top", &border.top);
    write_border_edge(xml, "bottom", &border.bottom);
    write_border_edge(xml, "diagonal", &border.diagonal);
    xml.push_str("</border>");
}

fn horiz_to_str(align: HorizontalAlignment) -> Option<&'static str> {
    match align {
        HorizontalAlignment::General => None,
        HorizontalAlignment::Left => Some("left"),
        HorizontalAlignment::Center => Some("center"),
        HorizontalAlignment::Right => Some("right"),
        HorizontalAlignment::Fill => Some("fill"),
        HorizontalAlignment::Justify => Some("justify"),
        HorizontalAlignment::CenterContinuous => Some("centerContinuous"),
        HorizontalAlignment::Distributed => Some("distributed"),
    }
}

fn str_to_horizontal(s: &str) -> HorizontalAlignment {
    match s {
        "left" => HorizontalAlignment::Left,
        "center" => HorizontalAlignment::Center,
        "right" => HorizontalAlignment::Right,
        "fill" => HorizontalAlignment::Fill,
        "justify" => HorizontalAlignment::Justify,
        "centerContinuous" => HorizontalAlignment::CenterContinuous,
        "distributed" => HorizontalAlignment::Distributed,
        _ => HorizontalAlignment::General,
    }
}

fn vert_to_str(align: VerticalAlignment) -> Option<&'static str> {
    match align {
        VerticalAlignment::Bottom => None,
        VerticalAlignment::Top => Some("top"),
        VerticalAlignment::Center => Some("center"),
        VerticalAlignment::Justify => Some("justify"),
        VerticalAlignment::Distributed => Some("distributed"),
    }
}

fn str_to_vertical(s: &str) -> VerticalAlignment {
    match s {
        "top" => VerticalAlignment::Top,
        "center" => VerticalAlignment::Center,
        "justify" => VerticalAlignment::Justify,
        "distributed" => VerticalAlignment::Distributed,
        _ => VerticalAlignment::Bottom,
    }
}

/// OOXML stores rotation as 0..=90 for CCW, 91..=180 for CW, 255 for stacked
fn rotation_to_xlsx(rotation: i16) -> Option<u16> {
    match rotation {
        0 => None,
        255 => Some(255),
        r if r > 0 => Some(r as u16),
        r => Some((90 - r) as u16),
    }
}

fn rotation_from_xlsx(raw: u16) -> i16 {
    match raw {
        255 => 255,
        r if r <= 90 => r as i16,
        r if r <= 180 => 90 - r as i16,
        _ => 0,
    }
}

fn write_alignment(xml: &mut String, alignment: &Alignment) {
    let mut attrs = String::new();
    if let Some(h) = horiz_to_str(alignment.horizontal) {
        attrs.push_str(&format!(" horizontal=\"{}\"", h));
    }
    if let Some(v) = vert_to_str(alignment.vertical) {
        attrs.push_str(&format!(" vertical=\"{}\"", v));
    }
    if alignment.wrap_text {
        attrs.push_str(" wrapText=\"1\"");
    }
    if alignment.shrink_to_fit {
        attrs.push_str(" shrinkToFit=\"1\"");
    }
    if alignment.indent > 0 {
        attrs.push_str(&format!(" indent=\"{}\"", alignment.indent));
    }
    if let Some(r) = rotation_to_xlsx(alignment.rotation) {
        attrs.push_str(&format!(" textRotation=\"{}\"", r));
    }
    if !attrs.is_empty() {
        xml.push_str(&format!("<alignment{}/>", attrs));
    }
}

fn write_xf(
    xml: &mut String,
    style: &Style,
    numfmt_id: u32,
    font_id: usize,
    fill_id: usize,
    border_id: usize,
) {
    let mut attrs = format!(
        " numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"",
        numfmt_id, font_id, fill_id, border_id
    );
    if numfmt_id != 0 {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if font_id != 0 {
        attrs.push_str(" applyFont=\"1\"");
    }
    if fill_id != 0 {
        attrs.push_str(" applyFill=\"1\"");
    }
    if border_id != 0 {
        attrs.push_str(" applyBorder=\"1\"");
    }

    let default_alignment = style.alignment == Alignment::default();
    let default_protection = style.protection == Protection::default();
    if !default_alignment {
        attrs.push_str(" applyAlignment=\"1\"");
    }
    if !default_protection {
        attrs.push_str(" applyProtection=\"1\"");
    }

    if default_alignment && default_protection {
        xml.push_str(&format!("\n        <xf{}/>", attrs));
        return;
    }

    xml.push_str(&format!("\n        <xf{}>", attrs));
    if !default_alignment {
        write_alignment(xml, &style.alignment);
    }
    if !default_protection {
        let mut prot = String::new();
        if !style.protection.locked {
            prot.push_str(" locked=\"0\"");
        }
        if style.protection.hidden {
            prot.push_str(" hidden=\"1\"");
        }
        xml.push_str(&format!("<protection{}/>", prot));
    }
    xml.push_str("</xf>");
}

fn parse_color_attrs(e: &BytesStart) -> Option<Color> {
    let mut rgb: Option<String> = None;
    let mut theme: Option<u8> = None;
    let mut tint: f64 = 0.0;
    let mut indexed: Option<u8> = None;
    let mut auto = false;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"rgb" => rgb = attr.unescape_value().ok().map(|s| s.to_string()),
            b"theme" => theme = attr.unescape_value().ok().and_then(|s| s.parse().ok()),
            b"tint" => {
                tint = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0.0)
            }
            b"indexed" => indexed = attr.unescape_value().ok().and_then(|s| s.parse().ok()),
            b"auto" => auto = true,
            _ => {}
        }
    }

    if let Some(hex) = rgb {
        return Color::from_hex(&hex).map(|c| match c {
            // Fully opaque ARGB folds down to plain RGB
            Color::Argb {
                a: 0xFF,
                r,
                g,
                b,
            } => Color::Rgb { r, g, b },
            other => other,
        });
    }
    if let Some(index) = theme {
        return Some(Color::Theme {
            index,
            tint: (tint * 100.0).round() as i8,
        });
    }
    if let Some(i) = indexed {
        // Index 64 is the "system foreground" sentinel
        return Some(if i == 64 { Color::Auto } else { Color::Indexed(i) });
    }
    if auto {
        return Some(Color::Auto);
    }
    None
}

#[derive(Default)]
struct XfParts {
    numfmt_id: u32,
    font_id: usize,
    fill_id: usize,
    border_id: usize,
    alignment: Alignment,
    protection: Protection,
}

fn parse_xf_attrs(e: &BytesStart) -> XfParts {
    let mut parts = XfParts::default();
    for attr in e.attributes().flatten() {
        let value = match attr.unescape_value() {
            Ok(v) => v,
            Err(_) => continue,
        };
        match attr.key.as_ref() {
            b"numFmtId" => parts.numfmt_id = value.parse().unwrap_or(0),
            b"fontId" => parts.font_id = value.parse().unwrap_or(0),
            b"fillId" => parts.fill_id = value.parse().unwrap_or(0),
            b"borderId" => parts.border_id = value.parse().unwrap_or(0),
            _ => {}
        }
    }
    parts
}

fn parse_alignment_attrs(e: &BytesStart) -> Alignment {
    let mut alignment = Alignment::default();
    for attr in e.attributes().flatten() {
        let value = match attr.unescape_value() {
            Ok(v) => v,
            Err(_) => continue,
        };
        match attr.key.as_ref() {
            b"horizontal" => alignment.horizontal = str_to_horizontal(&value),
            b"vertical" => alignment.vertical = str_to_vertical(&value),
            b"wrapText" => alignment.wrap_text = value == "1" || value == "true",
            b"shrinkToFit" => alignment.shrink_to_fit = value == "1" || value == "true",
            b"indent" => alignment.indent = value.parse().unwrap_or(0),
            b"textRotation" => {
                alignment.rotation = rotation_from_xlsx(value.parse().unwrap_or(0))
            }
            _ => {}
        }
    }
    alignment
}

fn parse_protection_attrs(e: &BytesStart) -> Protection {
    let mut protection = Protection::default();
    for attr in e.attributes().flatten() {
        let value = match attr.unescape_value() {
            Ok(v) => v,
            Err(_) => continue,
        };
        match attr.key.as_ref() {
            b"locked" => protection.locked = !(value == "0" || value == "false"),
            b"hidden" => protection.hidden = value == "1" || value == "true",
            _ => {}
        }
    }
    protection
}

fn str_to_underline(s: &str) -> Underline {
    match s {
        "double" => Underline::Double,
        "singleAccounting" => Underline::SingleAccounting,
        "doubleAccounting" => Underline::DoubleAccounting,
        "none" => Underline::None,
        _ => Underline::Single,
    }
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|s| s.to_string()))
}

#[derive(Default)]
struct PendingFill {
    pattern: PatternType,
    foreground: Option<Color>,
    background: Option<Color>,
}

impl PendingFill {
    fn finalize(self) -> FillStyle {
        match self.pattern {
            PatternType::None => FillStyle::None,
            PatternType::Solid => FillStyle::Solid {
                color: self.foreground.unwrap_or(Color::Auto),
            },
            // Bare gray125 with no colors is the mandatory filler fill
            PatternType::Gray125 if self.foreground.is_none() && self.background.is_none() => {
                FillStyle::Pattern {
                    pattern: PatternType::Gray125,
                    foreground: Color::Auto,
                    background: Color::Auto,
                }
            }
            pattern => FillStyle::Pattern {
                pattern,
                foreground: self.foreground.unwrap_or(Color::Auto),
                background: self.background.unwrap_or(Color::Auto),
            },
        }
    }
}

fn set_border_edge(border: &mut BorderStyle, tag: &[u8], edge: Option<BorderEdge>) {
    match tag {
        b"left" => border.left = edge,
        b"right" => border.right = edge,
        b"top" => border.top = edge,
        b"bottom" => border.bottom = edge,
        b"diagonal" => border.diagonal = edge,
        _ => {}
    }
}

fn edge_of<'a>(border: &'a mut BorderStyle, tag: &[u8]) -> Option<&'a mut Option<BorderEdge>> {
    match tag {
        b"left" => Some(&mut border.left),
        b"right" => Some(&mut border.right),
        b"top" => Some(&mut border.top),
        b"bottom" => Some(&mut border.bottom),
        b"diagonal" => Some(&mut border.diagonal),
        _ => None,
    }
}

/// Parse styles.xml into the `cellXfs` style list
///
/// The returned vector is indexed by xf id, so a cell's `s` attribute maps
/// straight into it. Index 0 is the default style.
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<Style>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    let mut formats: HashMap<u32, String> = HashMap::new();
    let mut fonts: Vec<FontStyle> = Vec::new();
    let mut fills: Vec<FillStyle> = Vec::new();
    let mut borders: Vec<BorderStyle> = Vec::new();
    let mut styles: Vec<Style> = Vec::new();

    let mut in_fonts = false;
    let mut in_fills = false;
    let mut in_borders = false;
    let mut in_cell_xfs = false;

    let mut current_font: Option<FontStyle> = None;
    let mut current_fill: Option<PendingFill> = None;
    let mut current_border: Option<BorderStyle> = None;
    let mut current_edge: Option<Vec<u8>> = None;
    let mut current_edge_style: BorderLineStyle = BorderLineStyle::None;
    let mut current_edge_color: Color = Color::Auto;
    let mut current_xf: Option<XfParts> = None;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"fonts" => in_fonts = true,
                b"fills" => in_fills = true,
                b"borders" => in_borders = true,
                b"cellXfs" => in_cell_xfs = true,
                b"font" if in_fonts => current_font = Some(FontStyle::default()),
                b"fill" if in_fills => current_fill = Some(PendingFill::default()),
                b"patternFill" => {
                    if let Some(fill) = current_fill.as_mut() {
                        if let Some(p) = attr_value(&e, b"patternType") {
                            fill.pattern = str_to_pattern_type(&p);
                        }
                    }
                }
                b"border" if in_borders => {
                    let mut border = BorderStyle::default();
                    let up = attr_value(&e, b"diagonalUp").map_or(false, |v| v == "1");
                    let down = attr_value(&e, b"diagonalDown").map_or(false, |v| v == "1");
                    border.diagonal_direction = match (up, down) {
                        (true, true) => DiagonalDirection::Both,
                        (true, false) => DiagonalDirection::Up,
                        (false, true) => DiagonalDirection::Down,
                        (false, false) => DiagonalDirection::None,
                    };
                    current_border = Some(border);
                }
                tag @ (b"left" | b"right" | b"top" | b"bottom" | b"diagonal")
                    if current_border.is_some() =>
                {
                    current_edge = Some(tag.to_vec());
                    current_edge_style = attr_value(&e, b"style")
                        .map(|s| str_to_border_style(&s))
                        .unwrap_or(BorderLineStyle::None);
                    current_edge_color = Color::Auto;
                }
                b"xf" if in_cell_xfs => current_xf = Some(parse_xf_attrs(&e)),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"numFmt" => {
                    let id = attr_value(&e, b"numFmtId").and_then(|v| v.parse::<u32>().ok());
                    let code = attr_value(&e, b"formatCode");
                    if let (Some(id), Some(code)) = (id, code) {
                        formats.insert(id, code);
                    }
                }
                b"b" => {
                    if let Some(font) = current_font.as_mut() {
                        font.bold = true;
                    }
                }
                b"i" => {
                    if let Some(font) = current_font.as_mut() {
                        font.italic = true;
                    }
                }
                b"strike" => {
                    if let Some(font) = current_font.as_mut() {
                        font.strikethrough = true;
                    }
                }
                b"u" => {
                    if let Some(font) = current_font.as_mut() {
                        font.underline = attr_value(&e, b"val")
                            .map(|v| str_to_underline(&v))
                            .unwrap_or(Underline::Single);
                    }
                }
                b"sz" => {
                    if let Some(font) = current_font.as_mut() {
                        if let Some(size) = attr_value(&e, b"val").and_then(|v| v.parse().ok()) {
                            font.size = size;
                        }
                    }
                }
                b"name" => {
                    if let Some(font) = current_font.as_mut() {
                        if let Some(name) = attr_value(&e, b"val") {
                            font.name = name;
                        }
                    }
                }
                b"color" => {
                    let color = parse_color_attrs(&e);
                    if current_edge.is_some() {
                        if let Some(c) = color {
                            current_edge_color = c;
                        }
                    } else if let Some(font) = current_font.as_mut() {
                        if let Some(c) = color {
                            font.color = c;
                        }
                    }
                }
                b"fgColor" => {
                    if let Some(fill) = current_fill.as_mut() {
                        fill.foreground = parse_color_attrs(&e);
                    }
                }
                b"bgColor" => {
                    if let Some(fill) = current_fill.as_mut() {
                        fill.background = parse_color_attrs(&e);
                    }
                }
                b"patternFill" => {
                    if let Some(fill) = current_fill.as_mut() {
                        if let Some(p) = attr_value(&e, b"patternType") {
                            fill.pattern = str_to_pattern_type(&p);
                        }
                    }
                }
                tag @ (b"left" | b"right" | b"top" | b"bottom" | b"diagonal") => {
                    // Self-closing edge: style attr only, no nested color
                    if let Some(border) = current_border.as_mut() {
                        let style = attr_value(&e, b"style")
                            .map(|s| str_to_border_style(&s))
                            .unwrap_or(BorderLineStyle::None);
                        let edge = if style == BorderLineStyle::None {
                            None
                        } else {
                            Some(BorderEdge::new(style, Color::Auto))
                        };
                        set_border_edge(border, tag, edge);
                    }
                }
                b"alignment" => {
                    if let Some(xf) = current_xf.as_mut() {
                        xf.alignment = parse_alignment_attrs(&e);
                    }
                }
                b"protection" => {
                    if let Some(xf) = current_xf.as_mut() {
                        xf.protection = parse_protection_attrs(&e);
                    }
                }
                b"xf" if in_cell_xfs => {
                    let parts = parse_xf_attrs(&e);
                    styles.push(resolve_style(&parts, &formats, &fonts, &fills, &borders));
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"fonts" => in_fonts = false,
                b"fills" => in_fills = false,
                b"borders" => in_borders = false,
                b"cellXfs" => in_cell_xfs = false,
                b"font" => {
                    if let Some(font) = current_font.take() {
                        fonts.push(font);
                    }
                }
                b"fill" => {
                    if let Some(fill) = current_fill.take() {
                        fills.push(fill.finalize());
                    }
                }
                b"border" => {
                    if let Some(border) = current_border.take() {
                        borders.push(border);
                    }
                }
                tag @ (b"left" | b"right" | b"top" | b"bottom" | b"diagonal") => {
                    if current_edge.as_deref() == Some(tag) {
                        if let Some(border) = current_border.as_mut() {
                            let edge = if current_edge_style == BorderLineStyle::None {
                                None
                            } else {
                                Some(BorderEdge::new(current_edge_style, current_edge_color))
                            };
                            if let Some(slot) = edge_of(border, tag) {
                                *slot = edge;
                            }
                        }
                        current_edge = None;
                    }
                }
                b"xf" if in_cell_xfs => {
                    if let Some(parts) = current_xf.take() {
                        styles.push(resolve_style(&parts, &formats, &fonts, &fills, &borders));
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if styles.is_empty() {
        styles.push(Style::default());
    }

    Ok(styles)
}

fn resolve_style(
    parts: &XfParts,
    formats: &HashMap<u32, String>,
    fonts: &[FontStyle],
    fills: &[FillStyle],
    borders: &[BorderStyle],
) -> Style {
    let number_format = match parts.numfmt_id {
        0 => NumberFormat::General,
        id => match formats.get(&id) {
            Some(code) => NumberFormat::Custom(code.clone()),
            None => NumberFormat::BuiltIn(id),
        },
    };

    Style {
        font: fonts.get(parts.font_id).cloned().unwrap_or_default(),
        fill: fills.get(parts.fill_id).copied().unwrap_or_default(),
        border: borders.get(parts.border_id).cloned().unwrap_or_default(),
        alignment: parts.alignment.clone(),
        number_format,
        protection: parts.protection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use xlmerge_core::Worksheet;

    fn table_for(styles: &[Style]) -> XlsxStyleTable {
        let mut workbook = Workbook::empty();
        let mut sheet = Worksheet::new("S");
        for (i, style) in styles.iter().enumerate() {
            sheet.set_value_at(0, i as u16, "x").unwrap();
            sheet.set_style_at(0, i as u16, style.clone()).unwrap();
        }
        workbook.push_worksheet(sheet).unwrap();
        XlsxStyleTable::build(&workbook)
    }

    #[test]
    fn styles_round_trip_through_xml() {
        let styles = vec![
            Style::new().bold().font_size(14.0),
            Style::new().fill_color(Color::rgb(255, 255, 0)),
            Style::new().number_format("yyyy-mm-dd"),
            Style::new()
                .italic()
                .horizontal_alignment(HorizontalAlignment::Center)
                .wrap_text(),
        ];
        let table = table_for(&styles);
        let xml = table.to_styles_xml();

        let parsed = read_styles_xml(Cursor::new(xml.into_bytes())).unwrap();
        // Index 0 is the default; the custom styles follow in build order
        assert_eq!(parsed[0], Style::default());
        for style in &styles {
            assert!(
                parsed.contains(style),
                "style {:?} missing after round trip",
                style
            );
        }
    }

    #[test]
    fn identical_styles_share_one_xf() {
        let mut workbook = Workbook::empty();
        let mut a = Worksheet::new("A");
        a.set_value_at(0, 0, "x").unwrap();
        a.set_style_at(0, 0, Style::new().bold()).unwrap();
        let mut b = Worksheet::new("B");
        b.set_value_at(0, 0, "y").unwrap();
        b.set_style_at(0, 0, Style::new().bold()).unwrap();
        workbook.push_worksheet(a).unwrap();
        workbook.push_worksheet(b).unwrap();

        let table = XlsxStyleTable::build(&workbook);
        let xf_a = table.xf_id_for(0, 1);
        let xf_b = table.xf_id_for(1, 1);
        assert_eq!(xf_a, xf_b);
        assert_ne!(xf_a, 0);
        // Default + bold
        assert_eq!(table.styles.len(), 2);
    }

    #[test]
    fn unknown_local_index_maps_to_default() {
        let table = table_for(&[]);
        assert_eq!(table.xf_id_for(0, 42), 0);
        assert_eq!(table.xf_id_for(9, 0), 0);
    }

    #[test]
    fn borders_round_trip() {
        let style = Style {
            border: BorderStyle::all(BorderLineStyle::Thin, Color::rgb(0, 0, 0)),
            ..Style::default()
        };
        let table = table_for(std::slice::from_ref(&style));
        let parsed = read_styles_xml(Cursor::new(table.to_styles_xml().into_bytes())).unwrap();
        assert!(parsed.contains(&style));
    }

    #[test]
    fn rotation_encoding() {
        assert_eq!(rotation_to_xlsx(0), None);
        assert_eq!(rotation_to_xlsx(45), Some(45));
        assert_eq!(rotation_to_xlsx(-45), Some(135));
        assert_eq!(rotation_to_xlsx(255), Some(255));
        assert_eq!(rotation_from_xlsx(45), 45);
        assert_eq!(rotation_from_xlsx(135), -45);
        assert_eq!(rotation_from_xlsx(255), 255);
    }

    #[test]
    fn empty_styles_xml_yields_default() {
        let xml = r#"<?xml version="1.0"?><styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"></styleSheet>"#;
        let parsed = read_styles_xml(Cursor::new(xml.as_bytes().to_vec())).unwrap();
        assert_eq!(parsed, vec![Style::default()]);
    }
}
