use crate::xml::{XmlDocument, A};
use indextree::NodeId;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where a color comes from. Preset and system colors are fixed values and
/// are carried as raw hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ColorSource {
    #[serde(rename_all = "camelCase")]
    RawHex { hex: String },
    /// `slot` is the scheme name as written (`tx1`, `accent2`, ...).
    #[serde(rename_all = "camelCase")]
    ThemeReference { slot: String, theme_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ColorTransform {
    LumMod(i32),
    LumOff(i32),
    Tint(i32),
    Shade(i32),
}

impl ColorTransform {
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::LumMod(_) => "lumMod",
            Self::LumOff(_) => "lumOff",
            Self::Tint(_) => "tint",
            Self::Shade(_) => "shade",
        }
    }

    pub fn value(&self) -> i32 {
        match self {
            Self::LumMod(v) | Self::LumOff(v) | Self::Tint(v) | Self::Shade(v) => *v,
        }
    }
}

/// A resolved color with its RGB and CIELAB values cached at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ColorValueRepr")]
pub struct ColorValue {
    source: ColorSource,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    transforms: Vec<ColorTransform>,
    rgb: [u8; 3],
    lab: [f64; 3],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColorValueRepr {
    source: ColorSource,
    #[serde(default)]
    transforms: Vec<ColorTransform>,
    #[serde(default)]
    rgb: Option<[u8; 3]>,
}

impl TryFrom<ColorValueRepr> for ColorValue {
    type Error = String;

    fn try_from(repr: ColorValueRepr) -> std::result::Result<Self, Self::Error> {
        match repr.source {
            ColorSource::RawHex { hex } => {
                let base = parse_hex(&hex).ok_or_else(|| format!("invalid hex color '{}'", hex))?;
                Ok(Self::build(
                    ColorSource::RawHex { hex: format_hex(base) },
                    repr.transforms,
                    base,
                ))
            }
            ColorSource::ThemeReference { slot, theme_id } => {
                let rgb = repr
                    .rgb
                    .ok_or_else(|| format!("theme color '{}' carries no rgb value", slot))?;
                // The cached rgb of a theme reference already includes its transforms.
                Ok(Self {
                    lab: rgb_to_lab(rgb),
                    source: ColorSource::ThemeReference { slot, theme_id },
                    transforms: repr.transforms,
                    rgb,
                })
            }
        }
    }
}

impl ColorValue {
    fn build(source: ColorSource, transforms: Vec<ColorTransform>, base: [u8; 3]) -> Self {
        let rgb = apply_transforms(base, &transforms);
        Self {
            lab: rgb_to_lab(rgb),
            source,
            transforms,
            rgb,
        }
    }

    /// `None` unless `hex` is six hex digits, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        Self::from_hex_with(hex, Vec::new())
    }

    pub fn from_hex_with(hex: &str, transforms: Vec<ColorTransform>) -> Option<Self> {
        let base = parse_hex(hex)?;
        Some(Self::build(
            ColorSource::RawHex { hex: format_hex(base) },
            transforms,
            base,
        ))
    }

    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        Self::from_rgb_with(rgb, Vec::new())
    }

    pub fn from_rgb_with(rgb: [u8; 3], transforms: Vec<ColorTransform>) -> Self {
        Self::build(ColorSource::RawHex { hex: format_hex(rgb) }, transforms, rgb)
    }

    /// `base` is the theme slot's color before transforms.
    pub fn theme_reference(
        slot: &str,
        theme_id: &str,
        transforms: Vec<ColorTransform>,
        base: [u8; 3],
    ) -> Self {
        Self::build(
            ColorSource::ThemeReference {
                slot: slot.to_string(),
                theme_id: theme_id.to_string(),
            },
            transforms,
            base,
        )
    }

    pub fn black() -> Self {
        Self::from_rgb([0, 0, 0])
    }

    pub fn source(&self) -> &ColorSource {
        &self.source
    }

    pub fn transforms(&self) -> &[ColorTransform] {
        &self.transforms
    }

    pub fn rgb(&self) -> [u8; 3] {
        self.rgb
    }

    pub fn lab(&self) -> [f64; 3] {
        self.lab
    }

    /// `#RRGGBB` of the cached RGB.
    pub fn hex(&self) -> String {
        format!("#{}", format_hex(self.rgb))
    }

    pub fn delta_e(&self, other: &ColorValue) -> f64 {
        delta_e76(self.lab, other.lab)
    }
}

pub fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Upper-case `RRGGBB`, the form `a:srgbClr/@val` uses.
pub fn format_hex(rgb: [u8; 3]) -> String {
    format!("{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

fn linearize(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB -> linear -> XYZ (D65) -> CIELAB.
pub fn rgb_to_lab(rgb: [u8; 3]) -> [f64; 3] {
    let r = linearize(rgb[0]);
    let g = linearize(rgb[1]);
    let b = linearize(rgb[2]);

    let x = r * 0.4124564 + g * 0.3575761 + b * 0.1804375;
    let y = r * 0.2126729 + g * 0.7151522 + b * 0.0721750;
    let z = r * 0.0193339 + g * 0.1191920 + b * 0.9503041;

    const WHITE: [f64; 3] = [0.95047, 1.0, 1.08883];
    const DELTA: f64 = 6.0 / 29.0;

    let f = |t: f64| {
        if t > DELTA.powi(3) {
            t.cbrt()
        } else {
            t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
        }
    };

    let fx = f(x / WHITE[0]);
    let fy = f(y / WHITE[1]);
    let fz = f(z / WHITE[2]);

    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// CIE76 color difference.
pub fn delta_e76(a: [f64; 3], b: [f64; 3]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}

fn rgb_to_hsl(rgb: [u8; 3]) -> (f64, f64, f64) {
    let r = rgb[0] as f64 / 255.0;
    let g = rgb[1] as f64 / 255.0;
    let b = rgb[2] as f64 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }
    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h / 6.0, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [u8; 3] {
    let to_byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    if s == 0.0 {
        let v = to_byte(l);
        return [v, v, v];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let hue = |mut t: f64| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    [
        to_byte(hue(h + 1.0 / 3.0)),
        to_byte(hue(h)),
        to_byte(hue(h - 1.0 / 3.0)),
    ]
}

/// Applies DrawingML color transforms in document order. Values are in
/// thousandths of a percent.
pub fn apply_transforms(base: [u8; 3], transforms: &[ColorTransform]) -> [u8; 3] {
    let mut rgb = base;
    for t in transforms {
        let f = t.value() as f64 / 100_000.0;
        rgb = match t {
            ColorTransform::LumMod(_) => {
                let (h, s, l) = rgb_to_hsl(rgb);
                hsl_to_rgb(h, s, (l * f).clamp(0.0, 1.0))
            }
            ColorTransform::LumOff(_) => {
                let (h, s, l) = rgb_to_hsl(rgb);
                hsl_to_rgb(h, s, (l + f).clamp(0.0, 1.0))
            }
            ColorTransform::Tint(_) => {
                rgb.map(|c| (c as f64 + (255.0 - c as f64) * (1.0 - f)).round().clamp(0.0, 255.0) as u8)
            }
            ColorTransform::Shade(_) => rgb.map(|c| (c as f64 * f).round().clamp(0.0, 255.0) as u8),
        };
    }
    rgb
}

static PRESET_COLORS: Lazy<HashMap<&'static str, [u8; 3]>> = Lazy::new(|| {
    HashMap::from([
        ("black", [0x00, 0x00, 0x00]),
        ("white", [0xFF, 0xFF, 0xFF]),
        ("red", [0xFF, 0x00, 0x00]),
        ("green", [0x00, 0x80, 0x00]),
        ("lime", [0x00, 0xFF, 0x00]),
        ("blue", [0x00, 0x00, 0xFF]),
        ("yellow", [0xFF, 0xFF, 0x00]),
        ("cyan", [0x00, 0xFF, 0xFF]),
        ("aqua", [0x00, 0xFF, 0xFF]),
        ("magenta", [0xFF, 0x00, 0xFF]),
        ("fuchsia", [0xFF, 0x00, 0xFF]),
        ("gray", [0x80, 0x80, 0x80]),
        ("grey", [0x80, 0x80, 0x80]),
        ("silver", [0xC0, 0xC0, 0xC0]),
        ("maroon", [0x80, 0x00, 0x00]),
        ("navy", [0x00, 0x00, 0x80]),
        ("olive", [0x80, 0x80, 0x00]),
        ("purple", [0x80, 0x00, 0x80]),
        ("teal", [0x00, 0x80, 0x80]),
        ("orange", [0xFF, 0xA5, 0x00]),
        ("pink", [0xFF, 0xC0, 0xCB]),
        ("brown", [0xA5, 0x2A, 0x2A]),
        ("gold", [0xFF, 0xD7, 0x00]),
        ("indigo", [0x4B, 0x00, 0x82]),
        ("violet", [0xEE, 0x82, 0xEE]),
        ("darkBlue", [0x00, 0x00, 0x8B]),
        ("darkRed", [0x8B, 0x00, 0x00]),
        ("darkGreen", [0x00, 0x64, 0x00]),
        ("darkGray", [0xA9, 0xA9, 0xA9]),
        ("lightGray", [0xD3, 0xD3, 0xD3]),
        ("lightBlue", [0xAD, 0xD8, 0xE6]),
        ("lightGreen", [0x90, 0xEE, 0x90]),
    ])
});

pub fn preset_color(name: &str) -> Option<[u8; 3]> {
    PRESET_COLORS.get(name).copied()
}

/// A color element as written in DrawingML, before theme resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorSpec {
    Rgb { rgb: [u8; 3], transforms: Vec<ColorTransform> },
    Scheme { slot: String, transforms: Vec<ColorTransform> },
}

/// Transforms that change the resolved RGB. Others (`alpha`, `satMod`,
/// `hueMod`, `inv`, ...) are logged and left out of the value.
fn read_transforms(doc: &XmlDocument, color: NodeId) -> Vec<ColorTransform> {
    doc.child_elements(color)
        .filter_map(|child| {
            let name = doc.name(child)?;
            if !name.in_namespace(A::NS) {
                return None;
            }
            let transform: fn(i32) -> ColorTransform = match name.local_name.as_str() {
                "lumMod" => ColorTransform::LumMod,
                "lumOff" => ColorTransform::LumOff,
                "tint" => ColorTransform::Tint,
                "shade" => ColorTransform::Shade,
                other => {
                    log::debug!("ignoring unsupported color transform a:{}", other);
                    return None;
                }
            };
            let value = doc.attr(child, "val")?.parse::<i32>().ok()?;
            Some(transform(value))
        })
        .collect()
}

/// Reads a color choice element (`a:srgbClr`, `a:schemeClr`, `a:prstClr`, `a:sysClr`).
pub fn read_color_element(doc: &XmlDocument, node: NodeId) -> Option<ColorSpec> {
    let name = doc.name(node)?;
    if !name.in_namespace(A::NS) {
        return None;
    }
    let transforms = read_transforms(doc, node);
    match name.local_name.as_str() {
        "srgbClr" => parse_hex(doc.attr(node, "val")?).map(|rgb| ColorSpec::Rgb { rgb, transforms }),
        "schemeClr" => doc.attr(node, "val").map(|slot| ColorSpec::Scheme {
            slot: slot.to_string(),
            transforms,
        }),
        "prstClr" => preset_color(doc.attr(node, "val")?).map(|rgb| ColorSpec::Rgb { rgb, transforms }),
        "sysClr" => doc
            .attr(node, "lastClr")
            .and_then(parse_hex)
            .or_else(|| match doc.attr(node, "val") {
                Some("windowText") => Some([0, 0, 0]),
                Some("window") => Some([0xFF, 0xFF, 0xFF]),
                _ => None,
            })
            .map(|rgb| ColorSpec::Rgb { rgb, transforms }),
        _ => None,
    }
}

/// First color choice child of `parent`, e.g. of an `a:solidFill`.
pub fn read_color_child(doc: &XmlDocument, parent: NodeId) -> Option<ColorSpec> {
    doc.child_elements(parent)
        .find_map(|child| read_color_element(doc, child))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser;
    use proptest::prelude::*;

    #[test]
    fn unsupported_transforms_are_left_out() {
        let doc = parser::parse(
            r#"<a:srgbClr xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" val="4472C4"><a:alpha val="50000"/><a:lumMod val="75000"/><a:satMod val="120000"/><a:inv/></a:srgbClr>"#,
        )
        .unwrap();
        let spec = read_color_element(&doc, doc.root().unwrap()).unwrap();
        assert_eq!(
            spec,
            ColorSpec::Rgb {
                rgb: [0x44, 0x72, 0xC4],
                transforms: vec![ColorTransform::LumMod(75000)],
            }
        );
    }

    #[test]
    fn lab_of_white_and_black() {
        let white = rgb_to_lab([255, 255, 255]);
        assert!((white[0] - 100.0).abs() < 0.01);
        assert!(white[1].abs() < 0.01 && white[2].abs() < 0.01);

        let black = rgb_to_lab([0, 0, 0]);
        assert!(black.iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn lab_of_pure_red_matches_reference() {
        let red = rgb_to_lab([255, 0, 0]);
        assert!((red[0] - 53.24).abs() < 0.05);
        assert!((red[1] - 80.09).abs() < 0.05);
        assert!((red[2] - 67.20).abs() < 0.05);
    }

    #[test]
    fn delta_e_is_zero_for_identical_colors() {
        let a = ColorValue::from_hex("#4472C4").unwrap();
        let b = ColorValue::from_hex("4472c4").unwrap();
        assert_eq!(a.delta_e(&b), 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn theme_reference_applies_transforms_to_rgb() {
        let c = ColorValue::theme_reference("accent1", "theme/theme1", vec![ColorTransform::LumMod(50000)], [0xFF, 0xFF, 0xFF]);
        assert_eq!(c.rgb(), [0x80, 0x80, 0x80]);
        assert!(matches!(c.source(), ColorSource::ThemeReference { slot, .. } if slot == "accent1"));
    }

    #[test]
    fn shade_and_tint() {
        assert_eq!(apply_transforms([200, 100, 0], &[ColorTransform::Shade(50000)]), [100, 50, 0]);
        assert_eq!(apply_transforms([0, 0, 0], &[ColorTransform::Tint(0)]), [255, 255, 255]);
    }

    #[test]
    fn deserialization_recomputes_cached_values() {
        let json = r#"{"source":{"type":"rawHex","hex":"ff0000"},"rgb":[1,2,3],"lab":[0,0,0]}"#;
        let c: ColorValue = serde_json::from_str(json).unwrap();
        assert_eq!(c.rgb(), [255, 0, 0]);
        assert!((c.lab()[0] - 53.24).abs() < 0.05);

        let bad = r#"{"source":{"type":"rawHex","hex":"zz0000"}}"#;
        assert!(serde_json::from_str::<ColorValue>(bad).is_err());
    }

    #[test]
    fn reads_every_color_element_kind() {
        let xml = r#"<a:solidFill xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
            <a:srgbClr val="1F4E79"/><a:schemeClr val="accent2"><a:lumMod val="75000"/></a:schemeClr>
            <a:prstClr val="red"/><a:sysClr val="windowText" lastClr="000000"/></a:solidFill>"#;
        let doc = parser::parse(xml).unwrap();
        let root = doc.root().unwrap();
        let specs: Vec<_> = doc
            .child_elements(root)
            .filter_map(|c| read_color_element(&doc, c))
            .collect();

        assert_eq!(
            specs,
            vec![
                ColorSpec::Rgb { rgb: [0x1F, 0x4E, 0x79], transforms: vec![] },
                ColorSpec::Scheme { slot: "accent2".into(), transforms: vec![ColorTransform::LumMod(75000)] },
                ColorSpec::Rgb { rgb: [255, 0, 0], transforms: vec![] },
                ColorSpec::Rgb { rgb: [0, 0, 0], transforms: vec![] },
            ]
        );
    }

    proptest! {
        #[test]
        fn raw_hex_round_trips_through_cache(r: u8, g: u8, b: u8) {
            let hex = format_hex([r, g, b]);
            let color = ColorValue::from_hex(&hex).unwrap();
            prop_assert_eq!(format_hex(color.rgb()), hex.clone());

            let json = serde_json::to_string(&color).unwrap();
            let back: ColorValue = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(back.hex(), format!("#{}", hex));
            prop_assert_eq!(back, color);
        }
    }
}
