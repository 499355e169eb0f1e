//! Partially specified run and paragraph properties, as written at one
//! level of the inheritance chain.

use crate::ir::{Alignment, Bullet, Spacing};
use crate::normalize::color::read_color_child;
use crate::normalize::ColorSpec;
use crate::xml::{XmlDocument, A};
use indextree::NodeId;

/// Character properties of an `a:rPr`, `a:defRPr` or `a:endParaRPr`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunProps {
    /// Typeface as written; may be a theme reference such as `+mn-lt`.
    pub font_family: Option<String>,
    /// Points.
    pub font_size: Option<f64>,
    pub color: Option<ColorSpec>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
}

impl RunProps {
    pub fn from_element(doc: &XmlDocument, node: NodeId) -> Self {
        let font_family = doc
            .first_child(node, &A::latin())
            .and_then(|latin| doc.attr(latin, "typeface"))
            .filter(|face| !face.is_empty())
            .map(str::to_string);

        let font_size = doc
            .attr(node, "sz")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .map(|hundredths| hundredths as f64 / 100.0);

        let color = doc
            .first_child(node, &A::solidFill())
            .and_then(|fill| read_color_child(doc, fill));

        Self {
            font_family,
            font_size,
            color,
            bold: flag(doc.attr(node, "b")),
            italic: flag(doc.attr(node, "i")),
            underline: doc.attr(node, "u").map(|u| u != "none"),
        }
    }

    pub fn from_optional(doc: &XmlDocument, node: Option<NodeId>) -> Self {
        node.map(|n| Self::from_element(doc, n)).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Fills every unset property from `fallback`.
    pub fn or(mut self, fallback: &RunProps) -> Self {
        if self.font_family.is_none() {
            self.font_family = fallback.font_family.clone();
        }
        if self.font_size.is_none() {
            self.font_size = fallback.font_size;
        }
        if self.color.is_none() {
            self.color = fallback.color.clone();
        }
        self.bold = self.bold.or(fallback.bold);
        self.italic = self.italic.or(fallback.italic);
        self.underline = self.underline.or(fallback.underline);
        self
    }
}

fn flag(value: Option<&str>) -> Option<bool> {
    match value? {
        "1" | "true" | "on" => Some(true),
        "0" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// Paragraph properties of an `a:pPr` or a list-style level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParaProps {
    pub alignment: Option<Alignment>,
    pub bullet: Option<Bullet>,
    pub line_spacing: Option<Spacing>,
    pub space_before: Option<Spacing>,
    pub space_after: Option<Spacing>,
}

impl ParaProps {
    pub fn from_element(doc: &XmlDocument, node: NodeId) -> Self {
        let bullet = doc.child_elements(node).find_map(|child| {
            let name = doc.name(child)?;
            if !name.in_namespace(A::NS) {
                return None;
            }
            match name.local_name.as_str() {
                "buNone" => Some(Bullet::None),
                "buChar" => Some(Bullet::Char {
                    char: doc.attr(child, "char").unwrap_or_default().to_string(),
                }),
                "buAutoNum" => Some(Bullet::AutoNumber {
                    scheme: doc.attr(child, "type").unwrap_or("arabicPeriod").to_string(),
                }),
                _ => None,
            }
        });

        Self {
            alignment: doc.attr(node, "algn").and_then(Alignment::from_xml),
            bullet,
            line_spacing: read_spacing(doc, node, &A::lnSpc()),
            space_before: read_spacing(doc, node, &A::spcBef()),
            space_after: read_spacing(doc, node, &A::spcAft()),
        }
    }

    pub fn from_optional(doc: &XmlDocument, node: Option<NodeId>) -> Self {
        node.map(|n| Self::from_element(doc, n)).unwrap_or_default()
    }

    pub fn or(mut self, fallback: &ParaProps) -> Self {
        if self.alignment.is_none() {
            self.alignment = fallback.alignment;
        }
        if self.bullet.is_none() {
            self.bullet = fallback.bullet.clone();
        }
        self.line_spacing = self.line_spacing.or(fallback.line_spacing);
        self.space_before = self.space_before.or(fallback.space_before);
        self.space_after = self.space_after.or(fallback.space_after);
        self
    }
}

fn read_spacing(doc: &XmlDocument, ppr: NodeId, name: &crate::xml::XName) -> Option<Spacing> {
    let spacing = doc.first_child(ppr, name)?;
    if let Some(pct) = doc.first_child(spacing, &A::spcPct()) {
        let val = doc.attr(pct, "val")?.trim().trim_end_matches('%').parse::<f64>().ok()?;
        return Some(Spacing::Percent(val / 1000.0));
    }
    let pts = doc.first_child(spacing, &A::spcPts())?;
    let val = doc.attr(pts, "val")?.trim().parse::<f64>().ok()?;
    Some(Spacing::Points(val / 100.0))
}

/// One level of a list style: paragraph properties and the `a:defRPr` inside.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelStyle {
    pub para: ParaProps,
    pub run: RunProps,
}

impl LevelStyle {
    fn from_element(doc: &XmlDocument, node: NodeId) -> Self {
        Self {
            para: ParaProps::from_element(doc, node),
            run: RunProps::from_optional(doc, doc.first_child(node, &A::defRPr())),
        }
    }

    fn or(self, fallback: &LevelStyle) -> Self {
        Self {
            para: self.para.or(&fallback.para),
            run: self.run.or(&fallback.run),
        }
    }
}

pub const LIST_LEVELS: usize = 9;

/// `a:lstStyle`, `p:titleStyle`, `p:defaultTextStyle` and friends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListStyle {
    default: LevelStyle,
    levels: [LevelStyle; LIST_LEVELS],
}

impl ListStyle {
    pub fn from_element(doc: &XmlDocument, node: NodeId) -> Self {
        let mut style = ListStyle::default();
        if let Some(def) = doc.first_child(node, &A::defPPr()) {
            style.default = LevelStyle::from_element(doc, def);
        }
        for (i, level) in style.levels.iter_mut().enumerate() {
            if let Some(lvl) = doc.first_child(node, &A::lvlPPr(i as u8 + 1)) {
                *level = LevelStyle::from_element(doc, lvl);
            }
        }
        style
    }

    pub fn from_optional(doc: &XmlDocument, node: Option<NodeId>) -> Self {
        node.map(|n| Self::from_element(doc, n)).unwrap_or_default()
    }

    /// Properties for the 0-based outline `level`, with `a:defPPr` filling gaps.
    pub fn level(&self, level: u8) -> LevelStyle {
        let index = (level as usize).min(LIST_LEVELS - 1);
        self.levels[index].clone().or(&self.default)
    }

    /// Fills every unset property, level by level, from `fallback`.
    pub fn or(mut self, fallback: &ListStyle) -> Self {
        self.default = self.default.or(&fallback.default);
        for (level, fb) in self.levels.iter_mut().zip(fallback.levels.iter()) {
            *level = std::mem::take(level).or(fb);
        }
        self
    }
}
