use crate::normalize::ColorValue;
use crate::style::CascadeLevel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TextFrame {
    pub paragraphs: Vec<Paragraph>,
}

impl TextFrame {
    /// Paragraph texts joined with `\n`; breaks inside a paragraph also yield `\n`.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.paragraphs.iter().flat_map(|p| p.runs.iter())
    }

    pub fn run(&self, paragraph: usize, run: usize) -> Option<&Run> {
        self.paragraphs.get(paragraph)?.runs.get(run)
    }

    pub fn is_empty(&self) -> bool {
        self.runs().all(|r| r.text.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
    Distributed,
}

impl Alignment {
    pub fn from_xml(value: &str) -> Option<Self> {
        match value {
            "l" => Some(Self::Left),
            "ctr" => Some(Self::Center),
            "r" => Some(Self::Right),
            "just" | "justLow" => Some(Self::Justify),
            "dist" | "thaiDist" => Some(Self::Distributed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Bullet {
    #[default]
    None,
    Char { char: String },
    AutoNumber { scheme: String },
}

/// Paragraph spacing as written: a percentage of line height or absolute points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "camelCase")]
pub enum Spacing {
    Percent(f64),
    Points(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub alignment: Alignment,
    /// Outline level, 0-based as in `a:pPr/@lvl`.
    pub level: u8,
    pub bullet: Bullet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<Spacing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_before: Option<Spacing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_after: Option<Spacing>,
}

impl Paragraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum RunKind {
    #[default]
    Text,
    /// `a:br`; its text is `"\n"`.
    Break,
    /// `a:fld`, e.g. a slide number.
    Field,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub text: String,
    #[serde(default)]
    pub kind: RunKind,
    pub formatting: FormattingRecord,
    pub provenance: RunProvenance,
}

/// Fully resolved character formatting. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattingRecord {
    pub font_family: String,
    /// Points.
    pub font_size: f64,
    pub color: ColorValue,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// The cascade level that supplied each formatting property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunProvenance {
    pub font_family: CascadeLevel,
    pub font_size: CascadeLevel,
    pub color: CascadeLevel,
    pub bold: CascadeLevel,
    pub italic: CascadeLevel,
    pub underline: CascadeLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Run {
        Run {
            text: text.to_string(),
            kind: RunKind::Text,
            formatting: FormattingRecord {
                font_family: "Calibri".into(),
                font_size: 18.0,
                color: ColorValue::black(),
                bold: false,
                italic: false,
                underline: false,
            },
            provenance: RunProvenance {
                font_family: CascadeLevel::HardDefault,
                font_size: CascadeLevel::HardDefault,
                color: CascadeLevel::HardDefault,
                bold: CascadeLevel::HardDefault,
                italic: CascadeLevel::HardDefault,
                underline: CascadeLevel::HardDefault,
            },
        }
    }

    fn paragraph(runs: Vec<Run>) -> Paragraph {
        Paragraph {
            runs,
            alignment: Alignment::Left,
            level: 0,
            bullet: Bullet::None,
            line_spacing: None,
            space_before: None,
            space_after: None,
        }
    }

    #[test]
    fn plain_text_joins_paragraphs() {
        let frame = TextFrame {
            paragraphs: vec![
                paragraph(vec![run("Q3 "), run("Results")]),
                paragraph(vec![run("Revenue")]),
            ],
        };
        assert_eq!(frame.plain_text(), "Q3 Results\nRevenue");
        assert_eq!(frame.run(0, 1).map(|r| r.text.as_str()), Some("Results"));
        assert!(frame.run(1, 1).is_none());
    }

    #[test]
    fn alignment_tokens() {
        assert_eq!(Alignment::from_xml("ctr"), Some(Alignment::Center));
        assert_eq!(Alignment::from_xml("bogus"), None);
    }
}
