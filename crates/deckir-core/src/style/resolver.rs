use super::cascade::{CascadeLevel, CascadePolicy};
use super::props::{ListStyle, ParaProps, RunProps};
use super::snapshot::{
    match_placeholder, ColorMap, LayoutSnapshot, MasterSnapshot, PlaceholderSnapshot, StyleSnapshots,
    ThemeSnapshot,
};
use crate::ir::{Alignment, Bullet, FormattingRecord, PlaceholderKind, RunProvenance, Spacing};
use crate::normalize::{ColorSpec, ColorValue};

pub const DEFAULT_FONT_SIZE: f64 = 18.0;
pub const DEFAULT_FONT_FAMILY: &str = "Calibri";

/// Style context of one slide: its layout, master, theme and effective color map.
#[derive(Debug, Clone)]
pub struct SlideStyle<'a> {
    policy: &'a CascadePolicy,
    snapshots: &'a StyleSnapshots,
    layout: &'a LayoutSnapshot,
    master: &'a MasterSnapshot,
    theme: Option<&'a ThemeSnapshot>,
    color_map: ColorMap,
}

impl<'a> SlideStyle<'a> {
    /// `slide_override` is the slide's own `p:clrMapOvr`, which takes
    /// precedence over the layout's.
    pub fn new(
        policy: &'a CascadePolicy,
        snapshots: &'a StyleSnapshots,
        layout: &'a LayoutSnapshot,
        master: &'a MasterSnapshot,
        slide_override: Option<ColorMap>,
    ) -> Self {
        let theme = master
            .theme_id
            .as_deref()
            .and_then(|id| snapshots.theme(id));
        let color_map = slide_override
            .or_else(|| layout.color_map_override.clone())
            .unwrap_or_else(|| master.color_map.clone());
        Self {
            policy,
            snapshots,
            layout,
            master,
            theme,
            color_map,
        }
    }

    pub fn layout(&self) -> &'a LayoutSnapshot {
        self.layout
    }

    pub fn master(&self) -> &'a MasterSnapshot {
        self.master
    }

    pub fn theme(&self) -> Option<&'a ThemeSnapshot> {
        self.theme
    }

    pub fn color_map(&self) -> &ColorMap {
        &self.color_map
    }

    pub fn resolve_color(&self, spec: &ColorSpec) -> ColorValue {
        match spec {
            ColorSpec::Rgb { rgb, transforms } => ColorValue::from_rgb_with(*rgb, transforms.clone()),
            ColorSpec::Scheme { slot, transforms } => {
                // phClr inside master/layout styles stands for the text color.
                let logical = if slot == "phClr" { "tx1" } else { slot.as_str() };
                let Some(theme) = self.theme else {
                    return ColorValue::from_rgb_with([0, 0, 0], transforms.clone());
                };
                match theme.color(self.color_map.resolve(logical)) {
                    Some(base) => {
                        ColorValue::theme_reference(logical, &theme.id, transforms.clone(), base)
                    }
                    None => {
                        log::warn!("{}: scheme color {} is not defined", theme.part_name, logical);
                        ColorValue::from_rgb_with([0, 0, 0], transforms.clone())
                    }
                }
            }
        }
    }

    /// Resolves `+mj-*`/`+mn-*` theme font references.
    pub fn resolve_font(&self, face: &str) -> String {
        let theme_font = if face.starts_with("+mj") {
            self.theme
                .and_then(|t| t.major_font.clone().or_else(|| t.minor_font.clone()))
        } else if face.starts_with("+mn") {
            self.theme.and_then(|t| t.minor_font.clone())
        } else {
            return face.to_string();
        };
        theme_font.unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string())
    }

    pub fn layout_placeholder(&self, kind: PlaceholderKind, index: Option<u32>) -> Option<&'a PlaceholderSnapshot> {
        match_placeholder(&self.layout.placeholders, kind, index)
    }

    pub fn master_placeholder(&self, kind: PlaceholderKind, index: Option<u32>) -> Option<&'a PlaceholderSnapshot> {
        match_placeholder(&self.master.placeholders, kind, index)
    }

    /// Context for one shape. `placeholder` is the shape's own `p:ph`
    /// reference; `own_list_style` its `p:txBody/a:lstStyle`.
    pub fn shape(
        &self,
        placeholder: Option<(PlaceholderKind, Option<u32>)>,
        own_list_style: ListStyle,
    ) -> ShapeStyle<'_, 'a> {
        let (layout_ph, master_ph) = match placeholder {
            Some((kind, index)) => {
                let layout_ph = self.layout_placeholder(kind, index);
                let (m_kind, m_index) = layout_ph
                    .map(|p| (p.kind, p.index))
                    .unwrap_or((kind, index));
                (layout_ph, self.master_placeholder(m_kind, m_index))
            }
            None => (None, None),
        };

        let kind = placeholder.map(|(k, _)| k);
        let text_style = self.master.text_style(kind);
        let master_list = match master_ph {
            Some(ph) => ph.list_style.clone().or(text_style),
            None => text_style.clone(),
        };

        ShapeStyle {
            slide: self,
            is_title: kind.map(|k| k.is_title()).unwrap_or(false),
            shape_list: own_list_style,
            layout_list: layout_ph.map(|p| &p.list_style),
            master_list,
        }
    }
}

/// Resolved paragraph-level properties.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParagraph {
    pub alignment: Alignment,
    pub bullet: Bullet,
    pub line_spacing: Option<Spacing>,
    pub space_before: Option<Spacing>,
    pub space_after: Option<Spacing>,
}

/// Cascade for the text of one shape.
#[derive(Debug, Clone)]
pub struct ShapeStyle<'s, 'a> {
    slide: &'s SlideStyle<'a>,
    is_title: bool,
    shape_list: ListStyle,
    layout_list: Option<&'a ListStyle>,
    master_list: ListStyle,
}

impl<'s, 'a> ShapeStyle<'s, 'a> {
    fn theme_run_props(&self, level: u8) -> RunProps {
        let defaults = self.slide.snapshots.default_text_style.level(level).run;
        let theme = RunProps {
            font_family: self
                .slide
                .theme
                .map(|_| if self.is_title { "+mj-lt" } else { "+mn-lt" }.to_string()),
            color: self.slide.theme.map(|_| ColorSpec::Scheme {
                slot: "tx1".to_string(),
                transforms: Vec::new(),
            }),
            ..RunProps::default()
        };
        defaults.or(&theme)
    }

    fn level_para_props(&self, level: u8) -> [(CascadeLevel, ParaProps); 4] {
        [
            (CascadeLevel::Shape, self.shape_list.level(level).para),
            (
                CascadeLevel::Layout,
                self.layout_list.map(|l| l.level(level).para).unwrap_or_default(),
            ),
            (CascadeLevel::Master, self.master_list.level(level).para),
            (
                CascadeLevel::Theme,
                self.slide.snapshots.default_text_style.level(level).para,
            ),
        ]
    }

    /// `ppr` is the paragraph's own `a:pPr`; `level` its 0-based outline level.
    pub fn resolve_paragraph(&self, ppr: &ParaProps, level: u8) -> ResolvedParagraph {
        let inherited = self.level_para_props(level);
        let props = |l: CascadeLevel| -> Option<&ParaProps> {
            match l {
                CascadeLevel::Paragraph => Some(ppr),
                CascadeLevel::Run | CascadeLevel::HardDefault => None,
                other => inherited.iter().find(|(lvl, _)| *lvl == other).map(|(_, p)| p),
            }
        };
        let policy = self.slide.policy;

        ResolvedParagraph {
            alignment: policy
                .pick(|l| props(l)?.alignment)
                .map(|(v, _)| v)
                .unwrap_or_default(),
            bullet: policy
                .pick(|l| props(l)?.bullet.clone())
                .map(|(v, _)| v)
                .unwrap_or_default(),
            line_spacing: policy.pick(|l| props(l)?.line_spacing).map(|(v, _)| v),
            space_before: policy.pick(|l| props(l)?.space_before).map(|(v, _)| v),
            space_after: policy.pick(|l| props(l)?.space_after).map(|(v, _)| v),
        }
    }

    /// Resolves every character property of a run independently; the
    /// provenance records the level that supplied each one.
    pub fn resolve_run(
        &self,
        rpr: &RunProps,
        paragraph_default: &RunProps,
        level: u8,
    ) -> (FormattingRecord, RunProvenance) {
        let shape = self.shape_list.level(level).run;
        let layout = self
            .layout_list
            .map(|l| l.level(level).run)
            .unwrap_or_default();
        let master = self.master_list.level(level).run;
        let theme = self.theme_run_props(level);

        let props = |l: CascadeLevel| -> Option<&RunProps> {
            match l {
                CascadeLevel::Run => Some(rpr),
                CascadeLevel::Paragraph => Some(paragraph_default),
                CascadeLevel::Shape => Some(&shape),
                CascadeLevel::Layout => Some(&layout),
                CascadeLevel::Master => Some(&master),
                CascadeLevel::Theme => Some(&theme),
                CascadeLevel::HardDefault => None,
            }
        };
        let policy = self.slide.policy;
        let slide = self.slide;

        let (font_family, font_family_level) = policy
            .pick(|l| props(l)?.font_family.clone())
            .map(|(face, l)| (slide.resolve_font(&face), l))
            .unwrap_or_else(|| (slide.resolve_font("+mn-lt"), CascadeLevel::HardDefault));

        let (font_size, font_size_level) = policy
            .pick(|l| props(l)?.font_size)
            .unwrap_or((DEFAULT_FONT_SIZE, CascadeLevel::HardDefault));

        let (color, color_level) = policy
            .pick(|l| props(l)?.color.clone())
            .map(|(spec, l)| (slide.resolve_color(&spec), l))
            .unwrap_or_else(|| (self.default_color(), CascadeLevel::HardDefault));

        let flag = |get: fn(&RunProps) -> Option<bool>| {
            policy
                .pick(|l| props(l).and_then(get))
                .unwrap_or((false, CascadeLevel::HardDefault))
        };
        let (bold, bold_level) = flag(|p| p.bold);
        let (italic, italic_level) = flag(|p| p.italic);
        let (underline, underline_level) = flag(|p| p.underline);

        (
            FormattingRecord {
                font_family,
                font_size,
                color,
                bold,
                italic,
                underline,
            },
            RunProvenance {
                font_family: font_family_level,
                font_size: font_size_level,
                color: color_level,
                bold: bold_level,
                italic: italic_level,
                underline: underline_level,
            },
        )
    }

    fn default_color(&self) -> ColorValue {
        match self.slide.theme {
            Some(_) => self.slide.resolve_color(&ColorSpec::Scheme {
                slot: "tx1".to_string(),
                transforms: Vec::new(),
            }),
            None => ColorValue::black(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{ColorSource, CoordinateSpace};

    fn level_style(sz: f64) -> ListStyle {
        let doc = crate::xml::parser::parse(&format!(
            r#"<a:lstStyle xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><a:lvl1pPr><a:defRPr sz="{}"/></a:lvl1pPr></a:lstStyle>"#,
            (sz * 100.0) as u32
        ))
        .unwrap();
        ListStyle::from_element(&doc, doc.root().unwrap())
    }

    fn fixture() -> StyleSnapshots {
        let theme = ThemeSnapshot {
            id: "theme/theme1".into(),
            part_name: "ppt/theme/theme1.xml".into(),
            name: "Office".into(),
            colors: vec![("dk1".into(), [0x11, 0x11, 0x11]), ("accent1".into(), [0x44, 0x72, 0xC4])],
            major_font: Some("Calibri Light".into()),
            minor_font: Some("Calibri".into()),
            effect_style_count: 3,
        };
        let master = MasterSnapshot {
            id: "slideMasters/slideMaster1".into(),
            part_name: "ppt/slideMasters/slideMaster1.xml".into(),
            theme_id: Some(theme.id.clone()),
            color_map: ColorMap::default(),
            placeholders: vec![PlaceholderSnapshot {
                kind: PlaceholderKind::Body,
                index: Some(1),
                shape_id: "3".into(),
                transform: None,
                space: CoordinateSpace::identity(),
                list_style: ListStyle::default(),
            }],
            title_style: level_style(44.0),
            body_style: level_style(28.0),
            other_style: ListStyle::default(),
            layout_parts: vec!["ppt/slideLayouts/slideLayout1.xml".into()],
        };
        let layout = LayoutSnapshot {
            id: "slideLayouts/slideLayout1".into(),
            part_name: "ppt/slideLayouts/slideLayout1.xml".into(),
            name: "Title and Content".into(),
            layout_type: Some("obj".into()),
            master_id: master.id.clone(),
            placeholders: vec![PlaceholderSnapshot {
                kind: PlaceholderKind::Body,
                index: Some(1),
                shape_id: "3".into(),
                transform: None,
                space: CoordinateSpace::identity(),
                list_style: level_style(24.0),
            }],
            color_map_override: None,
        };
        StyleSnapshots {
            themes: vec![theme],
            masters: vec![master],
            layouts: vec![layout],
            default_text_style: ListStyle::default(),
        }
    }

    #[test]
    fn first_defining_level_wins_per_property() {
        let snapshots = fixture();
        let policy = CascadePolicy::default();
        let slide = SlideStyle::new(&policy, &snapshots, &snapshots.layouts[0], &snapshots.masters[0], None);
        let shape = slide.shape(Some((PlaceholderKind::Body, Some(1))), ListStyle::default());

        let rpr = RunProps {
            bold: Some(true),
            ..RunProps::default()
        };
        let (record, provenance) = shape.resolve_run(&rpr, &RunProps::default(), 0);

        assert_eq!(record.font_size, 24.0);
        assert_eq!(provenance.font_size, CascadeLevel::Layout);
        assert!(record.bold);
        assert_eq!(provenance.bold, CascadeLevel::Run);
        assert_eq!(record.font_family, "Calibri");
        assert_eq!(provenance.font_family, CascadeLevel::Theme);
        assert_eq!(record.color.rgb(), [0x11, 0x11, 0x11]);
        assert_eq!(provenance.color, CascadeLevel::Theme);
        assert!(!record.italic);
        assert_eq!(provenance.italic, CascadeLevel::HardDefault);
    }

    #[test]
    fn custom_policy_changes_the_winner() {
        let snapshots = fixture();
        let policy = CascadePolicy::new(vec![
            CascadeLevel::Master,
            CascadeLevel::Run,
            CascadeLevel::Paragraph,
            CascadeLevel::Shape,
            CascadeLevel::Layout,
            CascadeLevel::Theme,
        ])
        .unwrap();
        let slide = SlideStyle::new(&policy, &snapshots, &snapshots.layouts[0], &snapshots.masters[0], None);
        let shape = slide.shape(Some((PlaceholderKind::Body, Some(1))), ListStyle::default());

        let (record, provenance) = shape.resolve_run(&RunProps::default(), &RunProps::default(), 0);
        assert_eq!(record.font_size, 28.0);
        assert_eq!(provenance.font_size, CascadeLevel::Master);
    }

    #[test]
    fn title_uses_major_font_and_title_style() {
        let snapshots = fixture();
        let policy = CascadePolicy::default();
        let slide = SlideStyle::new(&policy, &snapshots, &snapshots.layouts[0], &snapshots.masters[0], None);
        let shape = slide.shape(Some((PlaceholderKind::CenteredTitle, None)), ListStyle::default());

        let (record, provenance) = shape.resolve_run(&RunProps::default(), &RunProps::default(), 0);
        assert_eq!(record.font_family, "Calibri Light");
        assert_eq!(record.font_size, 44.0);
        assert_eq!(provenance.font_size, CascadeLevel::Master);
    }

    #[test]
    fn scheme_colors_resolve_through_the_color_map() {
        let snapshots = fixture();
        let policy = CascadePolicy::default();
        let slide = SlideStyle::new(&policy, &snapshots, &snapshots.layouts[0], &snapshots.masters[0], None);

        let color = slide.resolve_color(&ColorSpec::Scheme {
            slot: "accent1".into(),
            transforms: vec![],
        });
        assert_eq!(color.hex(), "#4472C4");
        assert_eq!(
            color.source(),
            &ColorSource::ThemeReference {
                slot: "accent1".into(),
                theme_id: "theme/theme1".into()
            }
        );
        assert_eq!(slide.resolve_font("+mn-lt"), "Calibri");
        assert_eq!(slide.resolve_font("Georgia"), "Georgia");
    }

    #[test]
    fn hard_defaults_without_a_theme() {
        let mut snapshots = fixture();
        snapshots.themes.clear();
        let policy = CascadePolicy::default();
        let slide = SlideStyle::new(&policy, &snapshots, &snapshots.layouts[0], &snapshots.masters[0], None);
        let shape = slide.shape(None, ListStyle::default());

        let (record, provenance) = shape.resolve_run(&RunProps::default(), &RunProps::default(), 0);
        assert_eq!(record.font_family, DEFAULT_FONT_FAMILY);
        assert_eq!(record.font_size, DEFAULT_FONT_SIZE);
        assert_eq!(record.color, ColorValue::black());
        assert_eq!(provenance.font_family, CascadeLevel::HardDefault);
        assert_eq!(provenance.color, CascadeLevel::HardDefault);

        let para = shape.resolve_paragraph(&ParaProps::default(), 0);
        assert_eq!(para.alignment, Alignment::Left);
        assert_eq!(para.bullet, Bullet::None);
    }
}
