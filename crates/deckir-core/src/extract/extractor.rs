use super::metadata::read_metadata;
use super::slide::extract_slide;
use super::stats::document_statistics;
use crate::error::Result;
use crate::ir::{
    ColorMapEntry, Document, FontScheme, Layout, Master, Placeholder, Slide, Theme, ThemeColor,
};
use crate::normalize::{normalize, ColorValue};
use crate::package::{PresentationPackage, SlideRef, SlideSize};
use crate::settings::ExtractionSettings;
use crate::style::{part_id, PlaceholderSnapshot, StyleSnapshots};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Builds [`Document`]s from presentation packages.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    settings: ExtractionSettings,
}

impl Extractor {
    pub fn new(settings: ExtractionSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    pub fn extract_path(&self, path: impl AsRef<Path>) -> Result<Document> {
        let path = path.as_ref();
        let pkg = PresentationPackage::open(path)?;
        let source_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        self.extract_with_source(&pkg, source_name)
    }

    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<Document> {
        let pkg = PresentationPackage::from_bytes(bytes)?;
        self.extract(&pkg)
    }

    pub fn extract(&self, pkg: &PresentationPackage) -> Result<Document> {
        self.extract_with_source(pkg, None)
    }

    /// Extracts several files in parallel; results keep the input order.
    pub fn extract_many(&self, paths: &[PathBuf]) -> Vec<Result<Document>> {
        paths.par_iter().map(|path| self.extract_path(path)).collect()
    }

    fn extract_with_source(&self, pkg: &PresentationPackage, source_name: Option<String>) -> Result<Document> {
        let metadata = read_metadata(pkg, source_name)?;
        let snapshots = StyleSnapshots::load(pkg)?;
        let slide_size = pkg.slide_size();

        let themes = snapshots.themes.iter().map(theme_ir).collect();
        let masters = snapshots
            .masters
            .iter()
            .map(|m| Master {
                id: m.id.clone(),
                part_name: m.part_name.clone(),
                theme_id: m.theme_id.clone().unwrap_or_default(),
                placeholders: placeholders_ir(&m.placeholders, slide_size),
                layout_ids: m.layout_parts.iter().map(|p| part_id(p)).collect(),
                color_map: m
                    .color_map
                    .entries()
                    .iter()
                    .map(|(name, slot)| ColorMapEntry {
                        name: name.clone(),
                        slot: slot.clone(),
                    })
                    .collect(),
            })
            .collect();
        let layouts = snapshots
            .layouts
            .iter()
            .map(|l| Layout {
                id: l.id.clone(),
                part_name: l.part_name.clone(),
                name: l.name.clone(),
                layout_type: l.layout_type.clone(),
                master_id: l.master_id.clone(),
                placeholders: placeholders_ir(&l.placeholders, slide_size),
            })
            .collect();

        let slide_refs = pkg.slides();
        let extract_one = |(i, slide_ref): (usize, &SlideRef)| {
            extract_slide(pkg, &snapshots, &self.settings, slide_ref, i + 1)
        };
        let results: Vec<(Slide, _)> = if self.settings.use_parallel(slide_refs.len()) {
            log::debug!("extracting {} slides in parallel", slide_refs.len());
            slide_refs
                .par_iter()
                .enumerate()
                .map(extract_one)
                .collect::<Result<Vec<_>>>()?
        } else {
            slide_refs
                .iter()
                .enumerate()
                .map(extract_one)
                .collect::<Result<Vec<_>>>()?
        };

        let mut slides = Vec::with_capacity(results.len());
        let mut warnings = Vec::new();
        for (slide, slide_warnings) in results {
            slides.push(slide);
            warnings.extend(slide_warnings);
        }
        if !warnings.is_empty() {
            log::warn!("{} shapes skipped during extraction", warnings.len());
        }

        let statistics = document_statistics(&slides, self.settings.color_merge_delta_e);
        Ok(Document {
            metadata,
            themes,
            masters,
            layouts,
            slides,
            statistics,
            warnings,
        })
    }
}

fn theme_ir(theme: &crate::style::ThemeSnapshot) -> Theme {
    Theme {
        id: theme.id.clone(),
        part_name: theme.part_name.clone(),
        name: theme.name.clone(),
        color_scheme: theme
            .colors
            .iter()
            .map(|(slot, rgb)| ThemeColor {
                slot: slot.clone(),
                color: ColorValue::from_rgb(*rgb),
            })
            .collect(),
        fonts: FontScheme {
            major: theme.major_font.clone(),
            minor: theme.minor_font.clone(),
        },
        effect_style_count: theme.effect_style_count,
    }
}

fn placeholders_ir(placeholders: &[PlaceholderSnapshot], slide_size: SlideSize) -> Vec<Placeholder> {
    placeholders
        .iter()
        .map(|ph| Placeholder {
            kind: ph.kind,
            index: ph.index,
            shape_id: ph.shape_id.clone(),
            bounds: ph
                .transform
                .as_ref()
                .map(|raw| normalize(raw, &ph.space, slide_size)),
        })
        .collect()
}
