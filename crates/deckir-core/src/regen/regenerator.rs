use super::apply::apply_edit;
use super::report::{AppliedEdit, RegenerationReport};
use crate::diff::{Diff, ShapeEdits};
use crate::error::{DeckError, Result};
use crate::ir::Document;
use crate::package::{OoxmlPackage, PresentationPackage, SlideSize};
use crate::settings::RegenerationSettings;
use crate::shape_tree::{find_sp_tree, ShapeTree};
use std::path::Path;

/// Applies a [`Diff`] to the package a [`Document`] was extracted from.
#[derive(Debug, Clone, Default)]
pub struct Regenerator {
    settings: RegenerationSettings,
}

impl Regenerator {
    pub fn new(settings: RegenerationSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RegenerationSettings {
        &self.settings
    }

    /// Reads `original_path`, applies `diff` and writes the result to `output_path`.
    pub fn regenerate(
        &self,
        original_path: impl AsRef<Path>,
        document: &Document,
        diff: &Diff,
        output_path: impl AsRef<Path>,
    ) -> Result<RegenerationReport> {
        let original_path = original_path.as_ref();
        log::debug!("regenerating from {}", original_path.display());
        let bytes = std::fs::read(original_path)?;
        let (output, report) = self.regenerate_bytes(&bytes, document, diff)?;
        std::fs::write(output_path.as_ref(), output)?;
        Ok(report)
    }

    /// Applies `diff` to a package held in memory. When no part changes the
    /// input bytes are returned as they are.
    pub fn regenerate_bytes(
        &self,
        original: &[u8],
        document: &Document,
        diff: &Diff,
    ) -> Result<(Vec<u8>, RegenerationReport)> {
        diff.validate(document)?;

        let pkg = PresentationPackage::from_bytes(original)?;
        let mut report = RegenerationReport {
            source_hash_matched: pkg.file_hash() == document.metadata.file_hash,
            ..Default::default()
        };
        if self.settings.verify_source_hash && !report.source_hash_matched {
            log::warn!(
                "source hash {} differs from the document's {}",
                pkg.file_hash(),
                document.metadata.file_hash
            );
        }
        if !diff.base_file_hash.is_empty() && diff.base_file_hash != document.metadata.file_hash {
            log::warn!("diff was built against {}, not this document", diff.base_file_hash);
        }

        let slide_size = pkg.slide_size();
        let targets: Vec<(&str, Option<String>)> = diff
            .slide_ids()
            .into_iter()
            .map(|id| (id, pkg.slide_by_id(id).map(|s| s.part_name.clone())))
            .collect();
        let mut package = pkg.into_package();

        for (slide_id, part_name) in targets {
            let edits: Vec<&ShapeEdits> = diff
                .shapes()
                .iter()
                .filter(|s| s.key.slide_id == slide_id)
                .collect();
            let Some(part_name) = part_name else {
                self.miss(&mut report, &edits, "slide not found in source package")?;
                continue;
            };
            if self.patch_slide(&mut package, &part_name, &edits, slide_size, &mut report)? {
                report.rewritten_parts.push(part_name);
            }
        }

        if report.rewritten_parts.is_empty() {
            log::debug!("no parts changed");
            return Ok((original.to_vec(), report));
        }
        log::debug!(
            "{} edits applied, {} skipped",
            report.applied.len(),
            report.skipped.len()
        );
        Ok((package.save()?, report))
    }

    /// Applies the edits of one slide. Returns whether the part was rewritten.
    fn patch_slide(
        &self,
        package: &mut OoxmlPackage,
        part_name: &str,
        edits: &[&ShapeEdits],
        slide_size: SlideSize,
        report: &mut RegenerationReport,
    ) -> Result<bool> {
        log::debug!("patching {}", part_name);
        let mut doc = package.get_xml_part(part_name)?;
        let Some(sp_tree) = find_sp_tree(&doc) else {
            self.miss(report, edits, "slide has no shape tree")?;
            return Ok(false);
        };
        let tree = ShapeTree::walk(&doc, sp_tree);

        let mut applied_any = false;
        for shape_edits in edits {
            let key = &shape_edits.key;
            let Some(visited) = tree.find(&key.shape_id) else {
                self.miss(report, &[*shape_edits], "shape not found in source slide")?;
                continue;
            };
            for edit in &shape_edits.edits {
                match apply_edit(&mut doc, visited, edit, slide_size) {
                    Ok(()) => {
                        applied_any = true;
                        report.applied.push(AppliedEdit {
                            key: key.clone(),
                            field: edit.field,
                        });
                    }
                    Err(reason) => report.skip(key, Some(edit.field), reason),
                }
            }
        }

        if applied_any {
            package.put_xml_part(part_name, &doc)?;
        }
        Ok(applied_any)
    }

    /// Records a lookup miss for every affected edit, or fails in strict mode.
    fn miss(
        &self,
        report: &mut RegenerationReport,
        edits: &[&ShapeEdits],
        reason: &str,
    ) -> Result<()> {
        for shape_edits in edits {
            if self.settings.strict {
                return Err(DeckError::ShapeLookupMiss {
                    slide: shape_edits.key.slide_id.clone(),
                    shape: shape_edits.key.shape_id.clone(),
                });
            }
            report.skip(&shape_edits.key, None, reason);
        }
        Ok(())
    }
}
