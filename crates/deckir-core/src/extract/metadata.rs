use crate::error::Result;
use crate::ir::{CustomProperty, DocumentMetadata};
use crate::package::{relationship_types, PresentationPackage};
use crate::xml::{XName, XmlDocument, CP, CUSTOM, DC, DCTERMS, EP};
use chrono::Utc;
use uuid::Uuid;

const DEFAULT_CORE_PART: &str = "docProps/core.xml";
const DEFAULT_APP_PART: &str = "docProps/app.xml";
const DEFAULT_CUSTOM_PART: &str = "docProps/custom.xml";

/// Deterministic presentation id: UUID v5 over the container hash.
pub fn presentation_id(file_hash: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, file_hash.as_bytes()).to_string()
}

/// Document properties are optional; a missing or unreadable property part
/// leaves the corresponding fields empty.
fn property_part(pkg: &PresentationPackage, rel_type: &str, fallback: &str) -> Option<XmlDocument> {
    let part = pkg
        .related_part("", rel_type)
        .ok()
        .flatten()
        .unwrap_or_else(|| fallback.to_string());
    if !pkg.package().has_part(&part) {
        return None;
    }
    match pkg.package().get_xml_part(&part) {
        Ok(doc) => Some(doc),
        Err(err) => {
            log::warn!("ignoring unreadable property part {}: {}", part, err);
            None
        }
    }
}

fn child_text(doc: &XmlDocument, name: &XName) -> Option<String> {
    let root = doc.root()?;
    let node = doc.first_child(root, name)?;
    let text = doc.text_content(node);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

pub fn read_metadata(pkg: &PresentationPackage, source_name: Option<String>) -> Result<DocumentMetadata> {
    let file_hash = pkg.file_hash().to_string();
    let slide_size = pkg.slide_size();

    let mut metadata = DocumentMetadata {
        presentation_id: presentation_id(&file_hash),
        source_name,
        file_hash,
        extracted_at: Utc::now(),
        title: None,
        author: None,
        last_modified_by: None,
        created: None,
        modified: None,
        revision: None,
        language: None,
        company: None,
        custom_properties: Vec::new(),
        slide_size,
        aspect_ratio: slide_size.aspect_ratio(),
    };

    if let Some(core) = property_part(pkg, relationship_types::CORE_PROPERTIES, DEFAULT_CORE_PART) {
        metadata.title = child_text(&core, &DC::title());
        metadata.author = child_text(&core, &DC::creator());
        metadata.last_modified_by = child_text(&core, &CP::lastModifiedBy());
        metadata.created = child_text(&core, &DCTERMS::created());
        metadata.modified = child_text(&core, &DCTERMS::modified());
        metadata.revision = child_text(&core, &CP::revision());
        metadata.language = child_text(&core, &DC::language());
    }

    if let Some(app) = property_part(pkg, relationship_types::EXTENDED_PROPERTIES, DEFAULT_APP_PART) {
        metadata.company = child_text(&app, &EP::Company());
    }

    if let Some(custom) = property_part(pkg, relationship_types::CUSTOM_PROPERTIES, DEFAULT_CUSTOM_PART) {
        if let Some(root) = custom.root() {
            metadata.custom_properties = custom
                .elements_by_name(root, &CUSTOM::property())
                .filter_map(|prop| {
                    let name = custom.attr(prop, "name")?.to_string();
                    let value = custom
                        .child_elements(prop)
                        .next()
                        .map(|v| custom.text_content(v))
                        .unwrap_or_default();
                    Some(CustomProperty { name, value })
                })
                .collect();
        }
    }

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presentation_id_is_stable_per_hash() {
        let a = presentation_id("abc");
        assert_eq!(a, presentation_id("abc"));
        assert_ne!(a, presentation_id("abd"));
        assert_eq!(Uuid::parse_str(&a).unwrap().get_version_num(), 5);
    }
}
