use crate::xml::{XmlDocument, CT};
use std::collections::HashMap;

/// Parsed `[Content_Types].xml`: extension defaults plus per-part overrides.
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    pub fn new() -> Self {
        let mut defaults = HashMap::new();
        defaults.insert("rels".to_string(), content_type_values::RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), "application/xml".to_string());

        Self {
            defaults,
            overrides: HashMap::new(),
        }
    }

    pub fn from_xml(doc: &XmlDocument) -> Self {
        let mut types = Self::default();
        let Some(root) = doc.root() else {
            return types;
        };

        let default_name = CT::Default();
        for node in doc.elements_by_name(root, &default_name) {
            if let (Some(ext), Some(ct)) = (doc.attr(node, "Extension"), doc.attr(node, "ContentType")) {
                types.add_default(ext, ct);
            }
        }
        let override_name = CT::Override();
        for node in doc.elements_by_name(root, &override_name) {
            if let (Some(part), Some(ct)) = (doc.attr(node, "PartName"), doc.attr(node, "ContentType")) {
                types.set_content_type(part, ct);
            }
        }
        types
    }

    pub fn get_content_type(&self, path: &str) -> Option<&str> {
        let path = path.trim_start_matches('/');
        if let Some(ct) = self.overrides.get(path) {
            return Some(ct);
        }

        let ext = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())?;
        self.defaults.get(&ext).map(|s| s.as_str())
    }

    pub fn set_content_type(&mut self, path: &str, content_type: &str) {
        self.overrides
            .insert(path.trim_start_matches('/').to_string(), content_type.to_string());
    }

    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        self.defaults
            .insert(extension.to_ascii_lowercase(), content_type.to_string());
    }
}

pub mod content_type_values {
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const PRESENTATION_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
    pub const SLIDESHOW_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideshow.main+xml";
    pub const TEMPLATE_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";
    pub const PRESENTATION_MACRO_MAIN: &str =
        "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml";
    pub const SLIDESHOW_MACRO_MAIN: &str =
        "application/vnd.ms-powerpoint.slideshow.macroEnabled.main+xml";
    pub const TEMPLATE_MACRO_MAIN: &str =
        "application/vnd.ms-powerpoint.template.macroEnabled.main+xml";
    pub const SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
    pub const SLIDE_LAYOUT: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
    pub const SLIDE_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
    pub const THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";

    /// Main-part content types accepted as a presentation.
    pub fn is_presentation_main(content_type: &str) -> bool {
        matches!(
            content_type,
            PRESENTATION_MAIN
                | SLIDESHOW_MAIN
                | TEMPLATE_MAIN
                | PRESENTATION_MACRO_MAIN
                | SLIDESHOW_MACRO_MAIN
                | TEMPLATE_MACRO_MAIN
        )
    }
}
