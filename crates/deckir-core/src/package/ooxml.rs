use crate::error::{DeckError, Result};
use crate::xml::XmlDocument;
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::read::ZipArchive;
use zip::write::ZipWriter;
use zip::CompressionMethod;

use super::content_types::ContentTypes;
use super::relationships::{parse_relationships, rels_path_for, Relationship};

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// One ZIP entry as read from the container.
#[derive(Debug, Clone)]
struct PackageEntry {
    name: String,
    compression: CompressionMethod,
    data: Vec<u8>,
    modified: bool,
}

/// An OPC container held fully in memory. Entry order and per-entry
/// compression are kept so that a save reproduces the original layout.
#[derive(Debug, Clone)]
pub struct OoxmlPackage {
    entries: Vec<PackageEntry>,
    index: HashMap<String, usize>,
    content_types: ContentTypes,
}

impl OoxmlPackage {
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let cursor = Cursor::new(bytes);
        let mut archive = ZipArchive::new(cursor)
            .map_err(|e| DeckError::corrupt("<container>", format!("not a readable ZIP archive: {}", e)))?;

        let mut entries = Vec::with_capacity(archive.len());
        let mut index = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| DeckError::corrupt("<container>", format!("entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let compression = file.compression();
            let mut data = Vec::new();
            file.read_to_end(&mut data)
                .map_err(|e| DeckError::corrupt(&name, format!("cannot decompress: {}", e)))?;

            index.insert(name.clone(), entries.len());
            entries.push(PackageEntry {
                name,
                compression,
                data,
                modified: false,
            });
        }

        let mut package = Self {
            entries,
            index,
            content_types: ContentTypes::new(),
        };

        if package.get_part(CONTENT_TYPES_PART).is_none() {
            return Err(DeckError::corrupt(CONTENT_TYPES_PART, "missing from container"));
        }
        let types_doc = package.get_xml_part(CONTENT_TYPES_PART)?;
        package.content_types = ContentTypes::from_xml(&types_doc);

        log::debug!("opened package with {} parts", package.entries.len());
        Ok(package)
    }

    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::open(&bytes)
    }

    /// Writes every entry in its original order. Untouched parts carry their
    /// original bytes; stored entries stay stored.
    pub fn save(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let mut writer = ZipWriter::new(&mut buffer);

        for entry in &self.entries {
            let method = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options: zip::write::FileOptions<'_, ()> =
                zip::write::FileOptions::default().compression_method(method);
            writer.start_file(entry.name.as_str(), options)?;
            writer.write_all(&entry.data)?;
        }

        writer.finish()?;
        Ok(buffer.into_inner())
    }

    pub fn save_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.save()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn get_part(&self, path: &str) -> Option<&[u8]> {
        let path = path.trim_start_matches('/');
        self.index
            .get(path)
            .map(|&i| self.entries[i].data.as_slice())
    }

    pub fn has_part(&self, path: &str) -> bool {
        self.get_part(path).is_some()
    }

    /// Parses an XML part. A missing or malformed part is reported as corrupt.
    pub fn get_xml_part(&self, path: &str) -> Result<XmlDocument> {
        let bytes = self
            .get_part(path)
            .ok_or_else(|| DeckError::corrupt(path, "part missing from container"))?;
        crate::xml::parser::parse_bytes(bytes).map_err(|e| match e {
            DeckError::XmlParse { message, location } => {
                DeckError::corrupt(path, format!("malformed XML at {}: {}", location, message))
            }
            other => other,
        })
    }

    /// Replaces a part's bytes, or appends a new deflated entry.
    pub fn set_part(&mut self, path: &str, content: Vec<u8>) {
        let path = path.trim_start_matches('/');
        match self.index.get(path) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                entry.modified |= entry.data != content;
                entry.data = content;
            }
            None => {
                self.index.insert(path.to_string(), self.entries.len());
                self.entries.push(PackageEntry {
                    name: path.to_string(),
                    compression: CompressionMethod::Deflated,
                    data: content,
                    modified: true,
                });
            }
        }
    }

    pub fn put_xml_part(&mut self, path: &str, doc: &XmlDocument) -> Result<()> {
        let bytes = crate::xml::builder::serialize_bytes(doc)?;
        self.set_part(path, bytes);
        Ok(())
    }

    /// Relationships whose source is `part_name` (empty for the package root).
    /// A part without a `.rels` part has no relationships.
    pub fn relationships(&self, part_name: &str) -> Result<Vec<Relationship>> {
        let rels_path = rels_path_for(part_name);
        if !self.has_part(&rels_path) {
            return Ok(Vec::new());
        }
        let doc = self.get_xml_part(&rels_path)?;
        Ok(parse_relationships(part_name, &doc))
    }

    pub fn content_type(&self, path: &str) -> Option<&str> {
        self.content_types.get_content_type(path)
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn is_modified(&self, path: &str) -> bool {
        self.index
            .get(path.trim_start_matches('/'))
            .map(|&i| self.entries[i].modified)
            .unwrap_or(false)
    }

    pub fn modified_parts(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.modified)
            .map(|e| e.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::write::SimpleFileOptions;

    const TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

    fn container(entries: &[(&str, &[u8], CompressionMethod)]) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        let mut writer = ZipWriter::new(&mut buffer);
        for (name, data, method) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default().compression_method(*method))
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
        buffer.into_inner()
    }

    #[test]
    fn save_preserves_order_and_compression() {
        let bytes = container(&[
            (CONTENT_TYPES_PART, TYPES.as_bytes(), CompressionMethod::Deflated),
            ("ppt/media/image1.png", b"\x89PNG", CompressionMethod::Stored),
            ("a.xml", b"<root/>", CompressionMethod::Deflated),
        ]);

        let pkg = OoxmlPackage::open(&bytes).unwrap();
        let saved = pkg.save().unwrap();
        let mut archive = ZipArchive::new(Cursor::new(saved)).unwrap();

        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec![CONTENT_TYPES_PART, "ppt/media/image1.png", "a.xml"]);
        assert_eq!(
            archive.by_name("ppt/media/image1.png").unwrap().compression(),
            CompressionMethod::Stored
        );
    }

    #[test]
    fn set_part_tracks_modification() {
        let bytes = container(&[
            (CONTENT_TYPES_PART, TYPES.as_bytes(), CompressionMethod::Deflated),
            ("a.xml", b"<root/>", CompressionMethod::Deflated),
        ]);
        let mut pkg = OoxmlPackage::open(&bytes).unwrap();

        pkg.set_part("a.xml", b"<root/>".to_vec());
        assert!(!pkg.is_modified("a.xml"));

        pkg.set_part("/a.xml", b"<root a=\"1\"/>".to_vec());
        assert!(pkg.is_modified("a.xml"));
        assert_eq!(pkg.modified_parts(), vec!["a.xml".to_string()]);
    }

    #[test]
    fn missing_content_types_is_corrupt() {
        let bytes = container(&[("a.xml", b"<root/>", CompressionMethod::Deflated)]);
        let err = OoxmlPackage::open(&bytes).unwrap_err();
        assert!(matches!(err, DeckError::PackageCorrupt { part, .. } if part == CONTENT_TYPES_PART));
    }

    #[test]
    fn garbage_bytes_are_corrupt() {
        let err = OoxmlPackage::open(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, DeckError::PackageCorrupt { .. }));
    }

    #[test]
    fn malformed_part_is_reported_with_its_name() {
        let bytes = container(&[
            (CONTENT_TYPES_PART, TYPES.as_bytes(), CompressionMethod::Deflated),
            ("ppt/slides/slide1.xml", b"<p:sld><unclosed>", CompressionMethod::Deflated),
        ]);
        let pkg = OoxmlPackage::open(&bytes).unwrap();
        let err = pkg.get_xml_part("ppt/slides/slide1.xml").unwrap_err();
        assert!(matches!(err, DeckError::PackageCorrupt { part, .. } if part == "ppt/slides/slide1.xml"));
    }
}
