use super::arena::XmlDocument;
use super::namespaces::{XML, XMLNS};
use super::node::XmlNodeData;
use super::xname::{XAttribute, XName};
use crate::error::{DeckError, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::HashMap;
use std::io::{Cursor, Write};

/// Namespace URI to prefix, as declared on the element being written and its ancestors.
type NamespaceMap = HashMap<String, String>;

fn write_err(e: impl std::fmt::Display) -> DeckError {
    DeckError::XmlWrite(e.to_string())
}

pub fn serialize(doc: &XmlDocument) -> Result<String> {
    let bytes = serialize_bytes(doc)?;
    String::from_utf8(bytes).map_err(write_err)
}

/// Serializes the document with the standalone declaration PowerPoint writes on every part.
pub fn serialize_bytes(doc: &XmlDocument) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(write_err)?;
    writer.get_mut().write_all(b"\r\n")?;

    if let Some(root_id) = doc.root() {
        write_node(doc, root_id, &mut writer, &NamespaceMap::new())?;
    }

    Ok(writer.into_inner().into_inner())
}

fn is_xmlns_attr(attr: &XAttribute) -> bool {
    (attr.name.namespace.is_none() && attr.name.local_name == "xmlns")
        || attr.name.namespace.as_deref() == Some(XMLNS)
}

fn extend_namespace_map(namespace_map: &mut NamespaceMap, attributes: &[XAttribute]) {
    for attr in attributes.iter().filter(|a| is_xmlns_attr(a)) {
        let prefix = if attr.name.namespace.is_none() {
            String::new()
        } else {
            attr.name.local_name.clone()
        };
        namespace_map.insert(attr.value.clone(), prefix);
    }
}

fn qualified(name: &XName, namespace_map: &NamespaceMap, is_attribute: bool) -> String {
    let Some(ns) = &name.namespace else {
        return name.local_name.clone();
    };
    let prefix = match namespace_map.get(ns.as_str()) {
        // Attributes never take the default namespace.
        Some(p) if !(is_attribute && p.is_empty()) => p.as_str(),
        _ => well_known_prefix(ns),
    };
    if prefix.is_empty() {
        name.local_name.clone()
    } else {
        format!("{}:{}", prefix, name.local_name)
    }
}

fn write_node<W: Write>(
    doc: &XmlDocument,
    node_id: indextree::NodeId,
    writer: &mut Writer<W>,
    namespace_map: &NamespaceMap,
) -> Result<()> {
    let Some(node_data) = doc.get(node_id) else {
        return Ok(());
    };

    match node_data {
        XmlNodeData::Element { name, attributes } => {
            write_element(doc, node_id, name, attributes, writer, namespace_map)?;
        }
        XmlNodeData::Text(text) => {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_err)?;
        }
        XmlNodeData::CData(text) => {
            writer
                .write_event(Event::CData(BytesCData::new(text)))
                .map_err(write_err)?;
        }
        XmlNodeData::Comment(text) => {
            writer
                .write_event(Event::Comment(BytesText::new(text)))
                .map_err(write_err)?;
        }
        XmlNodeData::ProcessingInstruction { target, data } => {
            let content = if data.is_empty() {
                target.clone()
            } else {
                format!("{} {}", target, data)
            };
            writer
                .write_event(Event::PI(BytesPI::new(&content)))
                .map_err(write_err)?;
        }
    }

    Ok(())
}

fn write_element<W: Write>(
    doc: &XmlDocument,
    node_id: indextree::NodeId,
    name: &XName,
    attributes: &[XAttribute],
    writer: &mut Writer<W>,
    namespace_map: &NamespaceMap,
) -> Result<()> {
    let mut scoped_map = namespace_map.clone();
    extend_namespace_map(&mut scoped_map, attributes);

    let tag_name = qualified(name, &scoped_map, false);
    let mut elem = BytesStart::new(tag_name.as_str());

    for attr in attributes {
        let attr_name = if is_xmlns_attr(attr) {
            if attr.name.namespace.is_none() {
                "xmlns".to_string()
            } else {
                format!("xmlns:{}", attr.name.local_name)
            }
        } else {
            qualified(&attr.name, &scoped_map, true)
        };
        elem.push_attribute((attr_name.as_str(), attr.value.as_str()));
    }

    let mut children = doc.children(node_id).peekable();

    if children.peek().is_none() {
        writer.write_event(Event::Empty(elem)).map_err(write_err)?;
        return Ok(());
    }

    writer.write_event(Event::Start(elem)).map_err(write_err)?;
    for child_id in children {
        write_node(doc, child_id, writer, &scoped_map)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(tag_name.as_str())))
        .map_err(write_err)?;

    Ok(())
}

/// Conventional prefixes for namespaces an edit may introduce without a declaration in scope.
fn well_known_prefix(namespace: &str) -> &'static str {
    use super::namespaces::*;
    match namespace {
        P::NS => "p",
        A::NS => "a",
        R::NS => "r",
        C::NS => "c",
        PIC::NS => "pic",
        MC::NS => "mc",
        P14::NS => "p14",
        A14::NS => "a14",
        DGM::NS => "dgm",
        CP::NS => "cp",
        DC::NS => "dc",
        DCTERMS::NS => "dcterms",
        VT::NS => "vt",
        XMLNS => "xmlns",
        XML => "xml",
        _ => "ns",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::namespaces::{A, P};
    use crate::xml::parser;

    #[test]
    fn serialize_simple_document() {
        let mut doc = XmlDocument::new();
        let root = doc.add_root(XmlNodeData::element(XName::local("root")));
        doc.add_child(root, XmlNodeData::text("content"));

        let xml = serialize(&doc).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(xml.contains("<root>content</root>"));
    }

    #[test]
    fn serialize_empty_element() {
        let mut doc = XmlDocument::new();
        doc.add_root(XmlNodeData::element(XName::local("empty")));

        let xml = serialize(&doc).unwrap();
        assert!(xml.contains("<empty/>"));
    }

    #[test]
    fn reparse_keeps_declared_prefixes() {
        let source = r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><a:t>Q3 &amp; Q4</a:t></p:cSld></p:sld>"#;
        let doc = parser::parse(source).unwrap();
        let xml = serialize(&doc).unwrap();

        assert!(xml.contains("<p:cSld><a:t>Q3 &amp; Q4</a:t></p:cSld>"));
        let again = parser::parse(&xml).unwrap();
        let root = again.root().unwrap();
        assert!(again.is(root, &P::sld()));
        let t = again.descendants_by_name(root, &A::t()).next().unwrap();
        assert_eq!(again.text_content(t), "Q3 & Q4");
    }

    #[test]
    fn undeclared_namespace_uses_conventional_prefix() {
        let mut doc = XmlDocument::new();
        let root = doc.add_root(XmlNodeData::element(A::rPr()));
        doc.set_attribute(root, &XName::local("sz"), "2400");

        let xml = serialize(&doc).unwrap();
        assert!(xml.contains(r#"<a:rPr sz="2400"/>"#));
    }
}
