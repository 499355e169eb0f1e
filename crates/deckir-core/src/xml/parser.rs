use super::arena::XmlDocument;
use super::node::XmlNodeData;
use super::xname::{XAttribute, XName};
use super::namespaces::XMLNS;
use crate::error::{DeckError, Result};

pub fn parse(xml: &str) -> Result<XmlDocument> {
    parse_bytes(xml.as_bytes())
}

pub fn parse_bytes(bytes: &[u8]) -> Result<XmlDocument> {
    let text = std::str::from_utf8(bytes).map_err(|e| DeckError::XmlParse {
        message: e.to_string(),
        location: "input".to_string(),
    })?;
    // Parts written by some producers start with a UTF-8 byte order mark.
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let doc = roxmltree::Document::parse_with_options(
        text,
        roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        },
    )
    .map_err(|e| DeckError::XmlParse {
        message: e.to_string(),
        location: format!("line {}", e.pos().row),
    })?;

    let mut xml_doc = XmlDocument::new();
    build_tree(doc.root_element(), &mut xml_doc);
    Ok(xml_doc)
}

fn build_tree(root: roxmltree::Node, doc: &mut XmlDocument) {
    let mut stack: Vec<(roxmltree::Node, Option<indextree::NodeId>)> = vec![(root, None)];

    while let Some((node, parent)) = stack.pop() {
        let Some(node_data) = node_data(node) else {
            continue;
        };

        let new_id = match parent {
            Some(parent_id) => doc.add_child(parent_id, node_data),
            None => doc.add_root(node_data),
        };

        let children: Vec<_> = node.children().collect();
        for child in children.into_iter().rev() {
            stack.push((child, Some(new_id)));
        }
    }
}

fn node_data(node: roxmltree::Node) -> Option<XmlNodeData> {
    match node.node_type() {
        roxmltree::NodeType::Element => {
            let name = XName::new(
                node.tag_name().namespace().unwrap_or(""),
                node.tag_name().name(),
            );

            let mut attributes: Vec<XAttribute> = Vec::new();

            // roxmltree reports every in-scope namespace; keep only the ones
            // this element declares so re-serialization does not repeat them.
            let parent = node.parent_element();
            for ns in node.namespaces() {
                let inherited = parent
                    .map(|p| {
                        p.namespaces()
                            .any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri())
                    })
                    .unwrap_or(false);
                if inherited || ns.name() == Some("xml") {
                    continue;
                }
                match ns.name() {
                    Some(prefix) => {
                        attributes.push(XAttribute::new(XName::new(XMLNS, prefix), ns.uri()))
                    }
                    None => attributes.push(XAttribute::local("xmlns", ns.uri())),
                }
            }

            attributes.extend(node.attributes().map(|attr| {
                XAttribute::new(
                    XName::new(attr.namespace().unwrap_or(""), attr.name()),
                    attr.value(),
                )
            }));

            Some(XmlNodeData::Element { name, attributes })
        }
        roxmltree::NodeType::Text => node.text().map(|t| XmlNodeData::Text(t.to_string())),
        roxmltree::NodeType::Comment => node.text().map(|t| XmlNodeData::Comment(t.to_string())),
        roxmltree::NodeType::PI => node.pi().map(|pi| XmlNodeData::ProcessingInstruction {
            target: pi.target.to_string(),
            data: pi.value.map(|s| s.to_string()).unwrap_or_default(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::namespaces::{A, P};

    #[test]
    fn parse_slide_fragment() {
        let xml = r#"<p:sld xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
                        xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
            <p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>Hello</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld>
        </p:sld>"#;

        let doc = parse(xml).unwrap();
        let root = doc.root().unwrap();
        assert!(doc.is(root, &P::sld()));
        let t = doc.descendants_by_name(root, &A::t()).next().unwrap();
        assert_eq!(doc.text_content(t), "Hello");
    }

    #[test]
    fn namespace_declarations_are_not_repeated_on_children() {
        let xml = r#"<root xmlns:a="urn:a"><a:child/></root>"#;
        let doc = parse(xml).unwrap();
        let root = doc.root().unwrap();
        let child = doc.child_elements(root).next().unwrap();

        assert_eq!(doc.get(root).unwrap().attributes().unwrap().len(), 1);
        assert!(doc.get(child).unwrap().attributes().unwrap().is_empty());
    }

    #[test]
    fn parse_preserves_attribute_order() {
        let doc = parse(r#"<root a="1" b="2" c="3"/>"#).unwrap();
        let attrs = doc.get(doc.root().unwrap()).unwrap().attributes().unwrap();
        let names: Vec<_> = attrs.iter().map(|a| a.name.local_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn malformed_xml_reports_location() {
        let err = parse("<root><unclosed></root>").unwrap_err();
        assert!(matches!(err, DeckError::XmlParse { .. }));
    }
}
