use super::xname::{XAttribute, XName};

/// Content of one arena node. Comments, CDATA and processing instructions are
/// kept so that a rewritten part differs from the source only where it was edited.
#[derive(Clone, Debug)]
pub enum XmlNodeData {
    Element {
        name: XName,
        attributes: Vec<XAttribute>,
    },
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

impl XmlNodeData {
    pub fn element(name: XName) -> Self {
        Self::Element {
            name,
            attributes: Vec::new(),
        }
    }

    pub fn text(content: &str) -> Self {
        Self::Text(content.to_string())
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element { .. })
    }

    pub fn name(&self) -> Option<&XName> {
        match self {
            Self::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Changes an element's name, keeping its attributes. No-op on other nodes.
    pub fn rename(&mut self, new_name: XName) {
        if let Self::Element { name, .. } = self {
            *name = new_name;
        }
    }

    pub fn attributes(&self) -> Option<&[XAttribute]> {
        match self {
            Self::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    pub fn attributes_mut(&mut self) -> Option<&mut Vec<XAttribute>> {
        match self {
            Self::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Value of the attribute `name`.
    pub fn attr(&self, name: &XName) -> Option<&str> {
        self.attributes()?
            .iter()
            .find(|a| &a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Overwrites `name` in place, or appends it after the existing attributes.
    /// No-op on non-element nodes.
    pub fn set_attr(&mut self, name: &XName, value: &str) {
        let Some(attrs) = self.attributes_mut() else {
            return;
        };
        match attrs.iter_mut().find(|a| &a.name == name) {
            Some(attr) => attr.value = value.to_string(),
            None => attrs.push(XAttribute::new(name.clone(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &XName) {
        if let Some(attrs) = self.attributes_mut() {
            attrs.retain(|a| &a.name != name);
        }
    }

    pub fn text_content(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::CData(s) => Some(s),
            _ => None,
        }
    }
}
