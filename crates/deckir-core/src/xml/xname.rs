use std::fmt;

/// Namespace-qualified XML name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct XName {
    pub namespace: Option<String>,
    pub local_name: String,
}

impl XName {
    pub fn new(namespace: &str, local_name: &str) -> Self {
        Self {
            namespace: if namespace.is_empty() {
                None
            } else {
                Some(namespace.to_string())
            },
            local_name: local_name.to_string(),
        }
    }

    pub fn local(local_name: &str) -> Self {
        Self {
            namespace: None,
            local_name: local_name.to_string(),
        }
    }

    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.namespace.as_deref() == Some(namespace)
    }

    pub fn matches(&self, namespace: &str, local_name: &str) -> bool {
        self.in_namespace(namespace) && self.local_name == local_name
    }

    /// True when the name is in `namespace` and its local part is one of `locals`.
    pub fn is_one_of(&self, namespace: &str, locals: &[&str]) -> bool {
        self.in_namespace(namespace) && locals.contains(&self.local_name.as_str())
    }
}

impl fmt::Display for XName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XAttribute {
    pub name: XName,
    pub value: String,
}

impl XAttribute {
    pub fn new(name: XName, value: &str) -> Self {
        Self {
            name,
            value: value.to_string(),
        }
    }

    pub fn local(local_name: &str, value: &str) -> Self {
        Self::new(XName::local(local_name), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xname_with_namespace_displays_correctly() {
        let name = XName::new("http://example.com", "element");
        assert_eq!(name.to_string(), "{http://example.com}element");
        assert!(name.matches("http://example.com", "element"));
    }

    #[test]
    fn empty_namespace_is_local() {
        assert_eq!(XName::new("", "id"), XName::local("id"));
        assert!(!XName::local("id").in_namespace(""));
    }

    #[test]
    fn membership_checks_namespace_first() {
        let ns = "http://schemas.openxmlformats.org/drawingml/2006/main";
        let fill = XName::new(ns, "gradFill");
        assert!(fill.is_one_of(ns, &["solidFill", "gradFill"]));
        assert!(!fill.is_one_of("http://example.com", &["gradFill"]));
        assert!(!XName::local("gradFill").is_one_of(ns, &["gradFill"]));
    }
}
