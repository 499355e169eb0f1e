use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Corrupt package part '{part}': {message}")]
    PackageCorrupt { part: String, message: String },

    #[error("Unsupported presentation format: {message}")]
    UnsupportedFormat { message: String },

    #[error("Style resolution failed for '{part}': {message}")]
    StyleResolutionError { part: String, message: String },

    #[error("Diff references unknown shape '{shape}' on slide '{slide}'")]
    UnknownShapeReference { slide: String, shape: String },

    #[error("Invalid edit for shape '{shape}': {message}")]
    InvalidEdit { shape: String, message: String },

    #[error("Shape '{shape}' on slide '{slide}' not found in source package")]
    ShapeLookupMiss { slide: String, shape: String },

    #[error("XML parsing error at {location}: {message}")]
    XmlParse { message: String, location: String },

    #[error("XML serialization error: {0}")]
    XmlWrite(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DeckError {
    pub(crate) fn corrupt(part: &str, message: impl Into<String>) -> Self {
        Self::PackageCorrupt {
            part: part.to_string(),
            message: message.into(),
        }
    }

    /// Whole-document structural failures abort the operation.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ShapeLookupMiss { .. })
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        let err = DeckError::PackageCorrupt {
            part: "ppt/presentation.xml".to_string(),
            message: "missing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Corrupt package part 'ppt/presentation.xml': missing"
        );
    }

    #[test]
    fn unknown_shape_reference_formats_correctly() {
        let err = DeckError::UnknownShapeReference {
            slide: "256".to_string(),
            shape: "42".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Diff references unknown shape '42' on slide '256'"
        );
    }

    #[test]
    fn lookup_miss_is_not_fatal() {
        let miss = DeckError::ShapeLookupMiss {
            slide: "256".to_string(),
            shape: "7".to_string(),
        };
        assert!(!miss.is_fatal());
        assert!(DeckError::XmlWrite("x".into()).is_fatal());
    }
}
