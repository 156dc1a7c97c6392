//! Error types for the slidecraft library.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Result type alias for slidecraft operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an analysis or generation call.
///
/// Cosmetic problems met while styling a slide are not errors; they are
/// reported as [`SoftFailure`] values instead.
#[derive(Error, Debug)]
pub enum Error {
    /// The template container cannot be opened or is not a presentation.
    #[error("Template unreadable: {0}")]
    TemplateUnreadable(String),

    /// There is no layout to place a slide on.
    #[error("No usable layout in template")]
    NoUsableLayout,

    /// Writing the generated container failed.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Invalid or malformed data in the document.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required package part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(String),
}

impl Error {
    /// Re-label a low-level failure as an unreadable template.
    ///
    /// Structural errors keep their own variant.
    pub(crate) fn into_unreadable(self) -> Self {
        match self {
            Error::TemplateUnreadable(_)
            | Error::NoUsableLayout
            | Error::SerializationFailed(_) => self,
            other => Error::TemplateUnreadable(other.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::DeError> for Error {
    fn from(err: quick_xml::DeError) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

/// The cosmetic aspect of a slide that could not be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylingAspect {
    Title,
    Subtitle,
    Body,
    Font,
    Color,
    Image,
    Notes,
}

/// A styling step that was skipped without aborting generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftFailure {
    /// Zero-based index of the slide being built, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slide_index: Option<usize>,
    /// What was left out.
    pub aspect: StylingAspect,
    /// Human-readable reason.
    pub detail: String,
}

impl SoftFailure {
    /// Create a soft failure for a slide.
    pub fn new(
        slide_index: Option<usize>,
        aspect: StylingAspect,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            slide_index,
            aspect,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for SoftFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.slide_index {
            Some(idx) => write!(f, "slide {}: {:?}: {}", idx + 1, self.aspect, self.detail),
            None => write!(f, "{:?}: {}", self.aspect, self.detail),
        }
    }
}

/// Soft failures collected during one call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<SoftFailure>,
}

impl Diagnostics {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a soft failure and log it.
    pub fn record(&mut self, failure: SoftFailure) {
        tracing::warn!(%failure, "styling degraded");
        self.entries.push(failure);
    }

    /// Record a soft failure built from its parts.
    pub fn degrade(
        &mut self,
        slide_index: Option<usize>,
        aspect: StylingAspect,
        detail: impl Into<String>,
    ) {
        self.record(SoftFailure::new(slide_index, aspect, detail));
    }

    /// Append all entries from another list.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// All recorded entries in order.
    pub fn entries(&self) -> &[SoftFailure] {
        &self.entries
    }

    /// Entries for one aspect.
    pub fn for_aspect(&self, aspect: StylingAspect) -> impl Iterator<Item = &SoftFailure> {
        self.entries.iter().filter(move |f| f.aspect == aspect)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NoUsableLayout;
        assert_eq!(err.to_string(), "No usable layout in template");

        let err = Error::TemplateUnreadable("not a zip".to_string());
        assert_eq!(err.to_string(), "Template unreadable: not a zip");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_into_unreadable_keeps_structural_variants() {
        assert!(matches!(
            Error::NoUsableLayout.into_unreadable(),
            Error::NoUsableLayout
        ));
        assert!(matches!(
            Error::XmlParse("bad".into()).into_unreadable(),
            Error::TemplateUnreadable(_)
        ));
    }

    #[test]
    fn test_diagnostics_filtering() {
        let mut diag = Diagnostics::new();
        diag.degrade(Some(0), StylingAspect::Title, "no title placeholder");
        diag.degrade(Some(1), StylingAspect::Image, "unknown image format");
        diag.degrade(None, StylingAspect::Color, "scheme color");

        assert_eq!(diag.len(), 3);
        assert_eq!(diag.for_aspect(StylingAspect::Image).count(), 1);
        assert_eq!(
            diag.entries()[0].to_string(),
            "slide 1: Title: no title placeholder"
        );
    }
}
