//! Container kind detection for presentation packages.

use crate::container::Package;
use crate::error::{Error, Result};

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Main part content type of a regular presentation.
pub const PRESENTATION_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";

/// Main part content type of a presentation template.
pub const TEMPLATE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";

/// Main part content type of a slide show.
pub const SLIDESHOW_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideshow.main+xml";

/// Macro-enabled presentation.
const MACRO_PRESENTATION_CONTENT_TYPE: &str =
    "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml";

/// Macro-enabled template.
const MACRO_TEMPLATE_CONTENT_TYPE: &str =
    "application/vnd.ms-powerpoint.template.macroEnabled.main+xml";

/// Kind of presentation package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// Regular presentation (.pptx, .pptm)
    Presentation,
    /// Presentation template (.potx, .potm)
    Template,
    /// Slide show (.ppsx)
    Slideshow,
}

impl ContainerKind {
    /// Returns the file extension for this kind.
    pub fn extension(&self) -> &'static str {
        match self {
            ContainerKind::Presentation => "pptx",
            ContainerKind::Template => "potx",
            ContainerKind::Slideshow => "ppsx",
        }
    }

    /// Returns a human-readable name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            ContainerKind::Presentation => "PowerPoint Presentation",
            ContainerKind::Template => "PowerPoint Template",
            ContainerKind::Slideshow => "PowerPoint Slide Show",
        }
    }

    fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            PRESENTATION_CONTENT_TYPE | MACRO_PRESENTATION_CONTENT_TYPE => {
                Some(ContainerKind::Presentation)
            }
            TEMPLATE_CONTENT_TYPE | MACRO_TEMPLATE_CONTENT_TYPE => Some(ContainerKind::Template),
            SLIDESHOW_CONTENT_TYPE => Some(ContainerKind::Slideshow),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}

/// Locate the main presentation part through the package relationships.
///
/// Falls back to `ppt/presentation.xml` when the package relationships are
/// missing or do not name an office document.
pub fn main_part_path(package: &Package) -> Result<String> {
    let rels = package.read_package_relationships()?;
    let from_rels = rels
        .of_kind(crate::container::rel_types::OFFICE_DOCUMENT)
        .map(|r| Package::resolve_path("", &r.target))
        .find(|p| package.exists(p));

    match from_rels {
        Some(path) => Ok(path),
        None if package.exists("ppt/presentation.xml") => Ok("ppt/presentation.xml".to_string()),
        None => Err(Error::MissingComponent("ppt/presentation.xml".to_string())),
    }
}

/// Determine the presentation kind of an opened package.
///
/// Word and Excel packages, and packages without a presentation part, are
/// rejected with [`Error::TemplateUnreadable`].
pub fn detect_kind(package: &Package) -> Result<ContainerKind> {
    let main = main_part_path(package).map_err(Error::into_unreadable)?;
    let types = package.content_types().map_err(Error::into_unreadable)?;

    match types.content_type_for(&main) {
        Some(ct) => ContainerKind::from_content_type(ct).ok_or_else(|| {
            Error::TemplateUnreadable(format!("not a presentation package ({})", ct))
        }),
        // No declared type but the presentation part is where it should be
        None => Ok(ContainerKind::Presentation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{rel_types, ContentTypes, Relationships};

    fn package_with_main_type(content_type: &str) -> Package {
        let mut pkg = Package::new();
        let mut rels = Relationships::new();
        rels.add_internal(rel_types::OFFICE_DOCUMENT, "ppt/presentation.xml");
        pkg.write_relationships("", &rels);
        pkg.put_xml("ppt/presentation.xml", "<p:presentation/>".to_string());
        let mut types = ContentTypes::default();
        types.set_override("/ppt/presentation.xml", content_type);
        pkg.set_content_types(&types);
        pkg
    }

    #[test]
    fn test_container_kind_display() {
        assert_eq!(ContainerKind::Presentation.to_string(), "PowerPoint Presentation");
        assert_eq!(ContainerKind::Template.extension(), "potx");
    }

    #[test]
    fn test_is_zip_file() {
        assert!(is_zip_file(&[0x50, 0x4B, 0x03, 0x04, 0x00]));
        assert!(!is_zip_file(&[0x00, 0x00, 0x00, 0x00]));
        assert!(!is_zip_file(&[0x50, 0x4B]));
    }

    #[test]
    fn test_detect_template_and_presentation() {
        let pkg = package_with_main_type(TEMPLATE_CONTENT_TYPE);
        assert_eq!(detect_kind(&pkg).unwrap(), ContainerKind::Template);

        let pkg = package_with_main_type(PRESENTATION_CONTENT_TYPE);
        assert_eq!(detect_kind(&pkg).unwrap(), ContainerKind::Presentation);
    }

    #[test]
    fn test_detect_rejects_word_document() {
        let pkg = package_with_main_type(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
        );
        assert!(matches!(detect_kind(&pkg), Err(Error::TemplateUnreadable(_))));
    }

    #[test]
    fn test_detect_rejects_missing_presentation_part() {
        let pkg = Package::new();
        assert!(matches!(detect_kind(&pkg), Err(Error::TemplateUnreadable(_))));
    }
}
