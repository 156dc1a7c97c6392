//! # slidecraft
//!
//! PowerPoint template analysis and template-styled deck generation.
//!
//! The library reads a `.pptx` or `.potx` template, derives a
//! [`TemplateProfile`] (layouts, theme, palette, fonts, reusable images) and
//! generates new decks from a list of [`SlideContent`] records in that
//! template's style.
//!
//! ## Quick Start
//!
//! ```no_run
//! use slidecraft::{generate, GenerationOptions, SlideContent, SlideType};
//!
//! let template = std::fs::read("brand.potx")?;
//! let profile = slidecraft::analyze_bytes(&template)?;
//! println!("{} layouts, palette {:?}", profile.layouts.len(), profile.colors);
//!
//! let records = vec![
//!     SlideContent::new(SlideType::Title, "Quarterly Review").with_content(["Finance team"]),
//!     SlideContent::new(SlideType::Content, "Highlights")
//!         .with_content(["Revenue up 12%", "Churn down"])
//!         .with_notes("Pause for questions"),
//! ];
//! let generated = generate(Some(template.as_slice()), &records, &profile, &GenerationOptions::default())?;
//! generated.save("review.pptx")?;
//! # Ok::<(), slidecraft::Error>(())
//! ```
//!
//! ## Lower-level APIs
//!
//! ```no_run
//! use slidecraft::analyzer::TemplateAnalyzer;
//!
//! let analyzer = TemplateAnalyzer::open("brand.potx")?;
//! let structure = analyzer.slide_structure()?;
//! println!("template ships {} example slides", structure.slide_count);
//! # Ok::<(), slidecraft::Error>(())
//! ```
//!
//! Cosmetic problems met while styling slides never abort generation; they
//! are returned as [`Diagnostics`] alongside the output.

pub mod analyzer;
pub mod container;
pub mod detect;
pub mod error;
pub mod generator;
pub mod model;
pub mod pptx;
pub mod render;

// Re-exports
pub use analyzer::{analyze_bytes, analyze_file, validate_bytes, validate_file, TemplateAnalyzer};
pub use container::{Package, Relationship, Relationships};
pub use detect::ContainerKind;
pub use error::{Diagnostics, Error, Result, SoftFailure, StylingAspect};
pub use generator::{
    assemble, output_path_for, preview, select, GeneratedPresentation, GenerationOptions,
};
pub use model::{
    parse_slide_records, LayoutCategory, LayoutDescriptor, SlideContent, SlidePreview, SlideType,
    TemplateProfile, ValidationReport,
};

use std::path::Path;

/// Generate a deck from `records`, styled by `profile`.
///
/// `template` is the template the profile was derived from; without one the
/// built-in blank deck is used.
///
/// # Example
///
/// ```no_run
/// use slidecraft::{generate, GenerationOptions, SlideContent, SlideType};
///
/// let template = std::fs::read("brand.pptx")?;
/// let profile = slidecraft::analyze_bytes(&template)?;
/// let records = [SlideContent::new(SlideType::Content, "Agenda")];
/// let bytes = generate(Some(template.as_slice()), &records, &profile, &GenerationOptions::default())?
///     .into_bytes();
/// # Ok::<(), slidecraft::Error>(())
/// ```
pub fn generate(
    template: Option<&[u8]>,
    records: &[SlideContent],
    profile: &TemplateProfile,
    options: &GenerationOptions,
) -> Result<GeneratedPresentation> {
    assemble(template, records, profile, options)
}

/// Analyze a template file and generate a deck saved beside it as
/// `<stem>_generated.pptx`.
///
/// # Example
///
/// ```no_run
/// use slidecraft::{generate_file, parse_slide_records, GenerationOptions};
///
/// let records = parse_slide_records(&std::fs::read_to_string("slides.json")?)?;
/// let generated = generate_file("brand.pptx", &records, &GenerationOptions::default())?;
/// for skipped in generated.diagnostics.entries() {
///     eprintln!("{}", skipped);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn generate_file(
    template: impl AsRef<Path>,
    records: &[SlideContent],
    options: &GenerationOptions,
) -> Result<GeneratedPresentation> {
    generator::generate_file(template, records, options)
}

/// Kind of presentation container in `data`.
pub fn detect_kind_from_bytes(data: &[u8]) -> Result<ContainerKind> {
    let package = Package::from_bytes(data.to_vec()).map_err(Error::into_unreadable)?;
    detect::detect_kind(&package)
}
