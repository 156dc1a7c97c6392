//! Template analysis: layouts, theme, palette, fonts and images.
//!
//! # Example
//!
//! ```no_run
//! use slidecraft::analyzer::TemplateAnalyzer;
//!
//! let profile = TemplateAnalyzer::open("corporate.potx")?.analyze()?;
//! for layout in &profile.layouts {
//!     println!("{} -> {}", layout.name, layout.category);
//! }
//! # Ok::<(), slidecraft::Error>(())
//! ```

pub mod heuristics;
mod validate;

pub use heuristics::{classify_layout, harvest_fonts, harvest_palette, sniff_content_type};
pub use validate::{validate_bytes, validate_file};

use crate::container::Package;
use crate::detect::{detect_kind, main_part_path, ContainerKind};
use crate::error::{Diagnostics, Error, Result};
use crate::model::{
    truncate_chars, ImageAsset, LayoutDescriptor, MasterInfo, ShapeKind, ShapeSummary,
    SlideExample, SlideStructure, TemplateProfile, ThemeInfo, ValidationSummary,
};
use crate::pptx::parts::{
    read_layouts, read_master, read_presentation, read_slide, read_theme, LayoutEntry,
    MasterPart, PresentationInfo, SlidePart,
};
use std::path::Path;

/// Example slides included in a structure report.
const MAX_EXAMPLE_SLIDES: usize = 3;

/// Characters kept per text sample in a structure report.
const MAX_SAMPLE_CHARS: usize = 100;

/// Reads a template package and derives its [`TemplateProfile`].
///
/// Opening only checks that the package is a presentation; the parts are
/// read again by each call, so one analyzer can serve several reports.
pub struct TemplateAnalyzer {
    package: Package,
    main_part: String,
    kind: ContainerKind,
}

/// The parts every report starts from.
struct Loaded {
    info: PresentationInfo,
    masters: Vec<MasterPart>,
    layouts: Vec<LayoutEntry>,
    slides: Vec<SlidePart>,
}

impl TemplateAnalyzer {
    /// Open a template file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let package = Package::open(path).map_err(Error::into_unreadable)?;
        Self::from_package(package)
    }

    /// Open a template held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let package = Package::from_bytes(data).map_err(Error::into_unreadable)?;
        Self::from_package(package)
    }

    pub fn from_package(package: Package) -> Result<Self> {
        let kind = detect_kind(&package)?;
        let main_part = main_part_path(&package).map_err(Error::into_unreadable)?;
        Ok(Self {
            package,
            main_part,
            kind,
        })
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    fn load(&self) -> Result<Loaded> {
        let info = read_presentation(&self.package, &self.main_part)?;
        let masters = info
            .masters
            .iter()
            .map(|part| read_master(&self.package, part))
            .collect::<Result<Vec<_>>>()?;
        let layouts = read_layouts(&self.package, &masters)?;
        let slides = info
            .slides
            .iter()
            .map(|s| read_slide(&self.package, &s.part))
            .collect::<Result<Vec<_>>>()?;
        Ok(Loaded {
            info,
            masters,
            layouts,
            slides,
        })
    }

    /// Derive the template profile.
    ///
    /// Fails with [`Error::TemplateUnreadable`] when a structural part cannot
    /// be parsed. Color and font faults are collected in the profile's
    /// diagnostics; an image that cannot be read is skipped.
    pub fn analyze(&self) -> Result<TemplateProfile> {
        let loaded = self.load().map_err(Error::into_unreadable)?;

        let layouts: Vec<LayoutDescriptor> = loaded
            .layouts
            .iter()
            .map(|entry| LayoutDescriptor {
                index: entry.index,
                name: entry.name.clone(),
                category: classify_layout(&entry.placeholders),
                placeholders: entry.placeholders.clone(),
                part_name: entry.part.clone(),
                master_index: entry.master_index,
            })
            .collect();
        if layouts.is_empty() {
            tracing::warn!("template declares no slide layouts");
        }

        let theme = self.theme(&loaded.masters);
        let mut diagnostics = Diagnostics::new();
        let trees = || loaded.slides.iter().map(|s| &s.tree);
        let colors = harvest_palette(trees(), &mut diagnostics);
        let fonts = harvest_fonts(trees(), &theme.font_scheme, &mut diagnostics);
        let images = self.collect_images(&loaded);

        let master_slides = MasterInfo {
            layouts_count: layouts.len(),
            has_master: !loaded.masters.is_empty(),
            master_shapes: loaded
                .masters
                .first()
                .map(|m| heuristics::master_shapes(&m.tree))
                .unwrap_or_default(),
        };

        tracing::info!(
            layouts = layouts.len(),
            colors = colors.len(),
            fonts = fonts.fonts_used.len(),
            images = images.len(),
            skipped = diagnostics.len(),
            "template analysis completed"
        );

        Ok(TemplateProfile {
            layouts,
            theme,
            colors,
            fonts,
            images,
            slide_size: loaded.info.slide_size,
            master_slides,
            diagnostics,
        })
    }

    /// Theme of the first master; a missing or broken theme part yields the
    /// default.
    fn theme(&self, masters: &[MasterPart]) -> ThemeInfo {
        let Some(part) = masters.first().and_then(|m| m.theme.as_deref()) else {
            return ThemeInfo::default();
        };
        match read_theme(&self.package, part) {
            Ok(theme) => theme,
            Err(e) => {
                tracing::warn!(%part, error = %e, "theme unreadable, using default");
                ThemeInfo::default()
            }
        }
    }

    /// Pictures on the template's slides, top-level shapes only.
    fn collect_images(&self, loaded: &Loaded) -> Vec<ImageAsset> {
        let mut images = Vec::new();
        for (slide_index, slide) in loaded.slides.iter().enumerate() {
            for shape in &slide.tree.shapes {
                if shape.kind != ShapeKind::Picture {
                    continue;
                }
                let Some(rel_id) = shape.image_rel.as_deref() else {
                    continue;
                };
                let data = match slide.image_bytes(&self.package, rel_id) {
                    Ok(data) => data,
                    Err(e) => {
                        tracing::warn!(slide = slide_index, error = %e, "skipping image");
                        continue;
                    }
                };

                // A picture placeholder without its own frame sits where the layout puts it
                let geometry = shape.geometry.or_else(|| {
                    let ph = shape.placeholder.as_ref()?;
                    let layout_part = slide.layout.as_deref()?;
                    loaded
                        .layouts
                        .iter()
                        .find(|l| l.part == layout_part)?
                        .placeholders
                        .iter()
                        .find(|p| p.position_index == ph.idx.unwrap_or(0))
                        .map(|p| p.geometry)
                });

                images.push(ImageAsset {
                    slide_index,
                    shape_index: shape.index,
                    geometry: geometry.unwrap_or_default(),
                    content_type: sniff_content_type(data).to_string(),
                    size: data.len(),
                    data: data.to_vec(),
                });
            }
        }
        images
    }

    /// Slide count plus a summary of the first three slides.
    pub fn slide_structure(&self) -> Result<SlideStructure> {
        let loaded = self.load().map_err(Error::into_unreadable)?;

        let slide_examples = loaded
            .slides
            .iter()
            .take(MAX_EXAMPLE_SLIDES)
            .enumerate()
            .map(|(i, slide)| {
                let layout_name = slide
                    .layout
                    .as_deref()
                    .and_then(|part| loaded.layouts.iter().find(|l| l.part == part))
                    .map(|l| l.name.clone())
                    .unwrap_or_default();
                SlideExample {
                    slide_number: i + 1,
                    layout_name,
                    shapes: slide
                        .tree
                        .shapes
                        .iter()
                        .map(|s| ShapeSummary {
                            shape_type: s.kind,
                            has_text: s.has_text(),
                        })
                        .collect(),
                    text_content: slide
                        .tree
                        .shapes
                        .iter()
                        .filter(|s| s.has_text())
                        .map(|s| truncate_chars(&s.plain_text(), MAX_SAMPLE_CHARS))
                        .collect(),
                }
            })
            .collect();

        Ok(SlideStructure {
            slide_count: loaded.slides.len(),
            slide_examples,
        })
    }

    /// Counts behind a validation report.
    pub(crate) fn summary(&self) -> Result<ValidationSummary> {
        let loaded = self.load()?;
        let images = loaded
            .slides
            .iter()
            .flat_map(|s| s.tree.shapes.iter())
            .filter(|s| s.kind == ShapeKind::Picture && s.image_rel.is_some())
            .count();
        Ok(ValidationSummary {
            layouts: loaded.layouts.len(),
            slides: loaded.slides.len(),
            images,
            has_master: !loaded.masters.is_empty(),
        })
    }
}

/// Analyze a template file.
pub fn analyze_file(path: impl AsRef<Path>) -> Result<TemplateProfile> {
    TemplateAnalyzer::open(path)?.analyze()
}

/// Analyze a template held in memory.
pub fn analyze_bytes(data: &[u8]) -> Result<TemplateProfile> {
    TemplateAnalyzer::from_bytes(data.to_vec())?.analyze()
}
