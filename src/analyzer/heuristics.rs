//! Pure classification and harvesting rules over extracted descriptors.
//!
//! Nothing here touches the package; every function takes values that were
//! already read, so the rules can be tested on hand-built trees.

use crate::error::{Diagnostics, StylingAspect};
use crate::model::{
    FontInventory, FontScheme, LayoutCategory, MasterShape, PlaceholderDescriptor,
    PlaceholderKind, DEFAULT_PALETTE, MAX_PALETTE_COLORS,
};
use crate::pptx::{ColorSpec, ShapeTree};

/// Content type reported for bytes with no known signature.
pub const UNKNOWN_IMAGE_TYPE: &str = "image/unknown";

/// Category of a layout from its placeholder set.
///
/// Footer-family placeholders are ignored. Rules, first match wins:
/// title and body → content; a title with nothing besides subtitles → title;
/// a picture placeholder → image; more than three placeholders → complex;
/// otherwise basic.
pub fn classify_layout(placeholders: &[PlaceholderDescriptor]) -> LayoutCategory {
    let kinds: Vec<PlaceholderKind> = placeholders
        .iter()
        .filter(|p| !p.is_decoration())
        .map(|p| p.kind)
        .collect();

    let has = |kind| kinds.contains(&kind);

    if has(PlaceholderKind::Title) && has(PlaceholderKind::Body) {
        LayoutCategory::Content
    } else if has(PlaceholderKind::Title)
        && kinds
            .iter()
            .all(|k| matches!(k, PlaceholderKind::Title | PlaceholderKind::Subtitle))
    {
        LayoutCategory::Title
    } else if has(PlaceholderKind::Picture) {
        LayoutCategory::Image
    } else if kinds.len() > 3 {
        LayoutCategory::Complex
    } else {
        LayoutCategory::Basic
    }
}

/// Sniff an image content type from its leading bytes.
pub fn sniff_content_type(data: &[u8]) -> &'static str {
    if data.starts_with(b"\x89PNG") {
        "image/png"
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if data.starts_with(b"GIF") {
        "image/gif"
    } else if data.starts_with(b"BM") {
        "image/bmp"
    } else {
        UNKNOWN_IMAGE_TYPE
    }
}

/// Explicit colors of shape fills and text runs, in discovery order.
///
/// Groups are walked into. Collection stops at [`MAX_PALETTE_COLORS`]
/// distinct values. A color with no explicit RGB value is skipped and
/// recorded. An empty result is replaced by [`DEFAULT_PALETTE`].
pub fn harvest_palette<'a>(
    slides: impl IntoIterator<Item = &'a ShapeTree>,
    diagnostics: &mut Diagnostics,
) -> Vec<String> {
    let mut colors: Vec<String> = Vec::new();

    'slides: for (slide_index, tree) in slides.into_iter().enumerate() {
        for shape in tree.all_shapes() {
            let specs = shape.fill.iter().chain(
                shape
                    .text
                    .iter()
                    .flat_map(|body| body.runs())
                    .filter_map(|run| run.color.as_ref()),
            );
            for spec in specs {
                match spec.explicit_rgb() {
                    Some(hex) => {
                        if !colors.contains(&hex) {
                            colors.push(hex);
                        }
                        if colors.len() >= MAX_PALETTE_COLORS {
                            break 'slides;
                        }
                    }
                    None => record_color_fault(diagnostics, slide_index, &shape.name, spec),
                }
            }
        }
    }

    if colors.is_empty() {
        return DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect();
    }
    colors
}

fn record_color_fault(
    diagnostics: &mut Diagnostics,
    slide_index: usize,
    shape: &str,
    spec: &ColorSpec,
) {
    diagnostics.degrade(
        Some(slide_index),
        StylingAspect::Color,
        format!("shape '{}': {}", shape, spec.describe()),
    );
}

/// Typefaces of text runs in discovery order.
///
/// The first distinct face becomes the body font and the second the title
/// font; with a single face both use it. Theme references resolve through
/// `scheme`; one that does not resolve is skipped and recorded.
pub fn harvest_fonts<'a>(
    slides: impl IntoIterator<Item = &'a ShapeTree>,
    scheme: &FontScheme,
    diagnostics: &mut Diagnostics,
) -> FontInventory {
    let mut fonts_used: Vec<String> = Vec::new();

    for (slide_index, tree) in slides.into_iter().enumerate() {
        for shape in tree.all_shapes() {
            let Some(body) = &shape.text else { continue };
            for face in body.runs().filter_map(|r| r.font.as_deref()) {
                match scheme.resolve(face) {
                    Some(name) => {
                        if !fonts_used.contains(&name) {
                            fonts_used.push(name);
                        }
                    }
                    None => diagnostics.degrade(
                        Some(slide_index),
                        StylingAspect::Font,
                        format!("shape '{}': theme font '{}' does not resolve", shape.name, face),
                    ),
                }
            }
        }
    }

    let mut inventory = FontInventory::default();
    if let Some(first) = fonts_used.first() {
        inventory.body_font = first.clone();
        inventory.title_font = fonts_used.get(1).unwrap_or(first).clone();
    }
    inventory.fonts_used = fonts_used;
    inventory
}

/// Top-level shapes of a master with a text sample of up to 50 characters.
pub fn master_shapes(tree: &ShapeTree) -> Vec<MasterShape> {
    tree.shapes
        .iter()
        .map(|shape| {
            let text = shape.plain_text();
            let has_text = !text.is_empty();
            MasterShape {
                shape_type: shape.kind,
                geometry: shape.geometry.unwrap_or_default(),
                has_text,
                text_sample: has_text.then(|| text.chars().take(50).collect()),
            }
        })
        .collect()
}
