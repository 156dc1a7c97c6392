//! Fills one slide's placeholders from a slide record.

use super::options::GenerationOptions;
use crate::error::{Diagnostics, StylingAspect};
use crate::model::{
    inches_to_emu, PlaceholderKind, Rect, SlideContent, SlideSize, TemplateProfile,
};
use crate::pptx::shapes::normalize_hex;
use crate::pptx::{ImagePlacement, LayoutEntry, SlideDraft, SlideImage, TextFill, TextStyle};

/// Title run size in hundredths of a point.
pub const TITLE_SIZE: u32 = 3200;

/// Body run size in hundredths of a point.
pub const BODY_SIZE: u32 = 1800;

const WHITE: &str = "#FFFFFF";

/// Frame of a picture added without a picture placeholder: top right,
/// at most 3in x 2in and 30% of the canvas each way.
pub fn floating_image_frame(size: &SlideSize) -> Rect {
    let width = inches_to_emu(3.0).min(size.width * 3 / 10);
    let height = inches_to_emu(2.0).min(size.height * 3 / 10);
    Rect::new(
        size.width - width - inches_to_emu(0.5),
        inches_to_emu(1.0),
        width,
        height,
    )
}

fn position_of(layout: &LayoutEntry, kind: PlaceholderKind) -> Option<usize> {
    layout
        .placeholders
        .iter()
        .position(|p| p.kind == kind && !p.is_decoration())
}

/// Builds the text styles of one slide and records what could not be applied.
struct Styler<'a> {
    profile: &'a TemplateProfile,
    slide_index: usize,
}

impl Styler<'_> {
    fn font(&self, face: &str, diagnostics: &mut Diagnostics) -> Option<String> {
        if face.trim().is_empty() {
            diagnostics.degrade(Some(self.slide_index), StylingAspect::Font, "empty typeface");
            return None;
        }
        Some(face.to_string())
    }

    fn color(&self, value: Option<&str>, diagnostics: &mut Diagnostics) -> Option<String> {
        let value = value?;
        match normalize_hex(value) {
            Some(hex) => Some(hex.trim_start_matches('#').to_string()),
            None => {
                diagnostics.degrade(
                    Some(self.slide_index),
                    StylingAspect::Color,
                    format!("malformed color '{}'", value),
                );
                None
            }
        }
    }

    /// Bold title runs in the primary color, unless that color is white.
    fn title(&self, diagnostics: &mut Diagnostics) -> TextStyle {
        let primary = self
            .profile
            .primary_color()
            .filter(|c| !c.trim().eq_ignore_ascii_case(WHITE));
        TextStyle {
            font: self.font(&self.profile.fonts.title_font, diagnostics),
            size: Some(TITLE_SIZE),
            bold: true,
            color: self.color(primary, diagnostics),
        }
    }

    fn body(&self, diagnostics: &mut Diagnostics) -> TextStyle {
        TextStyle {
            font: self.font(&self.profile.fonts.body_font, diagnostics),
            size: Some(BODY_SIZE),
            bold: false,
            color: self.color(self.profile.secondary_color(), diagnostics),
        }
    }
}

/// Plan the slide for one record on `layout`.
///
/// The record is normalized to the option limits first. Nothing here fails:
/// a missing placeholder or an unusable color or font is recorded in
/// `diagnostics` and that part of the slide is left out.
pub fn populate<'p>(
    layout: &LayoutEntry,
    record: &SlideContent,
    profile: &'p TemplateProfile,
    options: &GenerationOptions,
    slide_index: usize,
    diagnostics: &mut Diagnostics,
) -> SlideDraft<'p> {
    let record = record.normalized(&options.limits());
    let styler = Styler {
        profile,
        slide_index,
    };
    let mut draft = SlideDraft {
        layout: layout.index,
        ..SlideDraft::default()
    };

    match position_of(layout, PlaceholderKind::Title) {
        Some(placeholder) => draft.fills.push(TextFill {
            placeholder,
            paragraphs: vec![record.title.clone()],
            style: styler.title(diagnostics),
        }),
        None => diagnostics.degrade(
            Some(slide_index),
            StylingAspect::Title,
            format!("layout '{}' has no title placeholder", layout.name),
        ),
    }

    if record.slide_type.is_title_like() {
        if let Some(subtitle) = record.content.first() {
            match position_of(layout, PlaceholderKind::Subtitle) {
                Some(placeholder) => draft.fills.push(TextFill {
                    placeholder,
                    paragraphs: vec![subtitle.clone()],
                    style: styler.body(diagnostics),
                }),
                None => diagnostics.degrade(
                    Some(slide_index),
                    StylingAspect::Subtitle,
                    format!("layout '{}' has no subtitle placeholder", layout.name),
                ),
            }
        }
    } else {
        if !record.content.is_empty() {
            match position_of(layout, PlaceholderKind::Body) {
                Some(placeholder) => draft.fills.push(TextFill {
                    placeholder,
                    paragraphs: record.content.clone(),
                    style: styler.body(diagnostics),
                }),
                None => diagnostics.degrade(
                    Some(slide_index),
                    StylingAspect::Body,
                    format!("layout '{}' has no body placeholder", layout.name),
                ),
            }
        }

        if options.include_images {
            draft.image = profile.images.first().map(|image| {
                let placement = match position_of(layout, PlaceholderKind::Picture) {
                    Some(pos) => ImagePlacement::Placeholder(pos),
                    None => ImagePlacement::Floating(floating_image_frame(&profile.slide_size)),
                };
                tracing::debug!(slide = slide_index, ?placement, "placing template image");
                SlideImage {
                    data: &image.data,
                    content_type: &image.content_type,
                    placement,
                }
            });
        }
    }

    if options.include_notes && !record.notes.is_empty() {
        draft.notes = Some(record.notes);
    }

    draft
}
