//! Slide previews computed without building a deck.

use super::selector;
use crate::model::{ElementEstimate, SlideContent, SlidePreview, TemplateProfile};

/// Content items shown in a preview.
const PREVIEW_ITEMS: usize = 3;

fn layout_suggestion(record: &SlideContent) -> &'static str {
    if record.slide_type.is_title_like() {
        return "Title Slide";
    }
    match record.content.len() {
        n if n > 5 => "Content Heavy",
        n if n <= 2 => "Minimal Content",
        _ => "Standard Content",
    }
}

fn estimate(record: &SlideContent, profile: &TemplateProfile) -> ElementEstimate {
    let gets_image = !record.slide_type.is_title_like() && !profile.images.is_empty();
    ElementEstimate {
        text_blocks: record.content.len(),
        has_title: !record.title.is_empty(),
        has_notes: !record.notes.is_empty(),
        estimated_images: usize::from(gets_image),
    }
}

/// One preview per record, in record order.
pub fn preview(records: &[SlideContent], profile: &TemplateProfile) -> Vec<SlidePreview> {
    records
        .iter()
        .map(|record| SlidePreview {
            slide_number: record.slide_number,
            title: record.title.clone(),
            content_preview: record.content.iter().take(PREVIEW_ITEMS).cloned().collect(),
            slide_type: record.slide_type,
            has_notes: !record.notes.is_empty(),
            estimated_elements: estimate(record, profile),
            layout_suggestion: layout_suggestion(record).to_string(),
            layout_name: selector::select(profile, record.slide_type).map(|l| l.name.clone()),
        })
        .collect()
}
