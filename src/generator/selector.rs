//! Layout selection by slide type.

use crate::model::{LayoutCategory, LayoutDescriptor, SlideType, TemplateProfile};

/// Layout categories tried for a slide type, most preferred first.
pub fn preferences(slide_type: SlideType) -> [LayoutCategory; 2] {
    use LayoutCategory::*;
    match slide_type {
        SlideType::Title => [Title, Basic],
        SlideType::Content => [Content, Basic],
        SlideType::Section => [Title, Content],
        SlideType::Conclusion => [Content, Basic],
        SlideType::Other => [Basic, Content],
    }
}

/// The layout to use for a slide type.
///
/// For each preferred category in turn, the first layout of that category
/// in template order wins. Without a match the first layout is used; `None`
/// only when the profile has no layouts.
pub fn select(profile: &TemplateProfile, slide_type: SlideType) -> Option<&LayoutDescriptor> {
    select_from(&profile.layouts, slide_type)
}

pub fn select_from(
    layouts: &[LayoutDescriptor],
    slide_type: SlideType,
) -> Option<&LayoutDescriptor> {
    preferences(slide_type)
        .iter()
        .find_map(|category| layouts.iter().find(|l| l.category == *category))
        .or_else(|| layouts.first())
}
