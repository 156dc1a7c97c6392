//! Property tests for selection, truncation and slide counts.

use proptest::prelude::*;
use slidecraft::generator::selector::select_from;
use slidecraft::model::{ContentLimits, LayoutCategory, LayoutDescriptor};
use slidecraft::{analyze_bytes, generate, GenerationOptions, SlideContent, SlideType};

fn category() -> impl Strategy<Value = LayoutCategory> {
    prop_oneof![
        Just(LayoutCategory::Title),
        Just(LayoutCategory::Content),
        Just(LayoutCategory::Image),
        Just(LayoutCategory::Complex),
        Just(LayoutCategory::Basic),
    ]
}

fn slide_type() -> impl Strategy<Value = SlideType> {
    prop_oneof![
        Just(SlideType::Title),
        Just(SlideType::Content),
        Just(SlideType::Section),
        Just(SlideType::Conclusion),
        Just(SlideType::Other),
    ]
}

fn layouts(categories: Vec<LayoutCategory>) -> Vec<LayoutDescriptor> {
    categories
        .into_iter()
        .enumerate()
        .map(|(index, category)| LayoutDescriptor {
            index,
            name: format!("Layout {}", index + 1),
            placeholders: Vec::new(),
            category,
            part_name: String::new(),
            master_index: 0,
        })
        .collect()
}

proptest! {
    #[test]
    fn selection_is_deterministic(
        categories in prop::collection::vec(category(), 0..12),
        slide_type in slide_type(),
    ) {
        let layouts = layouts(categories);
        let first = select_from(&layouts, slide_type).map(|l| l.index);
        let second = select_from(&layouts, slide_type).map(|l| l.index);
        prop_assert_eq!(first, second);
        prop_assert_eq!(first.is_none(), layouts.is_empty());
    }

    #[test]
    fn selection_prefers_earliest_match(
        categories in prop::collection::vec(category(), 1..12),
        slide_type in slide_type(),
    ) {
        let layouts = layouts(categories);
        let chosen = select_from(&layouts, slide_type).unwrap();
        // nothing earlier has the chosen category
        prop_assert!(layouts[..chosen.index].iter().all(|l| l.category != chosen.category));
    }

    #[test]
    fn normalization_respects_limits(
        title in "\\PC{0,160}",
        items in prop::collection::vec("\\PC{0,260}", 0..16),
    ) {
        let record = SlideContent::new(SlideType::Content, title).with_content(items.clone());
        let limits = GenerationOptions::default().limits();
        let normalized = record.normalized(&limits);

        prop_assert!(normalized.title.chars().count() <= limits.title_max_chars);
        prop_assert_eq!(normalized.content.len(), items.len().min(limits.max_items));
        prop_assert!(normalized
            .content
            .iter()
            .all(|item| item.chars().count() <= limits.item_max_chars));
    }

    #[test]
    fn ascii_titles_keep_their_prefix(title in "[a-zA-Z0-9 ]{0,150}") {
        let limits = ContentLimits { title_max_chars: 100, max_items: 8, item_max_chars: 200 };
        let normalized = SlideContent::new(SlideType::Title, title.clone()).normalized(&limits);
        prop_assert!(title.starts_with(&normalized.title));
        prop_assert_eq!(normalized.title.len(), title.len().min(100));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn deck_has_one_slide_per_record(types in prop::collection::vec(slide_type(), 0..8)) {
        let blank = slidecraft::pptx::defaults::blank_package().to_bytes().unwrap();
        let profile = analyze_bytes(&blank).unwrap();
        let records: Vec<SlideContent> = types
            .iter()
            .enumerate()
            .map(|(i, t)| SlideContent::new(*t, format!("Slide {}", i + 1)).with_content(["point"]))
            .collect();

        let generated = generate(None, &records, &profile, &GenerationOptions::default()).unwrap();
        prop_assert_eq!(generated.slide_count, records.len());

        let structure = slidecraft::TemplateAnalyzer::from_bytes(generated.bytes)
            .unwrap()
            .slide_structure()
            .unwrap();
        prop_assert_eq!(structure.slide_count, records.len());
    }
}
