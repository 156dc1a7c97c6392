//! Reports produced for callers: validation, slide structure, previews.

use super::{ShapeKind, SlideType};
use serde::{Deserialize, Serialize};

/// Counts backing a validation report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub layouts: usize,
    pub slides: usize,
    pub images: usize,
    pub has_master: bool,
}

/// Result of checking a template before committing to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Additive score in 0..=100.
    pub compatibility_score: u8,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ValidationSummary>,
}

/// Kind and text presence of one shape on an example slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeSummary {
    #[serde(rename = "type")]
    pub shape_type: ShapeKind,
    pub has_text: bool,
}

/// One of the template's own slides, summarized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideExample {
    pub slide_number: usize,
    pub layout_name: String,
    pub shapes: Vec<ShapeSummary>,
    /// Text of each text-bearing shape, at most 100 characters each.
    pub text_content: Vec<String>,
}

/// The template's slide count and its first few slides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideStructure {
    pub slide_count: usize,
    pub slide_examples: Vec<SlideExample>,
}

/// Element counts a generated slide is expected to carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementEstimate {
    pub text_blocks: usize,
    pub has_title: bool,
    pub has_notes: bool,
    pub estimated_images: usize,
}

/// Preview of one slide before generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidePreview {
    pub slide_number: u32,
    pub title: String,
    /// First three content items.
    pub content_preview: Vec<String>,
    pub slide_type: SlideType,
    pub has_notes: bool,
    pub estimated_elements: ElementEstimate,
    pub layout_suggestion: String,
    /// Name of the template layout the selector would use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_name: Option<String>,
}
