//! Generation options.

use crate::model::{ContentLimits, MAX_CONTENT_ITEMS, MAX_ITEM_CHARS, MAX_TITLE_CHARS};
use serde::{Deserialize, Serialize};

/// Options for generating a deck.
///
/// Deserializes from a partial JSON object; absent fields keep their
/// defaults, so `{"include_images": false}` is a complete value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Reuse a template image on content slides
    pub include_images: bool,

    /// Write speaker notes
    pub include_notes: bool,

    /// Content items kept per slide
    pub max_content_items: usize,

    /// Title length in characters
    pub title_max_chars: usize,

    /// Length of each content item in characters
    pub item_max_chars: usize,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            include_images: true,
            include_notes: true,
            max_content_items: MAX_CONTENT_ITEMS,
            title_max_chars: MAX_TITLE_CHARS,
            item_max_chars: MAX_ITEM_CHARS,
        }
    }
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_images(mut self, include: bool) -> Self {
        self.include_images = include;
        self
    }

    pub fn with_notes(mut self, include: bool) -> Self {
        self.include_notes = include;
        self
    }

    pub fn with_max_content_items(mut self, max: usize) -> Self {
        self.max_content_items = max;
        self
    }

    pub fn with_title_max_chars(mut self, max: usize) -> Self {
        self.title_max_chars = max;
        self
    }

    pub fn with_item_max_chars(mut self, max: usize) -> Self {
        self.item_max_chars = max;
        self
    }

    /// Truncation limits for slide records.
    pub fn limits(&self) -> ContentLimits {
        ContentLimits {
            title_max_chars: self.title_max_chars,
            max_items: self.max_content_items,
            item_max_chars: self.item_max_chars,
        }
    }
}
