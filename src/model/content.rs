//! Slide content records: the structured input of the generator.

use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Maximum number of content items per slide.
pub const MAX_CONTENT_ITEMS: usize = 8;

/// Maximum length of one content item in characters.
pub const MAX_ITEM_CHARS: usize = 200;

/// Category of a requested slide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideType {
    Title,
    #[default]
    Content,
    Section,
    Conclusion,
    /// Any type the engine has no dedicated handling for.
    #[serde(other)]
    Other,
}

impl SlideType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlideType::Title => "title",
            SlideType::Content => "content",
            SlideType::Section => "section",
            SlideType::Conclusion => "conclusion",
            SlideType::Other => "other",
        }
    }

    /// Title and section slides use the title/subtitle arrangement.
    pub fn is_title_like(&self) -> bool {
        matches!(self, SlideType::Title | SlideType::Section)
    }
}

impl std::fmt::Display for SlideType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One slide to generate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideContent {
    #[serde(default)]
    pub slide_number: u32,
    #[serde(default)]
    pub slide_type: SlideType,
    #[serde(default)]
    pub title: String,
    /// Bullet items; a bare string is accepted as a single item.
    #[serde(default, deserialize_with = "string_or_list")]
    pub content: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

/// Limits applied by [`SlideContent::normalized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentLimits {
    pub title_max_chars: usize,
    pub max_items: usize,
    pub item_max_chars: usize,
}

impl Default for ContentLimits {
    fn default() -> Self {
        Self {
            title_max_chars: MAX_TITLE_CHARS,
            max_items: MAX_CONTENT_ITEMS,
            item_max_chars: MAX_ITEM_CHARS,
        }
    }
}

impl SlideContent {
    pub fn new(slide_type: SlideType, title: impl Into<String>) -> Self {
        Self {
            slide_type,
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_content<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Copy with the title and items cut to the limits.
    ///
    /// Text within its limit is kept verbatim, as are the notes.
    pub fn normalized(&self, limits: &ContentLimits) -> SlideContent {
        SlideContent {
            slide_number: self.slide_number,
            slide_type: self.slide_type,
            title: fit(&self.title, limits.title_max_chars),
            content: self
                .content
                .iter()
                .take(limits.max_items)
                .map(|item| fit(item, limits.item_max_chars))
                .collect(),
            notes: self.notes.clone(),
        }
    }
}

/// `s` if it fits in `max` characters, else its NFC form truncated, so a
/// cut does not separate a base letter from its combining marks.
fn fit(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let composed: String = s.nfc().collect();
    truncate_chars(&composed, max)
}

/// Truncate to at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((pos, _)) => s[..pos].to_string(),
        None => s.to_string(),
    }
}

fn string_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    fn item_text(value: Value) -> String {
        match value {
            Value::String(s) => s,
            other => other.to_string(),
        }
    }

    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => vec![s],
        Value::Array(items) => items.into_iter().map(item_text).collect(),
        _ => Vec::new(),
    })
}

#[derive(Deserialize)]
struct RawSlideContent {
    slide_number: Option<u32>,
    #[serde(default)]
    slide_type: SlideType,
    title: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    content: Vec<String>,
    #[serde(default)]
    notes: Option<String>,
}

/// Parse a JSON array of slide records, filling gaps by position.
///
/// A missing `slide_number` becomes the 1-based position and a missing
/// title becomes `Slide N`.
pub fn parse_slide_records(json: &str) -> Result<Vec<SlideContent>> {
    let raw: Vec<RawSlideContent> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(i, r)| {
            let position = i as u32 + 1;
            SlideContent {
                slide_number: r.slide_number.unwrap_or(position),
                slide_type: r.slide_type,
                title: r.title.unwrap_or_else(|| format!("Slide {}", position)),
                content: r.content,
                notes: r.notes.unwrap_or_default(),
            }
        })
        .collect())
}
