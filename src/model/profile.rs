//! Template profile: the derived summary of a template's visual vocabulary.

use crate::error::Diagnostics;
use serde::{Deserialize, Serialize};

/// English Metric Units per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// English Metric Units per typographic point.
pub const EMU_PER_POINT: i64 = 12_700;

/// Palette substituted when a template yields no explicit colors.
pub const DEFAULT_PALETTE: [&str; 5] = ["#000000", "#FFFFFF", "#1F497D", "#4F81BD", "#9CBB58"];

/// Typeface used when a template yields no fonts.
pub const DEFAULT_FONT: &str = "Calibri";

/// Maximum number of distinct colors collected from a template.
pub const MAX_PALETTE_COLORS: usize = 10;

/// Convert EMUs to inches.
pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMU_PER_INCH as f64
}

/// Convert inches to EMUs, rounding to the nearest unit.
pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH as f64).round() as i64
}

/// Axis-aligned rectangle in EMUs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    pub fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// True when the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Kind of a shape in a shape tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// `p:sp` without a placeholder reference
    AutoShape,
    /// `p:sp` bound to a placeholder
    Placeholder,
    /// `p:pic`
    Picture,
    /// `p:grpSp`
    Group,
    /// `p:graphicFrame` (tables, charts, diagrams)
    GraphicFrame,
    /// `p:cxnSp`
    Connector,
}

/// Semantic kind of a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderKind {
    Title,
    Subtitle,
    Body,
    Picture,
    Other,
}

impl PlaceholderKind {
    /// Map an OOXML `ph@type` value. An absent type means `obj`.
    pub fn from_ph_type(ph_type: Option<&str>) -> Self {
        match ph_type.unwrap_or("obj") {
            "title" | "ctrTitle" => PlaceholderKind::Title,
            "subTitle" => PlaceholderKind::Subtitle,
            "body" | "obj" => PlaceholderKind::Body,
            "pic" => PlaceholderKind::Picture,
            _ => PlaceholderKind::Other,
        }
    }

    /// Footer-family placeholders inherited from the master and never filled.
    pub fn is_decoration(ph_type: Option<&str>) -> bool {
        matches!(ph_type, Some("dt" | "ftr" | "sldNum" | "hdr"))
    }
}

/// A placeholder on a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderDescriptor {
    pub kind: PlaceholderKind,
    /// The placeholder's `idx`, 0 when absent.
    pub position_index: u32,
    #[serde(flatten)]
    pub geometry: Rect,
    /// Raw `ph@type`, `None` for the implicit `obj`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph_type: Option<String>,
}

impl PlaceholderDescriptor {
    /// Whether the placeholder is a footer-family decoration.
    pub fn is_decoration(&self) -> bool {
        PlaceholderKind::is_decoration(self.ph_type.as_deref())
    }
}

/// Layout category derived from the placeholder set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutCategory {
    Title,
    Content,
    Image,
    Complex,
    Basic,
}

impl LayoutCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutCategory::Title => "title",
            LayoutCategory::Content => "content",
            LayoutCategory::Image => "image",
            LayoutCategory::Complex => "complex",
            LayoutCategory::Basic => "basic",
        }
    }
}

impl std::fmt::Display for LayoutCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A slide layout of the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutDescriptor {
    /// Position in the template's layout order.
    pub index: usize,
    pub name: String,
    pub placeholders: Vec<PlaceholderDescriptor>,
    pub category: LayoutCategory,
    /// Package part holding the layout.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub part_name: String,
    /// Index of the owning slide master.
    #[serde(default)]
    pub master_index: usize,
}

impl LayoutDescriptor {
    /// First placeholder of a kind.
    pub fn placeholder(&self, kind: PlaceholderKind) -> Option<&PlaceholderDescriptor> {
        self.placeholders.iter().find(|p| p.kind == kind)
    }

    pub fn has_kind(&self, kind: PlaceholderKind) -> bool {
        self.placeholder(kind).is_some()
    }
}

/// A named color of the theme's color scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColor {
    /// Scheme slot, e.g. `accent1`.
    pub name: String,
    /// `#RRGGBB`
    pub color: String,
}

/// Heading and body typefaces declared by the theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontScheme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor_font: Option<String>,
}

impl FontScheme {
    /// Resolve a `+mj-lt` / `+mn-lt` reference; plain names pass through.
    pub fn resolve(&self, typeface: &str) -> Option<String> {
        match typeface {
            "+mj-lt" => self.major_font.clone(),
            "+mn-lt" => self.minor_font.clone(),
            t if t.starts_with('+') => None,
            t => Some(t.to_string()),
        }
    }
}

/// Theme information of the first slide master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeInfo {
    pub name: String,
    #[serde(default)]
    pub color_scheme: Vec<ThemeColor>,
    #[serde(default)]
    pub font_scheme: FontScheme,
}

impl Default for ThemeInfo {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            color_scheme: Vec::new(),
            font_scheme: FontScheme::default(),
        }
    }
}

/// Fonts harvested from the template's slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontInventory {
    pub title_font: String,
    pub body_font: String,
    #[serde(default)]
    pub fonts_used: Vec<String>,
}

impl Default for FontInventory {
    fn default() -> Self {
        Self {
            title_font: DEFAULT_FONT.to_string(),
            body_font: DEFAULT_FONT.to_string(),
            fonts_used: Vec::new(),
        }
    }
}

/// An image embedded in one of the template's slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub slide_index: usize,
    pub shape_index: usize,
    #[serde(flatten)]
    pub geometry: Rect,
    /// Raw image bytes, base64 in JSON.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// Sniffed from the leading bytes.
    pub content_type: String,
    pub size: usize,
}

/// Canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlideSize {
    pub width: i64,
    pub height: i64,
    pub width_inches: f64,
    pub height_inches: f64,
}

impl SlideSize {
    /// 10in x 7.5in, the 4:3 default.
    pub const DEFAULT_WIDTH: i64 = 9_144_000;
    pub const DEFAULT_HEIGHT: i64 = 6_858_000;

    pub fn from_emu(width: i64, height: i64) -> Self {
        Self {
            width,
            height,
            width_inches: emu_to_inches(width),
            height_inches: emu_to_inches(height),
        }
    }
}

impl Default for SlideSize {
    fn default() -> Self {
        Self::from_emu(Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }
}

/// A top-level shape of the slide master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterShape {
    #[serde(rename = "type")]
    pub shape_type: ShapeKind,
    #[serde(flatten)]
    pub geometry: Rect,
    #[serde(default)]
    pub has_text: bool,
    /// First 50 characters of the shape's text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_sample: Option<String>,
}

/// Summary of the master/layout hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterInfo {
    pub layouts_count: usize,
    pub has_master: bool,
    #[serde(default)]
    pub master_shapes: Vec<MasterShape>,
}

/// Everything the generator needs to know about a template.
///
/// Produced once by the analyzer and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateProfile {
    pub layouts: Vec<LayoutDescriptor>,
    #[serde(default)]
    pub theme: ThemeInfo,
    /// Up to ten `#RRGGBB` values, never empty.
    pub colors: Vec<String>,
    #[serde(default)]
    pub fonts: FontInventory,
    #[serde(default)]
    pub images: Vec<ImageAsset>,
    #[serde(default)]
    pub slide_size: SlideSize,
    #[serde(default)]
    pub master_slides: MasterInfo,
    /// Color/font faults skipped during analysis.
    #[serde(default, skip_serializing_if = "Diagnostics::is_empty")]
    pub diagnostics: Diagnostics,
}

impl TemplateProfile {
    /// Color applied to titles.
    pub fn primary_color(&self) -> Option<&str> {
        self.colors.first().map(String::as_str)
    }

    /// Color applied to body text.
    pub fn secondary_color(&self) -> Option<&str> {
        self.colors.get(1).map(String::as_str)
    }

    /// Layout at a position in template order.
    pub fn layout(&self, index: usize) -> Option<&LayoutDescriptor> {
        self.layouts.iter().find(|l| l.index == index)
    }
}

/// Serde adapter storing bytes as standard base64.
pub(crate) mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_kind_mapping() {
        assert_eq!(PlaceholderKind::from_ph_type(Some("ctrTitle")), PlaceholderKind::Title);
        assert_eq!(PlaceholderKind::from_ph_type(Some("subTitle")), PlaceholderKind::Subtitle);
        assert_eq!(PlaceholderKind::from_ph_type(None), PlaceholderKind::Body);
        assert_eq!(PlaceholderKind::from_ph_type(Some("pic")), PlaceholderKind::Picture);
        assert_eq!(PlaceholderKind::from_ph_type(Some("sldNum")), PlaceholderKind::Other);
        assert!(PlaceholderKind::is_decoration(Some("ftr")));
        assert!(!PlaceholderKind::is_decoration(Some("chart")));
    }

    #[test]
    fn test_slide_size_inches() {
        let size = SlideSize::from_emu(12_192_000, 6_858_000);
        assert!((size.width_inches - 13.333).abs() < 0.001);
        assert!((size.height_inches - 7.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_image_asset_json_shape() {
        let asset = ImageAsset {
            slide_index: 0,
            shape_index: 2,
            geometry: Rect::new(1, 2, 3, 4),
            data: b"\x89PNGabc".to_vec(),
            content_type: "image/png".to_string(),
            size: 7,
        };
        let value = serde_json::to_value(&asset).unwrap();
        assert_eq!(value["left"], 1);
        assert_eq!(value["height"], 4);
        assert_eq!(value["data"], "iVBOR2FiYw==");

        let back: ImageAsset = serde_json::from_value(value).unwrap();
        assert_eq!(back, asset);
    }

    #[test]
    fn test_placeholder_json_shape() {
        let ph = PlaceholderDescriptor {
            kind: PlaceholderKind::Title,
            position_index: 0,
            geometry: Rect::new(10, 20, 30, 40),
            ph_type: Some("title".into()),
        };
        let json = serde_json::to_string(&ph).unwrap();
        assert!(json.contains(r#""kind":"title""#));
        assert!(json.contains(r#""left":10"#));
    }
}
