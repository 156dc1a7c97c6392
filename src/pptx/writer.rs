//! Slide and notes XML built from a [`SlideDraft`].

use super::parts::LayoutEntry;
use crate::container::escape_xml;
use crate::model::Rect;
use std::fmt::Write;

const NS_DECLS: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);

const GROUP_HEADER: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

/// Run formatting applied to every run of a text fill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextStyle {
    pub font: Option<String>,
    /// Hundredths of a point.
    pub size: Option<u32>,
    pub bold: bool,
    /// `RRGGBB` without the leading `#`.
    pub color: Option<String>,
}

/// Text placed into one layout placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFill {
    /// Position in the layout's placeholder list.
    pub placeholder: usize,
    pub paragraphs: Vec<String>,
    pub style: TextStyle,
}

/// Where a picture goes on the slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePlacement {
    /// Into the layout placeholder at this position.
    Placeholder(usize),
    /// As a free shape at this rectangle.
    Floating(Rect),
}

/// A picture to embed, borrowed from the template profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideImage<'a> {
    pub data: &'a [u8],
    pub content_type: &'a str,
    pub placement: ImagePlacement,
}

/// Everything needed to write one slide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideDraft<'a> {
    /// Index into the deck's layouts.
    pub layout: usize,
    pub fills: Vec<TextFill>,
    pub image: Option<SlideImage<'a>>,
    pub notes: Option<String>,
}

/// Placeholder types whose shapes carry a text body.
fn is_text_type(ph_type: Option<&str>) -> bool {
    matches!(
        ph_type,
        None | Some("title" | "ctrTitle" | "subTitle" | "body" | "obj")
    )
}

fn shape_base_name(ph_type: Option<&str>) -> &'static str {
    match ph_type {
        Some("title" | "ctrTitle") => "Title",
        Some("subTitle") => "Subtitle",
        Some("body") => "Text Placeholder",
        None | Some("obj") => "Content Placeholder",
        Some("pic") => "Picture Placeholder",
        Some("tbl") => "Table Placeholder",
        Some("chart") => "Chart Placeholder",
        _ => "Placeholder",
    }
}

fn ph_element(ph_type: Option<&str>, idx: u32) -> String {
    let mut xml = String::from("<p:ph");
    if let Some(t) = ph_type {
        let _ = write!(xml, r#" type="{}""#, escape_xml(t));
    }
    if idx != 0 {
        let _ = write!(xml, r#" idx="{}""#, idx);
    }
    xml.push_str("/>");
    xml
}

/// `a:rPr` for a style.
pub fn run_properties(style: &TextStyle) -> String {
    let mut xml = String::from(r#"<a:rPr lang="en-US""#);
    if let Some(size) = style.size {
        let _ = write!(xml, r#" sz="{}""#, size);
    }
    if style.bold {
        xml.push_str(r#" b="1""#);
    }
    xml.push_str(r#" dirty="0""#);

    if style.color.is_none() && style.font.is_none() {
        xml.push_str("/>");
        return xml;
    }
    xml.push('>');
    if let Some(color) = &style.color {
        let _ = write!(
            xml,
            r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
            escape_xml(color)
        );
    }
    if let Some(font) = &style.font {
        let _ = write!(xml, r#"<a:latin typeface="{}"/>"#, escape_xml(font));
    }
    xml.push_str("</a:rPr>");
    xml
}

/// One `a:p`; embedded newlines become `a:br` line breaks.
pub fn paragraph_xml(text: &str, style: &TextStyle) -> String {
    if text.is_empty() {
        return "<a:p/>".to_string();
    }
    let rpr = run_properties(style);
    let mut xml = String::from("<a:p>");
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            let _ = write!(xml, "<a:br>{}</a:br>", rpr);
        }
        if !line.is_empty() {
            let _ = write!(xml, "<a:r>{}<a:t>{}</a:t></a:r>", rpr, escape_xml(line));
        }
    }
    xml.push_str("</a:p>");
    xml
}

fn text_body(paragraphs: &[String], style: &TextStyle) -> String {
    let mut xml = String::from("<p:txBody><a:bodyPr/><a:lstStyle/>");
    if paragraphs.is_empty() {
        xml.push_str("<a:p/>");
    }
    for p in paragraphs {
        xml.push_str(&paragraph_xml(p, style));
    }
    xml.push_str("</p:txBody>");
    xml
}

fn placeholder_sp(id: u32, ph_type: Option<&str>, idx: u32, fill: Option<&TextFill>) -> String {
    let mut xml = String::with_capacity(512);
    let _ = write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{} {}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{}</p:nvPr></p:nvSpPr><p:spPr/>"#,
        id,
        shape_base_name(ph_type),
        id - 1,
        ph_element(ph_type, idx)
    );
    match fill {
        Some(fill) => xml.push_str(&text_body(&fill.paragraphs, &fill.style)),
        None if is_text_type(ph_type) => xml.push_str(&text_body(&[], &TextStyle::default())),
        None => {}
    }
    xml.push_str("</p:sp>");
    xml
}

/// A `p:pic`; `ph` binds it to a picture placeholder, `frame` places it freely.
fn picture(id: u32, rel_id: &str, ph: Option<u32>, frame: Option<Rect>) -> String {
    let mut xml = String::with_capacity(512);
    let name = if ph.is_some() {
        "Picture Placeholder"
    } else {
        "Picture"
    };
    let _ = write!(
        xml,
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="{} {}"/><p:cNvPicPr><a:picLocks noGrp="1" noChangeAspect="1"/></p:cNvPicPr><p:nvPr>"#,
        id,
        name,
        id - 1
    );
    if let Some(idx) = ph {
        xml.push_str(&ph_element(Some("pic"), idx));
    }
    let _ = write!(
        xml,
        r#"</p:nvPr></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
        escape_xml(rel_id)
    );
    match frame {
        Some(r) => {
            let _ = write!(
                xml,
                r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#,
                r.left, r.top, r.width, r.height
            );
        }
        None => xml.push_str("<p:spPr/>"),
    }
    xml.push_str("</p:pic>");
    xml
}

/// Slide XML with one shape per non-decoration layout placeholder.
///
/// `picture_ref` is the image relationship id and where the picture goes.
pub fn slide_xml(
    layout: &LayoutEntry,
    fills: &[TextFill],
    picture_ref: Option<(&str, ImagePlacement)>,
) -> String {
    let mut shapes = String::new();
    let mut next_id = 2u32;

    for (pos, ph) in layout.placeholders.iter().enumerate() {
        if ph.is_decoration() {
            continue;
        }
        let id = next_id;
        next_id += 1;

        match picture_ref {
            Some((rel_id, ImagePlacement::Placeholder(target))) if target == pos => {
                shapes.push_str(&picture(id, rel_id, Some(ph.position_index), None));
            }
            _ => {
                let fill = fills.iter().find(|f| f.placeholder == pos);
                shapes.push_str(&placeholder_sp(
                    id,
                    ph.ph_type.as_deref(),
                    ph.position_index,
                    fill,
                ));
            }
        }
    }

    if let Some((rel_id, ImagePlacement::Floating(rect))) = picture_ref {
        shapes.push_str(&picture(next_id, rel_id, None, Some(rect)));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {}><p:cSld><p:spTree>{}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        NS_DECLS, GROUP_HEADER, shapes
    )
}

/// Notes slide XML: slide image plus a body holding one paragraph per line.
pub fn notes_xml(notes: &str) -> String {
    let paragraphs: Vec<String> = notes.lines().map(str::to_string).collect();
    let body = text_body(&paragraphs, &TextStyle::default());
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notes {}><p:cSld><p:spTree>{}"#,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Slide Image Placeholder 1"/><p:cNvSpPr><a:spLocks noGrp="1" noRot="1" noChangeAspect="1"/></p:cNvSpPr>"#,
            r#"<p:nvPr><p:ph type="sldImg"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>"#,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Notes Placeholder 2"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#,
            r#"<p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr/>{}</p:sp>"#,
            r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:notes>"#
        ),
        NS_DECLS, GROUP_HEADER, body
    )
}
