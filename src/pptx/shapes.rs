//! Owned shape trees parsed from slide, layout, master and notes parts.

use super::{attr, attr_local, attr_num};
use crate::error::{Error, Result};
use crate::model::{Rect, ShapeKind};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::name::QName;

/// A color reference as written in DrawingML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorSpec {
    /// `a:srgbClr@val`
    Rgb(String),
    /// `a:schemeClr@val`, bound to the theme
    Scheme(String),
    /// `a:sysClr`, with the last computed value when present
    System {
        name: String,
        last_color: Option<String>,
    },
    /// `a:prstClr@val`
    Preset(String),
    /// A fill or color model with no single color (gradient, pattern, ...)
    Other(String),
}

impl ColorSpec {
    /// The explicit `#RRGGBB` value, if the reference carries one.
    pub fn explicit_rgb(&self) -> Option<String> {
        match self {
            ColorSpec::Rgb(hex) => normalize_hex(hex),
            ColorSpec::System {
                last_color: Some(hex),
                ..
            } => normalize_hex(hex),
            _ => None,
        }
    }

    /// Short description used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            ColorSpec::Rgb(hex) => format!("malformed RGB value '{}'", hex),
            ColorSpec::Scheme(name) => format!("scheme color '{}' has no explicit RGB", name),
            ColorSpec::System { name, .. } => format!("system color '{}' has no last value", name),
            ColorSpec::Preset(name) => format!("preset color '{}' has no explicit RGB", name),
            ColorSpec::Other(kind) => format!("{} has no single color", kind),
        }
    }
}

/// Upper-case `#RRGGBB` from six hex digits, with or without `#`.
pub fn normalize_hex(value: &str) -> Option<String> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("#{}", hex.to_ascii_uppercase()))
    } else {
        None
    }
}

/// A text run (`a:r` or `a:fld`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    /// `a:latin@typeface`, possibly a theme reference like `+mn-lt`
    pub font: Option<String>,
    pub color: Option<ColorSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextParagraph {
    pub runs: Vec<TextRun>,
}

impl TextParagraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// The `p:txBody` of a shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBody {
    pub paragraphs: Vec<TextParagraph>,
}

impl TextBody {
    /// Paragraph texts joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(TextParagraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.paragraphs.iter().flat_map(|p| p.runs.iter())
    }
}

/// The `p:ph` reference of a placeholder shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderRef {
    pub ph_type: Option<String>,
    pub idx: Option<u32>,
}

/// One shape of a shape tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    /// Position among its siblings.
    pub index: usize,
    pub kind: ShapeKind,
    pub id: u32,
    pub name: String,
    pub placeholder: Option<PlaceholderRef>,
    /// `None` when the shape inherits its position.
    pub geometry: Option<Rect>,
    pub fill: Option<ColorSpec>,
    pub text: Option<TextBody>,
    /// `r:embed` of the picture's blip.
    pub image_rel: Option<String>,
    pub children: Vec<Shape>,
}

impl Shape {
    fn new(index: usize, kind: ShapeKind) -> Self {
        Self {
            index,
            kind,
            id: 0,
            name: String::new(),
            placeholder: None,
            geometry: None,
            fill: None,
            text: None,
            image_rel: None,
            children: Vec::new(),
        }
    }

    /// Text of the shape's text body, empty when it has none.
    pub fn plain_text(&self) -> String {
        self.text.as_ref().map(TextBody::text).unwrap_or_default()
    }

    pub fn has_text(&self) -> bool {
        !self.plain_text().trim().is_empty()
    }

    /// This shape followed by all nested shapes, depth first.
    pub fn descendants(&self) -> Vec<&Shape> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.descendants());
        }
        out
    }
}

/// The `p:cSld` of a part: its name and top-level shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeTree {
    pub name: Option<String>,
    pub shapes: Vec<Shape>,
}

impl ShapeTree {
    /// Every shape, nested ones included, in document order.
    pub fn all_shapes(&self) -> Vec<&Shape> {
        self.shapes.iter().flat_map(Shape::descendants).collect()
    }

    /// Top-level placeholder shapes.
    pub fn placeholders(&self) -> impl Iterator<Item = (&Shape, &PlaceholderRef)> {
        self.shapes
            .iter()
            .filter_map(|s| s.placeholder.as_ref().map(|ph| (s, ph)))
    }
}

fn shape_kind(local: &[u8]) -> Option<ShapeKind> {
    match local {
        b"sp" => Some(ShapeKind::AutoShape),
        b"pic" => Some(ShapeKind::Picture),
        b"grpSp" => Some(ShapeKind::Group),
        b"graphicFrame" => Some(ShapeKind::GraphicFrame),
        b"cxnSp" => Some(ShapeKind::Connector),
        _ => None,
    }
}

fn color_spec(e: &BytesStart<'_>) -> Option<ColorSpec> {
    let val = || attr(e, b"val").unwrap_or_default();
    match e.local_name().as_ref() {
        b"srgbClr" => Some(ColorSpec::Rgb(val())),
        b"schemeClr" => Some(ColorSpec::Scheme(val())),
        b"sysClr" => Some(ColorSpec::System {
            name: val(),
            last_color: attr(e, b"lastClr"),
        }),
        b"prstClr" => Some(ColorSpec::Preset(val())),
        b"scrgbClr" | b"hslClr" => Some(ColorSpec::Other(
            String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
        )),
        _ => None,
    }
}

/// Parse state of the shape being built.
#[derive(Default)]
struct Scope {
    in_nv_pr: bool,
    in_sp_pr: bool,
    in_line: bool,
    in_fill: bool,
    in_xfrm: bool,
    in_blip_fill: bool,
    in_tx_body: bool,
    in_run: bool,
    in_rpr: bool,
    in_run_line: bool,
    in_run_fill: bool,
    in_t: bool,
}

struct Frame {
    shape: Shape,
    scope: Scope,
}

#[derive(Default)]
struct TreeBuilder {
    name: Option<String>,
    in_sp_tree: bool,
    stack: Vec<Frame>,
    shapes: Vec<Shape>,
}

impl TreeBuilder {
    fn start(&mut self, e: &BytesStart<'_>, empty: bool) {
        let local = e.local_name();
        let local = local.as_ref();

        match local {
            b"cSld" => {
                self.name = attr(e, b"name");
                return;
            }
            b"spTree" => {
                self.in_sp_tree = !empty;
                return;
            }
            _ => {}
        }
        if !self.in_sp_tree {
            return;
        }

        if let Some(kind) = shape_kind(local) {
            if !empty {
                let index = self
                    .stack
                    .last()
                    .map(|f| f.shape.children.len())
                    .unwrap_or(self.shapes.len());
                self.stack.push(Frame {
                    shape: Shape::new(index, kind),
                    scope: Scope::default(),
                });
            }
            return;
        }

        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        let shape = &mut frame.shape;
        let scope = &mut frame.scope;

        match local {
            b"cNvPr" if shape.name.is_empty() && shape.id == 0 => {
                shape.id = attr_num(e, b"id").unwrap_or(0);
                shape.name = attr(e, b"name").unwrap_or_default();
            }
            b"nvPr" if !empty => scope.in_nv_pr = true,
            b"ph" if scope.in_nv_pr => {
                shape.placeholder = Some(PlaceholderRef {
                    ph_type: attr(e, b"type"),
                    idx: attr_num(e, b"idx"),
                });
                if shape.kind == ShapeKind::AutoShape {
                    shape.kind = ShapeKind::Placeholder;
                }
            }
            b"spPr" | b"grpSpPr" if !empty && !scope.in_tx_body => scope.in_sp_pr = true,
            b"xfrm"
                if !empty
                    && shape.geometry.is_none()
                    && (scope.in_sp_pr || shape.kind == ShapeKind::GraphicFrame) =>
            {
                scope.in_xfrm = true;
                shape.geometry = Some(Rect::default());
            }
            b"off" if scope.in_xfrm => {
                if let Some(g) = shape.geometry.as_mut() {
                    g.left = attr_num(e, b"x").unwrap_or(0);
                    g.top = attr_num(e, b"y").unwrap_or(0);
                }
            }
            b"ext" if scope.in_xfrm => {
                if let Some(g) = shape.geometry.as_mut() {
                    g.width = attr_num(e, b"cx").unwrap_or(0);
                    g.height = attr_num(e, b"cy").unwrap_or(0);
                }
            }
            b"ln" if scope.in_rpr => scope.in_run_line = !empty,
            b"ln" if scope.in_sp_pr => scope.in_line = !empty,
            b"solidFill" if scope.in_rpr && !scope.in_run_line => scope.in_run_fill = !empty,
            b"solidFill" if scope.in_sp_pr && !scope.in_line => scope.in_fill = !empty,
            b"gradFill" | b"pattFill" | b"blipFill"
                if scope.in_sp_pr && !scope.in_line && shape.fill.is_none() =>
            {
                shape.fill = Some(ColorSpec::Other(String::from_utf8_lossy(local).into_owned()));
            }
            b"blipFill" if !empty && shape.kind == ShapeKind::Picture => {
                scope.in_blip_fill = true;
            }
            b"blip" if scope.in_blip_fill => {
                shape.image_rel = attr_local(e, b"embed");
            }
            b"txBody" if !empty => {
                scope.in_tx_body = true;
                shape.text.get_or_insert_with(TextBody::default);
            }
            b"p" if scope.in_tx_body => {
                if let Some(body) = shape.text.as_mut() {
                    body.paragraphs.push(TextParagraph::default());
                }
            }
            b"r" | b"fld" if scope.in_tx_body && !empty => {
                if let Some(para) = shape.text.as_mut().and_then(|b| b.paragraphs.last_mut()) {
                    para.runs.push(TextRun::default());
                    scope.in_run = true;
                }
            }
            b"rPr" if scope.in_run && !empty => scope.in_rpr = true,
            b"latin" if scope.in_rpr => {
                if let Some(run) = current_run(shape) {
                    run.font = attr(e, b"typeface").filter(|f| !f.is_empty());
                }
            }
            b"t" if scope.in_run && !empty => scope.in_t = true,
            _ => {
                if let Some(color) = color_spec(e) {
                    if scope.in_run_fill {
                        if let Some(run) = current_run(shape) {
                            run.color.get_or_insert(color);
                        }
                    } else if scope.in_fill && shape.fill.is_none() {
                        shape.fill = Some(color);
                    }
                }
            }
        }
    }

    fn end(&mut self, local: &[u8]) {
        match local {
            b"spTree" => {
                self.in_sp_tree = false;
                return;
            }
            _ if shape_kind(local).is_some() => {
                if let Some(frame) = self.stack.pop() {
                    match self.stack.last_mut() {
                        Some(parent) => parent.shape.children.push(frame.shape),
                        None => self.shapes.push(frame.shape),
                    }
                }
                return;
            }
            _ => {}
        }

        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        let scope = &mut frame.scope;
        match local {
            b"nvPr" => scope.in_nv_pr = false,
            b"spPr" | b"grpSpPr" => scope.in_sp_pr = false,
            b"xfrm" => scope.in_xfrm = false,
            b"ln" if scope.in_rpr => scope.in_run_line = false,
            b"ln" => scope.in_line = false,
            b"solidFill" if scope.in_rpr => scope.in_run_fill = false,
            b"solidFill" => scope.in_fill = false,
            b"blipFill" => scope.in_blip_fill = false,
            b"txBody" => scope.in_tx_body = false,
            b"r" | b"fld" => scope.in_run = false,
            b"rPr" => scope.in_rpr = false,
            b"t" => scope.in_t = false,
            _ => {}
        }
    }

    fn text(&mut self, e: &BytesText<'_>) {
        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        if !frame.scope.in_t {
            return;
        }
        let text = e
            .unescape()
            .map(|t| t.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&e[..]).into_owned());
        if let Some(run) = current_run(&mut frame.shape) {
            run.text.push_str(&text);
        }
    }

    fn finish(mut self) -> ShapeTree {
        // Unclosed shapes in truncated XML are kept rather than lost
        while let Some(frame) = self.stack.pop() {
            match self.stack.last_mut() {
                Some(parent) => parent.shape.children.push(frame.shape),
                None => self.shapes.push(frame.shape),
            }
        }
        ShapeTree {
            name: self.name,
            shapes: self.shapes,
        }
    }
}

fn current_run(shape: &mut Shape) -> Option<&mut TextRun> {
    shape
        .text
        .as_mut()
        .and_then(|b| b.paragraphs.last_mut())
        .and_then(|p| p.runs.last_mut())
}

/// Parse the `p:cSld` of a slide-like part into an owned tree.
///
/// `mc:AlternateContent` is read through its `mc:Choice` branch; the
/// `mc:Fallback` branch is skipped so shapes are not counted twice.
pub fn parse_shape_tree(xml: &str) -> Result<ShapeTree> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut builder = TreeBuilder::default();
    let mut buf = Vec::new();
    let mut skip_buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"Fallback" {
                    let end = e.name().as_ref().to_vec();
                    reader
                        .read_to_end_into(QName(&end), &mut skip_buf)
                        .map_err(|err| Error::XmlParse(err.to_string()))?;
                    skip_buf.clear();
                } else {
                    builder.start(&e, false);
                }
            }
            Ok(Event::Empty(e)) => builder.start(&e, true),
            Ok(Event::End(e)) => builder.end(e.local_name().as_ref()),
            Ok(Event::Text(e)) => builder.text(&e),
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
       xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
       xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
       xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006">
  <p:cSld name="Agenda">
    <p:spTree>
      <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
      <p:grpSpPr/>
      <p:sp>
        <p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
        <p:spPr>
          <a:xfrm><a:off x="457200" y="274638"/><a:ext cx="8229600" cy="1143000"/></a:xfrm>
          <a:solidFill><a:srgbClr val="1f497d"/></a:solidFill>
          <a:ln><a:solidFill><a:srgbClr val="00FF00"/></a:solidFill></a:ln>
        </p:spPr>
        <p:txBody><a:bodyPr/><a:lstStyle/>
          <a:p><a:r><a:rPr lang="en-US"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="Georgia"/></a:rPr><a:t>Tom &amp; Jerry</a:t></a:r><a:r><a:t> rule</a:t></a:r></a:p>
          <a:p/>
          <a:p><a:r><a:rPr><a:solidFill><a:srgbClr val="C00000"/></a:solidFill></a:rPr><a:t>second</a:t></a:r></a:p>
        </p:txBody>
      </p:sp>
      <p:pic>
        <p:nvPicPr><p:cNvPr id="3" name="Picture 2"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr>
        <p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>
        <p:spPr><a:xfrm><a:off x="10" y="20"/><a:ext cx="30" cy="40"/></a:xfrm></p:spPr>
      </p:pic>
      <p:grpSp>
        <p:nvGrpSpPr><p:cNvPr id="4" name="Group 3"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
        <p:grpSpPr><a:xfrm><a:off x="1" y="2"/><a:ext cx="3" cy="4"/><a:chOff x="0" y="0"/><a:chExt cx="3" cy="4"/></a:xfrm></p:grpSpPr>
        <p:sp>
          <p:nvSpPr><p:cNvPr id="5" name="Inner"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
          <p:spPr><a:gradFill><a:gsLst><a:gs pos="0"><a:srgbClr val="FFFFFF"/></a:gs></a:gsLst></a:gradFill></p:spPr>
        </p:sp>
      </p:grpSp>
      <mc:AlternateContent>
        <mc:Choice Requires="p14"><p:sp><p:nvSpPr><p:cNvPr id="6" name="Choice"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp></mc:Choice>
        <mc:Fallback><p:sp><p:nvSpPr><p:cNvPr id="7" name="Fallback"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp></mc:Fallback>
      </mc:AlternateContent>
    </p:spTree>
  </p:cSld>
</p:sld>"#;

    #[test]
    fn test_parse_tree_structure() {
        let tree = parse_shape_tree(SLIDE).unwrap();
        assert_eq!(tree.name.as_deref(), Some("Agenda"));
        assert_eq!(tree.shapes.len(), 4);

        let kinds: Vec<ShapeKind> = tree.shapes.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ShapeKind::Placeholder,
                ShapeKind::Picture,
                ShapeKind::Group,
                ShapeKind::AutoShape
            ]
        );
        assert_eq!(tree.shapes[3].name, "Choice");
        assert_eq!(tree.all_shapes().len(), 5);
        assert_eq!(tree.shapes[2].children[0].index, 0);
        assert_eq!(tree.shapes[3].index, 3);
    }

    #[test]
    fn test_parse_placeholder_text_and_colors() {
        let tree = parse_shape_tree(SLIDE).unwrap();
        let title = &tree.shapes[0];

        let ph = title.placeholder.as_ref().unwrap();
        assert_eq!(ph.ph_type.as_deref(), Some("title"));
        assert_eq!(ph.idx, None);
        assert_eq!(title.geometry, Some(Rect::new(457200, 274638, 8229600, 1143000)));
        assert_eq!(title.fill, Some(ColorSpec::Rgb("1f497d".into())));
        assert_eq!(title.plain_text(), "Tom & Jerry rule\n\nsecond");

        let runs: Vec<&TextRun> = title.text.as_ref().unwrap().runs().collect();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].font.as_deref(), Some("Georgia"));
        assert_eq!(runs[0].color, Some(ColorSpec::Scheme("tx1".into())));
        assert_eq!(runs[1].color, None);
        assert_eq!(runs[2].color, Some(ColorSpec::Rgb("C00000".into())));
    }

    #[test]
    fn test_parse_picture_and_group() {
        let tree = parse_shape_tree(SLIDE).unwrap();
        let pic = &tree.shapes[1];
        assert_eq!(pic.image_rel.as_deref(), Some("rId2"));
        assert_eq!(pic.geometry, Some(Rect::new(10, 20, 30, 40)));

        let group = &tree.shapes[2];
        assert_eq!(group.geometry, Some(Rect::new(1, 2, 3, 4)));
        assert_eq!(
            group.children[0].fill,
            Some(ColorSpec::Other("gradFill".into()))
        );
    }

    #[test]
    fn test_explicit_rgb() {
        assert_eq!(
            ColorSpec::Rgb("1f497d".into()).explicit_rgb().as_deref(),
            Some("#1F497D")
        );
        assert_eq!(ColorSpec::Rgb("12345".into()).explicit_rgb(), None);
        assert_eq!(
            ColorSpec::System {
                name: "windowText".into(),
                last_color: Some("000000".into())
            }
            .explicit_rgb()
            .as_deref(),
            Some("#000000")
        );
        assert_eq!(ColorSpec::Scheme("accent1".into()).explicit_rgb(), None);
    }

    #[test]
    fn test_parse_rejects_broken_xml() {
        assert!(parse_shape_tree("<p:sld><p:cSld><p:spTree></p:sld>").is_err());
    }
}
