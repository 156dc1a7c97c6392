//! Synthetic presentation templates for integration tests.

#![allow(dead_code)]

use slidecraft::container::rel_types;
use slidecraft::pptx::parts::{read_presentation, read_slide, SlidePart};
use slidecraft::Package;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13, b'I', b'H', b'D', b'R',
];

const NS: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);

const GROUP: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Placeholder kinds a fixture layout can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ph {
    Title,
    CtrTitle,
    SubTitle,
    Body,
    Pic,
    Date,
    Footer,
    SlideNum,
}

impl Ph {
    fn element(self, idx: u32) -> String {
        match self {
            Ph::Title => r#"<p:ph type="title"/>"#.to_string(),
            Ph::CtrTitle => r#"<p:ph type="ctrTitle"/>"#.to_string(),
            Ph::SubTitle => format!(r#"<p:ph type="subTitle" idx="{}"/>"#, idx),
            Ph::Body => format!(r#"<p:ph idx="{}"/>"#, idx),
            Ph::Pic => format!(r#"<p:ph type="pic" idx="{}"/>"#, idx),
            Ph::Date => format!(r#"<p:ph type="dt" sz="half" idx="{}"/>"#, idx),
            Ph::Footer => format!(r#"<p:ph type="ftr" sz="quarter" idx="{}"/>"#, idx),
            Ph::SlideNum => format!(r#"<p:ph type="sldNum" sz="quarter" idx="{}"/>"#, idx),
        }
    }
}

/// A shape on a fixture slide.
#[derive(Debug, Clone)]
pub struct FixtureSlide {
    pub layout: usize,
    pub title: String,
    /// `srgbClr` of the title run
    pub title_color: Option<String>,
    /// `a:latin` of the title run
    pub title_font: Option<String>,
    /// `srgbClr` fill of a decorative rectangle
    pub shape_fill: Option<String>,
    /// Scheme color of a second run, which the palette skips
    pub scheme_color: Option<String>,
    pub image: Option<Vec<u8>>,
}

impl FixtureSlide {
    pub fn new(layout: usize, title: &str) -> Self {
        Self {
            layout,
            title: title.to_string(),
            title_color: None,
            title_font: None,
            shape_fill: None,
            scheme_color: None,
            image: None,
        }
    }

    pub fn color(mut self, hex: &str) -> Self {
        self.title_color = Some(hex.to_string());
        self
    }

    pub fn font(mut self, face: &str) -> Self {
        self.title_font = Some(face.to_string());
        self
    }

    pub fn fill(mut self, hex: &str) -> Self {
        self.shape_fill = Some(hex.to_string());
        self
    }

    pub fn scheme(mut self, name: &str) -> Self {
        self.scheme_color = Some(name.to_string());
        self
    }

    pub fn image(mut self, data: &[u8]) -> Self {
        self.image = Some(data.to_vec());
        self
    }
}

/// Builds a `.pptx` or `.potx` package in memory.
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    layouts: Vec<(String, Vec<Ph>)>,
    slides: Vec<FixtureSlide>,
    template: bool,
    size: (i64, i64),
    theme_fonts: (String, String),
}

impl Default for TemplateBuilder {
    fn default() -> Self {
        Self {
            layouts: Vec::new(),
            slides: Vec::new(),
            template: false,
            size: (12_192_000, 6_858_000),
            theme_fonts: ("Georgia".to_string(), "Verdana".to_string()),
        }
    }
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Title Slide, Title and Content, Title Only, Blank and Quad Text.
    pub fn standard() -> Self {
        use Ph::*;
        Self::new()
            .layout("Title Slide", &[CtrTitle, SubTitle, Date, Footer, SlideNum])
            .layout("Title and Content", &[Title, Body, Date, Footer, SlideNum])
            .layout("Title Only", &[Title, Date, Footer, SlideNum])
            .layout("Blank", &[Date, Footer, SlideNum])
            .layout("Quad Text", &[Body, Body, Body, Body])
    }

    pub fn layout(mut self, name: &str, placeholders: &[Ph]) -> Self {
        self.layouts.push((name.to_string(), placeholders.to_vec()));
        self
    }

    pub fn slide(mut self, slide: FixtureSlide) -> Self {
        self.slides.push(slide);
        self
    }

    /// Label the main part as a template (`.potx`).
    pub fn as_template(mut self) -> Self {
        self.template = true;
        self
    }

    pub fn size(mut self, cx: i64, cy: i64) -> Self {
        self.size = (cx, cy);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

        let mut put = |name: &str, content: &[u8]| {
            zip.start_file(name, options).unwrap();
            zip.write_all(content).unwrap();
        };

        put("[Content_Types].xml", self.content_types().as_bytes());
        put(
            "_rels/.rels",
            rels(&[("rId1", "officeDocument", "ppt/presentation.xml")]).as_bytes(),
        );
        put("ppt/presentation.xml", self.presentation().as_bytes());
        put("ppt/_rels/presentation.xml.rels", self.presentation_rels().as_bytes());
        put("ppt/slideMasters/slideMaster1.xml", self.master().as_bytes());
        put(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            self.master_rels().as_bytes(),
        );
        put("ppt/theme/theme1.xml", self.theme().as_bytes());

        for (i, (name, placeholders)) in self.layouts.iter().enumerate() {
            put(
                &format!("ppt/slideLayouts/slideLayout{}.xml", i + 1),
                layout_xml(name, placeholders).as_bytes(),
            );
            put(
                &format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", i + 1),
                rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]).as_bytes(),
            );
        }

        for (i, slide) in self.slides.iter().enumerate() {
            let n = i + 1;
            let layout_target = format!("../slideLayouts/slideLayout{}.xml", slide.layout + 1);
            let image_target = format!("../media/image{}.png", n);
            let mut slide_rels = vec![("rId1", "slideLayout", layout_target.as_str())];
            if let Some(data) = &slide.image {
                slide_rels.push(("rId2", "image", image_target.as_str()));
                put(&format!("ppt/media/image{}.png", n), data);
            }
            put(&format!("ppt/slides/slide{}.xml", n), slide_xml(slide).as_bytes());
            put(
                &format!("ppt/slides/_rels/slide{}.xml.rels", n),
                rels(&slide_rels).as_bytes(),
            );
        }

        zip.finish().unwrap();
        buffer
    }

    fn content_types(&self) -> String {
        let main = if self.template {
            "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml"
        } else {
            "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"
        };
        let mut xml = format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
                r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
                r#"<Default Extension="xml" ContentType="application/xml"/>"#,
                r#"<Default Extension="png" ContentType="image/png"/>"#,
                r#"<Override PartName="/ppt/presentation.xml" ContentType="{}"/>"#,
                r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#,
                r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#
            ),
            main
        );
        for i in 1..=self.layouts.len() {
            xml.push_str(&format!(
                r#"<Override PartName="/ppt/slideLayouts/slideLayout{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#,
                i
            ));
        }
        for i in 1..=self.slides.len() {
            xml.push_str(&format!(
                r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
                i
            ));
        }
        xml.push_str("</Types>");
        xml
    }

    fn presentation(&self) -> String {
        let mut slides = String::new();
        if !self.slides.is_empty() {
            slides.push_str("<p:sldIdLst>");
            for i in 0..self.slides.len() {
                slides.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, 10 + i));
            }
            slides.push_str("</p:sldIdLst>");
        }
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<p:presentation {}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
                r#"{}<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/>"#,
                r#"<p:defaultTextStyle/></p:presentation>"#
            ),
            NS, slides, self.size.0, self.size.1
        )
    }

    fn presentation_rels(&self) -> String {
        let targets: Vec<(String, &str, String)> = std::iter::once((
            "rId1".to_string(),
            "slideMaster",
            "slideMasters/slideMaster1.xml".to_string(),
        ))
        .chain(std::iter::once((
            "rId2".to_string(),
            "theme",
            "theme/theme1.xml".to_string(),
        )))
        .chain((0..self.slides.len()).map(|i| {
            (
                format!("rId{}", 10 + i),
                "slide",
                format!("slides/slide{}.xml", i + 1),
            )
        }))
        .collect();
        let borrowed: Vec<(&str, &str, &str)> = targets
            .iter()
            .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
            .collect();
        rels(&borrowed)
    }

    fn master(&self) -> String {
        let mut ids = String::new();
        for i in 0..self.layouts.len() {
            ids.push_str(&format!(
                r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#,
                2_147_483_649u64 + i as u64,
                i + 1
            ));
        }
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<p:sldMaster {}><p:cSld><p:spTree>{}"#,
                r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title Placeholder 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>"#,
                r#"<p:spPr><a:xfrm><a:off x="838200" y="365125"/><a:ext cx="10515600" cy="1325563"/></a:xfrm></p:spPr>"#,
                r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/><a:t>Click to edit Master title style</a:t></a:r></a:p></p:txBody></p:sp>"#,
                r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Text Placeholder 2"/><p:cNvSpPr/><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr>"#,
                r#"<p:spPr><a:xfrm><a:off x="838200" y="1825625"/><a:ext cx="10515600" cy="4351338"/></a:xfrm></p:spPr>"#,
                r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/><a:t>Edit Master text styles</a:t></a:r></a:p></p:txBody></p:sp>"#,
                r#"</p:spTree></p:cSld>"#,
                r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
                r#"<p:sldLayoutIdLst>{}</p:sldLayoutIdLst></p:sldMaster>"#
            ),
            NS, GROUP, ids
        )
    }

    fn master_rels(&self) -> String {
        let mut entries: Vec<(String, &str, String)> = (0..self.layouts.len())
            .map(|i| {
                (
                    format!("rId{}", i + 1),
                    "slideLayout",
                    format!("../slideLayouts/slideLayout{}.xml", i + 1),
                )
            })
            .collect();
        entries.push((
            format!("rId{}", self.layouts.len() + 1),
            "theme",
            "../theme/theme1.xml".to_string(),
        ));
        let borrowed: Vec<(&str, &str, &str)> = entries
            .iter()
            .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
            .collect();
        rels(&borrowed)
    }

    fn theme(&self) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Fixture Theme"><a:themeElements>"#,
                r#"<a:clrScheme name="Fixture"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
                r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="44546A"/></a:dk2>"#,
                r#"<a:lt2><a:srgbClr val="E7E6E6"/></a:lt2><a:accent1><a:srgbClr val="4472C4"/></a:accent1></a:clrScheme>"#,
                r#"<a:fontScheme name="Fixture"><a:majorFont><a:latin typeface="{}"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
                r#"<a:minorFont><a:latin typeface="{}"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme>"#,
                r#"<a:fmtScheme name="Fixture"/></a:themeElements></a:theme>"#
            ),
            self.theme_fonts.0, self.theme_fonts.1
        )
    }
}

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}">"#,
        RELS_NS
    );
    for (id, kind, target) in entries {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id,
            rel_types::uri(kind),
            target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn layout_xml(name: &str, placeholders: &[Ph]) -> String {
    let mut shapes = String::new();
    for (i, ph) in placeholders.iter().enumerate() {
        let id = i + 2;
        let idx = i as u32 + 1;
        // pictures carry their own frame; everything else inherits from the master
        let sp_pr = if *ph == Ph::Pic {
            r#"<p:spPr><a:xfrm><a:off x="6096000" y="1825625"/><a:ext cx="5257800" cy="4351338"/></a:xfrm></p:spPr>"#
        } else {
            "<p:spPr/>"
        };
        let element = if *ph == Ph::Pic { "pic" } else { "sp" };
        let nv = if *ph == Ph::Pic { "nvPicPr" } else { "nvSpPr" };
        let c_nv = if *ph == Ph::Pic { "cNvPicPr" } else { "cNvSpPr" };
        shapes.push_str(&format!(
            r#"<p:{el}><p:{nv}><p:cNvPr id="{id}" name="Placeholder {id}"/><p:{cnv}/><p:nvPr>{ph}</p:nvPr></p:{nv}>{sp_pr}</p:{el}>"#,
            el = element,
            nv = nv,
            cnv = c_nv,
            id = id,
            ph = ph.element(idx),
            sp_pr = sp_pr
        ));
    }
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<p:sldLayout {}><p:cSld name="{}"><p:spTree>{}{}</p:spTree></p:cSld>"#,
            r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
        ),
        NS, name, GROUP, shapes
    )
}

fn slide_xml(slide: &FixtureSlide) -> String {
    let mut rpr = String::from(r#"<a:rPr lang="en-US""#);
    if slide.title_color.is_none() && slide.title_font.is_none() {
        rpr.push_str("/>");
    } else {
        rpr.push('>');
        if let Some(color) = &slide.title_color {
            rpr.push_str(&format!(r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color));
        }
        if let Some(font) = &slide.title_font {
            rpr.push_str(&format!(r#"<a:latin typeface="{}"/>"#, font));
        }
        rpr.push_str("</a:rPr>");
    }
    let scheme_run = slide
        .scheme_color
        .as_ref()
        .map(|name| {
            format!(
                r#"<a:r><a:rPr lang="en-US"><a:solidFill><a:schemeClr val="{}"/></a:solidFill></a:rPr><a:t> themed</a:t></a:r>"#,
                name
            )
        })
        .unwrap_or_default();

    let mut shapes = format!(
        concat!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/>"#,
            r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r>{}<a:t>{}</a:t></a:r>{}</a:p></p:txBody></p:sp>"#
        ),
        rpr, slide.title, scheme_run
    );
    if let Some(fill) = &slide.shape_fill {
        shapes.push_str(&format!(
            concat!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Rectangle 2"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>"#,
                r#"<p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="914400" cy="914400"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:solidFill><a:srgbClr val="{}"/></a:solidFill></p:spPr></p:sp>"#
            ),
            fill
        ));
    }
    if slide.image.is_some() {
        shapes.push_str(concat!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="4" name="Picture 3"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr>"#,
            r#"<p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
            r#"<p:spPr><a:xfrm><a:off x="1828800" y="1828800"/><a:ext cx="2743200" cy="1828800"/></a:xfrm></p:spPr></p:pic>"#
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {}><p:cSld><p:spTree>{}{}</p:spTree></p:cSld></p:sld>"#,
        NS, GROUP, shapes
    )
}

/// A generated deck re-opened for assertions.
pub struct OpenedDeck {
    pub package: Package,
    pub slides: Vec<SlidePart>,
}

impl OpenedDeck {
    pub fn open(bytes: Vec<u8>) -> Self {
        let package = Package::from_bytes(bytes).unwrap();
        let info = read_presentation(&package, "ppt/presentation.xml").unwrap();
        let slides = info
            .slides
            .iter()
            .map(|s| read_slide(&package, &s.part).unwrap())
            .collect();
        Self { package, slides }
    }

    /// Text of the slide's placeholder of `ph_type` (`None` for the body).
    pub fn placeholder_text(&self, slide: usize, ph_type: Option<&str>) -> Option<String> {
        self.slides[slide]
            .tree
            .placeholders()
            .find(|(_, ph)| ph.ph_type.as_deref() == ph_type)
            .map(|(shape, _)| shape.plain_text())
    }

    pub fn title(&self, slide: usize) -> Option<String> {
        self.placeholder_text(slide, Some("title"))
            .or_else(|| self.placeholder_text(slide, Some("ctrTitle")))
    }

    /// Paragraph texts of the first placeholder of `ph_type`.
    pub fn paragraphs(&self, slide: usize, ph_type: Option<&str>) -> Vec<String> {
        self.slides[slide]
            .tree
            .placeholders()
            .find(|(_, ph)| ph.ph_type.as_deref() == ph_type)
            .and_then(|(shape, _)| shape.text.as_ref())
            .map(|body| body.paragraphs.iter().map(|p| p.text()).collect())
            .unwrap_or_default()
    }

    /// Layout part the slide is built on.
    pub fn layout_part(&self, slide: usize) -> Option<String> {
        self.slides[slide].layout.clone()
    }

    /// Text of the slide's notes body, if it has notes.
    pub fn notes(&self, slide: usize) -> Option<String> {
        let part = &self.slides[slide];
        let rel = part.rels.of_kind(rel_types::NOTES_SLIDE).next()?;
        let notes_part = Package::resolve_path(&part.part, &rel.target);
        let xml = self.package.read_xml(&notes_part).ok()?;
        let tree = slidecraft::pptx::shapes::parse_shape_tree(&xml).ok()?;
        let text = tree
            .placeholders()
            .find(|(_, ph)| ph.ph_type.as_deref() == Some("body"))
            .map(|(shape, _)| shape.plain_text());
        text
    }

    pub fn pictures(&self, slide: usize) -> Vec<&slidecraft::pptx::Shape> {
        self.slides[slide]
            .tree
            .shapes
            .iter()
            .filter(|s| s.kind == slidecraft::model::ShapeKind::Picture)
            .collect()
    }
}
