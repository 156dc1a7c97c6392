//! Readers for the presentation part and the master/layout/theme hierarchy.

use super::shapes::{normalize_hex, parse_shape_tree, ShapeTree};
use super::{attr, attr_num, rel_id_attr};
use crate::container::{rel_types, Package, Relationships};
use crate::error::{Error, Result};
use crate::model::{PlaceholderDescriptor, PlaceholderKind, SlideSize, ThemeColor, ThemeInfo};
use quick_xml::events::Event;

/// A slide listed in `p:sldIdLst`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideRef {
    pub id: u32,
    pub rel_id: String,
    pub part: String,
}

/// What `ppt/presentation.xml` declares.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresentationInfo {
    pub slides: Vec<SlideRef>,
    /// Master parts in `p:sldMasterIdLst` order.
    pub masters: Vec<String>,
    pub notes_master: Option<String>,
    pub slide_size: SlideSize,
}

/// Read the main presentation part.
///
/// List entries whose relationship is missing or dangling are dropped.
pub fn read_presentation(package: &Package, main_part: &str) -> Result<PresentationInfo> {
    let xml = package.read_xml(main_part)?;
    let rels = package.read_relationships(main_part)?;

    let mut info = PresentationInfo::default();
    let mut reader = quick_xml::Reader::from_str(&xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"sldId" => {
                    let id = attr_num(&e, b"id").unwrap_or(0);
                    if let Some(rel_id) = rel_id_attr(&e) {
                        match resolve(package, main_part, &rels, &rel_id) {
                            Some(part) => info.slides.push(SlideRef { id, rel_id, part }),
                            None => tracing::debug!(
                                %rel_id,
                                "skipping slide with dangling relationship"
                            ),
                        }
                    }
                }
                b"sldMasterId" => {
                    if let Some(part) =
                        rel_id_attr(&e).and_then(|r| resolve(package, main_part, &rels, &r))
                    {
                        info.masters.push(part);
                    }
                }
                b"notesMasterId" => {
                    info.notes_master =
                        rel_id_attr(&e).and_then(|r| resolve(package, main_part, &rels, &r));
                }
                b"sldSz" => {
                    let cx = attr_num(&e, b"cx").unwrap_or(SlideSize::DEFAULT_WIDTH);
                    let cy = attr_num(&e, b"cy").unwrap_or(SlideSize::DEFAULT_HEIGHT);
                    info.slide_size = SlideSize::from_emu(cx, cy);
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    // Some producers leave the master list out; fall back to the relationships
    if info.masters.is_empty() {
        info.masters = package.related_parts(main_part, rel_types::SLIDE_MASTER)?;
        info.masters.retain(|p| package.exists(p));
    }
    if info.notes_master.is_none() {
        info.notes_master = package
            .related_parts(main_part, rel_types::NOTES_MASTER)?
            .into_iter()
            .find(|p| package.exists(p));
    }

    Ok(info)
}

fn resolve(package: &Package, base: &str, rels: &Relationships, rel_id: &str) -> Option<String> {
    let rel = rels.get(rel_id).filter(|r| !r.external)?;
    let part = Package::resolve_path(base, &rel.target);
    package.exists(&part).then_some(part)
}

/// A slide master with its layouts in `p:sldLayoutIdLst` order.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterPart {
    pub part: String,
    pub tree: ShapeTree,
    pub layouts: Vec<String>,
    pub theme: Option<String>,
}

pub fn read_master(package: &Package, part: &str) -> Result<MasterPart> {
    let xml = package.read_xml(part)?;
    let rels = package.read_relationships(part)?;
    let tree = parse_shape_tree(&xml)?;

    let mut layouts = Vec::new();
    let mut reader = quick_xml::Reader::from_str(&xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"sldLayoutId" =>
            {
                let layout = rel_id_attr(&e).and_then(|r| resolve(package, part, &rels, &r));
                if let Some(layout) = layout {
                    layouts.push(layout);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if layouts.is_empty() {
        layouts = rels
            .of_kind(rel_types::SLIDE_LAYOUT)
            .map(|r| Package::resolve_path(part, &r.target))
            .filter(|p| package.exists(p))
            .collect();
    }

    let theme = rels
        .of_kind(rel_types::THEME)
        .map(|r| Package::resolve_path(part, &r.target))
        .find(|p| package.exists(p));

    Ok(MasterPart {
        part: part.to_string(),
        tree,
        layouts,
        theme,
    })
}

/// A slide layout as read from the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEntry {
    /// Position over all masters.
    pub index: usize,
    pub part: String,
    pub name: String,
    pub master_index: usize,
    pub placeholders: Vec<PlaceholderDescriptor>,
}

/// Every layout of every master, masters in presentation order.
pub fn read_layouts(package: &Package, masters: &[MasterPart]) -> Result<Vec<LayoutEntry>> {
    let mut entries = Vec::new();
    for (master_index, master) in masters.iter().enumerate() {
        for part in &master.layouts {
            let tree = parse_shape_tree(&package.read_xml(part)?)?;
            let index = entries.len();
            entries.push(LayoutEntry {
                index,
                part: part.clone(),
                name: tree
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Layout {}", index + 1)),
                master_index,
                placeholders: layout_placeholders(&tree, &master.tree),
            });
        }
    }
    Ok(entries)
}

/// Type of the master placeholder a layout placeholder inherits from.
fn base_ph_type(ph_type: Option<&str>) -> &str {
    match ph_type {
        Some("title" | "ctrTitle") => "title",
        Some(t @ ("dt" | "ftr" | "sldNum" | "hdr")) => t,
        _ => "body",
    }
}

/// Placeholder descriptors of a layout, geometry filled from the master.
pub fn layout_placeholders(layout: &ShapeTree, master: &ShapeTree) -> Vec<PlaceholderDescriptor> {
    layout
        .placeholders()
        .map(|(shape, ph)| {
            let geometry = shape
                .geometry
                .or_else(|| {
                    let base = base_ph_type(ph.ph_type.as_deref());
                    master
                        .placeholders()
                        .find(|(_, m)| base_ph_type(m.ph_type.as_deref()) == base)
                        .and_then(|(m, _)| m.geometry)
                })
                .unwrap_or_default();
            PlaceholderDescriptor {
                kind: PlaceholderKind::from_ph_type(ph.ph_type.as_deref()),
                position_index: ph.idx.unwrap_or(0),
                geometry,
                ph_type: ph.ph_type.clone(),
            }
        })
        .collect()
}

/// Read a theme part.
pub fn read_theme(package: &Package, part: &str) -> Result<ThemeInfo> {
    parse_theme(&package.read_xml(part)?)
}

#[derive(Clone, Copy)]
enum FontSlot {
    Major,
    Minor,
}

/// Parse theme XML: name, color scheme and latin major/minor fonts.
pub fn parse_theme(xml: &str) -> Result<ThemeInfo> {
    let mut theme = ThemeInfo::default();
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut in_clr_scheme = false;
    let mut slot: Option<String> = None;
    let mut font_slot: Option<FontSlot> = None;

    loop {
        let event = reader.read_event_into(&mut buf);
        match event {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let is_start = matches!(event, Ok(Event::Start(_)));
                match e.local_name().as_ref() {
                    b"theme" => {
                        if let Some(name) = attr(e, b"name").filter(|n| !n.is_empty()) {
                            theme.name = name;
                        }
                    }
                    b"clrScheme" => in_clr_scheme = is_start,
                    b"majorFont" if is_start => font_slot = Some(FontSlot::Major),
                    b"minorFont" if is_start => font_slot = Some(FontSlot::Minor),
                    b"srgbClr" | b"sysClr" if slot.is_some() => {
                        let value = attr(e, b"val")
                            .and_then(|v| normalize_hex(&v))
                            .or_else(|| attr(e, b"lastClr").and_then(|v| normalize_hex(&v)));
                        if let (Some(name), Some(color)) = (slot.clone(), value) {
                            theme.color_scheme.push(ThemeColor { name, color });
                        }
                    }
                    b"latin" => {
                        let target = match font_slot {
                            Some(FontSlot::Major) => Some(&mut theme.font_scheme.major_font),
                            Some(FontSlot::Minor) => Some(&mut theme.font_scheme.minor_font),
                            None => None,
                        };
                        if let Some(target) = target.filter(|t| t.is_none()) {
                            *target = attr(e, b"typeface").filter(|f| !f.is_empty());
                        }
                    }
                    other if is_start && in_clr_scheme && slot.is_none() => {
                        slot = Some(String::from_utf8_lossy(other).into_owned());
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"clrScheme" => in_clr_scheme = false,
                b"majorFont" | b"minorFont" => font_slot = None,
                other if slot.as_deref().map(str::as_bytes) == Some(other) => slot = None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(theme)
}

/// One of the deck's slides.
#[derive(Debug, Clone, PartialEq)]
pub struct SlidePart {
    pub part: String,
    pub layout: Option<String>,
    pub tree: ShapeTree,
    pub rels: Relationships,
}

pub fn read_slide(package: &Package, part: &str) -> Result<SlidePart> {
    let tree = parse_shape_tree(&package.read_xml(part)?)?;
    let rels = package.read_relationships(part)?;
    let layout = rels
        .of_kind(rel_types::SLIDE_LAYOUT)
        .map(|r| Package::resolve_path(part, &r.target))
        .next();
    Ok(SlidePart {
        part: part.to_string(),
        layout,
        tree,
        rels,
    })
}

impl SlidePart {
    /// Bytes of an image referenced by relationship id.
    pub fn image_bytes<'a>(&self, package: &'a Package, rel_id: &str) -> Result<&'a [u8]> {
        let rel = self
            .rels
            .get(rel_id)
            .ok_or_else(|| Error::MissingComponent(format!("{} in {}", rel_id, self.part)))?;
        if rel.external {
            return Err(Error::InvalidData(format!("{} is linked, not embedded", rel_id)));
        }
        package.read_binary(&Package::resolve_path(&self.part, &rel.target))
    }
}
