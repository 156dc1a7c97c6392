//! The in-memory deck the generator writes slides into.

use super::defaults::{blank_package, NOTES_MASTER_XML, THEME_XML};
use super::parts::{read_layouts, read_master, read_presentation, LayoutEntry, SlideRef};
use super::writer::{notes_xml, slide_xml, ImagePlacement, SlideDraft};
use super::attr;
use crate::container::{rel_types, ContentTypes, Package, Relationships};
use crate::detect::{detect_kind, main_part_path, ContainerKind, PRESENTATION_CONTENT_TYPE};
use crate::error::{Diagnostics, Error, Result, StylingAspect};
use crate::model::SlideSize;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};

const SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const NOTES_SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml";
const NOTES_MASTER_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.notesMaster+xml";
const THEME_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.theme+xml";

const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Extension URI of the PowerPoint 2010 slide section list.
const SECTION_LIST_EXT_URI: &str = "{521415D9-36F7-43E2-AB2F-B90AF26B5E84}";

/// Slide ids below this value are reserved.
const MIN_SLIDE_ID: u32 = 256;

/// Image extension for a media content type.
fn media_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpeg"),
        "image/gif" => Some("gif"),
        "image/bmp" => Some("bmp"),
        _ => None,
    }
}

/// Position of a `p:presentation` child in schema order.
fn child_rank(local: &[u8]) -> u8 {
    match local {
        b"sldMasterIdLst" => 0,
        b"notesMasterIdLst" => 1,
        b"handoutMasterIdLst" => 2,
        b"sldIdLst" => 3,
        b"sldSz" => 4,
        b"notesSz" => 5,
        _ => 6,
    }
}

/// A presentation package opened for editing.
///
/// Slide list, relationships and content types of the main part are kept
/// in memory and written back by [`Deck::into_bytes`].
#[derive(Debug)]
pub struct Deck {
    package: Package,
    main_part: String,
    kind: ContainerKind,
    layouts: Vec<LayoutEntry>,
    slide_size: SlideSize,
    slides: Vec<SlideRef>,
    pres_rels: Relationships,
    types: ContentTypes,
    notes_master: Option<String>,
    /// Relationship id of a notes master added by this deck.
    provisioned_notes_rel: Option<String>,
    media: Vec<String>,
    slides_stripped: bool,
}

impl Deck {
    /// Open a template from its bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let package = Package::from_bytes(data).map_err(Error::into_unreadable)?;
        Self::from_package(package)
    }

    /// The built-in blank deck.
    pub fn blank() -> Result<Self> {
        Self::from_package(blank_package())
    }

    pub fn from_package(package: Package) -> Result<Self> {
        let kind = detect_kind(&package)?;
        Self::load(package, kind).map_err(Error::into_unreadable)
    }

    fn load(package: Package, kind: ContainerKind) -> Result<Self> {
        let main_part = main_part_path(&package)?;
        let info = read_presentation(&package, &main_part)?;
        let masters = info
            .masters
            .iter()
            .map(|part| read_master(&package, part))
            .collect::<Result<Vec<_>>>()?;
        let layouts = read_layouts(&package, &masters)?;
        let pres_rels = package.read_relationships(&main_part)?;
        let types = package.content_types()?;

        let media = package.list_files_with_prefix("ppt/media/");

        tracing::debug!(
            %kind,
            layouts = layouts.len(),
            slides = info.slides.len(),
            "deck loaded"
        );

        Ok(Self {
            package,
            main_part,
            kind,
            layouts,
            slide_size: info.slide_size,
            slides: info.slides,
            pres_rels,
            types,
            notes_master: info.notes_master,
            provisioned_notes_rel: None,
            media,
            slides_stripped: false,
        })
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Layouts of every master in template order.
    pub fn layouts(&self) -> &[LayoutEntry] {
        &self.layouts
    }

    pub fn layout(&self, index: usize) -> Option<&LayoutEntry> {
        self.layouts.get(index)
    }

    pub fn slide_size(&self) -> SlideSize {
        self.slide_size
    }

    pub fn slides(&self) -> &[SlideRef] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn has_notes_master(&self) -> bool {
        self.notes_master.is_some()
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Remove every existing slide with its notes.
    ///
    /// Relationships to slides missing from the slide list are dropped too.
    pub fn strip_slides(&mut self) -> Result<usize> {
        let stray: Vec<(String, String)> = self
            .pres_rels
            .of_kind(rel_types::SLIDE)
            .map(|r| (r.id.clone(), Package::resolve_path(&self.main_part, &r.target)))
            .collect();

        let mut removed = 0;
        for (rel_id, part) in stray {
            self.pres_rels.remove(&rel_id);
            if self.package.exists(&part) {
                self.remove_slide_part(&part)?;
                removed += 1;
            }
        }
        self.slides.clear();
        self.slides_stripped = true;

        tracing::debug!(removed, "template slides stripped");
        Ok(removed)
    }

    fn remove_slide_part(&mut self, part: &str) -> Result<()> {
        let rels = self.package.read_relationships(part)?;
        for rel in rels.of_kind(rel_types::NOTES_SLIDE) {
            let notes = Package::resolve_path(part, &rel.target);
            self.remove_part_with_rels(&notes);
        }
        self.remove_part_with_rels(part);
        Ok(())
    }

    fn remove_part_with_rels(&mut self, part: &str) {
        self.package.remove_part(part);
        self.package.remove_part(&Package::rels_path_for(part));
        self.types.overrides.remove(part);
    }

    /// First `{prefix}{n}.{ext}` not present in the package.
    fn free_part_name(&self, prefix: &str, ext: &str) -> String {
        (1..)
            .map(|n| format!("{}{}.{}", prefix, n, ext))
            .find(|name| !self.package.exists(name))
            .unwrap_or_else(|| format!("{}.{}", prefix, ext))
    }

    fn next_slide_id(&self) -> u32 {
        self.slides
            .iter()
            .map(|s| s.id)
            .max()
            .unwrap_or(0)
            .max(MIN_SLIDE_ID - 1)
            + 1
    }

    /// Append a slide built from a draft and return its part name.
    ///
    /// An image or notes that cannot be written are recorded in
    /// `diagnostics` against `slide_index`; the slide is still added.
    pub fn add_slide(
        &mut self,
        draft: &SlideDraft<'_>,
        diagnostics: &mut Diagnostics,
        slide_index: usize,
    ) -> Result<String> {
        let layout = self
            .layouts
            .get(draft.layout)
            .cloned()
            .ok_or(Error::NoUsableLayout)?;

        let part = self.free_part_name("ppt/slides/slide", "xml");
        let mut rels = Relationships::new();
        rels.add_internal(
            rel_types::SLIDE_LAYOUT,
            Package::relative_target(&part, &layout.part),
        );

        let mut picture: Option<(String, ImagePlacement)> = None;
        if let Some(image) = &draft.image {
            match self.add_media(image.data, image.content_type) {
                Ok(media_part) => {
                    let rel_id = rels.add_internal(
                        rel_types::IMAGE,
                        Package::relative_target(&part, &media_part),
                    );
                    picture = Some((rel_id, image.placement));
                }
                Err(e) => {
                    diagnostics.degrade(Some(slide_index), StylingAspect::Image, e.to_string())
                }
            }
        }

        let xml = slide_xml(
            &layout,
            &draft.fills,
            picture.as_ref().map(|(rel_id, placement)| (rel_id.as_str(), *placement)),
        );
        self.package.put_xml(part.clone(), xml);
        self.types.set_override(&part, SLIDE_CONTENT_TYPE);

        if let Some(notes) = draft.notes.as_deref().filter(|n| !n.is_empty()) {
            if let Err(e) = self.add_notes(&part, &mut rels, notes) {
                diagnostics.degrade(Some(slide_index), StylingAspect::Notes, e.to_string());
            }
        }
        self.package.write_relationships(&part, &rels);

        let rel_id = self.pres_rels.add_internal(
            rel_types::SLIDE,
            Package::relative_target(&self.main_part, &part),
        );
        let id = self.next_slide_id();
        self.slides.push(SlideRef {
            id,
            rel_id,
            part: part.clone(),
        });

        tracing::debug!(%part, layout = %layout.name, "slide added");
        Ok(part)
    }

    /// Write a notes slide for `slide_part` and link it from `slide_rels`.
    fn add_notes(
        &mut self,
        slide_part: &str,
        slide_rels: &mut Relationships,
        notes: &str,
    ) -> Result<()> {
        let master = self.ensure_notes_master()?;
        let part = self.free_part_name("ppt/notesSlides/notesSlide", "xml");

        let mut rels = Relationships::new();
        rels.add_internal(rel_types::NOTES_MASTER, Package::relative_target(&part, &master));
        rels.add_internal(rel_types::SLIDE, Package::relative_target(&part, slide_part));

        self.package.put_xml(part.clone(), notes_xml(notes));
        self.package.write_relationships(&part, &rels);
        self.types.set_override(&part, NOTES_SLIDE_CONTENT_TYPE);

        slide_rels.add_internal(
            rel_types::NOTES_SLIDE,
            Package::relative_target(slide_part, &part),
        );
        Ok(())
    }

    /// The notes master, adding the built-in one (with its own theme) if
    /// the template has none.
    fn ensure_notes_master(&mut self) -> Result<String> {
        if let Some(existing) = &self.notes_master {
            return Ok(existing.clone());
        }

        let theme = self.free_part_name("ppt/theme/theme", "xml");
        self.package.put_xml(theme.clone(), THEME_XML.to_string());
        self.types.set_override(&theme, THEME_CONTENT_TYPE);

        let part = self.free_part_name("ppt/notesMasters/notesMaster", "xml");
        let mut rels = Relationships::new();
        rels.add_internal(rel_types::THEME, Package::relative_target(&part, &theme));
        self.package.put_xml(part.clone(), NOTES_MASTER_XML.to_string());
        self.package.write_relationships(&part, &rels);
        self.types.set_override(&part, NOTES_MASTER_CONTENT_TYPE);

        let rel_id = self.pres_rels.add_internal(
            rel_types::NOTES_MASTER,
            Package::relative_target(&self.main_part, &part),
        );
        self.provisioned_notes_rel = Some(rel_id);
        self.notes_master = Some(part.clone());

        tracing::debug!(%part, %theme, "notes master provisioned");
        Ok(part)
    }

    /// Store image bytes under `ppt/media/`, reusing an identical part.
    pub fn add_media(&mut self, data: &[u8], content_type: &str) -> Result<String> {
        let ext = media_extension(content_type)
            .ok_or_else(|| Error::InvalidData(format!("unsupported image type {}", content_type)))?;

        if let Some(existing) = self
            .media
            .iter()
            .find(|m| self.package.read_binary(m).map(|b| b == data).unwrap_or(false))
        {
            return Ok(existing.clone());
        }

        let part = self.free_part_name("ppt/media/image", ext);
        self.package.put_part(part.clone(), data.to_vec());
        self.types.ensure_default(ext, content_type);
        self.media.push(part.clone());
        Ok(part)
    }

    /// Main part XML with the slide list (and a provisioned notes master)
    /// written in schema position.
    fn rewrite_presentation(&self) -> Result<String> {
        let xml = self.package.read_xml(&self.main_part)?;
        let mut reader = Reader::from_str(&xml);
        let mut writer = Writer::new(Vec::with_capacity(xml.len() + self.slides.len() * 64));

        let mut buf = Vec::new();
        let mut skip = Vec::new();
        let mut depth = 0usize;
        let mut prefix = String::from("p");
        let mut rel_prefix = String::from("r");
        let mut pending_notes = self.provisioned_notes_rel.is_some();
        let mut pending_slides = true;

        loop {
            let event = reader.read_event_into(&mut buf)?;
            match event {
                Event::Start(e) if depth == 0 => {
                    let (root, p, r) = self.root_start(&e);
                    prefix = p;
                    rel_prefix = r;
                    writer.write_event(Event::Start(root))?;
                    depth = 1;
                }
                Event::Empty(e) if depth == 0 => {
                    let (root, p, r) = self.root_start(&e);
                    prefix = p;
                    rel_prefix = r;
                    writer.write_event(Event::Start(root.borrow()))?;
                    self.flush_lists(
                        &mut writer,
                        &prefix,
                        &rel_prefix,
                        &mut pending_notes,
                        &mut pending_slides,
                    )?;
                    writer.write_event(Event::End(root.to_end()))?;
                }
                Event::Start(e) => {
                    let local = e.local_name().as_ref().to_vec();
                    if depth == 1 {
                        self.flush_before(
                            &mut writer,
                            &prefix,
                            &rel_prefix,
                            child_rank(&local),
                            &mut pending_notes,
                            &mut pending_slides,
                        )?;
                    }
                    if self.is_replaced(depth, &local, &e) {
                        let end = e.name().as_ref().to_vec();
                        reader.read_to_end_into(QName(&end), &mut skip)?;
                        skip.clear();
                    } else {
                        writer.write_event(Event::Start(e))?;
                        depth += 1;
                    }
                }
                Event::Empty(e) => {
                    let local = e.local_name().as_ref().to_vec();
                    if depth == 1 {
                        self.flush_before(
                            &mut writer,
                            &prefix,
                            &rel_prefix,
                            child_rank(&local),
                            &mut pending_notes,
                            &mut pending_slides,
                        )?;
                    }
                    if !self.is_replaced(depth, &local, &e) {
                        writer.write_event(Event::Empty(e))?;
                    }
                }
                Event::End(e) => {
                    if depth == 1 {
                        self.flush_lists(
                            &mut writer,
                            &prefix,
                            &rel_prefix,
                            &mut pending_notes,
                            &mut pending_slides,
                        )?;
                    }
                    depth = depth.saturating_sub(1);
                    writer.write_event(Event::End(e))?;
                }
                Event::Eof => break,
                other => writer.write_event(other)?,
            }
            buf.clear();
        }

        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::SerializationFailed(e.to_string()))
    }

    /// Root element with the relationships namespace declared, plus the
    /// root prefix and the prefix bound to relationship ids.
    fn root_start(&self, e: &BytesStart<'_>) -> (BytesStart<'static>, String, String) {
        let mut root = e.clone().into_owned();
        let prefix = e
            .name()
            .prefix()
            .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned())
            .unwrap_or_default();

        let declared = e.attributes().flatten().find_map(|a| {
            let key = a.key.as_ref();
            let bound = key.strip_prefix(b"xmlns:")?;
            (a.value.as_ref() == RELATIONSHIPS_NS.as_bytes())
                .then(|| String::from_utf8_lossy(bound).into_owned())
        });
        let rel_prefix = match declared {
            Some(p) => p,
            None => {
                root.push_attribute(("xmlns:r", RELATIONSHIPS_NS));
                "r".to_string()
            }
        };
        (root, prefix, rel_prefix)
    }

    /// Whether an existing element is dropped in favor of a rewritten one.
    fn is_replaced(&self, depth: usize, local: &[u8], e: &BytesStart<'_>) -> bool {
        match local {
            b"sldIdLst" => depth == 1,
            b"notesMasterIdLst" => depth == 1 && self.provisioned_notes_rel.is_some(),
            b"ext" => {
                self.slides_stripped
                    && attr(e, b"uri").as_deref() == Some(SECTION_LIST_EXT_URI)
            }
            _ => false,
        }
    }

    fn flush_before(
        &self,
        writer: &mut Writer<Vec<u8>>,
        prefix: &str,
        rel_prefix: &str,
        rank: u8,
        pending_notes: &mut bool,
        pending_slides: &mut bool,
    ) -> Result<()> {
        if *pending_notes && rank > child_rank(b"notesMasterIdLst") {
            self.write_notes_list(writer, prefix, rel_prefix)?;
            *pending_notes = false;
        }
        if *pending_slides && rank > child_rank(b"sldIdLst") {
            self.write_slide_list(writer, prefix, rel_prefix)?;
            *pending_slides = false;
        }
        Ok(())
    }

    fn flush_lists(
        &self,
        writer: &mut Writer<Vec<u8>>,
        prefix: &str,
        rel_prefix: &str,
        pending_notes: &mut bool,
        pending_slides: &mut bool,
    ) -> Result<()> {
        self.flush_before(writer, prefix, rel_prefix, u8::MAX, pending_notes, pending_slides)
    }

    fn write_notes_list(
        &self,
        writer: &mut Writer<Vec<u8>>,
        prefix: &str,
        rel_prefix: &str,
    ) -> Result<()> {
        let Some(rel_id) = &self.provisioned_notes_rel else {
            return Ok(());
        };
        let list = qualified(prefix, "notesMasterIdLst");
        writer.write_event(Event::Start(BytesStart::new(list.as_str())))?;
        let rel_attr = qualified(rel_prefix, "id");
        writer.write_event(Event::Empty(
            BytesStart::new(qualified(prefix, "notesMasterId"))
                .with_attributes([(rel_attr.as_str(), rel_id.as_str())]),
        ))?;
        writer.write_event(Event::End(BytesEnd::new(list.as_str())))?;
        Ok(())
    }

    fn write_slide_list(
        &self,
        writer: &mut Writer<Vec<u8>>,
        prefix: &str,
        rel_prefix: &str,
    ) -> Result<()> {
        if self.slides.is_empty() {
            return Ok(());
        }
        let list = qualified(prefix, "sldIdLst");
        let rel_attr = qualified(rel_prefix, "id");
        writer.write_event(Event::Start(BytesStart::new(list.as_str())))?;
        for slide in &self.slides {
            let id = slide.id.to_string();
            writer.write_event(Event::Empty(
                BytesStart::new(qualified(prefix, "sldId"))
                    .with_attributes([
                        ("id", id.as_str()),
                        (rel_attr.as_str(), slide.rel_id.as_str()),
                    ]),
            ))?;
        }
        writer.write_event(Event::End(BytesEnd::new(list.as_str())))?;
        Ok(())
    }

    /// Serialize the deck as a `.pptx` archive.
    ///
    /// The main part is always labelled as a regular presentation, and parts
    /// no longer reachable (stripped slides, unused media) are dropped.
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        self.finish().map_err(|e| match e {
            Error::SerializationFailed(_) => e,
            other => Error::SerializationFailed(other.to_string()),
        })
    }

    fn finish(&mut self) -> Result<Vec<u8>> {
        let xml = self.rewrite_presentation()?;
        self.package.put_xml(self.main_part.clone(), xml);
        self.package.write_relationships(&self.main_part, &self.pres_rels);

        self.types.set_override(&self.main_part, PRESENTATION_CONTENT_TYPE);
        self.types
            .ensure_default("rels", "application/vnd.openxmlformats-package.relationships+xml");
        self.types.ensure_default("xml", "application/xml");
        self.package.set_content_types(&self.types);

        let pruned = self.package.prune_unreachable()?;
        tracing::debug!(slides = self.slides.len(), pruned, "deck serialized");
        self.package.to_bytes()
    }
}

fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}
