//! Owned OPC package: the zip parts of a presentation held in memory.
//!
//! A [`Package`] copies every part out of the archive on open, so anything
//! derived from it stays valid after the source bytes are dropped, and the
//! generator can edit parts freely before writing a fresh archive.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

/// Name of the content types part.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Relationship type suffixes (the last path segment of the type URI).
pub mod rel_types {
    pub const OFFICE_DOCUMENT: &str = "officeDocument";
    pub const SLIDE: &str = "slide";
    pub const SLIDE_LAYOUT: &str = "slideLayout";
    pub const SLIDE_MASTER: &str = "slideMaster";
    pub const NOTES_SLIDE: &str = "notesSlide";
    pub const NOTES_MASTER: &str = "notesMaster";
    pub const THEME: &str = "theme";
    pub const IMAGE: &str = "image";

    const BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/";

    /// Full transitional type URI for a suffix.
    pub fn uri(kind: &str) -> String {
        format!("{}{}", BASE, kind)
    }
}

/// A relationship entry from a .rels file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute)
    pub target: String,
    /// Whether the target is external
    pub external: bool,
}

impl Relationship {
    /// Whether the type URI ends with the given suffix (e.g. `"slide"`).
    ///
    /// Matching on the suffix accepts both transitional and strict URIs.
    pub fn is_kind(&self, kind: &str) -> bool {
        self.rel_type.rsplit('/').next() == Some(kind)
    }
}

/// Relationships of one part, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    /// Internal relationships whose type ends with `kind`.
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.entries
            .iter()
            .filter(move |r| !r.external && r.is_kind(kind))
    }

    /// All relationships in order.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    /// Add a relationship.
    pub fn add(&mut self, rel: Relationship) {
        self.entries.push(rel);
    }

    /// Add an internal relationship under a fresh ID and return the ID.
    pub fn add_internal(&mut self, kind: &str, target: impl Into<String>) -> String {
        let id = self.next_id();
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: rel_types::uri(kind),
            target: target.into(),
            external: false,
        });
        id
    }

    /// Remove a relationship by ID.
    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let pos = self.entries.iter().position(|r| r.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// First `rIdN` not yet in use.
    pub fn next_id(&self) -> String {
        let max = self
            .entries
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to a .rels XML document.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.entries.len() * 160);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for rel in &self.entries {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                escape_xml(&rel.id),
                escape_xml(&rel.rel_type),
                escape_xml(&rel.target)
            ));
            if rel.external {
                xml.push_str(r#" TargetMode="External""#);
            }
            xml.push_str("/>");
        }
        xml.push_str("</Relationships>");
        xml
    }

    /// Parse a .rels XML document.
    pub fn parse(content: &str) -> Result<Self> {
        let mut rels = Relationships::new();
        if content.trim().is_empty() {
            return Ok(rels);
        }

        let mut reader = quick_xml::Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Empty(e)) | Ok(quick_xml::events::Event::Start(e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut id = String::new();
                    let mut rel_type = String::new();
                    let mut target = String::new();
                    let mut external = false;

                    for attr in e.attributes().flatten() {
                        let value = attr
                            .unescape_value()
                            .map(|v| v.into_owned())
                            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
                        match attr.key.as_ref() {
                            b"Id" => id = value,
                            b"Type" => rel_type = value,
                            b"Target" => target = value,
                            b"TargetMode" => external = value.eq_ignore_ascii_case("external"),
                            _ => {}
                        }
                    }

                    if !id.is_empty() {
                        rels.add(Relationship {
                            id,
                            rel_type,
                            target,
                            external,
                        });
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }
}

#[derive(Debug, Deserialize)]
struct TypesXml {
    #[serde(rename = "$value", default)]
    entries: Vec<TypeEntryXml>,
}

#[derive(Debug, Deserialize)]
enum TypeEntryXml {
    Default {
        #[serde(rename = "@Extension")]
        extension: String,
        #[serde(rename = "@ContentType")]
        content_type: String,
    },
    Override {
        #[serde(rename = "@PartName")]
        part_name: String,
        #[serde(rename = "@ContentType")]
        content_type: String,
    },
}

/// Parsed `[Content_Types].xml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    /// Lower-cased extension to content type.
    pub defaults: BTreeMap<String, String>,
    /// Part name (without leading slash) to content type.
    pub overrides: BTreeMap<String, String>,
}

impl ContentTypes {
    /// Parse the content types XML.
    pub fn parse(xml: &str) -> Result<Self> {
        let parsed: TypesXml = quick_xml::de::from_str(xml)?;
        let mut types = ContentTypes::default();
        for entry in parsed.entries {
            match entry {
                TypeEntryXml::Default {
                    extension,
                    content_type,
                } => {
                    types.defaults.insert(extension.to_lowercase(), content_type);
                }
                TypeEntryXml::Override {
                    part_name,
                    content_type,
                } => {
                    types
                        .overrides
                        .insert(part_name.trim_start_matches('/').to_string(), content_type);
                }
            }
        }
        Ok(types)
    }

    /// Content type of a part, by override then by extension.
    pub fn content_type_for(&self, part: &str) -> Option<&str> {
        let part = part.trim_start_matches('/');
        if let Some(ct) = self.overrides.get(part) {
            return Some(ct);
        }
        let ext = part.rsplit('.').next()?.to_lowercase();
        self.defaults.get(&ext).map(String::as_str)
    }

    /// Set an override for a part.
    pub fn set_override(&mut self, part: &str, content_type: &str) {
        self.overrides.insert(
            part.trim_start_matches('/').to_string(),
            content_type.to_string(),
        );
    }

    /// Ensure a default exists for an extension.
    pub fn ensure_default(&mut self, extension: &str, content_type: &str) {
        self.defaults
            .entry(extension.to_lowercase())
            .or_insert_with(|| content_type.to_string());
    }

    /// Serialize to XML.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(512 + self.overrides.len() * 160);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(ct)
            ));
        }
        for (part, ct) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="/{}" ContentType="{}"/>"#,
                escape_xml(part),
                escape_xml(ct)
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}

/// Fix XML encoding declaration from UTF-16 to UTF-8.
///
/// Once UTF-16 bytes are decoded into a Rust `String` the declaration no
/// longer matches the data, and quick-xml would try to re-decode it.
fn fix_xml_encoding_declaration(content: &str) -> String {
    if content.starts_with("<?xml") {
        if let Some(end_decl) = content.find("?>") {
            let decl = &content[..end_decl + 2];
            let rest = &content[end_decl + 2..];

            let fixed_decl = decl
                .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='UTF-16'", "encoding='UTF-8'")
                .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='utf-16'", "encoding='UTF-8'");

            return format!("{}{}", fixed_decl, rest);
        }
    }
    content.to_string()
}

/// Decode XML bytes handling different encodings (UTF-8, UTF-16 LE/BE).
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8(bytes[3..].to_vec())
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)));
    }

    if bytes.starts_with(&[0xFF, 0xFE]) {
        let content = decode_utf16(&bytes[2..], u16::from_le_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    if bytes.starts_with(&[0xFE, 0xFF]) {
        let content = decode_utf16(&bytes[2..], u16::from_be_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        Err(_) => {
            // ASCII markup in UTF-16 leaves a zero in every other byte
            if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 {
                decode_utf16(bytes, u16::from_le_bytes)
            } else if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 {
                decode_utf16(bytes, u16::from_be_bytes)
            } else {
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Escape text for use in XML content or attribute values.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Control characters other than tab/newline are not valid XML 1.0
            c if (c as u32) < 0x20 && c != '\t' && c != '\n' && c != '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// An OPC package held fully in memory.
#[derive(Clone, Default)]
pub struct Package {
    parts: BTreeMap<String, Vec<u8>>,
}

impl Package {
    /// Create an empty package.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a package from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Create a package from a reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Read every part of a zip archive into memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
        let mut parts = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            let mut bytes = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut bytes)?;
            parts.insert(name, bytes);
        }
        Ok(Self { parts })
    }

    /// Read an XML part as a string, handling UTF-8 and UTF-16 encodings.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        decode_xml_bytes(self.read_binary(path)?)
    }

    /// Borrow a part's raw bytes.
    pub fn read_binary(&self, path: &str) -> Result<&[u8]> {
        self.parts
            .get(path)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::MissingComponent(path.to_string()))
    }

    /// Check if a part exists.
    pub fn exists(&self, path: &str) -> bool {
        self.parts.contains_key(path)
    }

    /// List all part names.
    pub fn list_files(&self) -> Vec<String> {
        self.parts.keys().cloned().collect()
    }

    /// List part names matching a prefix.
    pub fn list_files_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.parts
            .range(prefix.to_string()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Insert or replace a part.
    pub fn put_part(&mut self, path: impl Into<String>, data: Vec<u8>) {
        self.parts.insert(path.into(), data);
    }

    /// Insert or replace an XML part.
    pub fn put_xml(&mut self, path: impl Into<String>, xml: String) {
        self.put_part(path, xml.into_bytes());
    }

    /// Remove a part, returning its bytes.
    pub fn remove_part(&mut self, path: &str) -> Option<Vec<u8>> {
        self.parts.remove(path)
    }

    /// Path of the .rels part belonging to a part.
    pub fn rels_path_for(part_path: &str) -> String {
        if part_path.is_empty() || part_path == "/" {
            return "_rels/.rels".to_string();
        }
        match part_path.rfind('/') {
            Some(pos) => format!("{}/_rels/{}.rels", &part_path[..pos], &part_path[pos + 1..]),
            None => format!("_rels/{}.rels", part_path),
        }
    }

    /// Read the relationships of a part. A missing .rels part is empty.
    pub fn read_relationships(&self, part_path: &str) -> Result<Relationships> {
        let rels_path = Self::rels_path_for(part_path);
        match self.read_xml(&rels_path) {
            Ok(content) => Relationships::parse(&content),
            Err(Error::MissingComponent(_)) => Ok(Relationships::new()),
            Err(e) => Err(e),
        }
    }

    /// Read package-level relationships (_rels/.rels).
    pub fn read_package_relationships(&self) -> Result<Relationships> {
        self.read_relationships("")
    }

    /// Replace the relationships of a part.
    pub fn write_relationships(&mut self, part_path: &str, rels: &Relationships) {
        self.put_xml(Self::rels_path_for(part_path), rels.to_xml());
    }

    /// Internal targets of a part's relationships of one kind, as part paths.
    pub fn related_parts(&self, part_path: &str, kind: &str) -> Result<Vec<String>> {
        let rels = self.read_relationships(part_path)?;
        Ok(rels
            .of_kind(kind)
            .map(|r| Self::resolve_path(part_path, &r.target))
            .collect())
    }

    /// Parse `[Content_Types].xml`.
    pub fn content_types(&self) -> Result<ContentTypes> {
        ContentTypes::parse(&self.read_xml(CONTENT_TYPES_PART)?)
    }

    /// Replace `[Content_Types].xml`.
    pub fn set_content_types(&mut self, types: &ContentTypes) {
        self.put_xml(CONTENT_TYPES_PART, types.to_xml());
    }

    /// Resolve a relative path from a base path.
    pub fn resolve_path(base: &str, relative: &str) -> String {
        if let Some(stripped) = relative.strip_prefix('/') {
            return stripped.to_string();
        }

        let base_path = Path::new(base);
        let base_dir = base_path.parent().unwrap_or(Path::new(""));

        let mut result = base_dir.to_path_buf();
        for component in Path::new(relative).components() {
            match component {
                std::path::Component::ParentDir => {
                    result.pop();
                }
                std::path::Component::Normal(c) => {
                    result.push(c);
                }
                _ => {}
            }
        }

        result.to_string_lossy().replace('\\', "/")
    }

    /// Relative target from one part to another, e.g. `../media/image1.png`.
    pub fn relative_target(from_part: &str, to_part: &str) -> String {
        let from_dir: Vec<&str> = match from_part.rfind('/') {
            Some(pos) => from_part[..pos].split('/').collect(),
            None => Vec::new(),
        };
        let to: Vec<&str> = to_part.split('/').collect();
        let (to_dir, to_file) = to.split_at(to.len().saturating_sub(1));

        let common = from_dir
            .iter()
            .zip(to_dir.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut segments: Vec<&str> = vec![".."; from_dir.len() - common];
        segments.extend(&to_dir[common..]);
        segments.extend(to_file);
        segments.join("/")
    }

    /// Drop every part not reachable from the package relationships.
    ///
    /// Overrides for dropped parts are removed from the content types.
    /// Returns the number of parts removed.
    pub fn prune_unreachable(&mut self) -> Result<usize> {
        let mut keep: BTreeSet<String> = BTreeSet::new();
        keep.insert(CONTENT_TYPES_PART.to_string());

        let mut queue: VecDeque<String> = VecDeque::new();
        queue.push_back(String::new());

        while let Some(part) = queue.pop_front() {
            let rels_path = Self::rels_path_for(&part);
            if !self.exists(&rels_path) {
                continue;
            }
            keep.insert(rels_path);
            for rel in self.read_relationships(&part)?.iter() {
                if rel.external {
                    continue;
                }
                let target = Self::resolve_path(&part, &rel.target);
                if self.exists(&target) && keep.insert(target.clone()) {
                    queue.push_back(target);
                }
            }
        }

        let doomed: Vec<String> = self
            .parts
            .keys()
            .filter(|name| !keep.contains(*name))
            .cloned()
            .collect();

        if !doomed.is_empty() && self.exists(CONTENT_TYPES_PART) {
            let mut types = self.content_types()?;
            types.overrides.retain(|part, _| keep.contains(part));
            self.set_content_types(&types);
        }

        for name in &doomed {
            tracing::debug!(part = %name, "dropping unreferenced part");
            self.parts.remove(name);
        }
        Ok(doomed.len())
    }

    /// Serialize the package to zip bytes.
    ///
    /// `[Content_Types].xml` and the package relationships are written first.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let leading = [CONTENT_TYPES_PART, "_rels/.rels"];
        let ordered = leading
            .iter()
            .filter_map(|name| self.parts.get_key_value(*name))
            .chain(
                self.parts
                    .iter()
                    .filter(|(name, _)| !leading.contains(&name.as_str())),
            );

        for (name, data) in ordered {
            zip.start_file(name.as_str(), options)
                .map_err(|e| Error::SerializationFailed(e.to_string()))?;
            zip.write_all(data)
                .map_err(|e| Error::SerializationFailed(e.to_string()))?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| Error::SerializationFailed(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

impl std::fmt::Debug for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Package")
            .field("parts", &self.parts.len())
            .finish()
    }
}
