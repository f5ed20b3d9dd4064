//! ZIP container abstraction for OOXML packages.
//!
//! The container owns the raw package for the duration of one import and
//! exposes two explicit read operations: [`OoxmlContainer::read_xml`] for a
//! bare part and [`OoxmlContainer::read_part`] for a part together with its
//! `_rels` sidecar.

use crate::error::{Error, Result};
use crate::xml::attr_value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

/// Location of the package-level relationships.
pub const PACKAGE_RELATIONSHIPS: &str = "_rels/.rels";

/// Whether a relationship target lives inside the package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetMode {
    /// Target is a package part, resolved against the owning part's directory
    #[default]
    Internal,
    /// Target is an external URL and is kept verbatim
    External,
}

/// A relationship entry from a .rels file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target: a normalized package path for internal targets, verbatim otherwise
    pub target: String,
    /// Internal or external target
    pub target_mode: TargetMode,
}

impl Relationship {
    /// The last segment of the type URI, e.g. `"officeDocument"` or `"styles"`.
    ///
    /// Transitional and strict packages use different namespace prefixes, so
    /// dispatch happens on this suffix rather than on the full URI.
    pub fn kind(&self) -> &str {
        self.rel_type.rsplit('/').next().unwrap_or(&self.rel_type)
    }

    /// Whether the target points outside the package.
    pub fn is_external(&self) -> bool {
        self.target_mode == TargetMode::External
    }
}

/// Collection of relationships parsed from a .rels file.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    /// Map from relationship ID to relationship data
    pub by_id: HashMap<String, Relationship>,
    /// Map from type suffix to relationships, in declaration order
    pub by_kind: HashMap<String, Vec<Relationship>>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id)
    }

    /// First relationship declared with the given type suffix.
    pub fn find_by_kind(&self, kind: &str) -> Option<&Relationship> {
        self.by_kind.get(kind).and_then(|v| v.first())
    }

    /// Add a relationship.
    pub fn add(&mut self, rel: Relationship) {
        self.by_kind
            .entry(rel.kind().to_string())
            .or_default()
            .push(rel.clone());
        self.by_id.insert(rel.id.clone(), rel);
    }

    /// Number of relationships.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// An XML part read together with its relationship sidecar.
#[derive(Debug, Clone)]
pub struct Part {
    /// Normalized package path of the part
    pub path: String,
    /// Decoded XML text
    pub xml: String,
    /// Relationships owned by this part (empty when no sidecar exists)
    pub relationships: Relationships,
}

/// Fix XML encoding declaration from UTF-16 to UTF-8.
///
/// After decoding UTF-16 into a Rust `String` the declaration still claims
/// UTF-16, which makes quick-xml misinterpret the already decoded text.
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
    // UTF-8 BOM: EF BB BF
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
            // BOM-less UTF-16: ASCII markup leaves a zero in every other byte
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

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));

    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Normalize a ZIP entry name into a package path.
fn normalize_entry_name(name: &str) -> String {
    name.replace('\\', "/").trim_start_matches('/').to_string()
}

/// OOXML container abstraction over a ZIP archive.
pub struct OoxmlContainer {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
    /// Normalized path -> raw entry name, file entries only
    entries: HashMap<String, String>,
}

impl OoxmlContainer {
    /// Open an OOXML container from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use xlsx_ingest::container::OoxmlContainer;
    ///
    /// let container = OoxmlContainer::open("book.xlsx")?;
    /// # Ok::<(), xlsx_ingest::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Create an OOXML container from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))?;

        let entries = archive
            .file_names()
            .filter(|name| !name.ends_with('/') && !name.ends_with('\\'))
            .map(|name| (normalize_entry_name(name), name.to_string()))
            .collect::<HashMap<_, _>>();
        log::debug!("opened package with {} entries", entries.len());

        Ok(Self {
            archive: RefCell::new(archive),
            entries,
        })
    }

    /// Create an OOXML container from a reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Read an XML part from the archive as a string.
    ///
    /// Fails with [`Error::PartNotFound`] when no file entry matches `path`.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let bytes = self.read_binary(path)?;
        decode_xml_bytes(&bytes)
    }

    /// Read an XML part together with its relationship sidecar.
    pub fn read_part(&self, path: &str) -> Result<Part> {
        let path = normalize_entry_name(path);
        let xml = self.read_xml(&path)?;
        let relationships = self.read_relationships(&path)?;
        log::debug!(
            "read part {} ({} bytes, {} relationships)",
            path,
            xml.len(),
            relationships.len()
        );
        Ok(Part {
            path,
            xml,
            relationships,
        })
    }

    /// Read a binary entry from the archive.
    pub fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        let name = self
            .entries
            .get(&normalize_entry_name(path))
            .ok_or_else(|| Error::PartNotFound(path.to_string()))?;

        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(name)
            .map_err(|_| Error::PartNotFound(path.to_string()))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Check if a file entry exists in the archive.
    pub fn exists(&self, path: &str) -> bool {
        self.entries.contains_key(&normalize_entry_name(path))
    }

    /// List all file entries in the archive.
    pub fn list_files(&self) -> Vec<String> {
        let mut files: Vec<String> = self.entries.keys().cloned().collect();
        files.sort();
        files
    }

    /// Sidecar path holding the relationships of `part_path`.
    ///
    /// The package root (empty path) maps to `_rels/.rels`.
    pub fn relationships_path(part_path: &str) -> String {
        let part_path = part_path.trim_start_matches('/');
        if part_path.is_empty() {
            return PACKAGE_RELATIONSHIPS.to_string();
        }
        match part_path.rfind('/') {
            Some(slash) => format!(
                "{}/_rels/{}.rels",
                &part_path[..slash],
                &part_path[slash + 1..]
            ),
            None => format!("_rels/{}.rels", part_path),
        }
    }

    /// Read and parse the relationships owned by a part.
    ///
    /// A part without a sidecar owns no relationships; that is not an error.
    pub fn read_relationships(&self, part_path: &str) -> Result<Relationships> {
        let rels_path = Self::relationships_path(part_path);
        if !self.exists(&rels_path) {
            log::trace!("no relationships sidecar at {}", rels_path);
            return Ok(Relationships::new());
        }
        let content = self.read_xml(&rels_path)?;
        Self::parse_relationships(&content, part_path)
    }

    /// Read package-level relationships (`_rels/.rels`).
    pub fn read_package_relationships(&self) -> Result<Relationships> {
        self.read_relationships("")
    }

    /// Parse a relationships document owned by `owner`.
    pub fn parse_relationships(content: &str, owner: &str) -> Result<Relationships> {
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
                    let mut target_mode = TargetMode::Internal;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = attr_value(&attr),
                            b"Type" => rel_type = attr_value(&attr),
                            b"Target" => target = attr_value(&attr),
                            b"TargetMode" => {
                                if attr_value(&attr).eq_ignore_ascii_case("external") {
                                    target_mode = TargetMode::External;
                                }
                            }
                            _ => {}
                        }
                    }

                    if !id.is_empty() {
                        let target = match target_mode {
                            TargetMode::Internal => Self::resolve_path(owner, &target),
                            TargetMode::External => target,
                        };
                        rels.add(Relationship {
                            id,
                            rel_type,
                            target,
                            target_mode,
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

    /// Resolve a relative target against the directory of `base`.
    ///
    /// Absolute targets (leading `/`) are package-rooted. `..` never climbs
    /// above the package root.
    pub fn resolve_path(base: &str, relative: &str) -> String {
        let mut segments: Vec<&str> = Vec::new();

        let relative = match relative.strip_prefix('/') {
            Some(stripped) => stripped,
            None => {
                if let Some(slash) = base.rfind('/') {
                    segments.extend(base[..slash].split('/').filter(|s| !s.is_empty()));
                }
                relative
            }
        };

        for segment in relative.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }

        segments.join("/")
    }
}

impl std::fmt::Debug for OoxmlContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlContainer")
            .field("files", &self.entries.len())
            .finish()
    }
}
