//! ZIP package accessor for PPTX presentations.
//!
//! Wraps the archive both ways: parts and relationships are read on demand,
//! and modified parts are staged in memory until the caller saves the whole
//! package. Untouched entries are carried over verbatim on save.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Package path of the presentation root part.
pub const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Package path of the core document properties part.
pub const CORE_PROPERTIES_PART: &str = "docProps/core.xml";

/// A relationship entry from a .rels file.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute) or external URI
    pub target: String,
    /// Whether the target is external
    pub external: bool,
}

impl Relationship {
    /// Check the relationship type by its trailing segment, e.g. `"slide"`
    /// or `"slideMaster"`.
    pub fn has_type(&self, suffix: &str) -> bool {
        self.rel_type
            .rsplit('/')
            .next()
            .is_some_and(|tail| tail == suffix)
    }
}

/// Relationships of one part, in .rels document order.
///
/// Document order is what "package order" means for part enumeration:
/// masters and layouts are visited in the order their relationships appear.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    /// All relationships in document order
    pub ordered: Vec<Relationship>,
    /// Map from relationship ID to index into `ordered`
    by_id: HashMap<String, usize>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id).map(|&i| &self.ordered[i])
    }

    /// Relationships whose type ends with the given segment, in document order.
    pub fn of_type(&self, suffix: &str) -> Vec<&Relationship> {
        self.ordered.iter().filter(|r| r.has_type(suffix)).collect()
    }

    /// First relationship of the given type, if any.
    pub fn first_of_type(&self, suffix: &str) -> Option<&Relationship> {
        self.ordered.iter().find(|r| r.has_type(suffix))
    }

    /// Add a relationship.
    pub fn add(&mut self, rel: Relationship) {
        self.by_id.insert(rel.id.clone(), self.ordered.len());
        self.ordered.push(rel);
    }
}

/// Decode part bytes to a string, stripping a UTF-8 BOM if present.
fn decode_xml_bytes(bytes: &[u8]) -> String {
    let bytes = match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => rest,
        other => other,
    };
    String::from_utf8_lossy(bytes).into_owned()
}

/// A PPTX package opened from disk or memory.
///
/// Reading never mutates the archive. Writing stages replacement part bytes
/// in memory; [`PptxPackage::save`] re-serializes the archive, substituting
/// staged parts and copying everything else through unchanged.
pub struct PptxPackage {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
    staged: HashMap<String, Vec<u8>>,
    writable: bool,
    path: Option<PathBuf>,
}

impl PptxPackage {
    /// Open a package read-only from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = Self::read_file(path.as_ref())?;
        let mut package = Self::from_bytes(data)?;
        package.path = Some(path.as_ref().to_path_buf());
        Ok(package)
    }

    /// Open a package for writing from a file path.
    ///
    /// The file is not locked; changes live in memory until [`save`] or
    /// [`save_as`] is called.
    ///
    /// [`save`]: PptxPackage::save
    /// [`save_as`]: PptxPackage::save_as
    pub fn open_writable(path: impl AsRef<Path>) -> Result<Self> {
        let mut package = Self::open(path)?;
        package.writable = true;
        Ok(package)
    }

    /// Create a package from a byte vector (read-only).
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: RefCell::new(archive),
            staged: HashMap::new(),
            writable: false,
            path: None,
        })
    }

    /// Create a writable package from a byte vector.
    pub fn from_bytes_writable(data: Vec<u8>) -> Result<Self> {
        let mut package = Self::from_bytes(data)?;
        package.writable = true;
        Ok(package)
    }

    /// Create a package from a reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    fn read_file(path: &Path) -> Result<Vec<u8>> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Whether the package contains a presentation root part.
    pub fn has_presentation_root(&self) -> bool {
        self.exists(PRESENTATION_PART)
    }

    /// Read an XML part as a string. Staged replacements shadow the
    /// original archive entry.
    pub fn read_xml(&self, part: &str) -> Result<String> {
        if let Some(bytes) = self.staged.get(part) {
            return Ok(decode_xml_bytes(bytes));
        }
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(part)
            .map_err(|_| Error::MissingComponent(part.to_string()))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(decode_xml_bytes(&bytes))
    }

    /// Check if a part exists in the package.
    pub fn exists(&self, part: &str) -> bool {
        self.staged.contains_key(part)
            || self.archive.borrow().file_names().any(|n| n == part)
    }

    /// List all part names in the package.
    pub fn list_parts(&self) -> Vec<String> {
        self.archive.borrow().file_names().map(String::from).collect()
    }

    /// Read and parse the relationships of a part (its `_rels/*.rels`
    /// sibling). A part without a .rels file has no relationships, which is
    /// not an error.
    pub fn relationships(&self, part: &str) -> Result<Relationships> {
        let rels_path = Self::rels_path_for(part);
        let xml = match self.read_xml(&rels_path) {
            Ok(xml) => xml,
            Err(Error::MissingComponent(_)) => return Ok(Relationships::new()),
            Err(e) => return Err(e),
        };
        if xml.trim().is_empty() {
            return Ok(Relationships::new());
        }
        Self::parse_relationships(&xml)
    }

    /// Build the .rels path of a part: `ppt/slides/slide1.xml` ->
    /// `ppt/slides/_rels/slide1.xml.rels`.
    fn rels_path_for(part: &str) -> String {
        if part.is_empty() || part == "/" {
            return "_rels/.rels".to_string();
        }
        match part.rfind('/') {
            Some(slash) => format!("{}/_rels/{}.rels", &part[..slash], &part[slash + 1..]),
            None => format!("_rels/{}.rels", part),
        }
    }

    fn parse_relationships(xml: &str) -> Result<Relationships> {
        let mut rels = Relationships::new();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        loop {
            match reader.read_event() {
                Ok(quick_xml::events::Event::Empty(e))
                | Ok(quick_xml::events::Event::Start(e))
                    if e.name().local_name().as_ref() == b"Relationship" =>
                {
                    let mut id = String::new();
                    let mut rel_type = String::new();
                    let mut target = String::new();
                    let mut external = false;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                            b"TargetMode" => {
                                external = String::from_utf8_lossy(&attr.value)
                                    .eq_ignore_ascii_case("external")
                            }
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
        }

        Ok(rels)
    }

    /// Resolve a relationship target against the part it was declared on.
    ///
    /// `resolve_target("ppt/slides/slide1.xml", "../media/image1.png")`
    /// yields `ppt/media/image1.png`.
    pub fn resolve_target(base: &str, target: &str) -> String {
        if let Some(stripped) = target.strip_prefix('/') {
            return stripped.to_string();
        }

        let base_dir = Path::new(base).parent().unwrap_or(Path::new(""));
        let mut result = base_dir.to_path_buf();
        for component in Path::new(target).components() {
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

    /// Stage replacement bytes for a part. The archive on disk is not
    /// touched until [`save`](PptxPackage::save).
    pub fn replace_part(&mut self, part: &str, bytes: Vec<u8>) -> Result<()> {
        if !self.writable {
            return Err(Error::ReadOnlyPackage);
        }
        self.staged.insert(part.to_string(), bytes);
        Ok(())
    }

    /// Number of parts with staged replacements.
    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }

    /// Serialize the package, substituting staged parts, and return the
    /// archive bytes. Entry order follows the source archive.
    pub fn save_to_bytes(&self) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            let name = file.name().to_string();
            if file.is_dir() {
                writer.add_directory(name, options)?;
                continue;
            }
            writer.start_file(&*name, options)?;
            match self.staged.get(&name) {
                Some(bytes) => writer.write_all(bytes)?,
                None => {
                    std::io::copy(&mut file, &mut writer)?;
                }
            }
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }

    /// Save the package back to the path it was opened from.
    pub fn save(&self) -> Result<()> {
        if !self.writable {
            return Err(Error::ReadOnlyPackage);
        }
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| Error::InvalidData("package has no backing path".to_string()))?;
        std::fs::write(path, self.save_to_bytes()?)?;
        Ok(())
    }

    /// Save the package to a different path.
    pub fn save_as(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.save_to_bytes()?)?;
        Ok(())
    }
}

impl std::fmt::Debug for PptxPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PptxPackage")
            .field("parts", &self.archive.borrow().len())
            .field("staged", &self.staged.len())
            .field("writable", &self.writable)
            .finish()
    }
}
