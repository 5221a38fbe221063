//! Extraction: package tree -> flat [`PresentationData`] snapshot.
//!
//! One pass walks metadata, sizes, the presentation-level theme, the
//! masters with their layouts, and every slide in slide-id-list order.
//! Extraction is read-only and best-effort: apart from a package with no
//! presentation root, every defect degrades to a documented default and
//! is reported on the diagnostic channel.

mod master;
mod slide;
mod theme;

pub use slide::{classify_node, shape_tree_outline, NodeKind};
pub use theme::resolve_theme;

pub(crate) use slide::SlideEntry;

use crate::error::{Error, Result};
use crate::model::{NoteSize, PresentationData, SlideSize, TOOL_CREATOR};
use crate::package::{PptxPackage, Relationships, CORE_PROPERTIES_PART, PRESENTATION_PART};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Extract the whole presentation into a fresh [`PresentationData`].
///
/// Fails only when the package has no presentation root part.
pub fn extract_all(package: &PptxPackage) -> Result<PresentationData> {
    if !package.has_presentation_root() {
        return Err(Error::MissingPresentationRoot);
    }
    let presentation_xml = package.read_xml(PRESENTATION_PART)?;
    let root = parse_presentation_root(&presentation_xml)?;
    let pres_rels = package.relationships(PRESENTATION_PART)?;

    let mut data = PresentationData::default();
    read_core_properties(package, &mut data);
    data.slide_size = root.slide_size;
    data.note_size = root.note_size;
    // The presentation-level theme is resolved from the presentation
    // part's own theme relationship; masters resolve theirs independently.
    data.global_theme = resolve_theme(theme_xml(package, PRESENTATION_PART, &pres_rels).as_deref());
    data.slide_masters = master::extract_masters(package, &pres_rels)?;
    data.slides = slide::extract_slides(package, &root.slide_entries, &pres_rels)?;
    Ok(data)
}

/// What `ppt/presentation.xml` itself contributes: sizes and the ordered
/// slide-id list.
pub(crate) struct PresentationRoot {
    pub slide_size: SlideSize,
    pub note_size: NoteSize,
    pub slide_entries: Vec<SlideEntry>,
}

pub(crate) fn parse_presentation_root(xml: &str) -> Result<PresentationRoot> {
    let mut root = PresentationRoot {
        slide_size: SlideSize::default(),
        note_size: NoteSize::default(),
        slide_entries: Vec::new(),
    };
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = e.name();
                match name.local_name().as_ref() {
                    b"sldSz" => {
                        for attr in e.attributes().flatten() {
                            match attr.key.local_name().as_ref() {
                                b"cx" => root.slide_size.width = parse_emu(&attr.value),
                                b"cy" => root.slide_size.height = parse_emu(&attr.value),
                                b"type" => {
                                    root.slide_size.size_type =
                                        String::from_utf8_lossy(&attr.value).to_string()
                                }
                                _ => {}
                            }
                        }
                    }
                    b"notesSz" => {
                        for attr in e.attributes().flatten() {
                            match attr.key.local_name().as_ref() {
                                b"cx" => root.note_size.width = parse_emu(&attr.value),
                                b"cy" => root.note_size.height = parse_emu(&attr.value),
                                _ => {}
                            }
                        }
                    }
                    b"sldId" => {
                        if let Some(entry) = slide::parse_slide_id(&e) {
                            root.slide_entries.push(entry);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }
    Ok(root)
}

fn parse_emu(value: &[u8]) -> i64 {
    String::from_utf8_lossy(value).parse().unwrap_or(0)
}

/// Read docProps/core.xml into the metadata fields. A package without
/// core properties keeps the model defaults.
fn read_core_properties(package: &PptxPackage, data: &mut PresentationData) {
    let xml = match package.read_xml(CORE_PROPERTIES_PART) {
        Ok(xml) => xml,
        Err(_) => {
            log::debug!("package has no core properties part");
            return;
        }
    };
    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(true);

    let mut current: Option<Vec<u8>> = None;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                current = Some(e.name().local_name().as_ref().to_vec());
            }
            Ok(Event::Text(t)) => {
                if let Some(ref elem) = current {
                    let text = t.unescape().unwrap_or_default().to_string();
                    match elem.as_slice() {
                        b"title" => data.title = text,
                        b"subject" => data.subject = text,
                        b"description" => data.description = text,
                        b"creator" if !text.is_empty() => data.creator = text,
                        b"created" => data.created = text,
                        b"modified" => data.modified = text,
                        _ => {}
                    }
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
    if data.creator.is_empty() {
        data.creator = TOOL_CREATOR.to_string();
    }
}

/// Read the theme part attached to `base_part`, if any.
pub(crate) fn theme_xml(
    package: &PptxPackage,
    base_part: &str,
    rels: &Relationships,
) -> Option<String> {
    let rel = rels.first_of_type("theme")?;
    let part = PptxPackage::resolve_target(base_part, &rel.target);
    match package.read_xml(&part) {
        Ok(xml) => Some(xml),
        Err(e) => {
            log::warn!("theme part {part} unreadable: {e}");
            None
        }
    }
}

/// Name attribute of the first `p:cSld` in a slide/layout/master part.
pub(crate) fn common_slide_data_name(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().local_name().as_ref() == b"cSld" {
                    for attr in e.attributes().flatten() {
                        if attr.key.local_name().as_ref() == b"name" {
                            return Some(String::from_utf8_lossy(&attr.value).to_string());
                        }
                    }
                    return None;
                }
            }
            Ok(Event::Eof) => return None,
            Err(_) => return None,
            _ => {}
        }
    }
}
