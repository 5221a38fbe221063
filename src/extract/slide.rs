//! Slide assembly and shape-tree classification.
//!
//! The classifier walks the immediate children of a slide's `p:spTree`
//! in document order and turns each into at most a handful of content
//! entries. Nested groups are never descended into; structural nodes are
//! skipped silently; anything unrecognized is skipped with a diagnostic.

use super::common_slide_data_name;
use crate::error::{Error, Result};
use crate::model::{Slide, SlideContent, TableCell, TableContent, TableRow};
use crate::package::{PptxPackage, Relationships, PRESENTATION_PART};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One entry of the presentation's slide-id list.
#[derive(Debug, Clone)]
pub(crate) struct SlideEntry {
    /// Presentation-wide slide id
    pub id: u32,
    /// Relationship id resolving to the slide part
    pub rel_id: String,
}

/// Parse one `p:sldId` element. Entries without a numeric `id` or without
/// an `r:id` are dropped with a diagnostic.
pub(crate) fn parse_slide_id(e: &BytesStart<'_>) -> Option<SlideEntry> {
    let mut id: Option<u32> = None;
    let mut rel_id: Option<String> = None;
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"id" {
            id = String::from_utf8_lossy(&attr.value).parse().ok();
        } else if attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id" {
            rel_id = Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    match (id, rel_id) {
        (Some(id), Some(rel_id)) => Some(SlideEntry { id, rel_id }),
        _ => {
            log::warn!("skipping slide-id entry without usable id and relationship id");
            None
        }
    }
}

/// Assemble slides in slide-id-list order. A slide whose relationship or
/// part cannot be resolved is absent from the output, not a placeholder.
pub(crate) fn extract_slides(
    package: &PptxPackage,
    entries: &[SlideEntry],
    pres_rels: &Relationships,
) -> Result<Vec<Slide>> {
    let mut slides = Vec::new();
    for entry in entries {
        let Some(rel) = pres_rels.get(&entry.rel_id) else {
            log::warn!(
                "slide {} references unknown relationship {}",
                entry.id,
                entry.rel_id
            );
            continue;
        };
        let part = PptxPackage::resolve_target(PRESENTATION_PART, &rel.target);
        let xml = match package.read_xml(&part) {
            Ok(xml) => xml,
            Err(e) => {
                log::warn!("slide {} part {part} unreadable: {e}", entry.id);
                continue;
            }
        };
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("slide {} shape tree:\n{}", entry.id, shape_tree_outline(&xml));
        }
        let slide_rels = package.relationships(&part)?;
        let contents = match classify_shape_tree(&xml, &part, &slide_rels, package) {
            Ok(contents) => contents,
            Err(e) => {
                log::warn!("slide {} part {part} malformed: {e}", entry.id);
                continue;
            }
        };
        slides.push(Slide {
            slide_id: entry.id,
            layout_name: layout_name_for(package, &part, &slide_rels),
            contents,
        });
    }
    Ok(slides)
}

/// Name of the slide's attached layout, empty when unresolved.
fn layout_name_for(package: &PptxPackage, slide_part: &str, slide_rels: &Relationships) -> String {
    let Some(rel) = slide_rels.first_of_type("slideLayout") else {
        return String::new();
    };
    let part = PptxPackage::resolve_target(slide_part, &rel.target);
    match package.read_xml(&part) {
        Ok(xml) => common_slide_data_name(&xml).unwrap_or_default(),
        Err(e) => {
            log::warn!("layout part {part} unreadable: {e}");
            String::new()
        }
    }
}

/// Classification of one top-level shape-tree child.
///
/// New content variants extend this tag set; nothing dispatches on raw
/// element names outside [`classify_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A shape that may carry a text body (`p:sp`)
    Text,
    /// A picture (`p:pic`)
    Image,
    /// A graphic frame that may carry a table (`p:graphicFrame`)
    Table,
    /// Recognized structural-only node: groups, connectors, group
    /// property metadata, embedded content parts
    Ignored,
    /// Anything else; reported, never fatal
    Unknown,
}

/// Classify a shape-tree child by its element's local name.
pub fn classify_node(local_name: &[u8]) -> NodeKind {
    match local_name {
        b"sp" => NodeKind::Text,
        b"pic" => NodeKind::Image,
        b"graphicFrame" => NodeKind::Table,
        b"grpSp" | b"cxnSp" | b"nvGrpSpPr" | b"grpSpPr" | b"contentPart" => NodeKind::Ignored,
        _ => NodeKind::Unknown,
    }
}

/// Classify a slide part's shape tree into its ordered content list.
///
/// Only the immediate children of `p:spTree` are visited; entries are
/// appended strictly in document order.
pub fn classify_shape_tree(
    xml: &str,
    slide_part: &str,
    rels: &Relationships,
    package: &PptxPackage,
) -> Result<Vec<SlideContent>> {
    let mut contents = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut in_tree = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let local = e.name().local_name().as_ref().to_vec();
                if !in_tree {
                    if local == b"spTree" {
                        in_tree = true;
                    }
                    continue;
                }
                match classify_node(&local) {
                    NodeKind::Text => {
                        for paragraph in collect_shape_paragraphs(&mut reader)? {
                            contents.push(SlideContent::text(paragraph));
                        }
                    }
                    NodeKind::Image => {
                        let embed = collect_picture_embed(&mut reader)?;
                        if let Some(url) =
                            embed.and_then(|id| resolve_image_url(&id, slide_part, rels, package))
                        {
                            contents.push(SlideContent::image(url));
                        }
                    }
                    NodeKind::Table => {
                        if let Some(table) = collect_frame_table(&mut reader)? {
                            contents.push(SlideContent::table(table));
                        }
                    }
                    NodeKind::Ignored => skip_element(&mut reader, &local)?,
                    NodeKind::Unknown => {
                        log::warn!(
                            "unknown shape-tree node kind: {}",
                            String::from_utf8_lossy(&local)
                        );
                        skip_element(&mut reader, &local)?;
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                if in_tree {
                    // An empty element has no text body, blip or table to
                    // contribute; only unknown kinds are worth reporting.
                    let local = e.name().local_name();
                    if classify_node(local.as_ref()) == NodeKind::Unknown {
                        log::warn!(
                            "unknown shape-tree node kind: {}",
                            String::from_utf8_lossy(local.as_ref())
                        );
                    }
                }
            }
            Ok(Event::End(e)) => {
                if in_tree && e.name().local_name().as_ref() == b"spTree" {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }

    Ok(contents)
}

/// Consume a `p:sp` subtree; return the concatenated run text of each
/// non-empty paragraph of its text body, in order.
fn collect_shape_paragraphs(reader: &mut Reader<&[u8]>) -> Result<Vec<String>> {
    let mut paragraphs = Vec::new();
    let mut depth = 1usize;
    let mut in_txbody = false;
    let mut in_paragraph = false;
    let mut in_run = false;
    let mut in_text = false;
    let mut paragraph = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().local_name().as_ref() {
                b"sp" => depth += 1,
                b"txBody" => in_txbody = true,
                b"p" if in_txbody => {
                    in_paragraph = true;
                    paragraph.clear();
                }
                // Only real runs count; fields carry generated text.
                b"r" if in_paragraph => in_run = true,
                b"t" if in_run => in_text = true,
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                paragraph.push_str(&t.unescape().unwrap_or_default());
            }
            Ok(Event::End(e)) => match e.name().local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => in_run = false,
                b"p" if in_paragraph => {
                    if !paragraph.is_empty() {
                        paragraphs.push(std::mem::take(&mut paragraph));
                    }
                    in_paragraph = false;
                }
                b"txBody" => in_txbody = false,
                b"sp" => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(paragraphs);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => return Err(unexpected_eof("p:sp")),
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }
}

/// Consume a `p:pic` subtree; return its first `a:blip` embed id, if any.
fn collect_picture_embed(reader: &mut Reader<&[u8]>) -> Result<Option<String>> {
    let mut embed: Option<String> = None;
    let mut depth = 1usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().local_name().as_ref() {
                b"pic" => depth += 1,
                b"blip" => read_blip_embed(&e, &mut embed),
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.name().local_name().as_ref() == b"blip" {
                    read_blip_embed(&e, &mut embed);
                }
            }
            Ok(Event::End(e)) => {
                if e.name().local_name().as_ref() == b"pic" {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(embed);
                    }
                }
            }
            Ok(Event::Eof) => return Err(unexpected_eof("p:pic")),
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }
}

/// First `r:embed` wins; later blips in the same picture are alternates.
fn read_blip_embed(e: &BytesStart<'_>, embed: &mut Option<String>) {
    if embed.is_some() {
        return;
    }
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"embed" {
            *embed = Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
}

/// Resolve a picture's embed relationship to a part URI. External targets
/// pass through verbatim; a missing relationship or missing part yields
/// nothing (and a diagnostic), never an error.
fn resolve_image_url(
    embed: &str,
    slide_part: &str,
    rels: &Relationships,
    package: &PptxPackage,
) -> Option<String> {
    let Some(rel) = rels.get(embed) else {
        log::warn!("image embed {embed} has no relationship in {slide_part}");
        return None;
    };
    if rel.target.is_empty() {
        return None;
    }
    if rel.external {
        return Some(rel.target.clone());
    }
    let part = PptxPackage::resolve_target(slide_part, &rel.target);
    if package.exists(&part) {
        Some(part)
    } else {
        log::warn!("image part {part} missing from package");
        None
    }
}

/// Consume a `p:graphicFrame` subtree; return its table, if it holds one.
/// At most one table per frame; cell text joins every paragraph (empty
/// ones included) with a newline.
fn collect_frame_table(reader: &mut Reader<&[u8]>) -> Result<Option<TableContent>> {
    let mut table: Option<TableContent> = None;
    let mut rows: Vec<TableRow> = Vec::new();
    let mut cells: Vec<TableCell> = Vec::new();
    let mut cell_paragraphs: Vec<String> = Vec::new();
    let mut paragraph = String::new();

    let mut in_table = false;
    let mut in_row = false;
    let mut in_cell = false;
    let mut in_txbody = false;
    let mut in_paragraph = false;
    let mut in_run = false;
    let mut in_text = false;

    let mut depth = 1usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().local_name().as_ref() {
                b"graphicFrame" => depth += 1,
                b"tbl" if table.is_none() => {
                    in_table = true;
                    rows.clear();
                }
                b"tr" if in_table => {
                    in_row = true;
                    cells.clear();
                }
                b"tc" if in_row => {
                    in_cell = true;
                    cell_paragraphs.clear();
                }
                b"txBody" if in_cell => in_txbody = true,
                b"p" if in_txbody => {
                    in_paragraph = true;
                    paragraph.clear();
                }
                b"r" if in_paragraph => in_run = true,
                b"t" if in_run => in_text = true,
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                paragraph.push_str(&t.unescape().unwrap_or_default());
            }
            Ok(Event::End(e)) => match e.name().local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => in_run = false,
                b"p" if in_paragraph => {
                    cell_paragraphs.push(std::mem::take(&mut paragraph));
                    in_paragraph = false;
                }
                b"txBody" => in_txbody = false,
                b"tc" if in_cell => {
                    cells.push(TableCell::text(cell_paragraphs.join("\n")));
                    in_cell = false;
                }
                b"tr" if in_row => {
                    rows.push(TableRow {
                        cells: std::mem::take(&mut cells),
                    });
                    in_row = false;
                }
                b"tbl" if in_table => {
                    in_table = false;
                    table = Some(TableContent {
                        rows: std::mem::take(&mut rows),
                    });
                }
                b"graphicFrame" => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(table);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => return Err(unexpected_eof("p:graphicFrame")),
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }
}

/// Consume events until the matching end tag of an already-entered
/// element, counting same-named nesting (groups nest groups).
fn skip_element(reader: &mut Reader<&[u8]>, local: &[u8]) -> Result<()> {
    let mut depth = 1usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().local_name().as_ref() == local => depth += 1,
            Ok(Event::End(e)) if e.name().local_name().as_ref() == local => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Ok(Event::Eof) => return Err(unexpected_eof(&String::from_utf8_lossy(local))),
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }
}

fn unexpected_eof(context: &str) -> Error {
    Error::XmlParse(format!("unexpected end of document inside {context}"))
}

/// Indented element outline of a slide part's shape tree, for the
/// diagnostic channel. Best-effort; parse problems truncate the outline.
pub fn shape_tree_outline(xml: &str) -> String {
    let mut out = String::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut level = 0usize;
    let mut active = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                if active {
                    push_outline_line(&mut out, level, name.as_ref());
                    level += 1;
                } else if name.local_name().as_ref() == b"spTree" {
                    active = true;
                    push_outline_line(&mut out, 0, name.as_ref());
                    level = 1;
                }
            }
            Ok(Event::Empty(e)) => {
                if active {
                    push_outline_line(&mut out, level, e.name().as_ref());
                }
            }
            Ok(Event::End(_)) if active => {
                level -= 1;
                if level == 0 {
                    active = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
    out
}

fn push_outline_line(out: &mut String, level: usize, qname: &[u8]) {
    for _ in 0..level {
        out.push_str("  ");
    }
    out.push_str(&String::from_utf8_lossy(qname));
    out.push('\n');
}
