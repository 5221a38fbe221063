//! Slide master and layout extraction.

use super::theme::resolve_theme;
use super::{common_slide_data_name, theme_xml};
use crate::error::Result;
use crate::model::{SlideLayout, SlideMaster};
use crate::package::{PptxPackage, Relationships, PRESENTATION_PART};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Name used for a master whose part declares none.
const MASTER_NAME_FALLBACK: &str = "slide-master-part";

/// Name used for a layout whose part declares none.
const LAYOUT_NAME_FALLBACK: &str = "Default layout";

/// Extract every slide master attached to the presentation part, in
/// relationship document order. An unreadable master part is skipped.
pub(crate) fn extract_masters(
    package: &PptxPackage,
    pres_rels: &Relationships,
) -> Result<Vec<SlideMaster>> {
    let mut masters = Vec::new();
    for rel in pres_rels.of_type("slideMaster") {
        let part = PptxPackage::resolve_target(PRESENTATION_PART, &rel.target);
        let xml = match package.read_xml(&part) {
            Ok(xml) => xml,
            Err(e) => {
                log::warn!("slide master part {part} unreadable: {e}");
                continue;
            }
        };
        let parsed = match parse_master(&xml) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("slide master part {part} malformed: {e}");
                continue;
            }
        };

        let master_rels = package.relationships(&part)?;
        let mut layouts = Vec::new();
        for layout_rel in master_rels.of_type("slideLayout") {
            let layout_part = PptxPackage::resolve_target(&part, &layout_rel.target);
            match package.read_xml(&layout_part) {
                Ok(layout_xml) => layouts.push(parse_layout(&layout_xml)),
                Err(e) => log::warn!("layout part {layout_part} unreadable: {e}"),
            }
        }

        // A master's theme comes from its own theme relationship, never
        // from the presentation-level theme.
        let theme = resolve_theme(theme_xml(package, &part, &master_rels).as_deref());

        masters.push(SlideMaster {
            name: parsed.name.unwrap_or_else(|| MASTER_NAME_FALLBACK.to_string()),
            slide_layout_ids: parsed.layout_ids,
            slide_layouts: layouts,
            theme,
        });
    }
    Ok(masters)
}

struct ParsedMaster {
    name: Option<String>,
    layout_ids: Vec<String>,
}

/// Parse a slide master part: declared name and the literal inner text of
/// every child of its layout-id list. The ids are opaque strings captured
/// exactly as found: order preserved, empties skipped, nothing resolved.
fn parse_master(xml: &str) -> Result<ParsedMaster> {
    let mut name = None;
    let mut layout_ids = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut in_id_list = false;
    let mut child_depth = 0usize;
    let mut inner_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let element = e.name();
                let local = element.local_name();
                if local.as_ref() == b"sldLayoutIdLst" {
                    in_id_list = true;
                } else if in_id_list {
                    child_depth += 1;
                    if child_depth == 1 {
                        inner_text.clear();
                    }
                } else if local.as_ref() == b"cSld" && name.is_none() {
                    name = name_attr(&e);
                }
            }
            Ok(Event::Empty(e)) => {
                let element = e.name();
                // An empty-element child has no inner text and is skipped.
                if !in_id_list && element.local_name().as_ref() == b"cSld" && name.is_none() {
                    name = name_attr(&e);
                }
            }
            Ok(Event::Text(t)) if in_id_list && child_depth > 0 => {
                inner_text.push_str(&t.unescape().unwrap_or_default());
            }
            Ok(Event::End(e)) => {
                let element = e.name();
                if element.local_name().as_ref() == b"sldLayoutIdLst" {
                    in_id_list = false;
                } else if in_id_list {
                    child_depth -= 1;
                    if child_depth == 0 && !inner_text.is_empty() {
                        layout_ids.push(std::mem::take(&mut inner_text));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }

    Ok(ParsedMaster { name, layout_ids })
}

/// Parse a slide layout part into its name and declared placeholder type.
/// Both fall back to fixed literals; a malformed part yields the fallbacks.
pub(crate) fn parse_layout(xml: &str) -> SlideLayout {
    let mut layout = SlideLayout {
        name: String::new(),
        type_name: String::new(),
    };
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let element = e.name();
                match element.local_name().as_ref() {
                    b"sldLayout" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"type" {
                                layout.type_name = String::from_utf8_lossy(&attr.value).to_string();
                            }
                        }
                    }
                    b"cSld" if layout.name.is_empty() => {
                        if let Some(name) = name_attr(&e) {
                            layout.name = name;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }

    if layout.name.is_empty() {
        layout.name = LAYOUT_NAME_FALLBACK.to_string();
    }
    layout
}

fn name_attr(e: &quick_xml::events::BytesStart<'_>) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"name" {
            return Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    None
}
