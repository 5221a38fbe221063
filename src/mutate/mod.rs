//! Mutation: writing edited content back into the live package.
//!
//! Two independent strategies, both staging only the slide parts they
//! actually change. The caller owns the final package-level save.

mod rewrite;

use crate::error::{Error, Result};
use crate::extract::parse_presentation_root;
use crate::model::{PresentationData, TOOL_CREATOR};
use crate::package::{PptxPackage, CORE_PROPERTIES_PART, PRESENTATION_PART};
use rewrite::CoreFieldEdit;

fn ensure_presentation_root(package: &PptxPackage) -> Result<()> {
    if package.has_presentation_root() {
        Ok(())
    } else {
        Err(Error::MissingPresentationRoot)
    }
}

/// Replace every text run exactly equal to `old` with `new`, across all
/// slide parts of the presentation.
///
/// Returns whether at least one run matched; zero matches is reported on
/// the diagnostic channel, not an error. Only slide parts with a match
/// are re-serialized.
pub fn replace_text_exact(package: &mut PptxPackage, old: &str, new: &str) -> Result<bool> {
    ensure_presentation_root(package)?;
    if old.is_empty() {
        log::warn!("refusing to replace the empty string");
        return Ok(false);
    }

    let rels = package.relationships(PRESENTATION_PART)?;
    let slide_parts: Vec<String> = rels
        .of_type("slide")
        .into_iter()
        .map(|rel| PptxPackage::resolve_target(PRESENTATION_PART, &rel.target))
        .collect();

    let mut any = false;
    for part in slide_parts {
        let xml = match package.read_xml(&part) {
            Ok(xml) => xml,
            Err(e) => {
                log::warn!("slide part {part} unreadable: {e}");
                continue;
            }
        };
        let (bytes, count) = rewrite::replace_exact_text(&xml, old, new)?;
        if count > 0 {
            package.replace_part(&part, bytes)?;
            log::debug!("replaced {count} run(s) in {part}");
            any = true;
        }
    }

    if !any {
        log::warn!("no text run matched {old:?}");
    }
    Ok(any)
}

/// Apply an edited [`PresentationData`] back onto the live package.
///
/// Metadata fields are merged into the core properties when they carry a
/// non-default value. Each input slide is matched to its live slide by
/// `SlideId` (never by list position) and its contents are written over
/// the live text nodes in document order, index by index. Non-text input
/// entries consume their position without writing; surplus on either side
/// is left alone.
pub fn apply_presentation_data(package: &mut PptxPackage, data: &PresentationData) -> Result<()> {
    ensure_presentation_root(package)?;
    apply_metadata(package, data)?;

    let presentation_xml = package.read_xml(PRESENTATION_PART)?;
    let entries = parse_presentation_root(&presentation_xml)?.slide_entries;
    let rels = package.relationships(PRESENTATION_PART)?;

    for slide in &data.slides {
        let Some(entry) = entries.iter().find(|e| e.id == slide.slide_id) else {
            log::warn!("no live slide with id {}", slide.slide_id);
            continue;
        };
        let Some(rel) = rels.get(&entry.rel_id) else {
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

        let replacements: Vec<Option<String>> = slide
            .contents
            .iter()
            .map(|content| content.as_text().map(str::to_string))
            .collect();
        let (bytes, applied) = rewrite::replace_texts_positional(&xml, &replacements)?;
        if applied > 0 {
            package.replace_part(&part, bytes)?;
            log::debug!("slide {}: wrote {applied} text node(s)", entry.id);
        }
    }
    Ok(())
}

/// Merge non-default metadata fields into docProps/core.xml. A package
/// without core properties keeps its metadata; that is a diagnostic, not
/// an error.
fn apply_metadata(package: &mut PptxPackage, data: &PresentationData) -> Result<()> {
    let mut edits = Vec::new();
    let mut field = |local: &'static [u8], qualified: &'static str, date: bool, value: &str| {
        if !value.is_empty() {
            edits.push(CoreFieldEdit {
                local,
                qualified,
                date,
                value: value.to_string(),
            });
        }
    };
    field(b"title", "dc:title", false, &data.title);
    field(b"subject", "dc:subject", false, &data.subject);
    field(b"description", "dc:description", false, &data.description);
    // The tool identifier is the creator default, not an edit.
    if data.creator != TOOL_CREATOR {
        field(b"creator", "dc:creator", false, &data.creator);
    }
    field(b"created", "dcterms:created", true, &data.created);
    field(b"modified", "dcterms:modified", true, &data.modified);

    if edits.is_empty() {
        return Ok(());
    }
    let xml = match package.read_xml(CORE_PROPERTIES_PART) {
        Ok(xml) => xml,
        Err(_) => {
            log::warn!("package has no core properties part; metadata not applied");
            return Ok(());
        }
    };
    let bytes = rewrite::merge_core_properties(&xml, &edits)?;
    package.replace_part(CORE_PROPERTIES_PART, bytes)
}
