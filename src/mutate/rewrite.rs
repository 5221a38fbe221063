//! Event-level XML rewriters.
//!
//! Every rewriter streams a part's events through a writer untouched
//! except for the text nodes it is told to change, so attributes,
//! namespaces and unknown structure survive the round trip. Text content
//! of an `a:t` node may span several events; replacement always swaps the
//! node's whole content.

use crate::error::{Error, Result};
use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

/// Replace the content of every text run exactly equal to `old` with
/// `new`. Returns the rewritten part and the number of runs replaced.
pub(crate) fn replace_exact_text(xml: &str, old: &str, new: &str) -> Result<(Vec<u8>, usize)> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut replaced = 0usize;
    // Events buffered between <a:t> and </a:t>, with the unescaped
    // content accumulated for the comparison.
    let mut pending: Option<(Vec<Event<'static>>, String)> = None;

    loop {
        let event = reader.read_event().map_err(Error::from)?;
        match event {
            Event::Eof => break,
            Event::Start(e) if pending.is_none() && is_run_text(e.name()) => {
                writer.write_event(Event::Start(e))?;
                pending = Some((Vec::new(), String::new()));
            }
            Event::End(e) if pending.is_some() && is_run_text(e.name()) => {
                if let Some((events, content)) = pending.take() {
                    if content == old {
                        replaced += 1;
                        writer.write_event(Event::Text(BytesText::new(new)))?;
                    } else {
                        for buffered in events {
                            writer.write_event(buffered)?;
                        }
                    }
                }
                writer.write_event(Event::End(e))?;
            }
            event => match pending.as_mut() {
                Some((events, content)) => {
                    if let Event::Text(t) = &event {
                        content.push_str(&t.unescape().unwrap_or_default());
                    }
                    events.push(event.into_owned());
                }
                None => writer.write_event(event)?,
            },
        }
    }

    Ok((writer.into_inner().into_inner(), replaced))
}

/// Replace text node *i* with `replacements[i]` for every index both
/// sequences cover. `None` entries consume their position untouched;
/// positions past the end of `replacements` pass through; surplus
/// replacements are dropped by construction. Returns the rewritten part
/// and the number of nodes written.
pub(crate) fn replace_texts_positional(
    xml: &str,
    replacements: &[Option<String>],
) -> Result<(Vec<u8>, usize)> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut index = 0usize;
    let mut applied = 0usize;
    // Inside an a:t whose original content is being dropped.
    let mut replacing = false;
    let mut in_run_text = false;

    loop {
        let event = reader.read_event().map_err(Error::from)?;
        match event {
            Event::Eof => break,
            Event::Start(e) if !in_run_text && is_run_text(e.name()) => {
                in_run_text = true;
                let replacement = replacements.get(index).and_then(|r| r.as_deref());
                writer.write_event(Event::Start(e))?;
                if let Some(text) = replacement {
                    writer.write_event(Event::Text(BytesText::new(text)))?;
                    applied += 1;
                    replacing = true;
                }
            }
            Event::End(e) if in_run_text && is_run_text(e.name()) => {
                writer.write_event(Event::End(e))?;
                in_run_text = false;
                replacing = false;
                index += 1;
            }
            // A self-closing <a:t/> is still a text node of the walk; a
            // replacement expands it to an ordinary element.
            Event::Empty(e) if !in_run_text && is_run_text(e.name()) => {
                match replacements.get(index).and_then(|r| r.as_deref()) {
                    Some(text) => {
                        let end = e.to_end().into_owned();
                        writer.write_event(Event::Start(e))?;
                        writer.write_event(Event::Text(BytesText::new(text)))?;
                        writer.write_event(Event::End(end))?;
                        applied += 1;
                    }
                    None => writer.write_event(Event::Empty(e))?,
                }
                index += 1;
            }
            Event::Text(_) | Event::CData(_) if replacing => {}
            event => writer.write_event(event)?,
        }
    }

    Ok((writer.into_inner().into_inner(), applied))
}

/// One core-properties field to write.
pub(crate) struct CoreFieldEdit {
    /// Local element name, e.g. `title`
    pub local: &'static [u8],
    /// Qualified element name written when the element must be created
    pub qualified: &'static str,
    /// W3CDTF date fields carry an `xsi:type` when created
    pub date: bool,
    pub value: String,
}

/// Merge field values into a `docProps/core.xml` part. Existing elements
/// are rewritten in place; fields whose element is absent are appended
/// before the root close. Fields not listed pass through untouched.
pub(crate) fn merge_core_properties(xml: &str, edits: &[CoreFieldEdit]) -> Result<Vec<u8>> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut written = vec![false; edits.len()];
    // Index into `edits` while inside a matched element.
    let mut active: Option<usize> = None;

    loop {
        let event = reader.read_event().map_err(Error::from)?;
        match event {
            Event::Eof => break,
            Event::Start(e) if active.is_none() => {
                let position = edits
                    .iter()
                    .position(|edit| e.name().local_name().as_ref() == edit.local);
                writer.write_event(Event::Start(e))?;
                if let Some(i) = position {
                    writer.write_event(Event::Text(BytesText::new(&edits[i].value)))?;
                    written[i] = true;
                    active = Some(i);
                }
            }
            Event::Empty(e) => {
                let position = edits
                    .iter()
                    .position(|edit| e.name().local_name().as_ref() == edit.local);
                match position {
                    Some(i) => {
                        let end = e.to_end().into_owned();
                        writer.write_event(Event::Start(e))?;
                        writer.write_event(Event::Text(BytesText::new(&edits[i].value)))?;
                        writer.write_event(Event::End(end))?;
                        written[i] = true;
                    }
                    None => writer.write_event(Event::Empty(e))?,
                }
            }
            Event::End(e) => {
                if active.is_some() {
                    active = None;
                    writer.write_event(Event::End(e))?;
                    continue;
                }
                if e.name().local_name().as_ref() == b"coreProperties" {
                    for (i, edit) in edits.iter().enumerate() {
                        if !written[i] {
                            write_created_field(&mut writer, edit)?;
                        }
                    }
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Text(_) | Event::CData(_) if active.is_some() => {}
            event => writer.write_event(event)?,
        }
    }

    Ok(writer.into_inner().into_inner())
}

fn write_created_field(writer: &mut Writer<Cursor<Vec<u8>>>, edit: &CoreFieldEdit) -> Result<()> {
    let mut start = quick_xml::events::BytesStart::new(edit.qualified);
    if edit.date {
        start.push_attribute(("xsi:type", "dcterms:W3CDTF"));
    }
    let end = start.to_end().into_owned();
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(&edit.value)))?;
    writer.write_event(Event::End(end))?;
    Ok(())
}

fn is_run_text(name: quick_xml::name::QName<'_>) -> bool {
    name.local_name().as_ref() == b"t"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    const THREE_RUNS: &str = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
<p:sp><p:txBody><a:p><a:r><a:rPr b="1"/><a:t>Basic presentation</a:t></a:r></a:p></p:txBody></p:sp>
<p:sp><p:txBody><a:p><a:r><a:t>Basic presentation</a:t></a:r><a:r><a:t>other</a:t></a:r></a:p></p:txBody></p:sp>
<p:sp><p:txBody><a:p><a:r><a:t>Basic presentation</a:t></a:r></a:p></p:txBody></p:sp>
</p:spTree></p:cSld></p:sld>"#;

    #[test]
    fn test_exact_replace_all_matches() {
        let (bytes, count) =
            replace_exact_text(THREE_RUNS, "Basic presentation", "Updated Basic Presentation")
                .unwrap();
        assert_eq!(count, 3);
        let out = s(bytes);
        assert!(!out.contains(">Basic presentation<"));
        assert_eq!(out.matches("Updated Basic Presentation").count(), 3);
        // Non-matching runs and structure survive untouched.
        assert!(out.contains("<a:t>other</a:t>"));
        assert!(out.contains("<a:rPr b=\"1\"/>"));
    }

    #[test]
    fn test_exact_replace_no_match_is_identity() {
        let (bytes, count) = replace_exact_text(THREE_RUNS, "nonexistent", "x").unwrap();
        assert_eq!(count, 0);
        assert!(s(bytes).contains("<a:t>Basic presentation</a:t>"));
    }

    #[test]
    fn test_exact_replace_whole_node_only() {
        // "Basic" alone must not match a run reading "Basic presentation".
        let (_, count) = replace_exact_text(THREE_RUNS, "Basic", "x").unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_exact_replace_escapes() {
        let xml = r#"<a:p xmlns:a="a"><a:r><a:t>a &amp; b</a:t></a:r></a:p>"#;
        let (bytes, count) = replace_exact_text(xml, "a & b", "c < d").unwrap();
        assert_eq!(count, 1);
        assert!(s(bytes).contains("<a:t>c &lt; d</a:t>"));
    }

    fn live(texts: &[&str]) -> String {
        let runs: String = texts
            .iter()
            .map(|t| format!("<a:r><a:t>{t}</a:t></a:r>"))
            .collect();
        format!(r#"<p:sld xmlns:a="a" xmlns:p="p"><a:p>{runs}</a:p></p:sld>"#)
    }

    #[test]
    fn test_positional_more_live_than_input() {
        let xml = live(&["one", "two", "three", "four", "five"]);
        let replacements = vec![Some("ONE".to_string()), Some("TWO".to_string())];
        let (bytes, applied) = replace_texts_positional(&xml, &replacements).unwrap();
        assert_eq!(applied, 2);
        let out = s(bytes);
        assert!(out.contains("<a:t>ONE</a:t>"));
        assert!(out.contains("<a:t>TWO</a:t>"));
        for untouched in ["three", "four", "five"] {
            assert!(out.contains(&format!("<a:t>{untouched}</a:t>")));
        }
    }

    #[test]
    fn test_positional_more_input_than_live() {
        let xml = live(&["one", "two"]);
        let replacements: Vec<Option<String>> = ["A", "B", "C", "D", "E"]
            .iter()
            .map(|t| Some(t.to_string()))
            .collect();
        let (bytes, applied) = replace_texts_positional(&xml, &replacements).unwrap();
        assert_eq!(applied, 2, "surplus input entries are dropped");
        let out = s(bytes);
        assert!(out.contains("<a:t>A</a:t>"));
        assert!(out.contains("<a:t>B</a:t>"));
        assert!(!out.contains("C"));
    }

    #[test]
    fn test_positional_none_consumes_position() {
        let xml = live(&["one", "two", "three"]);
        let replacements = vec![None, Some("TWO".to_string())];
        let (bytes, applied) = replace_texts_positional(&xml, &replacements).unwrap();
        assert_eq!(applied, 1);
        let out = s(bytes);
        assert!(out.contains("<a:t>one</a:t>"), "position 0 untouched");
        assert!(out.contains("<a:t>TWO</a:t>"));
        assert!(out.contains("<a:t>three</a:t>"));
    }

    #[test]
    fn test_positional_expands_empty_text_node() {
        let xml = r#"<a:p xmlns:a="a"><a:r><a:t/></a:r><a:r><a:t>x</a:t></a:r></a:p>"#;
        let replacements = vec![Some("filled".to_string()), Some("y".to_string())];
        let (bytes, applied) = replace_texts_positional(&xml, &replacements).unwrap();
        assert_eq!(applied, 2);
        let out = s(bytes);
        assert!(out.contains("<a:t>filled</a:t>"));
        assert!(out.contains("<a:t>y</a:t>"));
    }

    const CORE: &str = r#"<?xml version="1.0"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dc:title>Draft</dc:title>
<dc:subject>Internal</dc:subject>
<dc:creator>someone</dc:creator>
<dcterms:created xsi:type="dcterms:W3CDTF">2020-01-01T00:00:00Z</dcterms:created>
</cp:coreProperties>"#;

    fn edit(
        local: &'static [u8],
        qualified: &'static str,
        date: bool,
        value: &str,
    ) -> CoreFieldEdit {
        CoreFieldEdit {
            local,
            qualified,
            date,
            value: value.to_string(),
        }
    }

    #[test]
    fn test_merge_rewrites_existing_field() {
        let edits = vec![edit(b"title", "dc:title", false, "Q3 Review")];
        let out = s(merge_core_properties(CORE, &edits).unwrap());
        assert!(out.contains("<dc:title>Q3 Review</dc:title>"));
        assert!(out.contains("<dc:subject>Internal</dc:subject>"), "unlisted fields untouched");
        assert!(out.contains("<dc:creator>someone</dc:creator>"));
    }

    #[test]
    fn test_merge_appends_missing_field() {
        let edits = vec![
            edit(b"description", "dc:description", false, "Added"),
            edit(b"modified", "dcterms:modified", true, "2024-06-01T00:00:00Z"),
        ];
        let out = s(merge_core_properties(CORE, &edits).unwrap());
        assert!(out.contains("<dc:description>Added</dc:description>"));
        assert!(out.contains(
            "<dcterms:modified xsi:type=\"dcterms:W3CDTF\">2024-06-01T00:00:00Z</dcterms:modified>"
        ));
        // Appended inside the root element.
        let root_close = out.find("</cp:coreProperties>").unwrap();
        assert!(out.find("<dc:description>").unwrap() < root_close);
    }
}
