//! Theme color scheme resolution.
//!
//! Resolution is total: any missing level (the theme part itself, its
//! color scheme, or any individual slot) degrades to the empty string
//! for the slots it covers. No theme condition is ever an error.

use crate::error::Result;
use crate::model::Theme;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Resolve a theme part's XML into a [`Theme`].
///
/// `None` (no theme part attached) yields the all-empty theme, as does a
/// theme without an `a:clrScheme` under `a:themeElements`. Malformed XML
/// is reported on the diagnostic channel and yields the all-empty theme.
pub fn resolve_theme(theme_xml: Option<&str>) -> Theme {
    let Some(xml) = theme_xml else {
        return Theme::empty();
    };
    parse_theme(xml).unwrap_or_else(|e| {
        log::warn!("unreadable theme part: {e}");
        Theme::empty()
    })
}

/// Whether an element name is one of the twelve color-scheme slots.
fn is_slot(slot: &[u8]) -> bool {
    matches!(
        slot,
        b"dk1" | b"lt1"
            | b"dk2"
            | b"lt2"
            | b"accent1"
            | b"accent2"
            | b"accent3"
            | b"accent4"
            | b"accent5"
            | b"accent6"
            | b"hlink"
            | b"folHlink"
    )
}

/// Map a color-scheme slot element name to its theme field.
fn slot_mut<'t>(theme: &'t mut Theme, slot: &[u8]) -> Option<&'t mut String> {
    Some(match slot {
        b"dk1" => &mut theme.dark1,
        b"lt1" => &mut theme.light1,
        b"dk2" => &mut theme.dark2,
        b"lt2" => &mut theme.light2,
        b"accent1" => &mut theme.accent1,
        b"accent2" => &mut theme.accent2,
        b"accent3" => &mut theme.accent3,
        b"accent4" => &mut theme.accent4,
        b"accent5" => &mut theme.accent5,
        b"accent6" => &mut theme.accent6,
        b"hlink" => &mut theme.hyperlink,
        b"folHlink" => &mut theme.followed_hyperlink,
        _ => return None,
    })
}

fn parse_theme(xml: &str) -> Result<Theme> {
    let mut theme = Theme::empty();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Only the scheme under a:themeElements counts; a:extraClrSchemeLst
    // carries alternates that are not the effective scheme.
    let mut in_theme_elements = false;
    let mut in_scheme = false;
    let mut current_slot: Option<Vec<u8>> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let local = name.local_name();
                match local.as_ref() {
                    b"themeElements" => in_theme_elements = true,
                    b"clrScheme" if in_theme_elements => in_scheme = true,
                    b"srgbClr" => read_srgb(&e, &mut theme, current_slot.as_deref()),
                    slot if in_scheme && is_slot(slot) => {
                        current_slot = Some(slot.to_vec());
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                if name.local_name().as_ref() == b"srgbClr" {
                    read_srgb(&e, &mut theme, current_slot.as_deref());
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                let local = name.local_name();
                match local.as_ref() {
                    b"themeElements" => in_theme_elements = false,
                    b"clrScheme" => in_scheme = false,
                    slot if current_slot.as_deref() == Some(slot) => current_slot = None,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }

    Ok(theme)
}

/// Read an `a:srgbClr val` into the active slot. Only RGB hex values
/// resolve; system colors and the like leave the slot empty. The first
/// value per slot wins.
fn read_srgb(e: &quick_xml::events::BytesStart<'_>, theme: &mut Theme, slot: Option<&[u8]>) {
    let Some(slot) = slot else { return };
    let Some(field) = slot_mut(theme, slot) else {
        return;
    };
    if !field.is_empty() {
        return;
    }
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"val" {
            *field = String::from_utf8_lossy(&attr.value).to_string();
        }
    }
}
