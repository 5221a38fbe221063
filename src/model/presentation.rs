//! Presentation-level model structures.

use super::{SlideContent, Theme};
use serde::{Deserialize, Serialize};

/// Creator string identifying this tool; the default for documents that
/// carry no creator of their own.
pub const TOOL_CREATOR: &str = "presdata";

/// The flat snapshot of one presentation.
///
/// Rebuilt from scratch on every extraction pass. `Slides` follows the
/// presentation's slide-id list order, not part-enumeration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PresentationData {
    pub title: String,
    pub subject: String,
    pub description: String,
    pub creator: String,
    /// ISO-8601 timestamp; empty means "unset".
    pub created: String,
    /// ISO-8601 timestamp; empty means "unset".
    pub modified: String,
    pub slide_size: SlideSize,
    pub note_size: NoteSize,
    pub global_theme: Theme,
    pub slide_masters: Vec<SlideMaster>,
    pub slides: Vec<Slide>,
}

impl Default for PresentationData {
    fn default() -> Self {
        Self {
            title: String::new(),
            subject: String::new(),
            description: String::new(),
            creator: TOOL_CREATOR.to_string(),
            created: String::new(),
            modified: String::new(),
            slide_size: SlideSize::default(),
            note_size: NoteSize::default(),
            global_theme: Theme::empty(),
            slide_masters: Vec::new(),
            slides: Vec::new(),
        }
    }
}

impl PresentationData {
    /// Parse a serialized snapshot, e.g. a mutation-input document.
    ///
    /// Absent fields take their defaults; a document that does not parse
    /// into this shape is the caller's error to handle.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the snapshot for interchange.
    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Slide dimensions in EMU, plus the declared size type (e.g. `screen4x3`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SlideSize {
    pub width: i64,
    pub height: i64,
    #[serde(rename = "Type")]
    pub size_type: String,
}

/// Notes page dimensions in EMU.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NoteSize {
    pub width: i64,
    pub height: i64,
}

/// One slide master with its layout-id list, attached layouts and theme.
///
/// `SlideLayoutIds` holds the literal inner text of the master's
/// layout-id-list children as opaque strings, order preserved, duplicates
/// allowed; it is not the resolved layout list (`SlideLayouts` is).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SlideMaster {
    pub name: String,
    pub slide_layout_ids: Vec<String>,
    pub slide_layouts: Vec<SlideLayout>,
    pub theme: Theme,
}

/// One slide layout attached to a master.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SlideLayout {
    pub name: String,
    pub type_name: String,
}

/// One slide: its presentation-wide id, resolved layout name and ordered
/// content list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Slide {
    pub slide_id: u32,
    pub layout_name: String,
    pub contents: Vec<SlideContent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let data = PresentationData::default();
        assert_eq!(data.creator, TOOL_CREATOR);
        assert_eq!(data.created, "");
        assert!(data.global_theme.is_empty());
        assert!(data.slides.is_empty());
    }

    #[test]
    fn test_wire_field_names() {
        let mut data = PresentationData::default();
        data.title = "Quarterly".to_string();
        data.slide_size = SlideSize {
            width: 9_144_000,
            height: 6_858_000,
            size_type: "screen4x3".to_string(),
        };
        data.slides.push(Slide {
            slide_id: 256,
            layout_name: "Title Slide".to_string(),
            contents: vec![SlideContent::text("Hello")],
        });

        let json = serde_json::to_string(&data).unwrap();
        for field in [
            "\"Title\"",
            "\"SlideSize\"",
            "\"NoteSize\"",
            "\"GlobalTheme\"",
            "\"SlideMasters\"",
            "\"Slides\"",
            "\"SlideId\"",
            "\"LayoutName\"",
            "\"Contents\"",
            "\"Type\":\"screen4x3\"",
        ] {
            assert!(json.contains(field), "missing {field} in {json}");
        }
    }

    #[test]
    fn test_partial_input_deserializes() {
        // Mutation input may carry only the fields it wants applied.
        let json = r#"{"Title":"Q3 Review","Slides":[{"SlideId":256,"Contents":[{"ContentType":"text","Text":"New"}]}]}"#;
        let data: PresentationData = serde_json::from_str(json).unwrap();
        assert_eq!(data.title, "Q3 Review");
        assert_eq!(data.subject, "");
        assert_eq!(data.slides.len(), 1);
        assert_eq!(data.slides[0].slide_id, 256);
        assert_eq!(data.slides[0].layout_name, "");
        assert_eq!(data.slides[0].contents[0].as_text(), Some("New"));
    }
}
