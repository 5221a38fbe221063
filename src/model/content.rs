//! Slide content model.

use serde::{Deserialize, Serialize};

/// Tag value used for table cells (currently the only cell kind).
pub const CELL_CONTENT_TEXT: &str = "text";

/// One classified entry of a slide's content list.
///
/// Entries appear in document order of the slide's top-level shape-tree
/// children; a shape with several paragraphs contributes several
/// consecutive `Text` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "ContentType")]
pub enum SlideContent {
    /// One non-empty paragraph of a shape's text body.
    #[serde(rename = "text")]
    Text {
        #[serde(rename = "Text", default)]
        text: String,
    },
    /// A picture, resolved to its package part path (never a raw embed id).
    #[serde(rename = "image")]
    Image {
        #[serde(rename = "ImageUrl", default)]
        url: String,
    },
    /// A graphic frame's table.
    #[serde(rename = "table")]
    Table {
        #[serde(rename = "Table", default)]
        table: TableContent,
    },
}

impl SlideContent {
    /// Build a text entry.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Build an image entry.
    pub fn image(url: impl Into<String>) -> Self {
        Self::Image { url: url.into() }
    }

    /// Build a table entry.
    pub fn table(table: TableContent) -> Self {
        Self::Table { table }
    }

    /// The text payload, if this is a text entry.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Table content: ordered rows of ordered cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TableContent {
    pub rows: Vec<TableRow>,
}

/// One table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

/// One table cell: a content-type tag plus its text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TableCell {
    pub content_type: String,
    pub text: String,
}

impl TableCell {
    /// Build a text cell.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: CELL_CONTENT_TEXT.to_string(),
            text: text.into(),
        }
    }
}
