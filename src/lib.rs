//! # presdata
//!
//! PPTX presentation data extraction and positional write-back.
//!
//! This library converts a PowerPoint package into a flat, strongly-typed
//! snapshot (metadata, sizes, themes, masters with their layouts, and
//! every slide's ordered content) and supports writing limited edits
//! back into the original package while preserving everything it does not
//! understand.
//!
//! ## Quick Start
//!
//! ```no_run
//! // Extract the whole presentation
//! let data = presdata::extract("slides.pptx")?;
//! println!("{} slides", data.slides.len());
//!
//! // Find/replace a text run and save in place
//! use presdata::PptxPackage;
//! let mut package = PptxPackage::open_writable("slides.pptx")?;
//! if presdata::replace_text_exact(&mut package, "Draft", "Final")? {
//!     package.save()?;
//! }
//! # Ok::<(), presdata::Error>(())
//! ```
//!
//! ## Write-back model
//!
//! Extraction is a pure read of the package. Both mutation strategies,
//! exact-match text replace and positional bulk replace from an edited
//! [`PresentationData`], stage only the slide parts they change; the
//! final, package-level save is an explicit call on [`PptxPackage`].
//! Content identity for bulk replace is positional: live text node *i*
//! takes input entry *i*'s text, and whichever side is longer keeps its
//! tail untouched.

pub mod error;
pub mod extract;
pub mod model;
pub mod mutate;
pub mod package;

pub use error::{Error, Result};
pub use extract::{classify_node, extract_all, resolve_theme, shape_tree_outline, NodeKind};
pub use model::{
    NoteSize, PresentationData, Slide, SlideContent, SlideLayout, SlideMaster, SlideSize,
    TableCell, TableContent, TableRow, Theme, TOOL_CREATOR,
};
pub use mutate::{apply_presentation_data, replace_text_exact};
pub use package::{PptxPackage, Relationship, Relationships};

use std::path::Path;

/// Extract a presentation file into a [`PresentationData`] snapshot.
///
/// # Example
///
/// ```no_run
/// let data = presdata::extract("slides.pptx")?;
/// println!("title: {}", data.title);
/// # Ok::<(), presdata::Error>(())
/// ```
pub fn extract(path: impl AsRef<Path>) -> Result<PresentationData> {
    let package = PptxPackage::open(path)?;
    extract_all(&package)
}

/// Extract a presentation from bytes already in memory.
pub fn extract_bytes(data: &[u8]) -> Result<PresentationData> {
    let package = PptxPackage::from_bytes(data.to_vec())?;
    extract_all(&package)
}
