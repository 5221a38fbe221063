//! Intermediate presentation model.
//!
//! These structures are the flat, strongly-typed snapshot one extraction
//! pass produces and the mutator consumes. The serialized shape (PascalCase
//! field names, a `ContentType` tag on content entries) is the interchange
//! contract; absent optional strings read back as empty strings, never null.

mod content;
mod presentation;
mod theme;

pub use content::*;
pub use presentation::*;
pub use theme::*;
