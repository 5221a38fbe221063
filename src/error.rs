//! Error types for the presdata library.

use std::io;
use thiserror::Error;

/// Result type alias for presdata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting or mutating a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing the ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// The package has no resolvable presentation root.
    ///
    /// This is the only fatal extraction error: a package without
    /// `ppt/presentation.xml` is not a presentation at all.
    #[error("presentation root (ppt/presentation.xml) not found")]
    MissingPresentationRoot,

    /// A required package part is missing.
    #[error("Missing part: {0}")]
    MissingComponent(String),

    /// Invalid or malformed data in the package or in mutation input.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A write operation was attempted on a package opened read-only.
    #[error("package was not opened for writing")]
    ReadOnlyPackage,

    /// Error (de)serializing the data model.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingPresentationRoot;
        assert_eq!(
            err.to_string(),
            "presentation root (ppt/presentation.xml) not found"
        );

        let err = Error::MissingComponent("ppt/slides/slide9.xml".to_string());
        assert_eq!(err.to_string(), "Missing part: ppt/slides/slide9.xml");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
