//! Error types for the edgequake-pdf2zip library.
//!
//! Every failure is fatal to the conversion that raised it. There is no
//! partial-success mode: a ZIP that silently skips a broken page is worse
//! than an explicit error, so the driver stops at the first failure, releases
//! the document and the half-written archive, and returns one of these.
//!
//! * [`Pdf2ZipError`] — the public taxonomy returned by every `convert*`
//!   entry point. [`Pdf2ZipError::kind`] flattens it into an [`ErrorKind`]
//!   for callers that only need to branch on the category.
//!
//! * [`EngineError`] — what a [`crate::engine::RasterEngine`] backend
//!   reports. The loader and rasteriser translate these into
//!   [`Pdf2ZipError`] with the page context attached.

use crate::output::ArchiveBuffer;
use std::path::PathBuf;
use thiserror::Error;

/// Result of one conversion: the sealed archive, or the reason there is none.
pub type ConversionOutcome = Result<ArchiveBuffer, Pdf2ZipError>;

/// All errors returned by the edgequake-pdf2zip library.
#[derive(Debug, Error)]
pub enum Pdf2ZipError {
    // ── Conversion errors ─────────────────────────────────────────────────
    /// The input bytes are not a readable PDF. Carries the parser diagnostic.
    #[error("Unable to open PDF: {detail}")]
    DocumentOpen { detail: String },

    /// A single page could not be rasterised. `page_index` is 0-based.
    #[error("Failed rendering page {page_index}: {detail}")]
    PageRender { page_index: usize, detail: String },

    /// Appending to or sealing the archive failed.
    #[error("Failed writing archive: {detail}")]
    ArchiveWrite { detail: String },

    /// The rasterisation engine could not be loaded in this process.
    #[error(
        "PDF rendering engine unavailable: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy, or install\n\
libpdfium on the system library path.\n"
    )]
    DependencyUnavailable(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read the input PDF from disk.
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output archive file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Flat classification of a [`Pdf2ZipError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    DocumentOpen,
    PageRender,
    ArchiveWrite,
    DependencyUnavailable,
    InvalidConfig,
    Io,
    Internal,
}

impl Pdf2ZipError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Pdf2ZipError::DocumentOpen { .. } => ErrorKind::DocumentOpen,
            Pdf2ZipError::PageRender { .. } => ErrorKind::PageRender,
            Pdf2ZipError::ArchiveWrite { .. } => ErrorKind::ArchiveWrite,
            Pdf2ZipError::DependencyUnavailable(_) => ErrorKind::DependencyUnavailable,
            Pdf2ZipError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Pdf2ZipError::InputReadFailed { .. } | Pdf2ZipError::OutputWriteFailed { .. } => {
                ErrorKind::Io
            }
            Pdf2ZipError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The 0-based index of the page that failed, for page-scoped errors.
    pub fn page_index(&self) -> Option<usize> {
        match self {
            Pdf2ZipError::PageRender { page_index, .. } => Some(*page_index),
            _ => None,
        }
    }
}

impl From<zip::result::ZipError> for Pdf2ZipError {
    fn from(e: zip::result::ZipError) -> Self {
        Pdf2ZipError::ArchiveWrite {
            detail: e.to_string(),
        }
    }
}

/// Failure reported by a rasterisation backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The document is encrypted and no password was supplied.
    #[error("document is encrypted and requires a password")]
    PasswordRequired,

    /// A password was supplied but the document rejected it.
    #[error("wrong password")]
    WrongPassword,

    /// The handle was used after `close()`.
    #[error("document handle is closed")]
    Closed,

    /// Anything else the backend reported, verbatim.
    #[error("{0}")]
    Backend(String),
}
