//! # edgequake-pdf2zip
//!
//! Rasterise every page of a PDF and return the images as one ZIP archive.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Load     validate header, open through the injected engine
//!  ├─ 2. Render   rasterise pages in order at their intrinsic size
//!  ├─ 3. Encode   flatten onto white, PNG (RGB, no alpha)
//!  ├─ 4. Archive  append page_001.png, page_002.png, … as deflated entries
//!  └─ 5. Seal     central directory written, bytes returned
//! ```
//!
//! The first page that fails aborts the conversion. No partial archive is
//! ever returned, and the document is closed on every path.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2zip::{convert, download_name, ConversionConfig, ARCHIVE_MIME_TYPE};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pdf = std::fs::read("report.pdf")?;
//!     let archive = convert(&pdf, &ConversionConfig::default())?;
//!     println!("{} ({}): {} pages", download_name("report.pdf"),
//!         ARCHIVE_MIME_TYPE, archive.entry_names().len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2zip` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## PDFium
//!
//! Rendering uses a dynamically loaded libpdfium. Point `PDFIUM_LIB_PATH` at
//! it, or install it on the system library path. Code that wants a different
//! backend, or a fake one in tests, implements [`RasterEngine`] and calls
//! [`convert_with`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{
    convert, convert_async, convert_file, convert_to_file, convert_with, inspect, inspect_with,
    write_archive, ConversionStage,
};
pub use engine::{PageSource, PdfiumEngine, RasterEngine};
pub use error::{ConversionOutcome, EngineError, ErrorKind, Pdf2ZipError};
pub use output::{
    download_name, entry_name, ArchiveBuffer, ArchiveSummary, DocumentInfo, RenderedPage,
    ARCHIVE_MIME_TYPE,
};
pub use pipeline::archive::ArchiveBuilder;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
