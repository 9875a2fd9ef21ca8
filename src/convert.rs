//! Conversion entry points: PDF bytes in, ZIP of page images out.
//!
//! [`convert_with`] is the driver. Everything else is a convenience wrapper
//! that binds the pdfium engine, reads or writes files, or moves the work
//! onto a blocking thread.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle → Opening → Rendering(0) → … → Rendering(n-1) → Sealing → Done
//!          └──────────────┴────────────────┴───────────────┴──→ Failed(kind)
//! ```
//!
//! `Done` and `Failed` are terminal.
//!
//! Pages are rendered strictly in order and the first failure aborts the
//! whole conversion: the document is closed, the half-built archive is
//! dropped (its scratch storage with it), and only the error is returned.

use crate::config::ConversionConfig;
use crate::engine::{PdfiumEngine, RasterEngine};
use crate::error::{ConversionOutcome, ErrorKind, Pdf2ZipError};
use crate::output::{ArchiveBuffer, ArchiveSummary, DocumentInfo};
use crate::pipeline::archive::ArchiveBuilder;
use crate::pipeline::{load, render};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where a conversion is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStage {
    Idle,
    Opening,
    /// Rendering the page with this 0-based index.
    Rendering(usize),
    Sealing,
    Done,
    /// The conversion stopped with an error of this kind.
    Failed(ErrorKind),
}

impl fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionStage::Idle => f.write_str("idle"),
            ConversionStage::Opening => f.write_str("opening"),
            ConversionStage::Rendering(i) => write!(f, "rendering page {}", i + 1),
            ConversionStage::Sealing => f.write_str("sealing"),
            ConversionStage::Done => f.write_str("done"),
            ConversionStage::Failed(kind) => write!(f, "failed ({kind:?})"),
        }
    }
}

/// Convert PDF bytes to a ZIP of page images using the pdfium engine.
///
/// The engine is bound first, so a missing libpdfium is reported as
/// [`Pdf2ZipError::DependencyUnavailable`] before the bytes are looked at.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdf2zip::{convert, ConversionConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pdf = std::fs::read("document.pdf")?;
/// let archive = convert(&pdf, &ConversionConfig::default())?;
/// std::fs::write("document_images.zip", archive.as_bytes())?;
/// # Ok(())
/// # }
/// ```
pub fn convert(bytes: &[u8], config: &ConversionConfig) -> ConversionOutcome {
    let engine = PdfiumEngine::bind()?;
    convert_with(&engine, bytes, config)
}

/// Convert PDF bytes with an explicit engine.
///
/// # Errors
/// - [`Pdf2ZipError::DocumentOpen`] — the bytes are not a readable PDF;
///   nothing is rendered.
/// - [`Pdf2ZipError::PageRender`] — the first page that failed; no archive
///   is returned.
/// - [`Pdf2ZipError::ArchiveWrite`] — appending or sealing failed.
pub fn convert_with(
    engine: &dyn RasterEngine,
    bytes: &[u8],
    config: &ConversionConfig,
) -> ConversionOutcome {
    let start = Instant::now();
    let mut stage = ConversionStage::Idle;

    let result = drive(engine, bytes, config, &mut stage);

    if let Ok(archive) = &result {
        info!(
            "Conversion complete: {} pages, {} bytes, {}ms",
            archive.entry_names().len(),
            archive.len(),
            start.elapsed().as_millis()
        );
    }
    result
}

/// Run one conversion, leaving `stage` at `Done` or `Failed`.
fn drive(
    engine: &dyn RasterEngine,
    bytes: &[u8],
    config: &ConversionConfig,
    stage: &mut ConversionStage,
) -> ConversionOutcome {
    let result = run(engine, bytes, config, stage);
    if let Err(e) = &result {
        let failed_while = *stage;
        advance(stage, ConversionStage::Failed(e.kind()));
        warn!("Conversion failed while {}: {}", failed_while, e);
    }
    result
}

fn run(
    engine: &dyn RasterEngine,
    bytes: &[u8],
    config: &ConversionConfig,
    stage: &mut ConversionStage,
) -> ConversionOutcome {
    advance(stage, ConversionStage::Opening);
    let mut doc = load::open_document(engine, bytes, config.password.as_deref())?;
    let total = doc.page_count();
    info!("PDF loaded: {} pages", total);

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total);
    }

    let mut builder =
        ArchiveBuilder::with_options(config.compression_level, config.spill_threshold_bytes);

    for index in 0..total {
        advance(stage, ConversionStage::Rendering(index));
        let page_num = index + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_num, total);
        }

        let page = match render::render_page(&mut doc, index) {
            Ok(page) => page,
            Err(e) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(page_num, total, &e.to_string());
                }
                return Err(e);
            }
        };

        let image_bytes = page.bytes.len();
        builder.append(page)?;

        if let Some(ref cb) = config.progress_callback {
            cb.on_page_complete(page_num, total, image_bytes);
        }
    }

    // Every page is in the archive; the document is no longer needed.
    doc.close();

    advance(stage, ConversionStage::Sealing);
    let archive = builder.seal()?;
    advance(stage, ConversionStage::Done);

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total, archive.len());
    }

    Ok(archive)
}

fn advance(stage: &mut ConversionStage, next: ConversionStage) {
    debug!("Conversion stage: {} → {}", stage, next);
    *stage = next;
}

/// Read a PDF from disk and convert it.
pub fn convert_file(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ArchiveBuffer, Pdf2ZipError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| Pdf2ZipError::InputReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!("Starting conversion: {}", path.display());
    convert(&bytes, config)
}

/// Convert a PDF file and write the archive to `output_path`.
///
/// Uses atomic write (temp file + rename) so a failed conversion never
/// leaves a partial archive behind.
pub fn convert_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ArchiveSummary, Pdf2ZipError> {
    let archive = convert_file(input_path, config)?;
    write_archive(&archive, output_path.as_ref())?;
    Ok(archive.summary())
}

/// Atomically write a sealed archive to `path`.
///
/// The bytes go to a uniquely named temp file in the destination directory,
/// which is then renamed over `path`. Concurrent writers to the same path
/// never share a scratch file; the last rename wins.
pub fn write_archive(archive: &ArchiveBuffer, path: &Path) -> Result<(), Pdf2ZipError> {
    let write_err = |source: std::io::Error| Pdf2ZipError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_err)?;

    // Dropped on any error below, which deletes the temp file.
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(archive.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    debug!("Wrote {} bytes to {}", archive.len(), path.display());
    Ok(())
}

/// Run [`convert`] on tokio's blocking pool.
///
/// pdfium is CPU-bound and not async-safe, so async servers should use this
/// instead of calling [`convert`] on a worker thread. Wrap the future in
/// `tokio::time::timeout` to bound it.
pub async fn convert_async(bytes: Vec<u8>, config: ConversionConfig) -> ConversionOutcome {
    tokio::task::spawn_blocking(move || convert(&bytes, &config))
        .await
        .map_err(|e| Pdf2ZipError::Internal(format!("Conversion task panicked: {}", e)))?
}

/// Open a PDF and report its page count without rendering anything.
pub fn inspect(bytes: &[u8], password: Option<&str>) -> Result<DocumentInfo, Pdf2ZipError> {
    let engine = PdfiumEngine::bind()?;
    inspect_with(&engine, bytes, password)
}

/// [`inspect`] with an explicit engine.
pub fn inspect_with(
    engine: &dyn RasterEngine,
    bytes: &[u8],
    password: Option<&str>,
) -> Result<DocumentInfo, Pdf2ZipError> {
    let mut doc = load::open_document(engine, bytes, password)?;
    let info = DocumentInfo::new(doc.page_count());
    doc.close();
    Ok(info)
}
