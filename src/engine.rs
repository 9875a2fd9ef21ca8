//! The rasterisation capability: open PDF bytes, count pages, render page N.
//!
//! The pipeline never talks to pdfium directly. It is handed a
//! [`RasterEngine`], so an engine that cannot be loaded is a typed
//! [`Pdf2ZipError::DependencyUnavailable`] at bind time instead of a null
//! check scattered through the pipeline, and tests can inject an
//! instrumented engine without a native library.
//!
//! ## Locating libpdfium
//!
//! [`PdfiumEngine::bind`] tries, in order:
//!
//! 1. `PDFIUM_LIB_PATH` — an explicit library file.
//! 2. The shared cache populated by the `pdf2md` tooling:
//!    `{cache_dir}/pdf2md/pdfium-{PDFIUM_VERSION}/` (base overridable with
//!    `PDFIUM_AUTO_CACHE_DIR`).
//! 3. The system library search path.

use crate::error::{EngineError, Pdf2ZipError};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// pdfium-binaries release whose cache directory is probed.
pub const PDFIUM_VERSION: &str = "7690";

/// A backend able to open PDF bytes as a paged document.
pub trait RasterEngine {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Open `bytes` as a document. No handle is returned on failure.
    fn open<'a>(
        &'a self,
        bytes: &'a [u8],
        password: Option<&'a str>,
    ) -> Result<Box<dyn PageSource + 'a>, EngineError>;
}

/// An open document owned by one conversion.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Rasterise page `index` at its intrinsic size (1 px per PDF point).
    ///
    /// The returned image may carry an alpha channel; flattening is the
    /// pipeline's job.
    fn render_page(&mut self, index: usize) -> Result<DynamicImage, EngineError>;

    /// Release backend resources. Must be idempotent; rendering afterwards
    /// returns [`EngineError::Closed`].
    fn close(&mut self);
}

// ── pdfium backend ───────────────────────────────────────────────────────

/// [`RasterEngine`] backed by a dynamically loaded libpdfium.
pub struct PdfiumEngine {
    pdfium: Pdfium,
}

impl PdfiumEngine {
    /// Locate and bind libpdfium, see the module docs for the search order.
    pub fn bind() -> Result<Self, Pdf2ZipError> {
        if let Ok(p) = std::env::var("PDFIUM_LIB_PATH") {
            let path = PathBuf::from(p);
            if path.exists() {
                return Self::from_path(&path);
            }
            debug!("PDFIUM_LIB_PATH '{}' does not exist; searching", path.display());
        }

        let cached = pdfium_cache_dir().join(Pdfium::pdfium_platform_library_name());
        if cached.exists() {
            return Self::from_path(&cached);
        }

        let bindings = Pdfium::bind_to_system_library().map_err(|e| {
            Pdf2ZipError::DependencyUnavailable(format!(
                "libpdfium not found (checked PDFIUM_LIB_PATH, {}, system paths): {e}",
                cached.display()
            ))
        })?;
        debug!("Bound pdfium from system library path");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    /// Bind libpdfium from an explicit file.
    pub fn from_path(path: &Path) -> Result<Self, Pdf2ZipError> {
        let bindings = Pdfium::bind_to_library(path).map_err(|e| {
            Pdf2ZipError::DependencyUnavailable(format!(
                "failed to load '{}': {e}",
                path.display()
            ))
        })?;
        debug!("Bound pdfium from {}", path.display());
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl RasterEngine for PdfiumEngine {
    fn name(&self) -> &str {
        "pdfium"
    }

    fn open<'a>(
        &'a self,
        bytes: &'a [u8],
        password: Option<&'a str>,
    ) -> Result<Box<dyn PageSource + 'a>, EngineError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, password)
            .map_err(|e| classify_load_error(&format!("{:?}", e), password.is_some()))?;
        let page_count = document.pages().len() as usize;
        Ok(Box::new(PdfiumDocument {
            document: Some(document),
            page_count,
        }))
    }
}

/// Map a pdfium load failure to an [`EngineError`].
///
/// pdfium reports a bad or missing password through the same error path as
/// corruption, so the message is inspected.
fn classify_load_error(err_str: &str, password_given: bool) -> EngineError {
    if err_str.contains("Password") || err_str.contains("password") {
        if password_given {
            EngineError::WrongPassword
        } else {
            EngineError::PasswordRequired
        }
    } else {
        EngineError::Backend(err_str.to_string())
    }
}

struct PdfiumDocument<'a> {
    document: Option<PdfDocument<'a>>,
    page_count: usize,
}

impl PageSource for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn render_page(&mut self, index: usize) -> Result<DynamicImage, EngineError> {
        let document = self.document.as_ref().ok_or(EngineError::Closed)?;

        let page = document
            .pages()
            .get(index as u16)
            .map_err(|e| EngineError::Backend(format!("{:?}", e)))?;

        // Scale 1.0: one pixel per point, the page's intrinsic 72 DPI size.
        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(1.0)
            .set_clear_color(PdfColor::WHITE);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| EngineError::Backend(format!("{:?}", e)))?;

        Ok(bitmap.as_image())
    }

    fn close(&mut self) {
        // Dropping the PdfDocument calls FPDF_CloseDocument.
        self.document.take();
    }
}

/// Per-version cache directory shared with the pdf2md tooling.
pub fn pdfium_cache_dir() -> PathBuf {
    if let Ok(override_dir) = std::env::var("PDFIUM_AUTO_CACHE_DIR") {
        return PathBuf::from(override_dir).join(format!("pdfium-{PDFIUM_VERSION}"));
    }

    let base = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir);

    base.join("pdf2md").join(format!("pdfium-{PDFIUM_VERSION}"))
}
