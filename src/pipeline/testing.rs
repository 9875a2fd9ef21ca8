//! In-memory engine used by the unit tests.

use crate::engine::{PageSource, RasterEngine};
use crate::error::EngineError;
use image::{DynamicImage, Rgba, RgbaImage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
pub(crate) struct FakeEngine {
    pub pages: usize,
    pub fail_on: Option<usize>,
    pub reject: Option<EngineError>,
    pub opens: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
    pub renders: Arc<AtomicUsize>,
}

impl FakeEngine {
    pub fn with_pages(pages: usize) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }
}

impl RasterEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    fn open<'a>(
        &'a self,
        _bytes: &'a [u8],
        _password: Option<&'a str>,
    ) -> Result<Box<dyn PageSource + 'a>, EngineError> {
        if let Some(ref e) = self.reject {
            return Err(e.clone());
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeDocument {
            engine: self,
            open: true,
        }))
    }
}

struct FakeDocument<'a> {
    engine: &'a FakeEngine,
    open: bool,
}

impl PageSource for FakeDocument<'_> {
    fn page_count(&self) -> usize {
        self.engine.pages
    }

    fn render_page(&mut self, index: usize) -> Result<DynamicImage, EngineError> {
        if !self.open {
            return Err(EngineError::Closed);
        }
        self.engine.renders.fetch_add(1, Ordering::SeqCst);
        if self.engine.fail_on == Some(index) {
            return Err(EngineError::Backend(format!("corrupt page object {index}")));
        }
        // Half-transparent red so the flattening path is exercised.
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            8 + index as u32,
            6,
            Rgba([255, 0, 0, 128]),
        )))
    }

    // Counts every call, so a double close shows up as 2.
    fn close(&mut self) {
        self.open = false;
        self.engine.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Bytes that pass the loader's header check.
pub(crate) const PDF_BYTES: &[u8] = b"%PDF-1.7\n%fake\n";
