//! Shared helpers for the integration tests.

#![allow(dead_code)]

use edgequake_pdf2zip::{EngineError, PageSource, RasterEngine};
use image::{DynamicImage, Rgba, RgbaImage};
use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use zip::ZipArchive;

// ── Instrumented engine ──────────────────────────────────────────────────────

/// Counts every lifecycle call so tests can assert on resource handling.
#[derive(Default, Clone)]
pub struct Counters {
    pub opens: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
    pub renders: Arc<AtomicUsize>,
    /// Page indices in the order the engine was asked to render them.
    pub rendered: Arc<Mutex<Vec<usize>>>,
}

impl Counters {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
    pub fn rendered(&self) -> Vec<usize> {
        self.rendered.lock().unwrap().clone()
    }
}

/// An engine that "parses" any buffer starting with `%PDF-` and reports a
/// fixed page count.
pub struct InstrumentedEngine {
    pub pages: usize,
    pub fail_on: Option<usize>,
    pub counters: Counters,
}

impl InstrumentedEngine {
    pub fn new(pages: usize) -> Self {
        Self {
            pages,
            fail_on: None,
            counters: Counters::default(),
        }
    }

    pub fn failing_on(pages: usize, index: usize) -> Self {
        Self {
            fail_on: Some(index),
            ..Self::new(pages)
        }
    }
}

impl RasterEngine for InstrumentedEngine {
    fn name(&self) -> &str {
        "instrumented"
    }

    fn open<'a>(
        &'a self,
        bytes: &'a [u8],
        _password: Option<&'a str>,
    ) -> Result<Box<dyn PageSource + 'a>, EngineError> {
        if !bytes.starts_with(b"%PDF-") {
            return Err(EngineError::Backend("FormatError".into()));
        }
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InstrumentedDocument {
            engine: self,
            closed: false,
        }))
    }
}

struct InstrumentedDocument<'a> {
    engine: &'a InstrumentedEngine,
    closed: bool,
}

impl PageSource for InstrumentedDocument<'_> {
    fn page_count(&self) -> usize {
        self.engine.pages
    }

    fn render_page(&mut self, index: usize) -> Result<DynamicImage, EngineError> {
        assert!(!self.closed, "render_page called after close");
        assert!(index < self.engine.pages, "index {index} out of range");
        let c = &self.engine.counters;
        c.renders.fetch_add(1, Ordering::SeqCst);
        c.rendered.lock().unwrap().push(index);

        if self.engine.fail_on == Some(index) {
            return Err(EngineError::Backend("unsupported content stream".into()));
        }
        // Distinct size per page; partly transparent to exercise flattening.
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_fn(
            20 + index as u32,
            10,
            |x, _| Rgba([(x * 10) as u8, 0, 200, if x % 2 == 0 { 255 } else { 0 }]),
        )))
    }

    fn close(&mut self) {
        assert!(!self.closed, "document closed twice");
        self.closed = true;
        self.engine.counters.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub const PDF_BYTES: &[u8] = b"%PDF-1.7\n%instrumented\n";

// ── Archive inspection ───────────────────────────────────────────────────────

/// `(name, uncompressed bytes)` for every entry, in archive order.
pub fn read_entries(zip_bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(zip_bytes)).expect("valid zip");
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).expect("entry");
            let mut data = Vec::new();
            entry.read_to_end(&mut data).expect("entry data");
            (entry.name().to_string(), data)
        })
        .collect()
}

// ── Minimal PDF generator ────────────────────────────────────────────────────

/// Build a valid `pages`-page PDF, each page `width`×`height` points with a
/// filled rectangle, and a correct xref table.
pub fn minimal_pdf(pages: usize, width: u32, height: u32) -> Vec<u8> {
    let mut objects: Vec<String> = Vec::new();
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());

    let kids: Vec<String> = (0..pages).map(|i| format!("{} 0 R", 3 + 2 * i)).collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages
    ));

    for i in 0..pages {
        let content_id = 4 + 2 * i;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {width} {height}] /Contents {content_id} 0 R >>"
        ));
        let stream = format!("0 0 1 rg 10 10 {} {} re f", 10 + i * 5, 20);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for off in offsets {
        out.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    out
}
