//! Document loading: validate the input bytes and open them through the engine.
//!
//! The returned [`DocumentHandle`] is the scoped owner of the engine's
//! document. It closes the document exactly once: on an explicit
//! [`DocumentHandle::close`] or, failing that, when it is dropped. Early
//! returns and `?` therefore can't leak the handle.

use crate::engine::{PageSource, RasterEngine};
use crate::error::{EngineError, Pdf2ZipError};
use tracing::debug;

/// How far into the buffer the `%PDF-` marker may appear. pdfium, like most
/// readers, tolerates a short preamble before the header.
const HEADER_SEARCH_WINDOW: usize = 1024;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// An open document, owned by one conversion.
pub struct DocumentHandle<'a> {
    source: Box<dyn PageSource + 'a>,
    page_count: usize,
    closed: bool,
}

impl<'a> DocumentHandle<'a> {
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Release the engine document. Safe to call any number of times.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.source.close();
            debug!("Document closed");
        }
    }

    pub(crate) fn source_mut(&mut self) -> Result<&mut (dyn PageSource + 'a), EngineError> {
        if self.closed {
            return Err(EngineError::Closed);
        }
        Ok(self.source.as_mut())
    }
}

impl Drop for DocumentHandle<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Open `bytes` as a PDF.
///
/// # Errors
/// [`Pdf2ZipError::DocumentOpen`] when the buffer is empty, has no PDF
/// header, or the engine refuses it. The engine's diagnostic is kept as the
/// error detail.
pub fn open_document<'a>(
    engine: &'a dyn RasterEngine,
    bytes: &'a [u8],
    password: Option<&'a str>,
) -> Result<DocumentHandle<'a>, Pdf2ZipError> {
    check_header(bytes)?;

    let source = engine
        .open(bytes, password)
        .map_err(|e| Pdf2ZipError::DocumentOpen {
            detail: e.to_string(),
        })?;
    let page_count = source.page_count();
    debug!(
        "Opened {} byte document with {}: {} pages",
        bytes.len(),
        engine.name(),
        page_count
    );

    Ok(DocumentHandle {
        source,
        page_count,
        closed: false,
    })
}

/// Cheap structural check before handing bytes to the engine.
fn check_header(bytes: &[u8]) -> Result<(), Pdf2ZipError> {
    if bytes.is_empty() {
        return Err(Pdf2ZipError::DocumentOpen {
            detail: "input is empty".into(),
        });
    }

    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    if window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        return Ok(());
    }

    let shown = &bytes[..bytes.len().min(4)];
    Err(Pdf2ZipError::DocumentOpen {
        detail: format!("missing %PDF header, first bytes: {:?}", shown),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pipeline::testing::{FakeEngine, PDF_BYTES};
    use std::sync::atomic::Ordering;

    #[test]
    fn empty_input_is_rejected_before_engine() {
        let engine = FakeEngine::with_pages(1);
        let err = open_document(&engine, b"", None).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::DocumentOpen);
        assert!(err.to_string().contains("empty"));
        assert_eq!(engine.opens.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn truncated_header_is_rejected() {
        let engine = FakeEngine::with_pages(1);
        let err = open_document(&engine, b"%PD", None).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::DocumentOpen);

        let err = open_document(&engine, b"PK\x03\x04zipfile", None).err().unwrap();
        assert!(err.to_string().contains("first bytes"), "got: {err}");
    }

    #[test]
    fn short_preamble_is_tolerated() {
        let engine = FakeEngine::with_pages(2);
        let mut bytes = b"\xEF\xBB\xBF\n".to_vec();
        bytes.extend_from_slice(PDF_BYTES);
        let doc = open_document(&engine, &bytes, None).unwrap();
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn engine_diagnostic_is_kept() {
        let engine = FakeEngine {
            reject: Some(EngineError::Backend("xref table broken".into())),
            ..FakeEngine::default()
        };
        let err = open_document(&engine, PDF_BYTES, None).err().unwrap();
        assert!(err.to_string().contains("xref table broken"));
    }

    #[test]
    fn password_required_surfaces_as_open_error() {
        let engine = FakeEngine {
            reject: Some(EngineError::PasswordRequired),
            ..FakeEngine::default()
        };
        let err = open_document(&engine, PDF_BYTES, None).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::DocumentOpen);
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn close_is_idempotent_and_drop_does_not_double_close() {
        let engine = FakeEngine::with_pages(3);
        {
            let mut doc = open_document(&engine, PDF_BYTES, None).unwrap();
            doc.close();
            doc.close();
            assert!(doc.is_closed());
            assert_eq!(doc.source_mut().err(), Some(EngineError::Closed));
        }
        assert_eq!(engine.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_closes_an_open_handle() {
        let engine = FakeEngine::with_pages(1);
        let doc = open_document(&engine, PDF_BYTES, None).unwrap();
        drop(doc);
        assert_eq!(engine.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn zero_page_document_opens() {
        let engine = FakeEngine::with_pages(0);
        let doc = open_document(&engine, PDF_BYTES, None).unwrap();
        assert_eq!(doc.page_count(), 0);
    }
}
