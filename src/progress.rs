//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the driver renders each page. Pages are processed strictly in
//! order, so events arrive in page order too.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2zip::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, image_bytes: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} done ({} bytes)", page_num, total_pages, image_bytes);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the conversion driver as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `Send + Sync` lets the config travel to a worker
/// thread (see [`crate::convert::convert_async`]).
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once the document is open and its page count is known.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is rasterised.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the document
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page has been rendered and appended to the archive.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages
    /// * `image_bytes` — size of the encoded PNG
    fn on_page_complete(&self, page_num: usize, total_pages: usize, image_bytes: usize) {
        let _ = (page_num, total_pages, image_bytes);
    }

    /// Called when a page fails. The conversion stops right after.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after the archive is sealed. Not called on failure.
    ///
    /// # Arguments
    /// * `total_pages`   — pages in the archive
    /// * `archive_bytes` — size of the sealed ZIP
    fn on_conversion_complete(&self, total_pages: usize, archive_bytes: usize) {
        let _ = (total_pages, archive_bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
