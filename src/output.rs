//! Output types: rendered pages, the sealed archive, and summaries.

use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// MIME type of the archive produced by a conversion.
pub const ARCHIVE_MIME_TYPE: &str = "application/zip";

/// File extension of every page image inside the archive.
pub const PAGE_IMAGE_EXTENSION: &str = "png";

/// Minimum digits in the page number of an entry name.
pub const PAGE_NUMBER_WIDTH: usize = 3;

/// Archive entry name for a 0-based page index: `page_001.png`, `page_002.png`, …
///
/// Pages past 999 simply grow wider (`page_1000.png`); names stay unique.
pub fn entry_name(page_index: usize) -> String {
    format!(
        "page_{:0width$}.{}",
        page_index + 1,
        PAGE_IMAGE_EXTENSION,
        width = PAGE_NUMBER_WIDTH
    )
}

/// Suggested download filename for the archive: `{base}_images.zip`.
///
/// `original` is the uploaded file name; any directory part and the final
/// extension are dropped. Sanitising the name is the caller's job.
pub fn download_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original);
    let stem = match base.rfind('.') {
        Some(0) | None => base,
        Some(dot) => &base[..dot],
    };
    let stem = if stem.is_empty() { "document" } else { stem };
    format!("{stem}_images.zip")
}

/// One rasterised page, ready to be moved into the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// 0-based position of the page in the source document.
    pub page_index: usize,
    /// Archive entry name, derived from `page_index`.
    pub name: String,
    /// Encoded image bytes (PNG, RGB, no alpha).
    pub bytes: Vec<u8>,
}

impl RenderedPage {
    pub fn new(page_index: usize, bytes: Vec<u8>) -> Self {
        Self {
            page_index,
            name: entry_name(page_index),
            bytes,
        }
    }
}

/// A sealed ZIP archive held in memory.
///
/// Immutable once returned: the only ways in are the accessors below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveBuffer {
    bytes: Vec<u8>,
    entry_names: Vec<String>,
}

impl ArchiveBuffer {
    pub(crate) fn new(bytes: Vec<u8>, entry_names: Vec<String>) -> Self {
        Self { bytes, entry_names }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Size of the archive in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Entry names in insertion (page) order.
    pub fn entry_names(&self) -> &[String] {
        &self.entry_names
    }

    /// A reader positioned at the start of the archive.
    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(&self.bytes)
    }

    pub fn summary(&self) -> ArchiveSummary {
        ArchiveSummary {
            page_count: self.entry_names.len(),
            entries: self.entry_names.clone(),
            size_bytes: self.bytes.len(),
            mime_type: ARCHIVE_MIME_TYPE.to_string(),
        }
    }
}

/// Serialisable description of a finished archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveSummary {
    pub page_count: usize,
    pub entries: Vec<String>,
    pub size_bytes: usize,
    pub mime_type: String,
}

/// What [`crate::convert::inspect`] learns without rendering anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    /// Entry names a full conversion would produce.
    pub entry_names: Vec<String>,
}

impl DocumentInfo {
    pub fn new(page_count: usize) -> Self {
        Self {
            page_count,
            entry_names: (0..page_count).map(entry_name).collect(),
        }
    }
}
