//! Archive assembly: rendered pages → one deflate-compressed ZIP.
//!
//! Entries are written in the order they are appended; the builder never
//! reorders. Names must be unique and a duplicate is rejected rather than
//! shadowing the earlier entry. [`ArchiveBuilder::seal`] consumes the
//! builder, so appending after sealing does not compile.
//!
//! The ZIP is streamed into a [`SpooledTempFile`]: it stays in memory up to
//! the configured threshold and rolls over to an anonymous temp file beyond
//! that. Either way the caller gets plain bytes back, and an abandoned
//! builder deletes its scratch data on drop.
//!
//! Every entry gets the same timestamp and permissions, so identical pages
//! produce byte-identical archives.

use crate::config::DEFAULT_SPILL_THRESHOLD_BYTES;
use crate::error::Pdf2ZipError;
use crate::output::{ArchiveBuffer, RenderedPage};
use std::collections::HashSet;
use std::io::{Read, Seek, SeekFrom, Write};
use tempfile::SpooledTempFile;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Incrementally builds the output archive.
pub struct ArchiveBuilder {
    zip: ZipWriter<SpooledTempFile>,
    compression_level: Option<i64>,
    names: HashSet<String>,
    entries: Vec<String>,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    /// An empty builder with default compression and spill threshold.
    pub fn new() -> Self {
        Self::with_options(None, DEFAULT_SPILL_THRESHOLD_BYTES)
    }

    pub fn with_options(compression_level: Option<i64>, spill_threshold_bytes: usize) -> Self {
        Self {
            zip: ZipWriter::new(SpooledTempFile::new(spill_threshold_bytes)),
            compression_level,
            names: HashSet::new(),
            entries: Vec::new(),
        }
    }

    /// Number of entries appended so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_options(&self) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(self.compression_level)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644)
    }

    /// Write `page` as the next entry. The page is consumed.
    pub fn append(&mut self, page: RenderedPage) -> Result<(), Pdf2ZipError> {
        if self.names.contains(&page.name) {
            return Err(Pdf2ZipError::ArchiveWrite {
                detail: format!("duplicate entry name '{}'", page.name),
            });
        }

        let options = self.entry_options();
        self.zip.start_file(page.name.as_str(), options)?;
        self.zip
            .write_all(&page.bytes)
            .map_err(|e| Pdf2ZipError::ArchiveWrite {
                detail: format!("writing '{}': {e}", page.name),
            })?;

        debug!("Appended {} ({} bytes)", page.name, page.bytes.len());
        self.names.insert(page.name.clone());
        self.entries.push(page.name);
        Ok(())
    }

    /// Write the central directory and return the finished archive.
    pub fn seal(self) -> Result<ArchiveBuffer, Pdf2ZipError> {
        let mut spool = self.zip.finish()?;

        let mut bytes = Vec::new();
        spool
            .seek(SeekFrom::Start(0))
            .and_then(|_| spool.read_to_end(&mut bytes))
            .map_err(|e| Pdf2ZipError::ArchiveWrite {
                detail: format!("reading back archive: {e}"),
            })?;

        debug!(
            "Sealed archive: {} entries, {} bytes",
            self.entries.len(),
            bytes.len()
        );
        Ok(ArchiveBuffer::new(bytes, self.entries))
    }
}
