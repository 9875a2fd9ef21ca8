//! Configuration types for PDF-to-ZIP conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Raster output is deliberately fixed
//! (PNG, RGB, the page's intrinsic size); the knobs here only touch how the
//! document is opened and how the archive is written.

use crate::error::Pdf2ZipError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Default number of archive bytes kept in memory before spilling to disk.
pub const DEFAULT_SPILL_THRESHOLD_BYTES: usize = 64 * 1024 * 1024;

/// Smallest spill threshold the builder accepts.
pub const MIN_SPILL_THRESHOLD_BYTES: usize = 64 * 1024;

/// Configuration for a PDF-to-ZIP conversion.
///
/// # Example
/// ```rust
/// use edgequake_pdf2zip::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .compression_level(6)
///     .password("s3cret")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Deflate level for archive entries, 0–9. `None` uses the zip default.
    ///
    /// Only [`ConversionConfigBuilder::build`] checks the range. When the
    /// field is set directly, an out-of-range level is not caught until the
    /// first entry is written and fails the conversion with
    /// [`Pdf2ZipError::ArchiveWrite`]; call [`ConversionConfig::validate`]
    /// to get [`Pdf2ZipError::InvalidConfig`] up front instead.
    pub compression_level: Option<i64>,

    /// Archive bytes held in memory before the assembler spills to an
    /// anonymous temp file. Default: 64 MiB.
    ///
    /// The spill is invisible to callers: the sealed archive is always
    /// returned as one in-memory buffer.
    pub spill_threshold_bytes: usize,

    /// Receives per-page events while the conversion runs.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            password: None,
            compression_level: None,
            spill_threshold_bytes: DEFAULT_SPILL_THRESHOLD_BYTES,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("compression_level", &self.compression_level)
            .field("spill_threshold_bytes", &self.spill_threshold_bytes)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check the constraints the builder enforces.
    pub fn validate(&self) -> Result<(), Pdf2ZipError> {
        if let Some(level) = self.compression_level {
            if !(0..=9).contains(&level) {
                return Err(Pdf2ZipError::InvalidConfig(format!(
                    "Compression level must be 0–9, got {level}"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn compression_level(mut self, level: i64) -> Self {
        self.config.compression_level = Some(level);
        self
    }

    pub fn spill_threshold_bytes(mut self, bytes: usize) -> Self {
        self.config.spill_threshold_bytes = bytes.max(MIN_SPILL_THRESHOLD_BYTES);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2ZipError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
