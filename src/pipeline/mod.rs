//! Pipeline stages for PDF-to-ZIP conversion.
//!
//! Each submodule implements exactly one step; [`crate::convert`] composes
//! them.
//!
//! ## Data Flow
//!
//! ```text
//! load ──▶ render ──▶ encode ──▶ archive
//! (open)   (engine)   (RGB PNG)  (deflate ZIP)
//! ```
//!
//! 1. [`load`]    — validate the bytes and open them as a [`load::DocumentHandle`]
//!    that closes itself on every exit path
//! 2. [`render`]  — rasterise one page through the injected engine
//! 3. [`encode`]  — flatten transparency onto white and PNG-encode
//! 4. [`archive`] — append each page as a deflated entry, then seal

pub mod archive;
pub mod encode;
pub mod load;
pub mod render;

#[cfg(test)]
pub(crate) mod testing;
