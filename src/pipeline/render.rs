//! Page rasterisation: one page of an open document → one [`RenderedPage`].
//!
//! Pages render at their intrinsic size with no DPI override. Any failure,
//! whether from the engine or the PNG encoder, comes back as
//! [`Pdf2ZipError::PageRender`] carrying the 0-based page index. A failed
//! page leaves the document handle usable; deciding that the whole
//! conversion stops is the driver's call.

use crate::error::Pdf2ZipError;
use crate::output::RenderedPage;
use crate::pipeline::encode;
use crate::pipeline::load::DocumentHandle;
use tracing::debug;

/// Rasterise page `page_index` of `doc` into an encoded PNG.
pub fn render_page(
    doc: &mut DocumentHandle<'_>,
    page_index: usize,
) -> Result<RenderedPage, Pdf2ZipError> {
    let total = doc.page_count();
    if page_index >= total {
        return Err(Pdf2ZipError::PageRender {
            page_index,
            detail: format!("page index out of range (document has {total} pages)"),
        });
    }

    let image = doc
        .source_mut()
        .and_then(|source| source.render_page(page_index))
        .map_err(|e| Pdf2ZipError::PageRender {
            page_index,
            detail: e.to_string(),
        })?;

    debug!(
        "Rendered page {} → {}x{} px",
        page_index + 1,
        image.width(),
        image.height()
    );

    let bytes = encode::encode_page(&image).map_err(|e| Pdf2ZipError::PageRender {
        page_index,
        detail: format!("image encoding failed: {e}"),
    })?;

    Ok(RenderedPage::new(page_index, bytes))
}
