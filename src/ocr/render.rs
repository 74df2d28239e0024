//! PDF rasterisation: decode bytes into per-page images via pdfium.
//!
//! pdfium wants a file-system path, so the bytes are spilled to a managed
//! temp file that is deleted on return. The whole routine is blocking and
//! CPU-bound; callers already run it inside `spawn_blocking`.

use crate::error::ExtractError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Write;
use tracing::debug;

/// Rasterise every page of a PDF into an image, in document order.
pub fn rasterize_pdf(
    pdf_bytes: &[u8],
    dpi: u32,
    max_pixels: u32,
) -> Result<Vec<DynamicImage>, ExtractError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| ExtractError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(pdf_bytes)
        .map_err(|e| ExtractError::Internal(format!("tempfile write: {e}")))?;

    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_file(tmp.path(), None)
        .map_err(|e| ExtractError::CorruptPdf {
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    debug!("PDF loaded: {} pages", total_pages);

    let mut images = Vec::with_capacity(total_pages);

    for idx in 0..total_pages {
        let page = pages
            .get(idx as u16)
            .map_err(|e| ExtractError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?;

        // Width in pixels at the requested DPI (page sizes are in points,
        // 72 per inch), capped so oversized pages stay in memory bounds.
        let target_width =
            (((page.width().value / 72.0) * dpi as f32) as u32).min(max_pixels) as i32;

        let render_config = PdfRenderConfig::new()
            .set_target_width(target_width)
            .set_maximum_height(max_pixels as i32);

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| ExtractError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        images.push(image);
    }

    Ok(images)
}
