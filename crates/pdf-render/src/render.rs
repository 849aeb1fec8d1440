//! Page rasterisation via pdfium

use crate::error::{RenderError, Result};
use image::ImageFormat;
use pdfium_render::prelude::*;
use std::io::Cursor;
use tracing::debug;

/// Default rasterisation resolution for preview images
pub const DEFAULT_RENDER_DPI: u32 = 150;

/// Resolution for the cheap open-and-render probe used by validation
const VALIDATE_DPI: u32 = 72;

/// PDF files start with this magic regardless of version
const PDF_MAGIC: &[u8] = b"%PDF";

fn bind_pdfium() -> Result<Pdfium> {
    // Prefer a pdfium shared library next to the binary, fall back to the
    // system-installed one.
    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map(Pdfium::new)
        .map_err(|e| RenderError::Render(format!("failed to bind pdfium: {e}")))
}

/// Render the first page of `data` to PNG bytes at `dpi`. Blocking; call
/// from `spawn_blocking` or use [`render_first_page`].
pub fn render_first_page_blocking(data: &[u8], dpi: u32) -> Result<Vec<u8>> {
    if !data.starts_with(PDF_MAGIC) {
        return Err(RenderError::InvalidDocument);
    }

    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(data, None)
        .map_err(|_| RenderError::InvalidDocument)?;

    let page = document
        .pages()
        .first()
        .map_err(|e| RenderError::Render(format!("document has no pages: {e}")))?;

    // Page metrics are in points (1/72 inch)
    let width_px = (page.width().value * dpi as f32 / 72.0).round() as i32;
    let height_px = (page.height().value * dpi as f32 / 72.0).round() as i32;

    let bitmap = page
        .render_with_config(
            &PdfRenderConfig::new()
                .set_target_width(width_px)
                .set_maximum_height(height_px),
        )
        .map_err(|e| RenderError::Render(format!("rasterisation failed: {e}")))?;

    let mut png = Cursor::new(Vec::new());
    bitmap.as_image().write_to(&mut png, ImageFormat::Png)?;

    let png = png.into_inner();
    debug!(dpi, width_px, height_px, png_bytes = png.len(), "Rendered first page");
    Ok(png)
}

/// Whether `data` is an openable, renderable PDF. Blocking; see
/// [`validate_pdf`] for the async wrapper.
pub fn validate_pdf_blocking(data: &[u8]) -> bool {
    if !data.starts_with(PDF_MAGIC) {
        return false;
    }
    // A header alone proves little; make sure page one actually renders
    render_first_page_blocking(data, VALIDATE_DPI).is_ok()
}

/// Async wrapper around [`render_first_page_blocking`]
pub async fn render_first_page(data: Vec<u8>, dpi: u32) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || render_first_page_blocking(&data, dpi))
        .await
        .map_err(|e| RenderError::Render(format!("render task panicked: {e}")))?
}

/// Async wrapper around [`validate_pdf_blocking`]
pub async fn validate_pdf(data: Vec<u8>) -> bool {
    tokio::task::spawn_blocking(move || validate_pdf_blocking(&data))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_missing_magic() {
        assert!(!validate_pdf_blocking(b"GIF89a not a pdf"));
        assert!(!validate_pdf_blocking(b""));
        assert!(matches!(
            render_first_page_blocking(b"plain text", DEFAULT_RENDER_DPI),
            Err(RenderError::InvalidDocument)
        ));
    }

    #[test]
    fn test_magic_alone_is_not_enough() {
        // Correct header, garbage body: must not validate
        assert!(!validate_pdf_blocking(b"%PDF-1.7 then nothing useful"));
    }

    #[tokio::test]
    async fn test_async_wrappers_reject_garbage() {
        assert!(!validate_pdf(b"not a pdf".to_vec()).await);
        assert!(render_first_page(b"not a pdf".to_vec(), DEFAULT_RENDER_DPI)
            .await
            .is_err());
    }
}
