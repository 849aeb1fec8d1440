//! First-page PDF rasterisation
//!
//! Renders page one of a PDF to PNG bytes at a caller-chosen DPI, and
//! validates that a byte buffer is an openable PDF at all. Pdfium is not
//! async-safe, so the async entry points hop through `spawn_blocking`;
//! the synchronous functions are exposed for callers already off the
//! runtime.

mod error;
mod render;

pub use error::{RenderError, Result};
pub use render::{
    render_first_page, render_first_page_blocking, validate_pdf, validate_pdf_blocking,
    DEFAULT_RENDER_DPI,
};
