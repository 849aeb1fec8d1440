//! Error types for PDF rendering

use std::fmt;

#[derive(Debug)]
pub enum RenderError {
    /// The bytes are not a PDF or pdfium refused to open them
    InvalidDocument,
    /// Pdfium failed while loading or rasterising a page
    Render(String),
    /// PNG encoding of the rendered bitmap failed
    Encode(image::ImageError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDocument => write!(f, "Not a valid PDF document"),
            Self::Render(msg) => write!(f, "PDF render error: {msg}"),
            Self::Encode(e) => write!(f, "PNG encode error: {e}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        Self::Encode(err)
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_document_display() {
        assert_eq!(
            format!("{}", RenderError::InvalidDocument),
            "Not a valid PDF document"
        );
    }

    #[test]
    fn test_render_error_display() {
        let err = RenderError::Render("page out of bounds".to_string());
        assert!(format!("{}", err).contains("page out of bounds"));
    }
}
