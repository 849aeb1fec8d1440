//! Error types for the Dify client

use std::fmt;

#[derive(Debug)]
pub enum DifyError {
    Http(reqwest::Error),
    /// Dify answered with a non-success status
    Api { status: u16, message: String },
}

impl fmt::Display for DifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "HTTP error: {e}"),
            Self::Api { status, message } => match status {
                401 => write!(f, "Dify rejected the API key (status 401): {message}"),
                404 => write!(f, "Dify endpoint not found (status 404): {message}"),
                _ => write!(f, "Dify API error (status {status}): {message}"),
            },
        }
    }
}

impl std::error::Error for DifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DifyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}

pub type Result<T> = std::result::Result<T, DifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_display_names_the_api_key() {
        let err = DifyError::Api {
            status: 401,
            message: "Unauthorized".to_string(),
        };
        assert!(format!("{}", err).contains("API key"));
    }

    #[test]
    fn test_generic_api_error_display() {
        let err = DifyError::Api {
            status: 500,
            message: "internal error".to_string(),
        };
        let rendered = format!("{}", err);
        assert!(rendered.contains("500"));
        assert!(rendered.contains("internal error"));
    }
}
