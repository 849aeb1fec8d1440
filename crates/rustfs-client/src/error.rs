//! Error types for the RustFS client

use std::fmt;

#[derive(Debug)]
pub enum RustFsError {
    /// Bad endpoint or credentials at construction time
    Config(String),
    /// Transport-level failure
    Http(reqwest::Error),
    /// The store answered with a non-success status
    Api { status: u16, message: String },
}

impl fmt::Display for RustFsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Http(e) => write!(f, "HTTP error: {e}"),
            Self::Api { status, message } => {
                write!(f, "Object store error (status {status}): {message}")
            }
        }
    }
}

impl std::error::Error for RustFsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RustFsError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}

pub type Result<T> = std::result::Result<T, RustFsError>;
