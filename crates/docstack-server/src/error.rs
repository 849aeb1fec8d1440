//! Error types for the document backend

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use disk_blob_cache::RetrieveError;
use serde_json::json;
use std::fmt;

/// Bootstrap-time failures surfaced from `main`
#[derive(Debug)]
pub enum ServerError {
    Config(String),
    Io(std::io::Error),
    Store(rustfs_client::RustFsError),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Store(e) => write!(f, "Object store error: {e}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Store(e) => Some(e),
            Self::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<rustfs_client::RustFsError> for ServerError {
    fn from(err: rustfs_client::RustFsError) -> Self {
        Self::Store(err)
    }
}

impl From<tracing_subscriber::filter::ParseError> for ServerError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

/// Request-handling error type that converts to HTTP responses
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    BadGateway(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadGateway(msg) => {
                tracing::error!(error = %msg, "Upstream failure");
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

impl From<RetrieveError> for AppError {
    fn from(err: RetrieveError) -> Self {
        match err {
            RetrieveError::NotFound => AppError::NotFound("Object not found".to_string()),
            RetrieveError::Remote(e) => AppError::BadGateway(format!("Object store error: {e}")),
            RetrieveError::Io(e) => AppError::Internal(format!("Cache I/O error: {e}")),
        }
    }
}

impl From<rustfs_client::RustFsError> for AppError {
    fn from(err: rustfs_client::RustFsError) -> Self {
        AppError::Internal(format!("Object store error: {err}"))
    }
}

impl From<dify_api::DifyError> for AppError {
    fn from(err: dify_api::DifyError) -> Self {
        AppError::Internal(format!("Dify processing failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display() {
        let err = ServerError::Config("RUSTFS_ACCESS_KEY is not set".to_string());
        assert_eq!(
            format!("{}", err),
            "Configuration error: RUSTFS_ACCESS_KEY is not set"
        );
    }

    #[test]
    fn test_retrieve_not_found_maps_to_404() {
        let err: AppError = RetrieveError::NotFound.into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_retrieve_remote_maps_to_502() {
        let err: AppError = RetrieveError::Remote("connection reset".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_internal_hides_detail() {
        let response = AppError::Internal("secret path /var/cache".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
