//! Cache-backed file serving and cache administration

use crate::error::AppError;
use crate::state::SharedState;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use disk_blob_cache::CacheStats;
use serde_json::json;
use tracing::info;

/// Extension of a storage key's final segment, with its leading dot;
/// empty when the segment has none
fn extension_of(key: &str) -> &str {
    let name = key.rsplit('/').next().unwrap_or(key);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[idx..],
        _ => "",
    }
}

/// GET /api/files/{*key}
///
/// Serve an object from the disk cache, transparently fetching it from the
/// object store on miss. `X-Cache` reports which side answered.
pub async fn get_file(
    State(state): State<SharedState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let extension = extension_of(&key);
    let fetched = state.retriever.fetch(&key, extension).await?;

    let data = tokio::fs::read(&fetched.path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read cached file: {e}")))?;

    let content_type = mime_guess::from_path(&fetched.path)
        .first_or_octet_stream()
        .to_string();
    let cache_header = if fetched.from_cache { "HIT" } else { "MISS" };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header("X-Cache", cache_header)
        .body(Body::from(data))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

/// GET /api/cache/stats
pub async fn cache_stats(State(state): State<SharedState>) -> Result<Json<CacheStats>, AppError> {
    let stats = state
        .cache
        .stats()
        .await
        .map_err(|e| AppError::Internal(format!("Cache scan failed: {e}")))?;
    Ok(Json(stats))
}

/// DELETE /api/cache
pub async fn purge_cache(State(state): State<SharedState>) -> Result<Response, AppError> {
    state
        .cache
        .purge_all()
        .await
        .map_err(|e| AppError::Internal(format!("Cache purge failed: {e}")))?;

    info!("Cache purged via admin endpoint");
    Ok(Json(json!({ "status": "cleared" })).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of_final_segment() {
        assert_eq!(extension_of("doc1/first_page.png"), ".png");
        assert_eq!(extension_of("doc1/report.v2.pdf"), ".pdf");
        assert_eq!(extension_of("doc1/original"), "");
        assert_eq!(extension_of("plain.pdf"), ".pdf");
    }

    #[test]
    fn test_extension_of_hidden_file_is_empty() {
        // A leading dot marks a hidden name, not an extension
        assert_eq!(extension_of("doc1/.hidden"), "");
    }
}
