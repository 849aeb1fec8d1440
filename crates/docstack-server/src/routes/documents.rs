//! PDF upload and Dify document-processing endpoints

use crate::error::AppError;
use crate::state::SharedState;
use axum::extract::{Multipart, State};
use axum::Json;
use pdf_render::DEFAULT_RENDER_DPI;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Lifetime of the preview URL handed to Dify
const PREVIEW_URL_TTL_SECS: u64 = 3600;

/// Response for a completed upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_processing_id: String,
    pub pdf_path: String,
    pub image_path: String,
    pub message: String,
}

/// Response for a completed Dify analysis
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub answer: String,
    pub confirmation_record: Option<serde_json::Value>,
    pub conversation_id: Option<String>,
    pub message_id: Option<String>,
    pub created_at: Option<i64>,
    pub metadata: serde_json::Value,
}

/// One uploaded PDF pulled out of a multipart body
struct UploadedPdf {
    file_name: String,
    data: Vec<u8>,
    user_id: Option<String>,
}

/// Read the `file` (and optional `user_id`) fields, enforcing the PDF
/// content-type check before buffering the payload
async fn read_pdf_upload(mut multipart: Multipart) -> Result<UploadedPdf, AppError> {
    let mut file_name = None;
    let mut data = None;
    let mut user_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let content_type = field.content_type().unwrap_or_default().to_lowercase();
                if !content_type.contains("pdf") {
                    return Err(AppError::BadRequest("Only PDF files are allowed".into()));
                }
                file_name = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|n| !n.is_empty());
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Failed to read file: {e}")))?
                        .to_vec(),
                );
            }
            Some("user_id") => {
                user_id = field.text().await.ok().filter(|u| !u.is_empty());
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| AppError::BadRequest("Missing 'file' field".into()))?;
    Ok(UploadedPdf {
        file_name: file_name.unwrap_or_else(|| "original.pdf".to_string()),
        data,
        user_id,
    })
}

/// POST /api/pdf/upload
///
/// Store the PDF and its first-page PNG in the object store under a fresh
/// processing ID.
pub async fn upload_pdf(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let upload = read_pdf_upload(multipart).await?;

    if !pdf_render::validate_pdf(upload.data.clone()).await {
        return Err(AppError::BadRequest("Invalid PDF file".into()));
    }

    let file_processing_id = Uuid::new_v4().to_string();
    let pdf_path = format!("{}/{}", file_processing_id, upload.file_name);
    let image_path = format!("{}/first_page.png", file_processing_id);

    info!(id = %file_processing_id, file = %upload.file_name, "Processing PDF upload");

    state
        .store
        .put_object(&pdf_path, &upload.data, "application/pdf")
        .await?;

    let image = pdf_render::render_first_page(upload.data, DEFAULT_RENDER_DPI)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to extract first page: {e}")))?;

    state.store.put_object(&image_path, &image, "image/png").await?;

    Ok(Json(UploadResponse {
        file_processing_id,
        pdf_path,
        image_path,
        message: "PDF processed successfully".to_string(),
    }))
}

/// POST /api/dify/process-document
///
/// Extract the first page, stage it in the object store, and run the Dify
/// analysis chatflow over a presigned preview URL.
pub async fn process_document(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Json<ProcessResponse>, AppError> {
    let dify = state
        .dify
        .as_ref()
        .ok_or_else(|| AppError::Internal("Dify API key is not configured".into()))?;

    let upload = read_pdf_upload(multipart).await?;
    let user_id = upload.user_id.unwrap_or_else(|| "default-user".to_string());

    if !pdf_render::validate_pdf(upload.data.clone()).await {
        return Err(AppError::BadRequest("Invalid PDF file".into()));
    }

    let file_processing_id = Uuid::new_v4().to_string();
    let image_path = format!("{}/first_page.png", file_processing_id);

    info!(id = %file_processing_id, user_id = %user_id, "Processing document for analysis");

    let image = pdf_render::render_first_page(upload.data, DEFAULT_RENDER_DPI)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to extract first page: {e}")))?;

    state.store.put_object(&image_path, &image, "image/png").await?;

    let preview_url = state
        .store
        .presigned_get_url(&image_path, PREVIEW_URL_TTL_SECS);

    let outcome = dify.analyze_document(&preview_url, &user_id, None).await?;

    info!(id = %file_processing_id, "Dify processing completed");

    Ok(Json(ProcessResponse {
        success: true,
        answer: outcome.answer,
        confirmation_record: outcome.confirmation_record,
        conversation_id: outcome.conversation_id,
        message_id: outcome.message_id,
        created_at: outcome.created_at,
        metadata: outcome.metadata,
    }))
}
