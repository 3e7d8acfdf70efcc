use super::{non_empty_str, JsonBody};
use crate::dtos::{DocumentListResponse, UploadResponse};
use crate::envelope::ResponseEnvelope;
use crate::startup::AppState;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use service_core::error::AppError;

pub const SYNC_REMINDER: &str = "Run POST /sync to update knowledge base";

pub async fn upload_document(
    state: &AppState,
    body: &JsonBody,
) -> Result<ResponseEnvelope, AppError> {
    let filename =
        non_empty_str(body, "filename").ok_or_else(|| AppError::bad_request("Filename required"))?;

    let data = decode_content(body)?;
    let size = data.len();

    tracing::info!(filename = %filename, size = size, "Document upload started");

    state.storage.upload(filename, data).await.map_err(|e| {
        tracing::error!("Failed to upload file {} to storage: {}", filename, e);
        e
    })?;

    tracing::info!(filename = %filename, "Document upload completed");

    Ok(ResponseEnvelope::ok(&UploadResponse {
        message: format!("{} uploaded", filename),
        note: SYNC_REMINDER,
    }))
}

/// Base64 content wins over plain text when both are supplied.
fn decode_content(body: &JsonBody) -> Result<Vec<u8>, AppError> {
    if let Some(encoded) = non_empty_str(body, "content_base64") {
        return STANDARD
            .decode(encoded)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Invalid base64 content: {}", e)));
    }

    non_empty_str(body, "content")
        .map(|text| text.as_bytes().to_vec())
        .ok_or_else(|| AppError::bad_request("Content required"))
}

pub async fn list_documents(state: &AppState) -> Result<ResponseEnvelope, AppError> {
    let documents = state.storage.list().await?;
    let count = documents.len();

    tracing::debug!(count = count, "Listed documents");

    Ok(ResponseEnvelope::ok(&DocumentListResponse { documents, count }))
}
