use std::path::PathBuf;

use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::Json;

use crate::api::dto::{ErrorResponse, ExtractTextForm, ExtractTextResponse};
use crate::api::AppState;
use crate::error::{FacelensError, Result};
use crate::ocr::{load_image, normalize_detections, OrderedTextFragment};
use crate::staging::CleanupGuard;

use super::upload::UploadForm;

/// `POST /api/extract-text`
#[utoipa::path(
    post,
    path = "/api/extract-text",
    tag = "ocr",
    request_body(content = ExtractTextForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Text fragments in reading order", body = ExtractTextResponse),
        (status = 400, description = "Missing upload or unsupported format", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 500, description = "Unreadable image or OCR failure", body = ErrorResponse),
    )
)]
pub async fn extract_text(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractTextResponse>> {
    let mut form = UploadForm::read(multipart).await?;
    let image = form
        .take("image")
        .ok_or_else(|| FacelensError::MissingUpload("No image file provided".to_string()))?;

    let mut guard = CleanupGuard::new();
    let staged = state.staging.stage(&image).await?;
    guard.track(staged.clone());

    let Some(path) = staged else {
        guard.finish();
        return Err(FacelensError::InvalidFormat);
    };

    let outcome = recognize_staged(&state, path).await;
    guard.finish();

    let extracted_text = outcome?;
    tracing::info!(text_count = extracted_text.len(), "Text extraction complete");

    Ok(Json(ExtractTextResponse {
        success: true,
        text_count: extracted_text.len(),
        extracted_text,
    }))
}

async fn recognize_staged(state: &AppState, path: PathBuf) -> Result<Vec<OrderedTextFragment>> {
    let image = tokio::task::spawn_blocking(move || load_image(&path))
        .await
        .map_err(|e| FacelensError::Internal(format!("Image decode task failed: {e}")))??;

    let raw = state.ocr.recognize(image).await?;
    Ok(normalize_detections(raw))
}
