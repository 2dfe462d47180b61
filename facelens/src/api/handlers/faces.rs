use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::Json;

use crate::api::dto::{CompareFacesForm, CompareFacesResponse, ErrorResponse};
use crate::api::AppState;
use crate::error::{FacelensError, Result};
use crate::faces::{coerce_comparison, ComparisonResult};
use crate::staging::CleanupGuard;

use super::upload::UploadForm;

/// `POST /api/compare-faces`
///
/// Stages both uploads, runs the shared comparator over the two paths and
/// returns its verdict with `match` coerced to a boolean. Staged files are
/// removed whatever the outcome.
#[utoipa::path(
    post,
    path = "/api/compare-faces",
    tag = "faces",
    request_body(content = CompareFacesForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Comparison verdict", body = CompareFacesResponse),
        (status = 400, description = "Missing upload or unsupported format", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 500, description = "Comparison failed", body = ErrorResponse),
    )
)]
pub async fn compare_faces(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ComparisonResult>> {
    let mut form = UploadForm::read(multipart).await?;
    let (Some(image1), Some(image2)) = (form.take("image1"), form.take("image2")) else {
        return Err(FacelensError::MissingUpload(
            "Both image1 and image2 must be provided".to_string(),
        ));
    };

    let mut guard = CleanupGuard::new();
    let first = state.staging.stage(&image1).await?;
    guard.track(first.clone());
    let second = state.staging.stage(&image2).await?;
    guard.track(second.clone());

    let (Some(first), Some(second)) = (first, second) else {
        guard.finish();
        return Err(FacelensError::InvalidFormat);
    };

    let outcome = state.faces.compare(&first, &second).await;
    guard.finish();

    let result = coerce_comparison(outcome?);
    tracing::info!(
        is_match = result.is_match,
        success = result.success,
        threshold = state.faces.threshold(),
        "Face comparison complete"
    );
    Ok(Json(result))
}
