use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FacelensError {
    #[error("{0}")]
    MissingUpload(String),

    #[error("Invalid file format. Allowed formats: png, jpg, jpeg")]
    InvalidFormat,

    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Could not read image: {0}")]
    ImageDecode(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),

    #[error("Face comparison error: {0}")]
    FaceComparison(String),

    #[error("Face comparator unavailable: {0}")]
    FaceUnavailable(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl FacelensError {
    /// True for failures caused by the request itself rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            FacelensError::MissingUpload(_)
                | FacelensError::InvalidFormat
                | FacelensError::Multipart(_)
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            FacelensError::MissingUpload(_) | FacelensError::InvalidFormat => {
                StatusCode::BAD_REQUEST
            }
            FacelensError::Multipart(e) => {
                let status = e.status();
                if status.is_client_error() {
                    status
                } else {
                    StatusCode::BAD_REQUEST
                }
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FacelensError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.is_client_error() {
            self.to_string()
        } else {
            tracing::error!(error = %self, "Error processing request");
            format!("Error processing request: {self}")
        };

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, FacelensError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_upload_is_bad_request_with_verbatim_message() {
        let response =
            FacelensError::MissingUpload("No image file provided".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "No image file provided");
    }

    #[tokio::test]
    async fn invalid_format_lists_allowed_extensions() {
        let response = FacelensError::InvalidFormat.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(
            json["error"],
            "Invalid file format. Allowed formats: png, jpg, jpeg"
        );
    }

    #[tokio::test]
    async fn engine_failure_is_internal_error_with_cause() {
        let response = FacelensError::Ocr("engine crashed".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(
            json["error"],
            "Error processing request: OCR error: engine crashed"
        );
    }

    #[test]
    fn error_kinds_are_tagged() {
        assert!(FacelensError::InvalidFormat.is_client_error());
        assert!(FacelensError::MissingUpload("x".into()).is_client_error());
        assert!(!FacelensError::ImageDecode("bad".into()).is_client_error());
        assert!(!FacelensError::FaceUnavailable("none".into()).is_client_error());
    }
}
