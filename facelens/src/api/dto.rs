use serde::Serialize;

use crate::ocr::OrderedTextFragment;

/// `GET /health` body.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Server time, RFC 3339.
    pub timestamp: String,
}

/// `POST /api/extract-text` success body.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ExtractTextResponse {
    pub success: bool,
    pub text_count: usize,
    pub extracted_text: Vec<OrderedTextFragment>,
}

/// `POST /api/compare-faces` success body.
///
/// Only documents the response; handlers serialise
/// [`ComparisonResult`](crate::faces::ComparisonResult) directly. Fields
/// beyond `success` and `match` depend on the comparator backend.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CompareFacesResponse {
    pub success: bool,
    #[serde(rename = "match")]
    pub is_match: bool,
    pub similarity: Option<f64>,
    pub threshold: Option<f64>,
    pub model: Option<String>,
}

/// Body of every 4xx/5xx response.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Multipart form accepted by `POST /api/compare-faces`.
#[derive(Debug, utoipa::ToSchema)]
pub struct CompareFacesForm {
    #[schema(value_type = String, format = Binary)]
    pub image1: Vec<u8>,
    #[schema(value_type = String, format = Binary)]
    pub image2: Vec<u8>,
}

/// Multipart form accepted by `POST /api/extract-text`.
#[derive(Debug, utoipa::ToSchema)]
pub struct ExtractTextForm {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}
