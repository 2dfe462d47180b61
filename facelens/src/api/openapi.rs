use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use crate::ocr::OrderedTextFragment;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Facelens API",
        version = "0.1.0",
        description = "Face comparison and reading-order text extraction for uploaded images.",
    ),
    paths(
        handlers::health::health_check,
        handlers::faces::compare_faces,
        handlers::text::extract_text,
    ),
    components(schemas(
        dto::HealthResponse,
        dto::CompareFacesForm,
        dto::CompareFacesResponse,
        dto::ExtractTextForm,
        dto::ExtractTextResponse,
        dto::ErrorResponse,
        OrderedTextFragment,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "faces", description = "Face comparison between two images"),
        (name = "ocr", description = "Text extraction in reading order"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
