use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::OcrConfig;
use crate::error::{FacelensError, Result};

use super::RawDetection;

/// Client for a remote OCR service speaking the PaddleOCR line format.
///
/// `POST {base_url}/ocr` with `{"image": "<base64 png>"}`; the answer is either
/// the bare result or `{"result": ...}`, where the result is a list of pages
/// (each `null` or a list of lines) or directly a list of lines, and a line is
/// `[[[x, y] ×4], [text, score]]`.
#[derive(Clone, Debug)]
pub struct OcrApiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct OcrRequest {
    image: String,
}

#[derive(Debug, Deserialize)]
struct PaddleLine([[f32; 2]; 4], (String, f32));

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PaddlePayload {
    Pages(Vec<Option<Vec<PaddleLine>>>),
    Lines(Vec<PaddleLine>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OcrResponse {
    Wrapped { result: Option<PaddlePayload> },
    Bare(Option<PaddlePayload>),
}

impl From<PaddleLine> for RawDetection {
    fn from(line: PaddleLine) -> Self {
        let PaddleLine(bbox, (text, confidence)) = line;
        RawDetection {
            bbox,
            text,
            confidence,
        }
    }
}

/// Decode a service response body into the detections of its first page.
pub(crate) fn parse_ocr_response(body: &str) -> Result<Option<Vec<RawDetection>>> {
    let response: OcrResponse = serde_json::from_str(body)
        .map_err(|e| FacelensError::Ocr(format!("Failed to parse response: {e}")))?;

    let payload = match response {
        OcrResponse::Wrapped { result } => result,
        OcrResponse::Bare(payload) => payload,
    };

    let lines = match payload {
        None => None,
        Some(PaddlePayload::Pages(pages)) => pages.into_iter().next().flatten(),
        Some(PaddlePayload::Lines(lines)) => Some(lines),
    };

    Ok(lines.map(|lines| lines.into_iter().map(RawDetection::from).collect()))
}

impl OcrApiClient {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .clone()
            .ok_or_else(|| FacelensError::Ocr("OCR_BASE_URL required for OCR API".to_string()))?
            .trim_end_matches('/')
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FacelensError::Ocr(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn recognize(&self, png_bytes: &[u8]) -> Result<Option<Vec<RawDetection>>> {
        let request = OcrRequest {
            image: STANDARD.encode(png_bytes),
        };

        let mut builder = self
            .client
            .post(format!("{}/ocr", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| FacelensError::Ocr(format!("API request failed: {e}")))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(FacelensError::Ocr(format!(
                "API request failed: {status} - {body}"
            )));
        }

        parse_ocr_response(&body)
    }
}
