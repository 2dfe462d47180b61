use reqwest::{
    multipart::{Form, Part},
    Client,
};
use serde_json::{Map, Value};
use std::path::Path;
use std::time::Duration;

use crate::config::FaceConfig;
use crate::error::{FacelensError, Result};

/// Client for a remote face comparison service.
///
/// `POST {base_url}/compare` as multipart with the two images (`image1`,
/// `image2`) and the `threshold`; the service answers with a JSON object that
/// is handed to the coercer untouched.
#[derive(Clone, Debug)]
pub struct FaceApiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

async fn file_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime.essence_str())
        .map_err(|e| FacelensError::FaceComparison(format!("Invalid upload part: {e}")))
}

impl FaceApiClient {
    pub fn new(config: &FaceConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .clone()
            .ok_or_else(|| {
                FacelensError::FaceComparison("FACE_BASE_URL required for face API".to_string())
            })?
            .trim_end_matches('/')
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FacelensError::FaceComparison(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn compare(
        &self,
        first: &Path,
        second: &Path,
        threshold: f32,
    ) -> Result<Map<String, Value>> {
        let form = Form::new()
            .part("image1", file_part(first).await?)
            .part("image2", file_part(second).await?)
            .text("threshold", threshold.to_string());

        let mut builder = self
            .client
            .post(format!("{}/compare", self.base_url))
            .multipart(form);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| FacelensError::FaceComparison(format!("API request failed: {e}")))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(FacelensError::FaceComparison(format!(
                "API request failed: {status} - {body}"
            )));
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(FacelensError::FaceComparison(format!(
                "Expected a JSON object, got: {other}"
            ))),
            Err(e) => Err(FacelensError::FaceComparison(format!(
                "Failed to parse response: {e}"
            ))),
        }
    }
}
