use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;
use leptess::LepTess;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::{parse_provider_model, OcrConfig};
use crate::error::{FacelensError, Result};

use super::api::OcrApiClient;
use super::preprocessing::{encode_png, prepare_for_ocr};
use super::tsv::parse_tsv_lines;

/// One text region as reported by an OCR engine.
///
/// `bbox` holds four corner points, clockwise from the top-left one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub bbox: [[f32; 2]; 4],
    pub text: String,
    pub confidence: f32,
}

impl RawDetection {
    pub fn top_left_y(&self) -> f32 {
        self.bbox[0][1]
    }
}

/// Text recognition over a decoded image.
///
/// `Ok(None)` or `Ok(Some(vec![]))` means nothing was detected. Detections
/// come back in engine order, not reading order.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    fn is_available(&self) -> bool;

    async fn recognize(&self, image: DynamicImage) -> Result<Option<Vec<RawDetection>>>;
}

enum OcrBackend {
    Local { tesseract: Arc<Mutex<LepTess>> },
    Api { client: OcrApiClient },
    Unavailable { reason: String },
}

pub struct OcrProvider {
    backend: OcrBackend,
    config: OcrConfig,
}

fn create_tesseract(languages: &str) -> std::result::Result<LepTess, String> {
    LepTess::new(None, languages).map_err(|e| e.to_string())
}

impl OcrProvider {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let (provider, _) = parse_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "api" => match OcrApiClient::new(config) {
                Ok(client) => {
                    info!(base_url = %client.base_url(), "OCR API backend initialized");
                    OcrBackend::Api { client }
                }
                Err(e) => {
                    let reason = format!("OCR API backend unavailable: {e}");
                    warn!("{}", reason);
                    OcrBackend::Unavailable { reason }
                }
            },
            _ => match create_tesseract(&config.languages) {
                Ok(lt) => {
                    info!(languages = %config.languages, "Tesseract OCR initialized");
                    OcrBackend::Local {
                        tesseract: Arc::new(Mutex::new(lt)),
                    }
                }
                Err(e) => {
                    let reason = format!("Tesseract not available: {e}");
                    warn!("{}", reason);
                    OcrBackend::Unavailable { reason }
                }
            },
        };

        Ok(Self {
            backend,
            config: config.clone(),
        })
    }

    #[cfg(test)]
    pub(crate) fn unavailable(reason: &str) -> Self {
        Self {
            backend: OcrBackend::Unavailable {
                reason: reason.to_string(),
            },
            config: OcrConfig::default(),
        }
    }
}

#[async_trait]
impl TextRecognizer for OcrProvider {
    fn is_available(&self) -> bool {
        !matches!(self.backend, OcrBackend::Unavailable { .. })
    }

    async fn recognize(&self, image: DynamicImage) -> Result<Option<Vec<RawDetection>>> {
        match &self.backend {
            OcrBackend::Local { tesseract } => {
                let tesseract = Arc::clone(tesseract);
                let max_dim = self.config.max_image_dimension;

                let lines = tokio::task::spawn_blocking(move || {
                    let (png, scale) = prepare_for_ocr(&image, max_dim)?;
                    let mut lt = tesseract.blocking_lock();
                    lt.set_image_from_mem(&png)
                        .map_err(|e| FacelensError::Ocr(format!("Failed to set image: {e}")))?;
                    let tsv = lt
                        .get_tsv_text(0)
                        .map_err(|e| FacelensError::Ocr(format!("Failed to extract text: {e}")))?;
                    Ok::<_, FacelensError>(parse_tsv_lines(&tsv, scale))
                })
                .await
                .map_err(|e| FacelensError::Ocr(format!("OCR task panicked: {e}")))??;

                Ok(Some(lines))
            }
            OcrBackend::Api { client } => {
                let png = encode_png(&image)?;
                client.recognize(&png).await
            }
            OcrBackend::Unavailable { reason } => {
                Err(FacelensError::OcrUnavailable(reason.clone()))
            }
        }
    }
}
