use async_trait::async_trait;
use fastembed::{ImageEmbedding, ImageEmbeddingModel, ImageInitOptions};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::config::{parse_provider_model, FaceConfig};
use crate::error::{FacelensError, Result};

use super::api::FaceApiClient;

/// Face similarity between two staged images.
///
/// Returns the engine's raw JSON object; callers run it through
/// [`coerce_comparison`](super::coerce_comparison) before responding.
#[async_trait]
pub trait FaceComparator: Send + Sync {
    fn is_available(&self) -> bool;

    fn threshold(&self) -> f32;

    async fn compare(&self, first: &Path, second: &Path) -> Result<Map<String, Value>>;
}

enum FaceBackend {
    /// Cosine similarity of whole-image embeddings. No face is located, so
    /// this measures image similarity and never reports a missing face.
    Local {
        model: Arc<Mutex<ImageEmbedding>>,
        model_name: String,
    },
    Api {
        client: FaceApiClient,
    },
    Unavailable {
        reason: String,
    },
}

pub struct FaceProvider {
    backend: FaceBackend,
    threshold: f32,
}

impl FaceProvider {
    pub fn new(config: &FaceConfig) -> Result<Self> {
        let (provider, model_name) = parse_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "api" => match FaceApiClient::new(config) {
                Ok(client) => {
                    info!(base_url = %client.base_url(), "Face comparison API backend initialized");
                    FaceBackend::Api { client }
                }
                Err(e) => {
                    let reason = format!("Face API backend unavailable: {e}");
                    warn!("{}", reason);
                    FaceBackend::Unavailable { reason }
                }
            },
            _ => match build_model(resolve_image_model(model_name), &config.cache_dir) {
                Ok(model) => {
                    info!(model = %model_name, "Local face embedding model initialized");
                    FaceBackend::Local {
                        model: Arc::new(Mutex::new(model)),
                        model_name: model_name.to_string(),
                    }
                }
                Err(e) => {
                    let reason = format!("Local face model not available: {e}");
                    warn!("{}", reason);
                    FaceBackend::Unavailable { reason }
                }
            },
        };

        Ok(Self {
            backend,
            threshold: config.similarity_threshold,
        })
    }

    #[cfg(test)]
    pub(crate) fn unavailable(reason: &str) -> Self {
        Self {
            backend: FaceBackend::Unavailable {
                reason: reason.to_string(),
            },
            threshold: crate::config::DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

#[async_trait]
impl FaceComparator for FaceProvider {
    fn is_available(&self) -> bool {
        !matches!(self.backend, FaceBackend::Unavailable { .. })
    }

    fn threshold(&self) -> f32 {
        self.threshold
    }

    async fn compare(&self, first: &Path, second: &Path) -> Result<Map<String, Value>> {
        match &self.backend {
            FaceBackend::Local { model, model_name } => {
                let model = Arc::clone(model);
                let images = vec![first.to_path_buf(), second.to_path_buf()];

                let embeddings = tokio::task::spawn_blocking(move || {
                    let mut model = model.lock().map_err(|e| {
                        FacelensError::FaceComparison(format!("Face model lock poisoned: {e}"))
                    })?;
                    model
                        .embed(images, None)
                        .map_err(|e| FacelensError::FaceComparison(e.to_string()))
                })
                .await
                .map_err(|e| FacelensError::FaceComparison(format!("Face worker failed: {e}")))??;

                let [a, b] = embeddings.as_slice() else {
                    return Err(FacelensError::FaceComparison(format!(
                        "Expected 2 embeddings, got {}",
                        embeddings.len()
                    )));
                };

                Ok(similarity_result(
                    cosine_similarity(a, b),
                    self.threshold,
                    model_name,
                ))
            }
            FaceBackend::Api { client } => client.compare(first, second, self.threshold).await,
            FaceBackend::Unavailable { reason } => {
                Err(FacelensError::FaceUnavailable(reason.clone()))
            }
        }
    }
}

fn resolve_image_model(model_name: &str) -> ImageEmbeddingModel {
    match model_name {
        "clip-vit-b32" | "Qdrant/clip-ViT-B-32-vision" => ImageEmbeddingModel::ClipVitB32,
        "resnet50" | "Qdrant/resnet50-onnx" => ImageEmbeddingModel::Resnet50,
        "unicom-vit-b16" | "Qdrant/Unicom-ViT-B-16" => ImageEmbeddingModel::UnicomVitB16,
        "unicom-vit-b32" | "Qdrant/Unicom-ViT-B-32" => ImageEmbeddingModel::UnicomVitB32,
        "nomic-embed-vision-v1.5" | "nomic-ai/nomic-embed-vision-v1.5" => {
            ImageEmbeddingModel::NomicEmbedVisionV15
        }
        _ => ImageEmbeddingModel::ClipVitB32,
    }
}

fn build_model(
    model: ImageEmbeddingModel,
    cache_dir: &str,
) -> std::result::Result<ImageEmbedding, String> {
    ImageEmbedding::try_new(
        ImageInitOptions::new(model)
            .with_cache_dir(PathBuf::from(cache_dir))
            .with_show_download_progress(true),
    )
    .map_err(|e| e.to_string())
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

fn similarity_result(similarity: f32, threshold: f32, model_name: &str) -> Map<String, Value> {
    let value = json!({
        "success": true,
        "match": similarity >= threshold,
        "similarity": similarity,
        "threshold": threshold,
        "model": model_name,
    });

    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let v = [0.3, -1.2, 4.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal_and_opposite() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_similarity_result_applies_threshold() {
        let above = similarity_result(0.5, 0.4, "clip-vit-b32");
        assert_eq!(above["match"], true);
        assert_eq!(above["success"], true);
        assert_eq!(above["model"], "clip-vit-b32");

        let below = similarity_result(0.39, 0.4, "clip-vit-b32");
        assert_eq!(below["match"], false);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let result = similarity_result(0.4, 0.4, "clip-vit-b32");
        assert_eq!(result["match"], true);
    }

    #[test]
    fn test_resolve_image_model_defaults_to_clip() {
        assert!(matches!(
            resolve_image_model("resnet50"),
            ImageEmbeddingModel::Resnet50
        ));
        assert!(matches!(
            resolve_image_model("unknown-model"),
            ImageEmbeddingModel::ClipVitB32
        ));
    }

    #[tokio::test]
    async fn test_unavailable_comparator_errors() {
        let provider = FaceProvider::unavailable("no model");
        assert!(!provider.is_available());
        assert_eq!(provider.threshold(), 0.4);

        let dir = tempfile::tempdir().unwrap();
        let result = provider
            .compare(&dir.path().join("a.png"), &dir.path().join("b.png"))
            .await;
        assert!(matches!(result, Err(FacelensError::FaceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_default_config_is_unavailable_until_a_service_is_configured() {
        let provider = FaceProvider::new(&FaceConfig::default()).unwrap();
        assert!(!provider.is_available());

        let dir = tempfile::tempdir().unwrap();
        let err = provider
            .compare(&dir.path().join("a.png"), &dir.path().join("b.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, FacelensError::FaceUnavailable(_)));
        assert!(err.to_string().contains("FACE_BASE_URL"), "{err}");
    }

    #[test]
    fn test_api_model_without_base_url_is_unavailable() {
        let config = FaceConfig {
            model: "api/deepface".to_string(),
            ..FaceConfig::default()
        };
        let provider = FaceProvider::new(&config).unwrap();
        assert!(!provider.is_available());
    }

    #[test]
    fn test_api_model_keeps_configured_threshold() {
        let config = FaceConfig {
            model: "api/deepface".to_string(),
            base_url: Some("http://localhost:5005".to_string()),
            similarity_threshold: 0.65,
            ..FaceConfig::default()
        };
        let provider = FaceProvider::new(&config).unwrap();
        assert!(provider.is_available());
        assert_eq!(provider.threshold(), 0.65);
    }
}
