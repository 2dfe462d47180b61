use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Image extensions accepted by the upload endpoints (matched case-insensitively).
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Total request body cap: 16 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.4;

pub const DEFAULT_FACE_MODEL: &str = "api/face-compare";

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub staging: StagingConfig,
    pub ocr: OcrConfig,
    pub face: FaceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StagingConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub languages: String,
    pub timeout_secs: u64,
    pub max_image_dimension: u32,
}

/// Face comparator configuration.
///
/// `similarity_threshold` is shared by every request; the comparator is built
/// once at startup with it. The default model is the remote `api/` backend,
/// which stays unavailable until `base_url` points at a face service.
/// `local/...` models compare whole-image embeddings and perform no face
/// detection.
#[derive(Debug, Clone, Deserialize)]
pub struct FaceConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub similarity_threshold: f32,
    pub timeout_secs: u64,
    pub cache_dir: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model: "local/tesseract".to_string(),
            api_key: None,
            base_url: None,
            languages: "eng".to_string(),
            timeout_secs: 60,
            max_image_dimension: 4096,
        }
    }
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_FACE_MODEL.to_string(),
            api_key: None,
            base_url: None,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            timeout_secs: 60,
            cache_dir: ".fastembed_cache".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("FACELENS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("FACELENS_PORT", 8080),
                max_body_bytes: parse_env_or("FACELENS_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
            },
            staging: StagingConfig {
                dir: env::var("STAGING_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("temp_uploads")),
            },
            ocr: OcrConfig {
                model: env::var("OCR_MODEL").unwrap_or_else(|_| "local/tesseract".to_string()),
                api_key: env::var("OCR_API_KEY").ok(),
                base_url: env::var("OCR_BASE_URL").ok(),
                languages: env::var("OCR_LANGUAGES").unwrap_or_else(|_| "eng".to_string()),
                timeout_secs: parse_env_or("OCR_TIMEOUT", 60),
                max_image_dimension: parse_env_or("OCR_MAX_DIMENSION", 4096),
            },
            face: FaceConfig {
                model: env::var("FACE_MODEL").unwrap_or_else(|_| DEFAULT_FACE_MODEL.to_string()),
                api_key: env::var("FACE_API_KEY").ok(),
                base_url: env::var("FACE_BASE_URL").ok(),
                similarity_threshold: parse_env_or(
                    "FACE_SIMILARITY_THRESHOLD",
                    DEFAULT_SIMILARITY_THRESHOLD,
                ),
                timeout_secs: parse_env_or("FACE_TIMEOUT", 60),
                cache_dir: env::var("FACE_CACHE_DIR")
                    .unwrap_or_else(|_| ".fastembed_cache".to_string()),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known engine providers. Anything else is treated as a local model name.
const KNOWN_PROVIDERS: &[&str] = &["local", "api"];

/// Parse a model name into (provider, model) tuple.
pub fn parse_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    ("local", model)
}
