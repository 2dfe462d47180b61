#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use image::{DynamicImage, ImageFormat};
use serde_json::{Map, Value};

use facelens::api::{create_router, AppState};
use facelens::config::Config;
use facelens::error::{FacelensError, Result};
use facelens::faces::FaceComparator;
use facelens::ocr::{RawDetection, TextRecognizer};
use facelens::staging::StagingArea;

pub const BOUNDARY: &str = "facelens-test-boundary";

/// A small valid PNG.
pub fn png_bytes() -> Vec<u8> {
    let mut out = Vec::new();
    DynamicImage::new_rgb8(8, 8)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

pub fn detection(text: &str, y: f32) -> RawDetection {
    RawDetection {
        bbox: [[0.0, y], [50.0, y], [50.0, y + 10.0], [0.0, y + 10.0]],
        text: text.to_string(),
        confidence: 0.9,
    }
}

/// Hand-built `multipart/form-data` body.
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, field: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn text(mut self, field: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn staged_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}

/// OCR engine returning canned detections.
pub struct FakeOcr {
    result: std::result::Result<Option<Vec<RawDetection>>, String>,
    calls: AtomicUsize,
}

impl FakeOcr {
    pub fn returning(detections: Option<Vec<RawDetection>>) -> Self {
        Self {
            result: Ok(detections),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextRecognizer for FakeOcr {
    fn is_available(&self) -> bool {
        true
    }

    async fn recognize(&self, _image: DynamicImage) -> Result<Option<Vec<RawDetection>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(FacelensError::Ocr)
    }
}

/// Face comparator returning a canned verdict and recording what it saw.
pub struct FakeFaces {
    result: std::result::Result<Map<String, Value>, String>,
    seen: Mutex<Vec<(PathBuf, bool)>>,
}

impl FakeFaces {
    pub fn returning(verdict: Value) -> Self {
        let map = match verdict {
            Value::Object(map) => map,
            other => panic!("verdict must be an object, got {other}"),
        };
        Self {
            result: Ok(map),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Paths passed to `compare`, with whether each existed at call time.
    pub fn seen(&self) -> Vec<(PathBuf, bool)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl FaceComparator for FakeFaces {
    fn is_available(&self) -> bool {
        true
    }

    fn threshold(&self) -> f32 {
        0.4
    }

    async fn compare(&self, first: &Path, second: &Path) -> Result<Map<String, Value>> {
        {
            let mut seen = self.seen.lock().unwrap();
            for path in [first, second] {
                seen.push((path.to_path_buf(), path.exists()));
            }
        }
        self.result.clone().map_err(FacelensError::FaceComparison)
    }
}

/// Face comparator whose engine panics mid-comparison, after checking that
/// both staged files are on disk.
pub struct FaultyFaces {
    pub message: &'static str,
    staged_seen: AtomicUsize,
}

impl FaultyFaces {
    pub fn new(message: &'static str) -> Self {
        Self {
            message,
            staged_seen: AtomicUsize::new(0),
        }
    }

    pub fn staged_seen(&self) -> usize {
        self.staged_seen.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FaceComparator for FaultyFaces {
    fn is_available(&self) -> bool {
        true
    }

    fn threshold(&self) -> f32 {
        0.4
    }

    async fn compare(&self, first: &Path, second: &Path) -> Result<Map<String, Value>> {
        let on_disk = [first, second].iter().filter(|p| p.exists()).count();
        self.staged_seen.fetch_add(on_disk, Ordering::SeqCst);
        panic!("{}", self.message);
    }
}

pub fn test_app(
    staging_dir: &Path,
    faces: Arc<dyn FaceComparator>,
    ocr: Arc<dyn TextRecognizer>,
) -> Router {
    test_app_with_limit(staging_dir, faces, ocr, 16 * 1024 * 1024)
}

pub fn test_app_with_limit(
    staging_dir: &Path,
    faces: Arc<dyn FaceComparator>,
    ocr: Arc<dyn TextRecognizer>,
    max_body_bytes: usize,
) -> Router {
    let mut config = Config::default();
    config.staging.dir = staging_dir.to_path_buf();
    config.server.max_body_bytes = max_body_bytes;

    let staging = StagingArea::new(staging_dir).unwrap();
    create_router(AppState::new(config, staging, faces, ocr))
}
