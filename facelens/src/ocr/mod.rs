//! OCR (Optical Character Recognition) Module
//!
//! Turns a decoded image into text fragments in reading order.
//!
//! # Architecture
//!
//! - [`TextRecognizer`] is the seam the HTTP handlers depend on; it returns the
//!   engine's raw, unordered detections.
//! - [`OcrProvider`] implements it with a backend chosen from `OcrConfig::model`:
//!   - `local/*`: Tesseract via leptess, fragments parsed from its TSV output
//!   - `api/*`: a remote service answering in the PaddleOCR line format
//! - [`normalize_detections`] sorts detections top-to-bottom and renumbers them.
//!
//! # Usage
//!
//! ```rust,ignore
//! let ocr = OcrProvider::new(&config.ocr)?;
//! let image = load_image(&path)?;
//! let ordered = normalize_detections(ocr.recognize(image).await?);
//! ```

mod api;
mod normalize;
mod preprocessing;
mod provider;
mod tsv;

pub use api::OcrApiClient;
pub use normalize::{normalize_detections, order_fragments, OrderedTextFragment, TextFragment};
pub use preprocessing::{load_image, prepare_for_ocr, ScaleFactors};
pub use provider::{OcrProvider, RawDetection, TextRecognizer};
pub use tsv::parse_tsv_lines;
