//! Tesseract TSV output → line detections.
//!
//! Tesseract reports one row per layout element:
//! `level page block par line word left top width height conf text`.
//! Level 4 rows open a text line (and carry its box); level 5 rows are the
//! words of the most recent line.

use super::{RawDetection, ScaleFactors};

const LEVEL_LINE: u32 = 4;
const LEVEL_WORD: u32 = 5;

struct Row<'a> {
    level: u32,
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    conf: f32,
    text: &'a str,
}

fn parse_row(line: &str) -> Option<Row<'_>> {
    let cols: Vec<&str> = line.split('\t').collect();
    if cols.len() < 11 {
        return None;
    }
    Some(Row {
        level: cols[0].trim().parse().ok()?,
        left: cols[6].trim().parse().ok()?,
        top: cols[7].trim().parse().ok()?,
        width: cols[8].trim().parse().ok()?,
        height: cols[9].trim().parse().ok()?,
        conf: cols[10].trim().parse().ok()?,
        text: cols.get(11).map(|t| t.trim()).unwrap_or(""),
    })
}

struct LineAcc {
    bbox: [[f32; 2]; 4],
    words: Vec<String>,
    conf_sum: f32,
}

impl LineAcc {
    fn finish(self) -> Option<RawDetection> {
        if self.words.is_empty() {
            return None;
        }
        let confidence = self.conf_sum / self.words.len() as f32 / 100.0;
        Some(RawDetection {
            bbox: self.bbox,
            text: self.words.join(" "),
            confidence: confidence.clamp(0.0, 1.0),
        })
    }
}

/// Parse TSV into one detection per text line, in emission order.
///
/// Coordinates are divided by the per-axis `scale` to map a downscaled OCR
/// input back onto the original image. Lines without any non-empty word are dropped; the
/// header row and malformed rows are skipped.
pub fn parse_tsv_lines(tsv: &str, scale: ScaleFactors) -> Vec<RawDetection> {
    let usable = |factor: f32| if factor.is_finite() && factor > 0.0 { factor } else { 1.0 };
    let (sx, sy) = (usable(scale.x), usable(scale.y));

    let mut detections = Vec::new();
    let mut current: Option<LineAcc> = None;

    for row in tsv.lines().filter_map(parse_row) {
        match row.level {
            LEVEL_LINE => {
                if let Some(done) = current.take().and_then(LineAcc::finish) {
                    detections.push(done);
                }
                let (l, t) = (row.left / sx, row.top / sy);
                let (r, b) = ((row.left + row.width) / sx, (row.top + row.height) / sy);
                current = Some(LineAcc {
                    bbox: [[l, t], [r, t], [r, b], [l, b]],
                    words: Vec::new(),
                    conf_sum: 0.0,
                });
            }
            LEVEL_WORD if !row.text.is_empty() => {
                if let Some(line) = current.as_mut() {
                    line.words.push(row.text.to_string());
                    line.conf_sum += row.conf.max(0.0);
                }
            }
            _ => {}
        }
    }

    if let Some(done) = current.and_then(LineAcc::finish) {
        detections.push(done);
    }

    detections
}
