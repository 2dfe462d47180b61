use serde::Serialize;

use super::RawDetection;

/// A recognised string and the vertical position of its box's first corner.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: String,
    pub top_left_y: f32,
}

impl From<RawDetection> for TextFragment {
    fn from(detection: RawDetection) -> Self {
        Self {
            top_left_y: detection.top_left_y(),
            text: detection.text,
        }
    }
}

/// A fragment's position in reading order, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct OrderedTextFragment {
    pub order: usize,
    pub text: String,
}

/// Normalise one image's raw OCR result.
///
/// `None` and an empty list both mean "no text detected" and yield an empty
/// sequence.
pub fn normalize_detections(raw: Option<Vec<RawDetection>>) -> Vec<OrderedTextFragment> {
    let fragments = raw
        .unwrap_or_default()
        .into_iter()
        .map(TextFragment::from)
        .collect();
    order_fragments(fragments)
}

/// Sort fragments top-to-bottom and assign a dense 1-based `order`.
///
/// The sort is stable: fragments on the same `y` keep detection order.
/// Non-finite coordinates sort after every finite one.
pub fn order_fragments(mut fragments: Vec<TextFragment>) -> Vec<OrderedTextFragment> {
    fragments.sort_by(|a, b| sort_key(a.top_left_y).total_cmp(&sort_key(b.top_left_y)));

    fragments
        .into_iter()
        .enumerate()
        .map(|(idx, fragment)| OrderedTextFragment {
            order: idx + 1,
            text: fragment.text,
        })
        .collect()
}

fn sort_key(y: f32) -> f32 {
    if y.is_finite() {
        y
    } else {
        f32::INFINITY
    }
}
