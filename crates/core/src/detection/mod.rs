//! Per-frame detection input.
//!
//! The vision pipeline hands over a list of detections for every processed
//! frame. Only the class labels matter for alerting; confidence and box are
//! carried so the same records can be deserialized from the pipeline's JSON
//! log format (`{"class", "confidence", "bounding_box": {x1, y1, x2, y2}}`).

use alloc::string::String;
use alloc::vec::Vec;

use serde::Deserialize;

/// Pixel-space bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// A single labelled detection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Detection {
    #[serde(rename = "class")]
    pub class_name: String,
    /// Score in `[0, 1]`.
    pub confidence: f32,
    #[serde(default)]
    pub bounding_box: BoundingBox,
}

/// Labels detected in one frame, in pipeline order.
///
/// `count()` is always the number of labels; the two cannot disagree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetectionSummary {
    class_names: Vec<String>,
}

impl DetectionSummary {
    pub fn new(class_names: Vec<String>) -> Self {
        Self { class_names }
    }

    /// Summary for a frame with nothing in it.
    pub fn clear() -> Self {
        Self::default()
    }

    /// Keeps detections scoring at least `min_confidence`, preserving order.
    pub fn from_detections(detections: &[Detection], min_confidence: f32) -> Self {
        let class_names = detections
            .iter()
            .filter(|d| d.confidence >= min_confidence)
            .map(|d| d.class_name.clone())
            .collect();
        Self { class_names }
    }

    pub fn count(&self) -> usize {
        self.class_names.len()
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn is_clear(&self) -> bool {
        self.class_names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for DetectionSummary {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}
