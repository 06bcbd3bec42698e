//! Greedy IOU suppression of overlapping detections.

use super::decoder::Detection;

/// Drop detections overlapping an already-kept, higher-confidence one.
///
/// Input must be sorted by descending confidence.
pub fn suppress_overlapping(mut detections: Vec<Detection>, iou_threshold: f64) -> Vec<Detection> {
    let mut kept = Vec::with_capacity(detections.len());

    while !detections.is_empty() {
        let current = detections.remove(0);
        detections.retain(|other| current.bbox.iou(&other.bbox) < iou_threshold);
        kept.push(current);
    }

    kept
}
