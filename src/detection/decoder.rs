//! Raw output buffer decoding.
//!
//! Layout contract: the raw buffer is attribute-major, as produced by
//! YOLO-family exports. With `n` candidates and `stride = 5 + num_classes`
//! attributes, attribute `a` of candidate `i` sits at `raw[a * n + i]`.
//! Attributes are normalized center-x, center-y, width, height, an
//! objectness score, then one score per class.
//!
//! A candidate survives decoding iff `objectness * best_class_score`
//! reaches the confidence threshold and the best class is the tracked
//! one. Survivors are sorted by confidence and greedily de-overlapped
//! before being handed downstream.

use anyhow::{bail, Result};
use nalgebra::Vector2;

use crate::config::DetectionConfig;
use crate::geometry::ScreenDimensions;

use super::suppression::suppress_overlapping;

/// Box attributes preceding the per-class scores.
const BOX_ATTRIBUTES: usize = 5;

/// Axis-aligned box in normalized model coordinates (0..1, y grows
/// downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub center: Vector2<f64>,
    pub size: Vector2<f64>,
}

impl BoundingBox {
    /// Box center in screen pixels. Model space is y-down while screen
    /// space is y-up, so the vertical coordinate flips.
    pub fn center_on_screen(&self, screen: ScreenDimensions) -> Vector2<f64> {
        Vector2::new(
            self.center.x * screen.width,
            (1.0 - self.center.y) * screen.height,
        )
    }

    /// Box size in screen pixels.
    pub fn size_on_screen(&self, screen: ScreenDimensions) -> Vector2<f64> {
        Vector2::new(self.size.x * screen.width, self.size.y * screen.height)
    }

    /// Intersection-over-union with another box, in normalized space.
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let (ax0, ay0, ax1, ay1) = self.corners();
        let (bx0, by0, bx1, by1) = other.corners();

        let overlap_w = (ax1.min(bx1) - ax0.max(bx0)).max(0.0);
        let overlap_h = (ay1.min(by1) - ay0.max(by0)).max(0.0);
        let intersection = overlap_w * overlap_h;

        let area_a = (ax1 - ax0) * (ay1 - ay0);
        let area_b = (bx1 - bx0) * (by1 - by0);
        let union = area_a + area_b - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    fn corners(&self) -> (f64, f64, f64, f64) {
        let half = self.size / 2.0;
        (
            self.center.x - half.x,
            self.center.y - half.y,
            self.center.x + half.x,
            self.center.y + half.y,
        )
    }
}

/// One qualifying detection of the tracked class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Decodes one frame's raw inference output into detections.
///
/// Not restartable: every call recomputes from a fresh raw buffer.
pub struct DetectionDecoder {
    config: DetectionConfig,
}

impl DetectionDecoder {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Decode a raw output buffer.
    ///
    /// Returns every qualifying detection, highest confidence first,
    /// after IOU suppression. A buffer whose length does not fit the
    /// layout contract is an error; the caller treats it like an
    /// inference failure.
    pub fn decode(&self, raw: &[f32]) -> Result<Vec<Detection>> {
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        if self.config.num_classes == 0 {
            bail!("decoder configured with zero classes");
        }

        let stride = BOX_ATTRIBUTES + self.config.num_classes;
        if raw.len() % stride != 0 {
            bail!(
                "raw output length {} is not a multiple of stride {}",
                raw.len(),
                stride
            );
        }
        let n = raw.len() / stride;
        let at = |attr: usize, i: usize| raw[attr * n + i];

        let mut detections = Vec::new();
        for i in 0..n {
            let objectness = at(4, i);

            let mut best_class = 0;
            let mut best_class_score = at(BOX_ATTRIBUTES, i);
            for class in 1..self.config.num_classes {
                let score = at(BOX_ATTRIBUTES + class, i);
                if score > best_class_score {
                    best_class_score = score;
                    best_class = class;
                }
            }

            let confidence = objectness * best_class_score;
            if confidence < self.config.confidence_threshold
                || best_class != self.config.target_class
            {
                continue;
            }

            detections.push(Detection {
                class_id: best_class,
                confidence,
                bbox: BoundingBox {
                    center: Vector2::new(at(0, i) as f64, at(1, i) as f64),
                    size: Vector2::new(at(2, i) as f64, at(3, i) as f64),
                },
            });
        }

        detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Ok(suppress_overlapping(
            detections,
            self.config.iou_threshold as f64,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build an attribute-major buffer from per-candidate rows of
    /// `[cx, cy, w, h, objectness, class scores...]`.
    fn raw_from(rows: &[Vec<f32>]) -> Vec<f32> {
        let stride = rows[0].len();
        let mut raw = Vec::with_capacity(stride * rows.len());
        for attr in 0..stride {
            for row in rows {
                raw.push(row[attr]);
            }
        }
        raw
    }

    fn decoder() -> DetectionDecoder {
        DetectionDecoder::new(DetectionConfig::default())
    }

    #[test]
    fn test_confidence_is_objectness_times_class_score() {
        // 0.9 * 0.5 = 0.45 falls under the 0.6 threshold
        let low = raw_from(&[vec![0.5, 0.5, 0.1, 0.2, 0.9, 0.5]]);
        assert!(decoder().decode(&low).unwrap().is_empty());

        // 0.9 * 0.8 = 0.72 passes
        let high = raw_from(&[vec![0.5, 0.5, 0.1, 0.2, 0.9, 0.8]]);
        let detections = decoder().decode(&high).unwrap();
        assert_eq!(detections.len(), 1);
        assert!((detections[0].confidence - 0.72).abs() < 1e-6);
    }

    #[test]
    fn test_non_target_class_is_dropped() {
        let config = DetectionConfig {
            num_classes: 2,
            ..DetectionConfig::default()
        };
        let decoder = DetectionDecoder::new(config);

        // class 1 wins the argmax, target is class 0
        let raw = raw_from(&[vec![0.5, 0.5, 0.1, 0.2, 0.9, 0.3, 0.9]]);
        assert!(decoder.decode(&raw).unwrap().is_empty());

        // class 0 wins
        let raw = raw_from(&[vec![0.5, 0.5, 0.1, 0.2, 0.9, 0.9, 0.3]]);
        assert_eq!(decoder.decode(&raw).unwrap().len(), 1);
    }

    #[test]
    fn test_all_qualifying_detections_emitted_sorted() {
        let raw = raw_from(&[
            vec![0.2, 0.5, 0.1, 0.2, 0.7, 1.0],
            vec![0.8, 0.5, 0.1, 0.2, 0.95, 1.0],
        ]);
        let detections = decoder().decode(&raw).unwrap();

        assert_eq!(detections.len(), 2);
        assert!(detections[0].confidence > detections[1].confidence);
        assert!((detections[0].bbox.center.x - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_overlapping_boxes_suppressed() {
        // same spot, nearly identical boxes
        let raw = raw_from(&[
            vec![0.50, 0.50, 0.20, 0.40, 0.9, 1.0],
            vec![0.51, 0.50, 0.20, 0.40, 0.8, 1.0],
        ]);
        let detections = decoder().decode(&raw).unwrap();

        assert_eq!(detections.len(), 1);
        assert!((detections[0].confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_malformed_buffer_is_an_error() {
        let raw = vec![0.0f32; 7]; // stride is 6 for a single class
        assert!(decoder().decode(&raw).is_err());
    }

    #[test]
    fn test_empty_buffer_decodes_to_nothing() {
        assert!(decoder().decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_screen_mapping_flips_vertical_axis() {
        let bbox = BoundingBox {
            center: Vector2::new(0.5, 0.25),
            size: Vector2::new(0.2, 0.4),
        };
        let screen = ScreenDimensions::new(1000, 2000);

        let center = bbox.center_on_screen(screen);
        assert!((center.x - 500.0).abs() < 1e-9);
        assert!((center.y - 1500.0).abs() < 1e-9); // (1 - 0.25) * 2000

        let size = bbox.size_on_screen(screen);
        assert!((size.x - 200.0).abs() < 1e-9);
        assert!((size.y - 800.0).abs() < 1e-9);
    }
}
