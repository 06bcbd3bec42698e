//! Decoding of raw per-frame inference output into door detections.
//!
//! The inference engine is a black box behind [`crate::host::InferenceEngine`];
//! this module owns the layout contract of its output buffer and turns it
//! into a confidence-filtered, overlap-suppressed list of detections for
//! the tracked class.

pub mod decoder;
pub mod suppression;

pub use decoder::{BoundingBox, Detection, DetectionDecoder};
