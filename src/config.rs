//! Runtime configuration for the detection-to-anchor pipeline.
//!
//! Every tunable has a design default; a YAML file may override any subset
//! of sections.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::host::{MirrorAxis, PixelFormat};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detection: DetectionConfig,
    pub reconstruction: ReconstructionConfig,
    pub tracking: TrackingConfig,
    pub scheduler: SchedulerConfig,
    pub camera: CameraConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        let config = serde_yaml::from_str(&text)
            .with_context(|| format!("could not parse config file {}", path.display()))?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum objectness * class-score product to accept a detection.
    pub confidence_threshold: f32,
    /// Number of class scores in the raw output layout.
    pub num_classes: usize,
    /// Index of the tracked class within the class scores.
    pub target_class: usize,
    /// IOU above which two boxes are considered the same detection.
    pub iou_threshold: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.6,
            num_classes: 1,
            target_class: 0,
            iou_threshold: 0.45,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Pixels to move edge-midpoint samples inward from the exact box
    /// edge. Exact-edge rays tend to graze past the surface.
    pub edge_inset_px: f64,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self { edge_inset_px: 2.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Observations closer than this (meters) to an existing anchor merge
    /// into it instead of creating a new one.
    pub merge_distance: f64,
    /// Anchors unseen for more than this many processed frames are
    /// destroyed.
    pub eviction_frames: u64,
    /// Template instantiated for each tracked door.
    pub visual_template: String,
    /// Shift the visual vertically so its bottom edge sits at the
    /// reconstructed bottom point's height.
    pub lock_bottom_edge: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            merge_distance: 0.5,
            eviction_frames: 30,
            visual_template: "door_quad".to_string(),
            lock_bottom_edge: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Process every n-th available camera frame.
    pub skip_factor: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { skip_factor: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Inference input size the camera image is converted to.
    pub inference_width: u32,
    pub inference_height: u32,
    /// Screen dimensions used for ray-casting detection boxes.
    pub screen_width: u32,
    pub screen_height: u32,
    pub pixel_format: PixelFormat,
    pub mirror: MirrorAxis,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            inference_width: 640,
            inference_height: 640,
            screen_width: 1080,
            screen_height: 1920,
            pixel_format: PixelFormat::Rgb24,
            mirror: MirrorAxis::Horizontal,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.detection.confidence_threshold, 0.6);
        assert_eq!(config.tracking.merge_distance, 0.5);
        assert_eq!(config.tracking.eviction_frames, 30);
        assert_eq!(config.scheduler.skip_factor, 5);
        assert_eq!(config.camera.inference_width, 640);
        assert_eq!(config.camera.mirror, MirrorAxis::Horizontal);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "tracking:\n  merge_distance: 1.5\nscheduler:\n  skip_factor: 1\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.tracking.merge_distance, 1.5);
        assert_eq!(config.scheduler.skip_factor, 1);
        // untouched sections keep their defaults
        assert_eq!(config.tracking.eviction_frames, 30);
        assert_eq!(config.detection.confidence_threshold, 0.6);
    }
}
