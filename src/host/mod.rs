//! Interfaces to the host platform.
//!
//! The fusion core never talks to a camera, an inference runtime, or the
//! host scene graph directly. Every collaborator is a trait here, and every
//! host-owned object (persistent anchor, instantiated visual) is an opaque
//! handle. The core only issues create/update/destroy calls through these
//! seams; it never reaches into host internals.

use anyhow::Result;
use nalgebra::{Point3, UnitQuaternion, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// A position and orientation in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPose {
    pub position: Point3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl WorldPose {
    pub fn new(position: Point3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self { position, rotation }
    }

    /// Pose with identity orientation.
    pub fn from_position(position: Point3<f64>) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::identity(),
        }
    }
}

/// Opaque handle to a host-managed persistent anchor.
///
/// Handles are issued by the host and never reused by the core; once the
/// anchor behind a handle is destroyed, the handle is dead for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorHandle(pub u64);

impl std::fmt::Display for AnchorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AN{}", self.0)
    }
}

/// Opaque handle to an instantiated visual representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u64);

impl std::fmt::Display for VisualHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VIS{}", self.0)
    }
}

/// Identifier of the reconstructed surface a ray landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// One ray-cast hit against reconstructed world geometry.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceHit {
    pub pose: WorldPose,
    pub surface: SurfaceId,
}

/// Ray-cast primitive provided by the host.
pub trait SurfaceRaycaster {
    /// Cast a ray through the given screen point against reconstructed
    /// surfaces. `None` means no surface was intersected there.
    fn raycast(&self, screen_point: Vector2<f64>) -> Option<SurfaceHit>;
}

/// Pixel layout of a converted camera frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    Rgb24,
    Rgba32,
}

/// Mirroring applied during camera image conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorAxis {
    None,
    Horizontal,
    Vertical,
}

/// A raw camera frame as delivered by the host camera subsystem.
#[derive(Debug, Clone)]
pub struct CameraImage {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

/// A camera frame converted to the inference input size and format.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Camera frame acquisition and conversion.
pub trait ImageSource {
    /// Latest CPU-accessible camera frame, if one is ready.
    fn acquire_latest(&mut self) -> Option<CameraImage>;

    /// Resize, reformat and mirror a camera frame for inference input.
    fn convert(
        &self,
        image: &CameraImage,
        target: (u32, u32),
        format: PixelFormat,
        mirror: MirrorAxis,
    ) -> Result<PixelBuffer>;
}

/// Neural inference over a converted camera frame.
///
/// The returned buffer is the model's raw output tensor, flattened. Its
/// layout contract lives with the detection decoder; the engine itself is
/// a black box. Any error is treated upstream as "no detections this
/// frame".
pub trait InferenceEngine {
    fn run(&mut self, input: &PixelBuffer) -> Result<Vec<f32>>;
}

/// Host subsystem managing persistent world anchors.
pub trait AnchorHost {
    /// Request a new anchor pinned at the given pose. The host may refuse
    /// (tracking not ready, resource limits); the caller drops the
    /// observation in that case.
    fn create_anchor(&mut self, pose: &WorldPose) -> Option<AnchorHandle>;

    fn destroy_anchor(&mut self, handle: AnchorHandle);
}

/// Host subsystem instantiating and transforming visual representations.
pub trait VisualHost {
    /// Instantiate the named template parented to an anchor.
    fn instantiate(&mut self, template: &str, parent: AnchorHandle) -> VisualHandle;

    /// Authored (unscaled) bounding size of the visual, when it has fixed
    /// real-world modeled dimensions. `None` for unit-sized templates such
    /// as a flat quad.
    fn native_size(&self, handle: VisualHandle) -> Option<Vector3<f64>>;

    fn set_transform(
        &mut self,
        handle: VisualHandle,
        position: Point3<f64>,
        rotation: UnitQuaternion<f64>,
        scale: Vector3<f64>,
    );

    fn destroy(&mut self, handle: VisualHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_equality() {
        let a = AnchorHandle(7);
        let b = AnchorHandle(7);
        let c = AnchorHandle(8);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(format!("{}", AnchorHandle(42)), "AN42");
        assert_eq!(format!("{}", VisualHandle(3)), "VIS3");
    }

    #[test]
    fn test_handle_as_hashmap_key() {
        use std::collections::HashMap;

        let mut owners: HashMap<AnchorHandle, &str> = HashMap::new();
        owners.insert(AnchorHandle(1), "first");
        owners.insert(AnchorHandle(2), "second");

        assert_eq!(owners.get(&AnchorHandle(1)), Some(&"first"));
        assert_eq!(owners.get(&AnchorHandle(3)), None);
    }
}
