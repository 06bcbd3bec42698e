//! Reconstruction of world-space door geometry from a 2D detection.
//!
//! Four rays are cast through the detection box's edge midpoints (left and
//! right at the vertical center, top and bottom at the horizontal center),
//! each inset a few pixels from the exact edge. All four must land on a
//! surface; anything less and the detection cannot be grounded this frame.
//! From the four world points we get real width, height, center, and a
//! surface normal derived from world-up and the left-to-right direction.

use nalgebra::{Point3, Unit, UnitQuaternion, Vector2, Vector3};

use crate::config::ReconstructionConfig;
use crate::detection::Detection;
use crate::host::SurfaceRaycaster;

use super::{world_up, ScreenDimensions, WorldProjector};

/// Minimum world separation of the left/right samples before the box is
/// considered degenerate.
const MIN_EDGE_SEPARATION: f64 = 1e-6;

/// World-space geometry of one reconstructed door.
#[derive(Debug, Clone, Copy)]
pub struct WorldGeometry {
    /// Mean of the four edge points.
    pub center: Point3<f64>,
    pub left: Point3<f64>,
    pub right: Point3<f64>,
    pub top: Point3<f64>,
    pub bottom: Point3<f64>,
    /// Distance between the left and right world points, meters.
    pub width: f64,
    /// Distance between the top and bottom world points, meters.
    pub height: f64,
    /// Unit normal facing out of the surface.
    pub normal: Unit<Vector3<f64>>,
}

impl WorldGeometry {
    /// Look-rotation along the normal with world up as the up reference,
    /// suitable for orienting a flat representation against the wall.
    pub fn orientation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::face_towards(self.normal.as_ref(), &world_up())
    }
}

/// Derives [`WorldGeometry`] from detections via edge-midpoint raycasts.
pub struct GeometryReconstructor {
    edge_inset_px: f64,
}

impl GeometryReconstructor {
    pub fn new(config: &ReconstructionConfig) -> Self {
        Self {
            edge_inset_px: config.edge_inset_px,
        }
    }

    /// Reconstruct one detection, or `None` if any edge projection missed
    /// or the box degenerates.
    pub fn reconstruct<R: SurfaceRaycaster>(
        &self,
        detection: &Detection,
        screen: ScreenDimensions,
        projector: &WorldProjector<R>,
    ) -> Option<WorldGeometry> {
        let center = detection.bbox.center_on_screen(screen);
        let half = detection.bbox.size_on_screen(screen) / 2.0;
        let inset = self.edge_inset_px;

        let left_mid = Vector2::new(center.x - half.x + inset, center.y);
        let right_mid = Vector2::new(center.x + half.x - inset, center.y);
        let top_mid = Vector2::new(center.x, center.y + half.y - inset);
        let bottom_mid = Vector2::new(center.x, center.y - half.y + inset);

        let left = projector.project(left_mid)?.position;
        let right = projector.project(right_mid)?.position;
        let top = projector.project(top_mid)?.position;
        let bottom = projector.project(bottom_mid)?.position;

        let horizontal = right - left;
        if horizontal.norm() < MIN_EDGE_SEPARATION {
            return None;
        }
        let normal = Unit::try_new(
            world_up().cross(&horizontal.normalize()),
            MIN_EDGE_SEPARATION,
        )?;

        let center = Point3::from((left.coords + right.coords + top.coords + bottom.coords) / 4.0);

        Some(WorldGeometry {
            center,
            left,
            right,
            top,
            bottom,
            width: (right - left).norm(),
            height: (top - bottom).norm(),
            normal,
        })
    }
}
