//! Geometry: screen-to-world projection and door box reconstruction.

pub mod projector;
pub mod reconstruct;

pub use projector::WorldProjector;
pub use reconstruct::{GeometryReconstructor, WorldGeometry};

use nalgebra::Vector3;

/// World up direction shared by reconstruction and anchor orientation.
pub fn world_up() -> Vector3<f64> {
    Vector3::y()
}

/// Screen dimensions, in pixels, of the surface raycasts are cast against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenDimensions {
    pub width: f64,
    pub height: f64,
}

impl ScreenDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
        }
    }
}
