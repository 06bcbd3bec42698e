//! Screen-to-world projection via the host ray-cast primitive.

use nalgebra::Vector2;

use crate::host::{SurfaceRaycaster, WorldPose};

/// Projects 2D screen points onto reconstructed world surfaces.
///
/// A miss means the point cannot be grounded this frame. Callers drop the
/// affected geometry entirely; partial or estimated poses are never
/// substituted.
pub struct WorldProjector<R> {
    raycaster: R,
}

impl<R: SurfaceRaycaster> WorldProjector<R> {
    pub fn new(raycaster: R) -> Self {
        Self { raycaster }
    }

    /// World pose of the surface under a screen point, if any.
    pub fn project(&self, screen_point: Vector2<f64>) -> Option<WorldPose> {
        self.raycaster.raycast(screen_point).map(|hit| hit.pose)
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use crate::host::{SurfaceHit, SurfaceId};

    use super::*;

    /// Hits a wall at z = 2 for on-screen points, misses otherwise.
    struct TestWall;

    impl SurfaceRaycaster for TestWall {
        fn raycast(&self, screen_point: Vector2<f64>) -> Option<SurfaceHit> {
            if screen_point.x < 0.0 || screen_point.y < 0.0 {
                return None;
            }
            Some(SurfaceHit {
                pose: WorldPose::from_position(Point3::new(
                    screen_point.x / 100.0,
                    screen_point.y / 100.0,
                    2.0,
                )),
                surface: SurfaceId(0),
            })
        }
    }

    #[test]
    fn test_project_keeps_hit_pose() {
        let projector = WorldProjector::new(TestWall);
        let pose = projector.project(Vector2::new(150.0, 50.0)).unwrap();

        assert!((pose.position.x - 1.5).abs() < 1e-9);
        assert!((pose.position.y - 0.5).abs() < 1e-9);
        assert!((pose.position.z - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_project_miss_is_none() {
        let projector = WorldProjector::new(TestWall);
        assert!(projector.project(Vector2::new(-1.0, 50.0)).is_none());
    }
}
