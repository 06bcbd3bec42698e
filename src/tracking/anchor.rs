//! One tracked door: a host anchor, its visual, and match bookkeeping.

use nalgebra::Point3;

use crate::geometry::WorldGeometry;
use crate::host::{AnchorHandle, VisualHandle};

/// A door currently being tracked.
///
/// The persistent anchor and the visual parented to it are exclusively
/// owned by this record from creation until eviction; both are released
/// together when the tracker evicts it, and neither handle is ever
/// revisited afterwards.
#[derive(Debug, Clone, Copy)]
pub struct TrackedAnchor {
    /// Host anchor the door is pinned to. Its pose is fixed by the host
    /// at creation.
    pub anchor: AnchorHandle,
    /// Visual representation parented to the anchor.
    pub visual: VisualHandle,
    /// Frame at which the anchor was created.
    pub created_frame: u64,
    /// Frame of the most recent successful match.
    pub last_seen_frame: u64,
    /// Most recent geometry applied to the visual.
    pub geometry: WorldGeometry,
}

impl TrackedAnchor {
    /// Last known world position (the geometry center).
    pub fn position(&self) -> Point3<f64> {
        self.geometry.center
    }

    /// Frames elapsed since the last successful match.
    pub fn frames_unseen(&self, current_frame: u64) -> u64 {
        current_frame.saturating_sub(self.last_seen_frame)
    }

    /// True once the anchor has gone unobserved longer than the budget.
    pub fn is_stale(&self, current_frame: u64, eviction_frames: u64) -> bool {
        self.frames_unseen(current_frame) > eviction_frames
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{Unit, Vector3};

    use super::*;

    fn anchor_seen_at(frame: u64) -> TrackedAnchor {
        let center = Point3::new(0.0, 1.0, 2.0);
        TrackedAnchor {
            anchor: AnchorHandle(1),
            visual: VisualHandle(1),
            created_frame: frame,
            last_seen_frame: frame,
            geometry: WorldGeometry {
                center,
                left: Point3::new(-0.5, 1.0, 2.0),
                right: Point3::new(0.5, 1.0, 2.0),
                top: Point3::new(0.0, 2.0, 2.0),
                bottom: Point3::new(0.0, 0.0, 2.0),
                width: 1.0,
                height: 2.0,
                normal: Unit::new_normalize(-Vector3::z()),
            },
        }
    }

    #[test]
    fn test_staleness_boundary() {
        let anchor = anchor_seen_at(12);

        // still within budget exactly at the threshold
        assert!(!anchor.is_stale(42, 30));
        // one frame past it
        assert!(anchor.is_stale(43, 30));
    }

    #[test]
    fn test_frames_unseen_saturates() {
        let anchor = anchor_seen_at(10);
        assert_eq!(anchor.frames_unseen(5), 0);
    }
}
