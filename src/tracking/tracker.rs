//! The anchor fusion state machine.
//!
//! Each observed geometry either refreshes the nearest anchor within the
//! merge distance or births a new anchor (host permitting). A per-frame
//! sweep destroys anchors unseen for longer than the eviction budget,
//! which is what bounds anchor count when a door leaves view.

use nalgebra::Vector3;
use tracing::{debug, info, warn};

use crate::config::TrackingConfig;
use crate::geometry::WorldGeometry;
use crate::host::{AnchorHandle, AnchorHost, VisualHandle, VisualHost, WorldPose};

use super::TrackedAnchor;

/// What happened to one observed geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveOutcome {
    /// Matched an existing anchor within the merge distance.
    Updated(AnchorHandle),
    /// No anchor nearby; a new one was created.
    Created(AnchorHandle),
    /// The host rejected the anchor request; the observation was dropped.
    Rejected,
}

/// Matches reconstructed geometry against live anchors and manages their
/// lifecycle through the host.
///
/// Anchors are stored in creation order and identities are never reused:
/// once evicted, a handle never reappears in the collection.
pub struct AnchorTracker<A, V> {
    anchors: Vec<TrackedAnchor>,
    anchor_host: A,
    visual_host: V,
    config: TrackingConfig,
}

impl<A: AnchorHost, V: VisualHost> AnchorTracker<A, V> {
    pub fn new(anchor_host: A, visual_host: V, config: TrackingConfig) -> Self {
        Self {
            anchors: Vec::new(),
            anchor_host,
            visual_host,
            config,
        }
    }

    /// Fuse one reconstructed geometry into the anchor set.
    ///
    /// Exactly one anchor is touched per observation: the nearest one
    /// within the merge distance, or a freshly created one.
    pub fn observe(&mut self, geometry: WorldGeometry, current_frame: u64) -> ObserveOutcome {
        if let Some(index) = self.nearest_within_merge_distance(&geometry) {
            let matched = &mut self.anchors[index];
            matched.geometry = geometry;
            matched.last_seen_frame = current_frame;
            let (anchor, visual) = (matched.anchor, matched.visual);

            self.apply_transform(visual, &geometry);
            debug!(
                "door {} refreshed at frame {} ({:.2}x{:.2} m)",
                anchor, current_frame, geometry.width, geometry.height
            );
            return ObserveOutcome::Updated(anchor);
        }

        let pose = WorldPose::new(geometry.center, geometry.orientation());
        let Some(anchor) = self.anchor_host.create_anchor(&pose) else {
            warn!(
                "host rejected anchor at ({:.2}, {:.2}, {:.2}); observation dropped",
                geometry.center.x, geometry.center.y, geometry.center.z
            );
            return ObserveOutcome::Rejected;
        };

        let visual = self
            .visual_host
            .instantiate(&self.config.visual_template, anchor);
        self.apply_transform(visual, &geometry);

        self.anchors.push(TrackedAnchor {
            anchor,
            visual,
            created_frame: current_frame,
            last_seen_frame: current_frame,
            geometry,
        });
        info!(
            "door {} anchored at ({:.2}, {:.2}, {:.2}), {:.2}x{:.2} m",
            anchor,
            geometry.center.x,
            geometry.center.y,
            geometry.center.z,
            geometry.width,
            geometry.height
        );
        ObserveOutcome::Created(anchor)
    }

    /// Destroy and remove every anchor unseen for longer than the eviction
    /// budget. Returns the number evicted.
    pub fn evict_stale(&mut self, current_frame: u64) -> usize {
        let eviction_frames = self.config.eviction_frames;
        let mut evicted = 0;

        let mut index = 0;
        while index < self.anchors.len() {
            if self.anchors[index].is_stale(current_frame, eviction_frames) {
                let stale = self.anchors.remove(index);
                // the visual is parented to the anchor: release it first
                self.visual_host.destroy(stale.visual);
                self.anchor_host.destroy_anchor(stale.anchor);
                info!(
                    "door {} evicted at frame {} (unseen for {} frames)",
                    stale.anchor,
                    current_frame,
                    stale.frames_unseen(current_frame)
                );
                evicted += 1;
            } else {
                index += 1;
            }
        }
        evicted
    }

    /// Live anchors, in creation order.
    pub fn anchors(&self) -> &[TrackedAnchor] {
        &self.anchors
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Index of the nearest anchor within the merge distance. Ties resolve
    /// to the lowest distance, then the earliest-created anchor.
    fn nearest_within_merge_distance(&self, geometry: &WorldGeometry) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, anchor) in self.anchors.iter().enumerate() {
            let distance = (anchor.position() - geometry.center).norm();
            if distance >= self.config.merge_distance {
                continue;
            }
            match best {
                Some((_, nearest)) if distance >= nearest => {}
                _ => best = Some((index, distance)),
            }
        }
        best.map(|(index, _)| index)
    }

    fn apply_transform(&mut self, visual: VisualHandle, geometry: &WorldGeometry) {
        let scale = match self.visual_host.native_size(visual) {
            // fixed-dimension model: stretch width/height, keep depth as modeled
            Some(native) if native.x > 0.0 && native.y > 0.0 => {
                Vector3::new(geometry.width / native.x, geometry.height / native.y, 1.0)
            }
            // unit quad: scale is the real size directly
            _ => Vector3::new(geometry.width, geometry.height, 1.0),
        };

        let mut position = geometry.center;
        if self.config.lock_bottom_edge {
            position.y = geometry.bottom.y + geometry.height / 2.0;
        }

        self.visual_host
            .set_transform(visual, position, geometry.orientation(), scale);
    }
}
