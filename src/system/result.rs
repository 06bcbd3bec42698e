//! Per-frame outcome reporting.
//!
//! These types describe what the pipeline did with one camera callback:
//! whether the frame was admitted at all, and if so how many detections
//! made it through each stage.

/// Outcome of one camera callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Dropped by the reentrancy guard (a frame was still in flight).
    Shed,
    /// Dropped by the skip-frame cadence.
    Throttled,
    /// Admitted, but no camera image was available (or conversion failed).
    SkippedNoImage,
    /// Admitted, but inference or its output decode failed.
    SkippedInference,
    /// Ran the full pipeline.
    Processed(FrameReport),
}

/// Stage-by-stage counters for one processed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Logical frame number this frame was stamped with.
    pub frame: u64,
    /// Qualifying detections out of the decoder.
    pub detections: usize,
    /// Detections that reconstructed to full world geometry.
    pub reconstructed: usize,
    /// Detections dropped because an edge projection missed.
    pub dropped_projections: usize,
    /// Observations that refreshed an existing anchor.
    pub updated: usize,
    /// Observations that created a new anchor.
    pub created: usize,
    /// Observations dropped because the host rejected the anchor.
    pub rejected: usize,
    /// Anchors evicted by this frame's sweep.
    pub evicted: usize,
    /// Live anchors after the sweep.
    pub active_anchors: usize,
}
