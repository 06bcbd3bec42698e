//! Anchor fusion: persistent door state across frames.
//!
//! This module owns the stateful half of the pipeline:
//! - matching each frame's reconstructed geometry against live anchors by
//!   spatial proximity
//! - refreshing matched anchors and creating new ones through the host
//! - evicting anchors that have gone unobserved for too long

pub mod anchor;
pub mod tracker;

pub use anchor::TrackedAnchor;
pub use tracker::{AnchorTracker, ObserveOutcome};
