//! The per-frame door tracking pipeline.
//!
//! Data flow for an admitted frame: acquire the camera image, convert it
//! to the inference input, run inference, decode detections, reconstruct
//! each one to world geometry, fuse into the anchor set, then advance the
//! frame counter and sweep stale anchors. Every failure along the way is
//! local: it skips the affected detection or frame and leaves tracker
//! state untouched.

use tracing::{debug, warn};

use crate::config::{CameraConfig, Config};
use crate::detection::DetectionDecoder;
use crate::geometry::{GeometryReconstructor, ScreenDimensions, WorldProjector};
use crate::host::{AnchorHost, ImageSource, InferenceEngine, SurfaceRaycaster, VisualHost};
use crate::tracking::{AnchorTracker, ObserveOutcome};

use super::result::{FrameOutcome, FrameReport};
use super::scheduler::{FrameAdmission, FrameScheduler};

/// Fuses per-frame detections into persistent anchors.
///
/// Single-threaded and callback-driven: the host invokes
/// [`on_frame_available`](Self::on_frame_available) for every camera
/// frame, and the scheduler decides which invocations actually run.
pub struct DoorTrackingPipeline<I, E, R, A, V> {
    images: I,
    inference: E,
    decoder: DetectionDecoder,
    projector: WorldProjector<R>,
    reconstructor: GeometryReconstructor,
    tracker: AnchorTracker<A, V>,
    scheduler: FrameScheduler,
    camera: CameraConfig,
}

impl<I, E, R, A, V> DoorTrackingPipeline<I, E, R, A, V>
where
    I: ImageSource,
    E: InferenceEngine,
    R: SurfaceRaycaster,
    A: AnchorHost,
    V: VisualHost,
{
    pub fn new(
        config: &Config,
        images: I,
        inference: E,
        raycaster: R,
        anchor_host: A,
        visual_host: V,
    ) -> Self {
        Self {
            images,
            inference,
            decoder: DetectionDecoder::new(config.detection.clone()),
            projector: WorldProjector::new(raycaster),
            reconstructor: GeometryReconstructor::new(&config.reconstruction),
            tracker: AnchorTracker::new(anchor_host, visual_host, config.tracking.clone()),
            scheduler: FrameScheduler::new(&config.scheduler),
            camera: config.camera.clone(),
        }
    }

    /// Host callback: a new camera frame is available.
    pub fn on_frame_available(&mut self) -> FrameOutcome {
        match self.scheduler.on_frame() {
            FrameAdmission::Busy => return FrameOutcome::Shed,
            FrameAdmission::Throttled => return FrameOutcome::Throttled,
            FrameAdmission::Admitted => {}
        }

        let Some(image) = self.images.acquire_latest() else {
            self.scheduler.abort_frame();
            return FrameOutcome::SkippedNoImage;
        };

        let target = (self.camera.inference_width, self.camera.inference_height);
        let buffer = match self
            .images
            .convert(&image, target, self.camera.pixel_format, self.camera.mirror)
        {
            Ok(buffer) => buffer,
            Err(err) => {
                debug!("image conversion failed: {err:#}");
                self.scheduler.abort_frame();
                return FrameOutcome::SkippedNoImage;
            }
        };

        let raw = match self.inference.run(&buffer) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("inference failed: {err:#}");
                self.scheduler.abort_frame();
                return FrameOutcome::SkippedInference;
            }
        };
        let detections = match self.decoder.decode(&raw) {
            Ok(detections) => detections,
            Err(err) => {
                warn!("could not decode inference output: {err:#}");
                self.scheduler.abort_frame();
                return FrameOutcome::SkippedInference;
            }
        };

        let frame = self.scheduler.upcoming_frame();
        let screen = ScreenDimensions::new(self.camera.screen_width, self.camera.screen_height);
        let mut report = FrameReport {
            frame,
            detections: detections.len(),
            ..FrameReport::default()
        };

        for detection in &detections {
            match self
                .reconstructor
                .reconstruct(detection, screen, &self.projector)
            {
                Some(geometry) => {
                    report.reconstructed += 1;
                    match self.tracker.observe(geometry, frame) {
                        ObserveOutcome::Updated(_) => report.updated += 1,
                        ObserveOutcome::Created(_) => report.created += 1,
                        ObserveOutcome::Rejected => report.rejected += 1,
                    }
                }
                None => {
                    report.dropped_projections += 1;
                    debug!("detection could not be grounded this frame");
                }
            }
        }

        let completed = self.scheduler.complete_frame();
        report.evicted = self.tracker.evict_stale(completed);
        report.active_anchors = self.tracker.len();

        debug!(
            "frame {}: {} detections, {} updated, {} created, {} evicted, {} active",
            completed,
            report.detections,
            report.updated,
            report.created,
            report.evicted,
            report.active_anchors
        );
        FrameOutcome::Processed(report)
    }

    pub fn tracker(&self) -> &AnchorTracker<A, V> {
        &self.tracker
    }

    pub fn current_frame(&self) -> u64 {
        self.scheduler.current_frame()
    }
}
