use anyhow::Result;
use nalgebra::{Point3, UnitQuaternion, Vector2, Vector3};
use tracing::info;

use doorsight::config::Config;
use doorsight::host::{
    AnchorHandle, AnchorHost, CameraImage, ImageSource, InferenceEngine, MirrorAxis, PixelBuffer,
    PixelFormat, SurfaceHit, SurfaceId, SurfaceRaycaster, VisualHandle, VisualHost, WorldPose,
};
use doorsight::system::{DoorTrackingPipeline, FrameOutcome};

/// Simulated camera that always has a frame ready.
struct SimCamera {
    width: u32,
    height: u32,
}

impl ImageSource for SimCamera {
    fn acquire_latest(&mut self) -> Option<CameraImage> {
        Some(CameraImage {
            width: self.width,
            height: self.height,
            format: PixelFormat::Rgb24,
            data: vec![0; (self.width * self.height * 3) as usize],
        })
    }

    fn convert(
        &self,
        _image: &CameraImage,
        target: (u32, u32),
        _format: PixelFormat,
        _mirror: MirrorAxis,
    ) -> Result<PixelBuffer> {
        Ok(PixelBuffer {
            width: target.0,
            height: target.1,
            data: vec![0; (target.0 * target.1 * 3) as usize],
        })
    }
}

/// Scripted detector: one door drifts through view and leaves, a second
/// appears elsewhere later.
#[derive(Default)]
struct ScriptedDetector {
    runs: u64,
}

/// Attribute-major single-candidate output: cx, cy, w, h, objectness,
/// door class score.
fn door_output(cx: f32, cy: f32, w: f32, h: f32, confidence: f32) -> Vec<f32> {
    vec![cx, cy, w, h, confidence, 1.0]
}

impl InferenceEngine for ScriptedDetector {
    fn run(&mut self, _input: &PixelBuffer) -> Result<Vec<f32>> {
        self.runs += 1;
        let t = self.runs;
        Ok(match t {
            1..=60 => door_output(0.5 + 0.0005 * t as f32, 0.45, 0.18, 0.55, 0.9),
            151..=210 => door_output(0.25, 0.5, 0.2, 0.6, 0.85),
            _ => Vec::new(),
        })
    }
}

/// Flat wall two meters in front of the camera: 4 m across the screen,
/// 3 m floor to ceiling.
struct FlatWall {
    screen_width: f64,
    screen_height: f64,
}

impl SurfaceRaycaster for FlatWall {
    fn raycast(&self, p: Vector2<f64>) -> Option<SurfaceHit> {
        if p.x < 0.0 || p.y < 0.0 || p.x > self.screen_width || p.y > self.screen_height {
            return None;
        }
        let x = (p.x / self.screen_width - 0.5) * 4.0;
        let y = (p.y / self.screen_height) * 3.0;
        Some(SurfaceHit {
            pose: WorldPose::from_position(Point3::new(x, y, 2.0)),
            surface: SurfaceId(1),
        })
    }
}

/// In-memory stand-in for the host anchor subsystem.
#[derive(Default)]
struct SimAnchors {
    next: u64,
    live: u64,
}

impl AnchorHost for SimAnchors {
    fn create_anchor(&mut self, _pose: &WorldPose) -> Option<AnchorHandle> {
        self.next += 1;
        self.live += 1;
        Some(AnchorHandle(self.next))
    }

    fn destroy_anchor(&mut self, _handle: AnchorHandle) {
        self.live -= 1;
    }
}

/// In-memory stand-in for the host scene graph.
#[derive(Default)]
struct SimVisuals {
    next: u64,
    live: u64,
}

impl VisualHost for SimVisuals {
    fn instantiate(&mut self, _template: &str, _parent: AnchorHandle) -> VisualHandle {
        self.next += 1;
        self.live += 1;
        VisualHandle(self.next)
    }

    fn native_size(&self, _handle: VisualHandle) -> Option<Vector3<f64>> {
        // door modeled at 1 x 2 x 0.05 m
        Some(Vector3::new(1.0, 2.0, 0.05))
    }

    fn set_transform(
        &mut self,
        _handle: VisualHandle,
        _position: Point3<f64>,
        _rotation: UnitQuaternion<f64>,
        _scale: Vector3<f64>,
    ) {
    }

    fn destroy(&mut self, _handle: VisualHandle) {
        self.live -= 1;
    }
}

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(config.logging.level.as_str())
        .init();

    info!("door tracking demo starting");

    let camera = SimCamera {
        width: 1920,
        height: 1440,
    };
    let wall = FlatWall {
        screen_width: config.camera.screen_width as f64,
        screen_height: config.camera.screen_height as f64,
    };
    let mut pipeline = DoorTrackingPipeline::new(
        &config,
        camera,
        ScriptedDetector::default(),
        wall,
        SimAnchors::default(),
        SimVisuals::default(),
    );

    let mut processed: u64 = 0;
    let mut throttled: u64 = 0;
    let mut anchors_created: usize = 0;
    let mut anchors_evicted: usize = 0;

    // the camera pushes ~1800 callbacks; the skip factor admits a fraction
    for _ in 0..1800 {
        match pipeline.on_frame_available() {
            FrameOutcome::Processed(report) => {
                processed += 1;
                anchors_created += report.created;
                anchors_evicted += report.evicted;
            }
            FrameOutcome::Throttled => throttled += 1,
            _ => {}
        }
    }

    info!(
        "done: {} frames processed, {} throttled, {} anchors created, {} evicted, {} still live",
        processed,
        throttled,
        anchors_created,
        anchors_evicted,
        pipeline.tracker().len()
    );

    Ok(())
}
