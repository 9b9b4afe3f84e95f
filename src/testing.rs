//! Recording fakes shared by the unit tests.

use crate::camera::{
    CameraBackend, CameraController, CameraDevice, CameraHolder, FrameRequest, FrameSink,
    PreviewParameters, PreviewTarget,
};
use crate::config::{DeliveryMode, DispatchConfig};
use crate::dispatch::FrameDispatcher;
use crate::events::EventBus;
use crate::error::CameraError;
use crate::frame::{PixelFormat, PreviewFrame};
use crate::render::{FrameRenderer, HostScreen, OverlayRenderer, RenderSurface, TrackingSession};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Poll `condition` for up to two seconds
pub fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}

/// A tiny valid NV21 frame
pub fn frame(sequence: u64) -> PreviewFrame {
    PreviewFrame::new(sequence, vec![sequence as u8; 6], 2, 2, PixelFormat::Nv21)
}

/// A controller over a fake continuous-delivery camera
pub fn fake_controller(events: &EventBus) -> (CameraController, Arc<DeviceProbe>) {
    let (backend, probe) = FakeBackend::new(DeliveryMode::Continuous);
    let dispatcher = FrameDispatcher::new(
        &DispatchConfig {
            queue_depth: 2,
            copy_frames: false,
        },
        Arc::new(RecordingRenderer::default()),
        Arc::new(RecordingSurface::default()),
    );
    let controller = CameraController::new(
        Arc::new(CameraHolder::new(backend)),
        dispatcher,
        events.clone(),
    );
    (controller, probe)
}

#[derive(Default)]
pub struct CollectingSink {
    frames: Mutex<Vec<PreviewFrame>>,
}

impl CollectingSink {
    pub fn count(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn frames(&self) -> Vec<PreviewFrame> {
        self.frames.lock().clone()
    }
}

impl FrameSink for CollectingSink {
    fn on_preview_frame(&self, frame: PreviewFrame) {
        self.frames.lock().push(frame);
    }
}

/// Everything the fake camera saw, shared with the test
#[derive(Default)]
pub struct DeviceProbe {
    log: Mutex<Vec<String>>,
    sink: Mutex<Option<Arc<dyn FrameSink>>>,
    pub open_devices: AtomicUsize,
    pub frame_requests: AtomicUsize,
    pub fail_open: AtomicBool,
    pub fail_start: AtomicBool,
    pub fail_bind: AtomicBool,
    pub reject_sizes: Mutex<Vec<(u32, u32)>>,
    pub reject_formats: Mutex<Vec<PixelFormat>>,
}

impl DeviceProbe {
    fn record(&self, call: impl Into<String>) {
        self.log.lock().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.log.lock().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }

    pub fn has_sink(&self) -> bool {
        self.sink.lock().is_some()
    }

    /// Push a frame into the registered sink as the delivery thread would
    pub fn deliver(&self, frame: PreviewFrame) -> bool {
        let sink = self.sink.lock().clone();
        match sink {
            Some(sink) => {
                sink.on_preview_frame(frame);
                true
            }
            None => false,
        }
    }
}

pub struct FakeBackend {
    probe: Arc<DeviceProbe>,
    mode: DeliveryMode,
    reuse_buffers: bool,
}

impl FakeBackend {
    pub fn new(mode: DeliveryMode) -> (Self, Arc<DeviceProbe>) {
        Self::with_buffer_reuse(mode, false)
    }

    pub fn with_buffer_reuse(mode: DeliveryMode, reuse_buffers: bool) -> (Self, Arc<DeviceProbe>) {
        let probe = Arc::new(DeviceProbe::default());
        (
            Self {
                probe: Arc::clone(&probe),
                mode,
                reuse_buffers,
            },
            probe,
        )
    }
}

impl CameraBackend for FakeBackend {
    fn open(&self) -> Result<Box<dyn CameraDevice>, CameraError> {
        if self.probe.fail_open.load(Ordering::SeqCst) {
            self.probe.record("open:failed");
            return Err(CameraError::DeviceUnavailable {
                details: "fake camera refused".to_string(),
            });
        }
        self.probe.open_devices.fetch_add(1, Ordering::SeqCst);
        self.probe.record("open");
        Ok(Box::new(FakeDevice {
            probe: Arc::clone(&self.probe),
            params: PreviewParameters {
                width: 640,
                height: 480,
                format: PixelFormat::Yuyv,
            },
            mode: self.mode,
            reuse_buffers: self.reuse_buffers,
        }))
    }
}

struct FakeDevice {
    probe: Arc<DeviceProbe>,
    params: PreviewParameters,
    mode: DeliveryMode,
    reuse_buffers: bool,
}

struct CountingRequest {
    probe: Arc<DeviceProbe>,
}

impl FrameRequest for CountingRequest {
    fn request_next_frame(&self) {
        self.probe.frame_requests.fetch_add(1, Ordering::SeqCst);
    }
}

impl CameraDevice for FakeDevice {
    fn parameters(&self) -> PreviewParameters {
        self.params
    }

    fn set_parameters(&mut self, params: &PreviewParameters) -> Result<(), CameraError> {
        let size_rejected = self
            .probe
            .reject_sizes
            .lock()
            .contains(&(params.width, params.height));
        let format_rejected = self.probe.reject_formats.lock().contains(&params.format);
        if size_rejected || format_rejected {
            self.probe.record("set_parameters:rejected");
            return Err(CameraError::ParameterRejected {
                parameter: "preview parameters".to_string(),
                details: format!("{:?} unsupported", params),
            });
        }
        self.probe.record("set_parameters");
        self.params = *params;
        Ok(())
    }

    fn delivery_mode(&self) -> DeliveryMode {
        self.mode
    }

    fn reuses_buffers(&self) -> bool {
        self.reuse_buffers
    }

    fn set_frame_sink(&mut self, sink: Option<Arc<dyn FrameSink>>) {
        self.probe
            .record(if sink.is_some() { "sink:set" } else { "sink:clear" });
        *self.probe.sink.lock() = sink;
    }

    fn frame_request(&self) -> Option<Arc<dyn FrameRequest>> {
        match self.mode {
            DeliveryMode::OneShot => Some(Arc::new(CountingRequest {
                probe: Arc::clone(&self.probe),
            })),
            DeliveryMode::Continuous => None,
        }
    }

    fn bind_preview_display(&mut self, target: PreviewTarget) -> Result<(), CameraError> {
        if self.probe.fail_bind.load(Ordering::SeqCst) {
            self.probe.record("bind:failed");
            return Err(CameraError::SurfaceBindingFailed {
                details: "fake binding refused".to_string(),
            });
        }
        self.probe.record(format!("bind:{}", target.generation));
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), CameraError> {
        if self.probe.fail_start.load(Ordering::SeqCst) {
            self.probe.record("start:failed");
            return Err(CameraError::Start {
                details: "fake start refused".to_string(),
            });
        }
        self.probe.record("start");
        Ok(())
    }

    fn stop_preview(&mut self) {
        self.probe.record("stop");
    }
}

impl Drop for FakeDevice {
    fn drop(&mut self) {
        self.probe.open_devices.fetch_sub(1, Ordering::SeqCst);
        self.probe.record("release");
    }
}

#[derive(Default)]
pub struct RecordingRenderer {
    frames: Mutex<Vec<PreviewFrame>>,
    secondary: AtomicBool,
    pub attempts: AtomicUsize,
    pub panic_on_frame: AtomicBool,
}

impl RecordingRenderer {
    pub fn sequences(&self) -> Vec<u64> {
        self.frames.lock().iter().map(|f| f.sequence).collect()
    }

    pub fn frames(&self) -> Vec<PreviewFrame> {
        self.frames.lock().clone()
    }

    pub fn has_secondary(&self) -> bool {
        self.secondary.load(Ordering::SeqCst)
    }
}

impl FrameRenderer for RecordingRenderer {
    fn on_frame(&self, frame: PreviewFrame) {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_frame.load(Ordering::SeqCst) {
            panic!("renderer failed on frame {}", frame.sequence);
        }
        self.frames.lock().push(frame);
    }

    fn set_secondary_renderer(&self, renderer: Option<Arc<dyn OverlayRenderer>>) {
        self.secondary.store(renderer.is_some(), Ordering::SeqCst);
    }
}

pub struct NoopOverlay;

impl OverlayRenderer for NoopOverlay {
    fn draw(&self) {}
}

#[derive(Default)]
pub struct RecordingSurface {
    pub redraws: AtomicUsize,
    pub pauses: AtomicUsize,
    pub resumes: AtomicUsize,
}

impl RenderSurface for RecordingSurface {
    fn request_redraw(&self) {
        self.redraws.fetch_add(1, Ordering::SeqCst);
    }

    fn on_pause(&self) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
    }

    fn on_resume(&self) {
        self.resumes.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingHost {
    pub finishes: AtomicUsize,
}

impl HostScreen for RecordingHost {
    fn finish(&self) {
        self.finishes.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingTracking {
    pub releases: AtomicUsize,
}

impl TrackingSession for RecordingTracking {
    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}
