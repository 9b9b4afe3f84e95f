use super::device::{
    CameraBackend, CameraDevice, FrameRequest, FrameSink, PreviewParameters, PreviewTarget,
};
use crate::config::{DeliveryMode, SimulationConfig};
use crate::error::CameraError;
use crate::frame::{PixelFormat, PreviewFrame};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

const DELIVERY_THREAD_NAME: &str = "arcam-camera-delivery";

/// Preview sizes the simulated sensor accepts
pub const SUPPORTED_SIZES: [(u32, u32); 3] = [(240, 160), (320, 240), (640, 480)];

/// Pixel formats the simulated sensor accepts
pub const SUPPORTED_FORMATS: [PixelFormat; 2] = [PixelFormat::Nv21, PixelFormat::Yuyv];

/// Delay between deliveries at `fps` frames per second
fn frame_interval(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / fps.max(1) as f64)
}

/// Camera backend producing synthetic frames, for hosts without a sensor
#[derive(Debug, Clone)]
pub struct SimulatedCamera {
    config: SimulationConfig,
}

impl SimulatedCamera {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }
}

impl CameraBackend for SimulatedCamera {
    fn open(&self) -> Result<Box<dyn CameraDevice>, CameraError> {
        if self.config.fail_open {
            return Err(CameraError::DeviceUnavailable {
                details: "simulated camera configured to refuse access".to_string(),
            });
        }
        info!(
            "Opening simulated camera ({} fps, {:?} delivery)",
            self.config.fps, self.config.delivery_mode
        );
        Ok(Box::new(SimulatedDevice::new(&self.config)))
    }
}

/// One-shot arming flag shared with the delivery thread
#[derive(Debug, Default)]
struct OneShotArm {
    armed: AtomicBool,
}

impl FrameRequest for OneShotArm {
    fn request_next_frame(&self) {
        self.armed.store(true, Ordering::Release);
    }
}

struct SimulatedDevice {
    params: PreviewParameters,
    fps: u32,
    mode: DeliveryMode,
    reuse_buffers: bool,
    sink: Arc<Mutex<Option<Arc<dyn FrameSink>>>>,
    arm: Arc<OneShotArm>,
    running: Arc<AtomicBool>,
    sequence: Arc<AtomicU64>,
    worker: Option<JoinHandle<()>>,
}

impl SimulatedDevice {
    fn new(config: &SimulationConfig) -> Self {
        Self {
            params: PreviewParameters {
                width: 640,
                height: 480,
                format: PixelFormat::Yuyv,
            },
            fps: config.fps.max(1),
            mode: config.delivery_mode,
            reuse_buffers: config.reuse_buffers,
            sink: Arc::new(Mutex::new(None)),
            arm: Arc::new(OneShotArm::default()),
            running: Arc::new(AtomicBool::new(false)),
            sequence: Arc::new(AtomicU64::new(0)),
            worker: None,
        }
    }
}

impl CameraDevice for SimulatedDevice {
    fn parameters(&self) -> PreviewParameters {
        self.params
    }

    fn set_parameters(&mut self, params: &PreviewParameters) -> Result<(), CameraError> {
        if !SUPPORTED_SIZES.contains(&(params.width, params.height)) {
            return Err(CameraError::ParameterRejected {
                parameter: "preview size".to_string(),
                details: format!("{}x{} not supported", params.width, params.height),
            });
        }
        if !SUPPORTED_FORMATS.contains(&params.format) {
            return Err(CameraError::ParameterRejected {
                parameter: "pixel format".to_string(),
                details: format!("{:?} not supported", params.format),
            });
        }
        if self.running.load(Ordering::Acquire) {
            return Err(CameraError::ParameterRejected {
                parameter: "preview parameters".to_string(),
                details: "cannot change parameters while previewing".to_string(),
            });
        }
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
        *self.sink.lock() = sink;
    }

    fn frame_request(&self) -> Option<Arc<dyn FrameRequest>> {
        match self.mode {
            DeliveryMode::OneShot => Some(Arc::clone(&self.arm) as Arc<dyn FrameRequest>),
            DeliveryMode::Continuous => None,
        }
    }

    fn bind_preview_display(&mut self, target: PreviewTarget) -> Result<(), CameraError> {
        debug!("Simulated camera bound to surface #{}", target.generation);
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), CameraError> {
        if self.worker.is_some() {
            return Ok(());
        }

        self.running.store(true, Ordering::Release);

        let params = self.params;
        let frame_interval = frame_interval(self.fps);
        let mode = self.mode;
        let reuse_buffers = self.reuse_buffers;
        let sink = Arc::clone(&self.sink);
        let arm = Arc::clone(&self.arm);
        let running = Arc::clone(&self.running);
        let sequence = Arc::clone(&self.sequence);

        let worker = std::thread::Builder::new()
            .name(DELIVERY_THREAD_NAME.to_string())
            .spawn(move || {
                let frame_size = params.format.frame_size(params.width, params.height);
                let shared_buffer = Arc::new(vec![0x80u8; frame_size]);

                info!(
                    "Simulated delivery loop started with {}us frame interval",
                    frame_interval.as_micros()
                );

                while running.load(Ordering::Acquire) {
                    std::thread::sleep(frame_interval);
                    if !running.load(Ordering::Acquire) {
                        break;
                    }

                    if mode == DeliveryMode::OneShot && !arm.armed.swap(false, Ordering::AcqRel) {
                        continue;
                    }

                    let Some(target) = sink.lock().clone() else {
                        continue;
                    };

                    let id = sequence.fetch_add(1, Ordering::Relaxed);
                    let frame = if reuse_buffers {
                        let mut frame = PreviewFrame::new(
                            id,
                            Vec::new(),
                            params.width,
                            params.height,
                            params.format,
                        );
                        frame.data = Arc::clone(&shared_buffer);
                        frame
                    } else {
                        // Luma ramp that moves with the sequence number
                        let data = (0..frame_size)
                            .map(|i| (i as u64).wrapping_add(id) as u8)
                            .collect();
                        PreviewFrame::new(id, data, params.width, params.height, params.format)
                    };

                    trace!("Delivering simulated frame {}", id);
                    target.on_preview_frame(frame);
                }

                debug!("Simulated delivery loop stopped");
            })
            .map_err(|e| {
                self.running.store(false, Ordering::Release);
                CameraError::Start {
                    details: e.to_string(),
                }
            })?;

        self.worker = Some(worker);
        Ok(())
    }

    fn stop_preview(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Simulated delivery thread panicked");
            }
        }
    }
}

impl Drop for SimulatedDevice {
    fn drop(&mut self) {
        self.stop_preview();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{wait_until, CollectingSink};

    fn simulation(mode: DeliveryMode) -> SimulationConfig {
        SimulationConfig {
            fps: 200,
            delivery_mode: mode,
            reuse_buffers: false,
            fail_open: false,
        }
    }

    #[test]
    fn test_frame_interval_never_reaches_zero() {
        assert_eq!(frame_interval(15), Duration::from_secs_f64(1.0 / 15.0));
        assert_eq!(frame_interval(2000), Duration::from_micros(500));
        assert!(frame_interval(1_000_000) > Duration::ZERO);
        assert_eq!(frame_interval(0), Duration::from_secs(1));
    }

    #[test]
    fn test_fail_open_reports_device_unavailable() {
        let camera = SimulatedCamera::new(SimulationConfig {
            fail_open: true,
            ..simulation(DeliveryMode::Continuous)
        });
        assert!(matches!(
            camera.open(),
            Err(CameraError::DeviceUnavailable { .. })
        ));
    }

    #[test]
    fn test_rejects_unsupported_parameters_and_keeps_previous() {
        let mut device = SimulatedCamera::new(simulation(DeliveryMode::Continuous))
            .open()
            .unwrap();
        let before = device.parameters();

        let result = device.set_parameters(&PreviewParameters {
            width: 1234,
            height: 5,
            ..before
        });
        assert!(matches!(result, Err(CameraError::ParameterRejected { .. })));
        assert_eq!(device.parameters(), before);

        let result = device.set_parameters(&PreviewParameters {
            format: PixelFormat::Rgb565,
            ..before
        });
        assert!(matches!(result, Err(CameraError::ParameterRejected { .. })));

        let accepted = PreviewParameters {
            width: 240,
            height: 160,
            format: PixelFormat::Nv21,
        };
        device.set_parameters(&accepted).unwrap();
        assert_eq!(device.parameters(), accepted);
    }

    #[test]
    fn test_continuous_delivery_reaches_sink() {
        let mut device = SimulatedCamera::new(simulation(DeliveryMode::Continuous))
            .open()
            .unwrap();
        let sink = Arc::new(CollectingSink::default());
        device.set_frame_sink(Some(sink.clone() as Arc<dyn FrameSink>));
        assert!(device.frame_request().is_none());

        device.start_preview().unwrap();
        assert!(wait_until(|| sink.count() >= 3));
        device.stop_preview();

        let delivered = sink.count();
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(sink.count(), delivered);
        assert!(sink.frames().iter().all(|f| f.validate_size()));
    }

    #[test]
    fn test_one_shot_delivery_waits_for_request() {
        let mut device = SimulatedCamera::new(simulation(DeliveryMode::OneShot))
            .open()
            .unwrap();
        let sink = Arc::new(CollectingSink::default());
        device.set_frame_sink(Some(sink.clone() as Arc<dyn FrameSink>));
        let request = device.frame_request().expect("one-shot device exposes a request handle");

        device.start_preview().unwrap();
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(sink.count(), 0);

        request.request_next_frame();
        assert!(wait_until(|| sink.count() == 1));
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(sink.count(), 1);

        device.stop_preview();
    }
}
