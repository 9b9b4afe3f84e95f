use super::device::{CameraDevice, PreviewParameters, PreviewTarget};
use super::holder::CameraHolder;
use super::params::{ConfigureOutcome, ParameterOutcome};
use crate::dispatch::{DispatchStatsSnapshot, FrameDispatcher};
use crate::error::{CameraError, Result};
use crate::events::{EventBus, LifecycleEvent};
use crate::frame::PixelFormat;
use crate::preview_state::SharedPreviewState;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Exclusive owner of the camera device and its preview stream.
///
/// Every operation is idempotent where it can be: opening an open camera,
/// stopping a stopped preview and closing a closed camera are all no-ops.
/// None of these may be called from the camera delivery thread.
pub struct CameraController {
    holder: Arc<CameraHolder>,
    device: Option<Box<dyn CameraDevice>>,
    dispatcher: FrameDispatcher,
    preview_state: SharedPreviewState,
    session_id: Option<Uuid>,
    bound_target: Option<PreviewTarget>,
    events: EventBus,
}

impl CameraController {
    pub fn new(holder: Arc<CameraHolder>, dispatcher: FrameDispatcher, events: EventBus) -> Self {
        Self {
            holder,
            device: None,
            dispatcher,
            preview_state: SharedPreviewState::new(),
            session_id: None,
            bound_target: None,
            events,
        }
    }

    /// Acquire the device and wire the dispatcher in as its frame sink.
    ///
    /// Returns `Ok(true)` when the device was opened by this call and
    /// `Ok(false)` when it was already open.
    pub fn open(&mut self) -> Result<bool, CameraError> {
        if self.device.is_some() {
            debug!("Camera already open");
            return Ok(false);
        }

        let mut device = self.holder.acquire()?;
        device.set_frame_sink(Some(self.dispatcher.sink()));
        self.dispatcher
            .attach(device.frame_request(), device.reuses_buffers());

        if let Err(e) = self.dispatcher.start() {
            error!("Failed to start frame consumer: {}", e);
            device.set_frame_sink(None);
            self.dispatcher.detach();
            self.holder.release(device);
            return Err(CameraError::DeviceUnavailable {
                details: format!("frame consumer could not start: {}", e),
            });
        }

        info!(
            "Camera opened ({:?} delivery, parameters {:?})",
            device.delivery_mode(),
            device.parameters()
        );
        self.device = Some(device);
        self.events.publish(LifecycleEvent::CameraOpened);
        Ok(true)
    }

    /// Best-effort preview configuration.
    ///
    /// Size and format are applied one after the other; a rejected value
    /// leaves the device on its previous setting and is only logged.
    pub fn configure(
        &mut self,
        preferred_width: u32,
        preferred_height: u32,
        preferred_format: PixelFormat,
    ) -> ConfigureOutcome {
        let Some(device) = self.device.as_mut() else {
            warn!("Cannot configure camera: device not open");
            return ConfigureOutcome::unavailable();
        };

        let preview_size = apply_parameter(device.as_mut(), &self.events, "preview size", |p| {
            p.width = preferred_width;
            p.height = preferred_height;
        });
        let pixel_format = apply_parameter(device.as_mut(), &self.events, "pixel format", |p| {
            p.format = preferred_format;
        });

        let outcome = ConfigureOutcome {
            preview_size,
            pixel_format,
        };
        info!(
            "Camera configured: requested {}x{} {:?}, using {:?}",
            preferred_width,
            preferred_height,
            preferred_format,
            device.parameters()
        );
        outcome
    }

    /// Bind the surface as the device's local preview display
    pub fn bind_preview_display(&mut self, target: PreviewTarget) -> Result<(), CameraError> {
        let device = self.device.as_mut().ok_or(CameraError::DeviceNotOpen)?;
        device
            .bind_preview_display(target)
            .map_err(|e| match e {
                CameraError::SurfaceBindingFailed { .. } => e,
                other => CameraError::SurfaceBindingFailed {
                    details: other.to_string(),
                },
            })?;
        self.bound_target = Some(target);
        debug!("Preview display bound to surface #{}", target.generation);
        Ok(())
    }

    /// Start frame delivery on the open device
    pub fn start_preview(&mut self) -> Result<(), CameraError> {
        let device = self.device.as_mut().ok_or(CameraError::DeviceNotOpen)?;

        if self.preview_state.is_previewing() {
            warn!("Preview already running; stop it before starting a new session");
            return Ok(());
        }

        if !self.dispatcher.is_running() {
            warn!("Frame consumer is not running; restarting it");
            self.dispatcher.start().map_err(|e| CameraError::Start {
                details: format!("frame consumer could not start: {}", e),
            })?;
        }

        device.start_preview()?;
        self.dispatcher.arm();

        let session_id = Uuid::new_v4();
        self.session_id = Some(session_id);
        self.preview_state.set_previewing(true);
        info!("Preview session {} started", session_id);
        self.events
            .publish(LifecycleEvent::PreviewStarted { session_id });
        Ok(())
    }

    /// Halt frame delivery; the device stays open
    pub fn stop_preview(&mut self) {
        if !self.preview_state.is_previewing() {
            return;
        }

        if let Some(device) = self.device.as_mut() {
            device.stop_preview();
        }
        self.preview_state.set_previewing(false);

        if let Some(session_id) = self.session_id.take() {
            info!("Preview session {} stopped", session_id);
            self.events
                .publish(LifecycleEvent::PreviewStopped { session_id });
        }
    }

    /// Stop the frame consumer without touching the device
    pub fn stop_frame_consumer(&mut self) -> Result<()> {
        self.dispatcher.stop()
    }

    /// Release the device back to the holder
    pub fn close(&mut self) {
        if self.device.is_none() {
            return;
        }

        self.stop_preview();

        if let Some(mut device) = self.device.take() {
            device.set_frame_sink(None);
            self.dispatcher.detach();
            if let Err(e) = self.dispatcher.stop() {
                error!("Frame consumer failed while closing camera: {}", e);
            }
            self.holder.release(device);
        }

        self.bound_target = None;
        info!("Camera closed");
        self.events.publish(LifecycleEvent::CameraClosed);
    }

    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }

    pub fn is_previewing(&self) -> bool {
        self.preview_state.is_previewing()
    }

    pub fn preview_state(&self) -> SharedPreviewState {
        self.preview_state.clone()
    }

    pub fn parameters(&self) -> Option<PreviewParameters> {
        self.device.as_ref().map(|d| d.parameters())
    }

    pub fn bound_target(&self) -> Option<PreviewTarget> {
        self.bound_target
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn dispatcher(&self) -> &FrameDispatcher {
        &self.dispatcher
    }

    pub fn dispatch_stats(&self) -> DispatchStatsSnapshot {
        self.dispatcher.stats()
    }
}

impl Drop for CameraController {
    fn drop(&mut self) {
        self.close();
    }
}

fn apply_parameter(
    device: &mut dyn CameraDevice,
    events: &EventBus,
    parameter: &str,
    change: impl FnOnce(&mut PreviewParameters),
) -> ParameterOutcome {
    let mut params = device.parameters();
    change(&mut params);

    match device.set_parameters(&params) {
        Ok(()) => ParameterOutcome::Applied,
        Err(e) => {
            warn!(
                "Camera rejected {} ({}); keeping {:?}",
                parameter,
                e,
                device.parameters()
            );
            events.publish(LifecycleEvent::ParameterFallback {
                parameter: parameter.to_string(),
            });
            ParameterOutcome::FellBack {
                details: e.to_string(),
            }
        }
    }
}
