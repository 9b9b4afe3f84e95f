use crate::config::DeliveryMode;
use crate::error::CameraError;
use crate::frame::{PixelFormat, PreviewFrame};
use std::sync::Arc;

/// Preview size and pixel format as understood by a camera device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewParameters {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

/// Identifies the surface instance a device draws its local preview into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewTarget {
    pub generation: u64,
}

/// Receives frames on the camera's delivery thread.
///
/// Implementations must return quickly and must never call back into the
/// camera controller.
pub trait FrameSink: Send + Sync {
    fn on_preview_frame(&self, frame: PreviewFrame);
}

/// Re-arms delivery on devices that hand over one frame per request
pub trait FrameRequest: Send + Sync {
    fn request_next_frame(&self);
}

/// An open camera device.
///
/// Dropping the device releases it.
pub trait CameraDevice: Send {
    fn parameters(&self) -> PreviewParameters;

    /// Apply all parameters at once; on error the device keeps its previous ones
    fn set_parameters(&mut self, params: &PreviewParameters) -> Result<(), CameraError>;

    fn delivery_mode(&self) -> DeliveryMode;

    /// Whether the buffer behind a delivered frame is recycled for the next one
    fn reuses_buffers(&self) -> bool {
        false
    }

    fn set_frame_sink(&mut self, sink: Option<Arc<dyn FrameSink>>);

    /// Present only in `DeliveryMode::OneShot`
    fn frame_request(&self) -> Option<Arc<dyn FrameRequest>>;

    fn bind_preview_display(&mut self, target: PreviewTarget) -> Result<(), CameraError>;

    fn start_preview(&mut self) -> Result<(), CameraError>;

    /// Halts delivery; no frame reaches the sink after this returns
    fn stop_preview(&mut self);
}

/// Opens the physical camera
pub trait CameraBackend: Send + Sync {
    fn open(&self) -> Result<Box<dyn CameraDevice>, CameraError>;
}
