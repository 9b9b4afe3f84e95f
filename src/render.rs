//! Boundaries to the collaborators that live outside this crate: the GPU
//! renderer, the drawable surface that owns the render thread, the host
//! screen, and the marker tracking session.

use crate::frame::PreviewFrame;
use std::sync::Arc;

/// Draws non-AR content on top of (or instead of) the tracked overlay
pub trait OverlayRenderer: Send + Sync {
    fn draw(&self);
}

/// Frame intake of the AR renderer
pub trait FrameRenderer: Send + Sync {
    /// Called from the frame consumer thread for every accepted frame
    fn on_frame(&self, frame: PreviewFrame);

    fn set_secondary_renderer(&self, renderer: Option<Arc<dyn OverlayRenderer>>);
}

/// The drawable surface and the render thread behind it.
///
/// The surface renders on demand: nothing is drawn unless `request_redraw` is called.
pub trait RenderSurface: Send + Sync {
    /// Must be non-blocking; called from the frame consumer thread
    fn request_redraw(&self);

    fn on_pause(&self);

    fn on_resume(&self);
}

/// The host screen hosting the surface
pub trait HostScreen: Send + Sync {
    /// Ask the host to terminate the visible screen
    fn finish(&self);
}

/// Marker tracking subsystem that consumes the frames handed to the renderer
pub trait TrackingSession: Send + Sync {
    /// Free native tracking resources; called once when the host is destroyed
    fn release(&self);
}
