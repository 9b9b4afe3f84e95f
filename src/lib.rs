pub mod app;
pub mod camera;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod fault;
pub mod frame;
pub mod preview_state;
pub mod render;
pub mod surface;

#[cfg(test)]
mod testing;

pub use app::{
    CoordinatorState, CoordinatorStatus, HostEvent, HostLifecycleState, LifecycleCoordinator,
    LifecycleCoordinatorBuilder, SavedState,
};
pub use camera::{
    CameraBackend, CameraController, CameraDevice, CameraHolder, ConfigureOutcome, FrameRequest,
    FrameSink, ParameterOutcome, PreviewParameters, PreviewTarget, SimulatedCamera,
};
pub use config::{ArcamConfig, DeliveryMode};
pub use dispatch::{DispatchStats, DispatchStatsSnapshot, FrameDispatcher};
pub use error::{ArcamError, CameraError, Result};
pub use events::{EventBus, LifecycleEvent};
pub use fault::install_fault_handler;
pub use frame::{PixelFormat, PreviewFrame};
pub use preview_state::SharedPreviewState;
pub use render::{FrameRenderer, HostScreen, OverlayRenderer, RenderSurface, TrackingSession};
pub use surface::{RedrawLoop, RenderSurfaceTracker, SurfaceLifecycleState};
