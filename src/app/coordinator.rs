use super::builder::LifecycleCoordinatorBuilder;
use super::types::{CoordinatorState, CoordinatorStatus, HostLifecycleState, SavedState};
use crate::camera::CameraController;
use crate::config::ArcamConfig;
use crate::dispatch::DispatchStatsSnapshot;
use crate::events::EventBus;
use crate::preview_state::SharedPreviewState;
use crate::render::{FrameRenderer, HostScreen, OverlayRenderer, RenderSurface, TrackingSession};
use crate::surface::RenderSurfaceTracker;
use std::sync::Arc;
use tracing::debug;

/// Authoritative state machine deciding when preview may run.
///
/// The host owns one coordinator and forwards every lifecycle and surface
/// callback to it from its lifecycle thread. All camera open/close/start/stop
/// calls happen on that thread; the camera delivery thread only feeds the
/// frame dispatcher.
pub struct LifecycleCoordinator {
    pub(super) config: ArcamConfig,
    pub(super) camera: CameraController,
    pub(super) surface: RenderSurfaceTracker,
    pub(super) renderer: Arc<dyn FrameRenderer>,
    pub(super) render_surface: Arc<dyn RenderSurface>,
    pub(super) host: Arc<dyn HostScreen>,
    pub(super) tracking: Arc<dyn TrackingSession>,
    pub(super) events: EventBus,

    // Lifecycle management
    pub(super) state: CoordinatorState,
    pub(super) host_state: Option<HostLifecycleState>,
    pub(super) pausing: bool,
    pub(super) saved_state: Option<SavedState>,
    pub(super) tracking_released: bool,
}

impl LifecycleCoordinator {
    pub fn builder() -> LifecycleCoordinatorBuilder {
        LifecycleCoordinatorBuilder::new()
    }

    /// Install or clear the non-AR overlay renderer
    pub fn set_secondary_renderer(&self, renderer: Option<Arc<dyn OverlayRenderer>>) {
        debug!(
            "Secondary renderer {}",
            if renderer.is_some() { "installed" } else { "cleared" }
        );
        self.renderer.set_secondary_renderer(renderer);
    }

    pub fn tracking_session(&self) -> Arc<dyn TrackingSession> {
        Arc::clone(&self.tracking)
    }

    pub fn render_surface(&self) -> Arc<dyn RenderSurface> {
        Arc::clone(&self.render_surface)
    }

    pub fn status(&self) -> CoordinatorStatus {
        CoordinatorStatus {
            state: self.state,
            host_state: self.host_state,
            surface_state: self.surface.state(),
            surface_generation: self.surface.generation(),
            pausing: self.pausing,
            camera_open: self.camera.is_open(),
            previewing: self.camera.is_previewing(),
            session_id: self.camera.session_id(),
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn is_pausing(&self) -> bool {
        self.pausing
    }

    pub fn is_previewing(&self) -> bool {
        self.camera.is_previewing()
    }

    pub fn preview_state(&self) -> SharedPreviewState {
        self.camera.preview_state()
    }

    pub fn saved_state(&self) -> Option<&SavedState> {
        self.saved_state.as_ref()
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn surface(&self) -> &RenderSurfaceTracker {
        &self.surface
    }

    pub fn config(&self) -> &ArcamConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn dispatch_stats(&self) -> DispatchStatsSnapshot {
        self.camera.dispatch_stats()
    }
}
