use super::coordinator::LifecycleCoordinator;
use super::types::CoordinatorState;
use crate::camera::{CameraController, CameraHolder};
use crate::config::ArcamConfig;
use crate::dispatch::FrameDispatcher;
use crate::error::{ArcamError, Result};
use crate::events::EventBus;
use crate::render::{FrameRenderer, HostScreen, RenderSurface, TrackingSession};
use crate::surface::RenderSurfaceTracker;
use std::sync::Arc;
use tracing::info;

/// Builder wiring a coordinator to its collaborators
pub struct LifecycleCoordinatorBuilder {
    config: Option<ArcamConfig>,
    camera_holder: Option<Arc<CameraHolder>>,
    renderer: Option<Arc<dyn FrameRenderer>>,
    render_surface: Option<Arc<dyn RenderSurface>>,
    host: Option<Arc<dyn HostScreen>>,
    tracking: Option<Arc<dyn TrackingSession>>,
    events: Option<EventBus>,
}

impl LifecycleCoordinatorBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            camera_holder: None,
            renderer: None,
            render_surface: None,
            host: None,
            tracking: None,
            events: None,
        }
    }

    pub fn config(mut self, config: ArcamConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn camera_holder(mut self, holder: Arc<CameraHolder>) -> Self {
        self.camera_holder = Some(holder);
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn FrameRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn render_surface(mut self, surface: Arc<dyn RenderSurface>) -> Self {
        self.render_surface = Some(surface);
        self
    }

    pub fn host(mut self, host: Arc<dyn HostScreen>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn tracking_session(mut self, tracking: Arc<dyn TrackingSession>) -> Self {
        self.tracking = Some(tracking);
        self
    }

    /// Share an existing event bus; a private one is created otherwise
    pub fn event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn build(self) -> Result<LifecycleCoordinator> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let camera_holder = self
            .camera_holder
            .ok_or_else(|| ArcamError::system("Camera holder must be specified"))?;
        let renderer = self
            .renderer
            .ok_or_else(|| ArcamError::system("Frame renderer must be specified"))?;
        let render_surface = self
            .render_surface
            .ok_or_else(|| ArcamError::system("Render surface must be specified"))?;
        let host = self
            .host
            .ok_or_else(|| ArcamError::system("Host screen must be specified"))?;
        let tracking = self
            .tracking
            .ok_or_else(|| ArcamError::system("Tracking session must be specified"))?;
        let events = self.events.unwrap_or_default();

        let dispatcher = FrameDispatcher::new(
            &config.dispatch,
            Arc::clone(&renderer),
            Arc::clone(&render_surface),
        );
        let camera = CameraController::new(camera_holder, dispatcher, events.clone());
        let surface = RenderSurfaceTracker::new(&config.surface, events.clone());

        info!("Lifecycle coordinator wired");

        Ok(LifecycleCoordinator {
            config,
            camera,
            surface,
            renderer,
            render_surface,
            host,
            tracking,
            events,
            state: CoordinatorState::Initializing,
            host_state: None,
            pausing: false,
            saved_state: None,
            tracking_released: false,
        })
    }
}

impl Default for LifecycleCoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
