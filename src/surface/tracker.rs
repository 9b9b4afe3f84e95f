use crate::camera::{CameraController, PreviewTarget};
use crate::config::SurfaceConfig;
use crate::events::{EventBus, LifecycleEvent};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Lifecycle of one surface instance; only ever moves forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceLifecycleState {
    NotCreated,
    Created,
    Destroyed,
}

/// Turns raw surface notifications into the "surface ready" predicate.
///
/// Each `surfaceCreated` after a destruction starts a new surface instance
/// with a fresh generation number.
pub struct RenderSurfaceTracker {
    state: SurfaceLifecycleState,
    generation: u64,
    size: Option<(u32, u32)>,
    bind_preview_display: bool,
    events: EventBus,
}

impl RenderSurfaceTracker {
    pub fn new(config: &SurfaceConfig, events: EventBus) -> Self {
        Self {
            state: SurfaceLifecycleState::NotCreated,
            generation: 0,
            size: None,
            bind_preview_display: config.bind_preview_display,
            events,
        }
    }

    pub fn on_surface_created(&mut self, camera: &mut CameraController) {
        if self.state == SurfaceLifecycleState::Created {
            warn!(
                "Surface #{} reported created twice; ignoring",
                self.generation
            );
            return;
        }

        self.generation += 1;
        self.state = SurfaceLifecycleState::Created;
        self.size = None;
        info!("Surface #{} created", self.generation);
        self.events.publish(LifecycleEvent::SurfaceStateChanged {
            state: self.state,
            generation: self.generation,
        });

        self.bind_if_required(camera);
    }

    /// Advisory only; readiness is unaffected
    pub fn on_surface_changed(&mut self, width: u32, height: u32) {
        if self.state != SurfaceLifecycleState::Created {
            debug!(
                "Surface size {}x{} reported while {:?}",
                width, height, self.state
            );
        }
        debug!("Surface #{} is {}x{}", self.generation, width, height);
        self.size = Some((width, height));
    }

    /// Stops preview and closes the camera whatever the prior state was
    pub fn on_surface_destroyed(&mut self, camera: &mut CameraController) {
        camera.stop_preview();
        camera.close();

        if self.state == SurfaceLifecycleState::Destroyed {
            debug!("Surface #{} already destroyed", self.generation);
            return;
        }

        self.state = SurfaceLifecycleState::Destroyed;
        info!("Surface #{} destroyed", self.generation);
        self.events.publish(LifecycleEvent::SurfaceStateChanged {
            state: self.state,
            generation: self.generation,
        });
    }

    /// Bind the current surface to an open camera when the platform needs it.
    ///
    /// Binding failures are logged and absorbed; preview can still run
    /// through the GPU path.
    pub fn bind_if_required(&self, camera: &mut CameraController) {
        if !self.bind_preview_display || !camera.is_open() {
            return;
        }
        let Some(target) = self.preview_target() else {
            return;
        };
        if camera.bound_target() == Some(target) {
            return;
        }

        if let Err(e) = camera.bind_preview_display(target) {
            warn!("Continuing without explicit preview display: {}", e);
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == SurfaceLifecycleState::Created
    }

    pub fn state(&self) -> SurfaceLifecycleState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Last size reported for the current surface instance
    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    pub fn preview_target(&self) -> Option<PreviewTarget> {
        self.is_ready().then_some(PreviewTarget {
            generation: self.generation,
        })
    }
}
