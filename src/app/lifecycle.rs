use super::types::{CoordinatorState, HostEvent, HostLifecycleState, SavedState};
use super::LifecycleCoordinator;
use crate::events::LifecycleEvent;
use crate::fault::install_fault_handler;
use tracing::{debug, info, warn};

impl LifecycleCoordinator {
    /// Route one host or surface notification
    pub fn handle(&mut self, event: HostEvent) {
        match event {
            HostEvent::Created(saved_state) => self.on_created(saved_state),
            HostEvent::Resumed => self.on_resumed(),
            HostEvent::Paused => self.on_paused(),
            HostEvent::Destroyed => self.on_destroyed(),
            HostEvent::SurfaceCreated => self.on_surface_created(),
            HostEvent::SurfaceChanged { width, height } => self.on_surface_changed(width, height),
            HostEvent::SurfaceDestroyed => self.on_surface_destroyed(),
        }
    }

    pub fn on_created(&mut self, saved_state: Option<SavedState>) {
        if self.state != CoordinatorState::Initializing {
            warn!("Host created while {:?}; ignoring", self.state);
            return;
        }

        install_fault_handler();
        if saved_state.is_some() {
            debug!("Restoring host saved state");
        }
        self.saved_state = saved_state;

        self.set_host_state(HostLifecycleState::Created);
        self.transition(CoordinatorState::Active);
        info!("Coordinator active");
    }

    /// Pausing cancels the whole preview pipeline before returning
    pub fn on_paused(&mut self) {
        if self.state != CoordinatorState::Active {
            warn!("Host paused while {:?}; ignoring", self.state);
            return;
        }

        info!("Host paused, suspending preview");
        self.pausing = true;
        self.render_surface.on_pause();

        if self.config.lifecycle.finish_on_pause {
            info!("Requesting host screen finish");
            self.host.finish();
            self.events.publish(LifecycleEvent::FinishRequested);
        }

        self.release_camera();

        self.set_host_state(HostLifecycleState::Paused);
        self.transition(CoordinatorState::Suspended);
    }

    /// The camera is not reopened here; callers restart it with `start_preview`
    pub fn on_resumed(&mut self) {
        match self.state {
            CoordinatorState::Suspended => {
                info!("Host resumed");
                self.pausing = false;
                self.render_surface.on_resume();
                self.set_host_state(HostLifecycleState::Resumed);
                self.transition(CoordinatorState::Active);
            }
            CoordinatorState::Active => {
                self.render_surface.on_resume();
                self.set_host_state(HostLifecycleState::Resumed);
            }
            state => warn!("Host resumed while {:?}; ignoring", state),
        }
    }

    pub fn on_destroyed(&mut self) {
        if self.state == CoordinatorState::Terminated {
            debug!("Host already destroyed");
            return;
        }

        info!("Host destroyed, releasing native resources");
        self.release_camera();

        if !self.tracking_released {
            self.tracking.release();
            self.tracking_released = true;
        }

        self.set_host_state(HostLifecycleState::Destroyed);
        self.transition(CoordinatorState::Terminated);
    }
}
