use super::types::{CoordinatorState, HostLifecycleState};
use super::LifecycleCoordinator;
use crate::events::LifecycleEvent;
use tracing::{debug, error};

impl LifecycleCoordinator {
    /// Move the state machine and announce the transition
    pub(super) fn transition(&mut self, to: CoordinatorState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        self.events
            .publish(LifecycleEvent::CoordinatorStateChanged { from, to });
    }

    pub(super) fn set_host_state(&mut self, state: HostLifecycleState) {
        debug!("Host state changed to: {:?}", state);
        self.host_state = Some(state);
        self.events
            .publish(LifecycleEvent::HostStateChanged { state });
    }

    /// Synchronously halt frame consumption, then stop and release the camera
    pub(super) fn release_camera(&mut self) {
        if let Err(e) = self.camera.stop_frame_consumer() {
            error!("Frame consumer stopped with error: {}", e);
        }
        self.camera.stop_preview();
        self.camera.close();
    }
}
