use crate::app::{CoordinatorState, HostLifecycleState};
use crate::surface::SurfaceLifecycleState;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Observable transitions of the camera/surface lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// The host delivered a lifecycle notification
    HostStateChanged { state: HostLifecycleState },
    /// The coordinator moved to a new state
    CoordinatorStateChanged {
        from: CoordinatorState,
        to: CoordinatorState,
    },
    /// The render surface was created or destroyed
    SurfaceStateChanged {
        state: SurfaceLifecycleState,
        generation: u64,
    },
    /// The camera device was acquired
    CameraOpened,
    /// The camera device was released
    CameraClosed,
    /// Frame delivery started
    PreviewStarted { session_id: Uuid },
    /// Frame delivery stopped
    PreviewStopped { session_id: Uuid },
    /// The device kept its previous value for a parameter
    ParameterFallback { parameter: String },
    /// The host screen was asked to finish
    FinishRequested,
}

impl LifecycleEvent {
    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            LifecycleEvent::HostStateChanged { .. } => "host_state_changed",
            LifecycleEvent::CoordinatorStateChanged { .. } => "coordinator_state_changed",
            LifecycleEvent::SurfaceStateChanged { .. } => "surface_state_changed",
            LifecycleEvent::CameraOpened => "camera_opened",
            LifecycleEvent::CameraClosed => "camera_closed",
            LifecycleEvent::PreviewStarted { .. } => "preview_started",
            LifecycleEvent::PreviewStopped { .. } => "preview_stopped",
            LifecycleEvent::ParameterFallback { .. } => "parameter_fallback",
            LifecycleEvent::FinishRequested => "finish_requested",
        }
    }

    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            LifecycleEvent::HostStateChanged { state } => format!("Host is now {:?}", state),
            LifecycleEvent::CoordinatorStateChanged { from, to } => {
                format!("Coordinator {:?} -> {:?}", from, to)
            }
            LifecycleEvent::SurfaceStateChanged { state, generation } => {
                format!("Surface #{} is now {:?}", generation, state)
            }
            LifecycleEvent::CameraOpened => "Camera opened".to_string(),
            LifecycleEvent::CameraClosed => "Camera closed".to_string(),
            LifecycleEvent::PreviewStarted { session_id } => {
                format!("Preview session {} started", session_id)
            }
            LifecycleEvent::PreviewStopped { session_id } => {
                format!("Preview session {} stopped", session_id)
            }
            LifecycleEvent::ParameterFallback { parameter } => {
                format!("Camera kept its previous {}", parameter)
            }
            LifecycleEvent::FinishRequested => "Host screen finish requested".to_string(),
        }
    }
}

/// Broadcast bus for lifecycle observers.
///
/// Publishing is synchronous and never blocks, so it is safe from host callbacks.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }

    /// Publish an event, returning how many subscribers received it
    pub fn publish(&self, event: LifecycleEvent) -> usize {
        match &event {
            LifecycleEvent::CoordinatorStateChanged { .. } => info!("{}", event.description()),
            _ => debug!("Publishing event: {}", event.description()),
        }

        // An error here only means nobody is listening
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Collect everything currently queued on a receiver
pub fn drain(receiver: &mut broadcast::Receiver<LifecycleEvent>) -> Vec<LifecycleEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                warn!("Event receiver lagged behind by {} events", n);
            }
            Err(_) => break,
        }
    }
    events
}
