use crate::surface::SurfaceLifecycleState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Host-provided state restored on creation; opaque to the coordinator
pub type SavedState = BTreeMap<String, String>;

/// Last lifecycle notification delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostLifecycleState {
    Created,
    Resumed,
    Paused,
    Destroyed,
}

/// Coordinator state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinatorState {
    Initializing,
    Active,
    Suspended,
    Terminated,
}

/// Notifications from the host and surface boundaries
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Created(Option<SavedState>),
    Resumed,
    Paused,
    Destroyed,
    SurfaceCreated,
    SurfaceChanged { width: u32, height: u32 },
    SurfaceDestroyed,
}

/// Point-in-time view of the coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorStatus {
    pub state: CoordinatorState,
    pub host_state: Option<HostLifecycleState>,
    pub surface_state: SurfaceLifecycleState,
    pub surface_generation: u64,
    pub pausing: bool,
    pub camera_open: bool,
    pub previewing: bool,
    pub session_id: Option<Uuid>,
}
