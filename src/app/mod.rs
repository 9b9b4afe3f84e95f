mod builder;
mod coordinator;
mod lifecycle;
mod preview;
mod state;
mod types;


pub use builder::LifecycleCoordinatorBuilder;
pub use coordinator::LifecycleCoordinator;
pub use types::{CoordinatorState, CoordinatorStatus, HostEvent, HostLifecycleState, SavedState};
