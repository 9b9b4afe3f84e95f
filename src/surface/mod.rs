mod redraw;
mod tracker;

pub use redraw::RedrawLoop;
pub use tracker::{RenderSurfaceTracker, SurfaceLifecycleState};
