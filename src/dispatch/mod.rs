mod dispatcher;
mod stats;

pub use dispatcher::FrameDispatcher;
pub use stats::{DispatchStats, DispatchStatsSnapshot};
