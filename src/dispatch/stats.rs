use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the camera-to-renderer handoff
#[derive(Debug, Default)]
pub struct DispatchStats {
    /// Frames handed over by the camera thread
    pub frames_received: AtomicU64,
    /// Frames passed to the renderer
    pub frames_forwarded: AtomicU64,
    /// Frames evicted from a full queue or discarded while stopped
    pub frames_dropped: AtomicU64,
    /// Redraw requests issued to the render surface
    pub redraws_requested: AtomicU64,
}

impl DispatchStats {
    pub fn snapshot(&self) -> DispatchStatsSnapshot {
        DispatchStatsSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_forwarded: self.frames_forwarded.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            redraws_requested: self.redraws_requested.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatch statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStatsSnapshot {
    pub frames_received: u64,
    pub frames_forwarded: u64,
    pub frames_dropped: u64,
    pub redraws_requested: u64,
}
