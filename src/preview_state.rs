use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Camera activity flag shared between the camera controller and its readers.
///
/// Only `CameraController` writes it. `true` means the device is open and
/// preview was started successfully.
#[derive(Debug, Clone, Default)]
pub struct SharedPreviewState {
    previewing: Arc<AtomicBool>,
}

impl SharedPreviewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_previewing(&self) -> bool {
        self.previewing.load(Ordering::Acquire)
    }

    pub(crate) fn set_previewing(&self, previewing: bool) {
        self.previewing.store(previewing, Ordering::Release);
    }
}
