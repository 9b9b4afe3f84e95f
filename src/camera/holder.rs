use super::device::{CameraBackend, CameraDevice};
use crate::error::CameraError;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Process-wide owner of the singleton camera device.
///
/// At most one device handle is out at any time. Share the holder by `Arc`
/// and give every handle back with [`CameraHolder::release`].
pub struct CameraHolder {
    backend: Box<dyn CameraBackend>,
    held: AtomicBool,
}

impl CameraHolder {
    pub fn new<B: CameraBackend + 'static>(backend: B) -> Self {
        Self {
            backend: Box::new(backend),
            held: AtomicBool::new(false),
        }
    }

    /// Take the device, failing if it is already held or cannot be opened
    pub fn acquire(&self) -> Result<Box<dyn CameraDevice>, CameraError> {
        if self
            .held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Camera acquire refused: device already held");
            return Err(CameraError::DeviceUnavailable {
                details: "device is already held by another owner".to_string(),
            });
        }

        match self.backend.open() {
            Ok(device) => {
                info!("Camera device acquired");
                Ok(device)
            }
            Err(e) => {
                self.held.store(false, Ordering::Release);
                Err(match e {
                    CameraError::DeviceUnavailable { .. } => e,
                    other => CameraError::DeviceUnavailable {
                        details: other.to_string(),
                    },
                })
            }
        }
    }

    /// Give the device back to the system
    pub fn release(&self, device: Box<dyn CameraDevice>) {
        drop(device);
        self.held.store(false, Ordering::Release);
        debug!("Camera device released");
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}
