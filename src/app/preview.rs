use super::types::CoordinatorState;
use super::LifecycleCoordinator;
use crate::error::Result;
use tracing::{debug, info};

impl LifecycleCoordinator {
    /// Start a preview session if the surface exists and the host is not pausing.
    ///
    /// Returns `Ok(())` without effect when a guard fails. A running session
    /// is stopped first so only one session ever exists. Failure to acquire
    /// the camera is returned to the caller; calling again is the retry.
    pub fn start_preview(&mut self) -> Result<()> {
        if self.state != CoordinatorState::Active {
            debug!("Ignoring start_preview while {:?}", self.state);
            return Ok(());
        }
        if !self.surface.is_ready() {
            debug!("Ignoring start_preview: surface not created");
            return Ok(());
        }
        if self.pausing {
            debug!("Ignoring start_preview: pausing");
            return Ok(());
        }

        if self.camera.is_previewing() {
            info!("Restarting preview session");
            self.camera.stop_preview();
        }

        if self.camera.open()? {
            let preferred = &self.config.camera;
            self.camera.configure(
                preferred.preview_width,
                preferred.preview_height,
                preferred.pixel_format,
            );
        }
        self.surface.bind_if_required(&mut self.camera);
        self.camera.start_preview()?;

        Ok(())
    }

    /// Stop the running session; the camera stays open
    pub fn stop_preview(&mut self) {
        self.camera.stop_preview();
    }

    pub fn on_surface_created(&mut self) {
        self.surface.on_surface_created(&mut self.camera);
    }

    pub fn on_surface_changed(&mut self, width: u32, height: u32) {
        self.surface.on_surface_changed(width, height);
    }

    /// Closes the camera even if nobody stopped the preview
    pub fn on_surface_destroyed(&mut self) {
        self.surface.on_surface_destroyed(&mut self.camera);
    }
}
