use crate::error::Result as ArcamResult;
use crate::frame::PixelFormat;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ArcamConfig {
    pub camera: CameraConfig,
    pub dispatch: DispatchConfig,
    pub surface: SurfaceConfig,
    pub lifecycle: LifecycleConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CameraConfig {
    /// Preferred preview width; small sizes keep per-frame tracking cheap
    #[serde(default = "default_preview_width")]
    pub preview_width: u32,

    /// Preferred preview height
    #[serde(default = "default_preview_height")]
    pub preview_height: u32,

    /// Preferred preview pixel format
    #[serde(default = "default_pixel_format")]
    pub pixel_format: PixelFormat,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DispatchConfig {
    /// Frames buffered between the camera thread and the consumer (1 or 2)
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,

    /// Always copy frames out of the device buffer
    #[serde(default = "default_copy_frames")]
    pub copy_frames: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SurfaceConfig {
    /// Bind the surface to the camera as its preview display when created
    #[serde(default = "default_bind_preview_display")]
    pub bind_preview_display: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LifecycleConfig {
    /// Ask the host to finish the screen whenever it pauses
    #[serde(default = "default_finish_on_pause")]
    pub finish_on_pause: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Frame rate of the simulated camera
    #[serde(default = "default_simulation_fps")]
    pub fps: u32,

    /// How the simulated device hands frames over
    #[serde(default = "default_delivery_mode")]
    pub delivery_mode: DeliveryMode,

    /// Simulated device reuses its frame buffer between deliveries
    #[serde(default = "default_reuse_buffers")]
    pub reuse_buffers: bool,

    /// Simulated device refuses to open
    #[serde(default = "default_fail_open")]
    pub fail_open: bool,
}

/// Camera frame delivery protocol
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Callback stays registered for every frame
    Continuous,
    /// Each frame must be requested again after it arrives
    OneShot,
}

impl ArcamConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("arcam.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("camera.preview_width", default_preview_width())?
            .set_default("camera.preview_height", default_preview_height())?
            .set_default("camera.pixel_format", "Nv21")?
            .set_default("dispatch.queue_depth", default_queue_depth() as i64)?
            .set_default("dispatch.copy_frames", default_copy_frames())?
            .set_default(
                "surface.bind_preview_display",
                default_bind_preview_display(),
            )?
            .set_default("lifecycle.finish_on_pause", default_finish_on_pause())?
            .set_default("simulation.fps", default_simulation_fps())?
            .set_default("simulation.delivery_mode", "Continuous")?
            .set_default("simulation.reuse_buffers", default_reuse_buffers())?
            .set_default("simulation.fail_open", default_fail_open())?
            .add_source(File::with_name(&path_str).required(false))
            // ARCAM__CAMERA__PREVIEW_WIDTH=320; field names contain underscores
            .add_source(Environment::with_prefix("ARCAM").separator("__"))
            .build()?;

        let config: ArcamConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.preview_width == 0 || self.camera.preview_height == 0 {
            return Err(ConfigError::Message(
                "Camera preview size must be greater than 0".to_string(),
            ));
        }

        if !(1..=2).contains(&self.dispatch.queue_depth) {
            return Err(ConfigError::Message(
                "Dispatch queue_depth must be 1 or 2".to_string(),
            ));
        }

        if self.simulation.fps == 0 {
            return Err(ConfigError::Message(
                "Simulation fps must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Render as a TOML document
    pub fn to_toml(&self) -> ArcamResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for ArcamConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            dispatch: DispatchConfig {
                queue_depth: default_queue_depth(),
                copy_frames: default_copy_frames(),
            },
            surface: SurfaceConfig {
                bind_preview_display: default_bind_preview_display(),
            },
            lifecycle: LifecycleConfig {
                finish_on_pause: default_finish_on_pause(),
            },
            simulation: SimulationConfig {
                fps: default_simulation_fps(),
                delivery_mode: default_delivery_mode(),
                reuse_buffers: default_reuse_buffers(),
                fail_open: default_fail_open(),
            },
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            preview_width: default_preview_width(),
            preview_height: default_preview_height(),
            pixel_format: default_pixel_format(),
        }
    }
}

// Default value functions
fn default_preview_width() -> u32 {
    240
}
fn default_preview_height() -> u32 {
    160
}
fn default_pixel_format() -> PixelFormat {
    PixelFormat::Nv21
}
fn default_delivery_mode() -> DeliveryMode {
    DeliveryMode::Continuous
}

fn default_queue_depth() -> usize {
    2
}
fn default_copy_frames() -> bool {
    false
}

fn default_bind_preview_display() -> bool {
    false
}

fn default_finish_on_pause() -> bool {
    true
}

fn default_simulation_fps() -> u32 {
    15
}
fn default_reuse_buffers() -> bool {
    false
}
fn default_fail_open() -> bool {
    false
}
