mod controller;
mod device;
mod holder;
mod params;
mod simulated;

pub use controller::CameraController;
pub use device::{
    CameraBackend, CameraDevice, FrameRequest, FrameSink, PreviewParameters, PreviewTarget,
};
pub use holder::CameraHolder;
pub use params::{ConfigureOutcome, ParameterOutcome};
pub use simulated::{SimulatedCamera, SUPPORTED_FORMATS, SUPPORTED_SIZES};
