use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArcamError {
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Uncaught fault on worker thread '{thread}': {message}")]
    WorkerFault { thread: String, message: String },

    #[error("System error: {message}")]
    System { message: String },
}

/// Camera device failures.
///
/// Only `DeviceUnavailable`, `DeviceNotOpen` and `Start` ever reach callers of
/// the coordinator; the other two are absorbed where they occur.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("Camera device unavailable: {details}")]
    DeviceUnavailable { details: String },

    #[error("Camera device is not open")]
    DeviceNotOpen,

    #[error("Camera rejected {parameter}: {details}")]
    ParameterRejected { parameter: String, details: String },

    #[error("Failed to bind preview display: {details}")]
    SurfaceBindingFailed { details: String },

    #[error("Failed to start preview: {details}")]
    Start { details: String },
}

impl ArcamError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn worker_fault<S: Into<String>>(thread: S, message: S) -> Self {
        Self::WorkerFault {
            thread: thread.into(),
            message: message.into(),
        }
    }

    /// Whether another `start_preview` attempt may succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ArcamError::Camera(_) => true,
            ArcamError::WorkerFault { .. } => false,
            ArcamError::Config(_) | ArcamError::Serialization(_) => false,
            ArcamError::Io(_) | ArcamError::System { .. } => true,
        }
    }
}

pub type Result<T, E = ArcamError> = std::result::Result<T, E>;
