/// Result of applying one preview parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterOutcome {
    /// The device accepted the requested value
    Applied,
    /// The device rejected the value and kept its previous one
    FellBack { details: String },
    /// No device was open to apply it to
    DeviceUnavailable,
}

impl ParameterOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ParameterOutcome::Applied)
    }
}

/// Per-parameter report of a `configure` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigureOutcome {
    pub preview_size: ParameterOutcome,
    pub pixel_format: ParameterOutcome,
}

impl ConfigureOutcome {
    pub(crate) fn unavailable() -> Self {
        Self {
            preview_size: ParameterOutcome::DeviceUnavailable,
            pixel_format: ParameterOutcome::DeviceUnavailable,
        }
    }

    pub fn fully_applied(&self) -> bool {
        self.preview_size.is_applied() && self.pixel_format.is_applied()
    }
}
