use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;

/// Preview pixel formats a camera may be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// YCbCr 4:2:0 semi-planar (NV21), the cheapest format for luminance-based tracking
    Nv21,
    /// YCbCr 4:2:2 interleaved
    Yuyv,
    /// Packed 16-bit RGB
    Rgb565,
}

impl PixelFormat {
    /// Size in bytes of one frame of the given dimensions
    pub fn frame_size(&self, width: u32, height: u32) -> usize {
        let pixels = width as usize * height as usize;
        match self {
            PixelFormat::Nv21 => pixels + pixels / 2,
            PixelFormat::Yuyv | PixelFormat::Rgb565 => pixels * 2,
        }
    }
}

/// One preview frame as delivered by the camera
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    /// Monotonic sequence number assigned by the device
    pub sequence: u64,
    pub timestamp: SystemTime,
    /// Raw pixel data (shared with the device unless detached)
    pub data: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl PreviewFrame {
    pub fn new(sequence: u64, data: Vec<u8>, width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            sequence,
            timestamp: SystemTime::now(),
            data: Arc::new(data),
            width,
            height,
            format,
        }
    }

    /// Copy the pixel data out of a buffer the device is about to reuse
    pub fn detached(&self) -> Self {
        Self {
            data: Arc::new(self.data.as_ref().clone()),
            ..self.clone()
        }
    }

    /// Check the buffer length against the declared format and dimensions
    pub fn validate_size(&self) -> bool {
        self.data.len() == self.format.frame_size(self.width, self.height)
    }
}
