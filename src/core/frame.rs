use serde::{Deserialize, Serialize};

/// Pixel layout of a captured frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    Rgb888,
    Bgr888,
    Jpeg,
}

impl PixelFormat {
    /// File extension used when the raw buffer is written to disk
    pub fn extension(&self) -> &'static str {
        match self {
            PixelFormat::Rgb888 | PixelFormat::Bgr888 => "raw",
            PixelFormat::Jpeg => "jpg",
        }
    }
}

impl Default for PixelFormat {
    fn default() -> Self {
        PixelFormat::Rgb888
    }
}

/// One image captured from the frame source
#[derive(Debug, Clone)]
pub struct Frame {
    /// Capture time in microseconds since the source was started
    pub timestamp: u64,

    /// Sequential frame number assigned by the source
    pub sequence_id: u64,

    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,

    /// Opaque image buffer
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(timestamp: u64, sequence_id: u64, width: u32, height: u32) -> Self {
        Self {
            timestamp,
            sequence_id,
            width,
            height,
            format: PixelFormat::default(),
            data: Vec::new(),
        }
    }

    pub fn with_data(mut self, format: PixelFormat, data: Vec<u8>) -> Self {
        self.format = format;
        self.data = data;
        self
    }
}
