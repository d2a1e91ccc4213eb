pub mod detection;
pub mod frame;

pub use detection::{top_detection, BoundingBox, Detection};
pub use frame::{Frame, PixelFormat};
