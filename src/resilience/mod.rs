pub mod frame_guard;

pub use frame_guard::{FrameGuard, FrameStage};
