pub mod aggregator;
pub mod burst;
pub mod pacing;
pub mod runtime;
pub mod state;
pub mod trigger;

pub use aggregator::{Aggregator, BurstSummary, UNKNOWN_LABEL};
pub use burst::{BurstProcessor, BurstSettings};
pub use pacing::{FramePacer, DEFAULT_FRAME_INTERVAL};
pub use runtime::{Devices, Runtime, RuntimeStatus};
pub use state::BurstState;
pub use trigger::{EdgeTrigger, TriggerSignal};
