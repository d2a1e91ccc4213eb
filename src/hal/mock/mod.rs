pub mod camera;
pub mod detector;
pub mod store;
pub mod transport;
pub mod trigger;

pub use camera::SimulatedCamera;
pub use detector::ScriptedDetector;
pub use store::MemoryAnnotationStore;
pub use transport::RecordingTransport;
pub use trigger::{ManualEdge, SimulatedEdgeSource};
