pub mod lifecycle;
pub mod mock;
pub mod serial;
pub mod storage;
pub mod traits;
pub mod types;

pub use lifecycle::ManagedCamera;
pub use serial::{select_port, GlobLister, SerialTransport, DEFAULT_PORT_PATTERNS};
pub use storage::{annotation_file_stem, DirectoryStore};
pub use traits::{AnnotationStore, Detector, EdgeSource, FrameSource, PortLister, Transport};
pub use types::DeviceState;
