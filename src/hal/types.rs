use serde::{Deserialize, Serialize};

/// Lifecycle state of a hardware device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceState {
    Unopened,
    Running,
    Stopped,
    Error(String),
}

impl Default for DeviceState {
    fn default() -> Self {
        DeviceState::Unopened
    }
}
