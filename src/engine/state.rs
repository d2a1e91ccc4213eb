use serde::{Deserialize, Serialize};

/// Burst worker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurstState {
    Waiting,
    /// `frame` is the 1-based frame being processed
    Capturing { frame: u32 },
    Finalizing,
    /// Worker has exited after a shutdown request
    Stopped,
}

impl BurstState {
    /// Check if transition from current state to target state is valid
    pub fn can_transition_to(&self, target: &BurstState) -> bool {
        use BurstState::*;

        matches!(
            (self, target),
            (Waiting, Capturing { .. }) |
            (Waiting, Stopped) |

            (Capturing { .. }, Capturing { .. }) |
            (Capturing { .. }, Finalizing) |
            (Capturing { .. }, Stopped) |

            (Finalizing, Waiting)
        )
    }

    /// Get human-readable state name
    pub fn name(&self) -> &str {
        match self {
            Self::Waiting => "Waiting",
            Self::Capturing { .. } => "Capturing",
            Self::Finalizing => "Finalizing",
            Self::Stopped => "Stopped",
        }
    }
}

impl Default for BurstState {
    fn default() -> Self {
        Self::Waiting
    }
}
