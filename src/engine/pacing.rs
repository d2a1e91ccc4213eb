use tokio::time::{sleep, Duration};

/// Default spacing between frame starts (5 FPS)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(200);

/// Keeps frames at most one per interval.
///
/// A slow frame is not compensated on later frames and no frame is skipped.
#[derive(Debug, Clone, Copy)]
pub struct FramePacer {
    interval: Duration,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep still owed after a frame that took `elapsed`
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.interval.saturating_sub(elapsed)
    }

    /// Sleep out the remainder of the interval, returning how long was slept
    pub async fn pace(&self, elapsed: Duration) -> Duration {
        let pause = self.remaining(elapsed);
        if !pause.is_zero() {
            sleep(pause).await;
        }
        pause
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}
