use std::fmt;
use std::future::Future;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use log::warn;
use tokio::time::{timeout, Duration};

use crate::observability::PipelineMetrics;

/// Step of a frame that may fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStage {
    Capture,
    Inference,
}

impl fmt::Display for FrameStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameStage::Capture => write!(f, "capture"),
            FrameStage::Inference => write!(f, "inference"),
        }
    }
}

/// Runs one stage of a frame, turning failure into "no result" for that frame.
///
/// Errors and timeouts are logged and counted but never leave the burst.
/// Without a timeout a stalled device holds the worker indefinitely.
pub struct FrameGuard {
    timeout: Option<Duration>,
    metrics: Arc<PipelineMetrics>,
}

impl FrameGuard {
    pub fn new(timeout: Option<Duration>, metrics: Arc<PipelineMetrics>) -> Self {
        Self { timeout, metrics }
    }

    pub async fn run<T, F>(&self, stage: FrameStage, frame_number: u32, work: F) -> Option<T>
    where
        F: Future<Output = Result<T>>,
    {
        let result = match self.timeout {
            Some(limit) => match timeout(limit, work).await {
                Ok(result) => result,
                Err(_) => Err(anyhow!("{} timed out after {:?}", stage, limit)),
            },
            None => work.await,
        };

        match result {
            Ok(value) => Some(value),
            Err(e) => {
                match stage {
                    FrameStage::Capture => self.metrics.record_capture_error(),
                    FrameStage::Inference => self.metrics.record_inference_error(),
                }
                warn!(
                    "  [Frame {}] {} failed, treating as no detection: {:#}",
                    frame_number, stage, e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    #[tokio::test]
    async fn test_error_becomes_none() {
        let metrics = Arc::new(PipelineMetrics::new());
        let guard = FrameGuard::new(None, metrics.clone());

        let result: Option<u32> = guard
            .run(FrameStage::Inference, 2, async { bail!("model crashed") })
            .await;

        assert!(result.is_none());
        assert_eq!(metrics.inference_errors(), 1);
        assert_eq!(metrics.capture_errors(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_none() {
        let metrics = Arc::new(PipelineMetrics::new());
        let guard = FrameGuard::new(Some(Duration::from_millis(100)), metrics.clone());

        let result = guard
            .run(FrameStage::Capture, 1, async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(7u32)
            })
            .await;

        assert!(result.is_none());
        assert_eq!(metrics.capture_errors(), 1);
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let guard = FrameGuard::new(Some(Duration::from_secs(1)), Arc::new(PipelineMetrics::new()));
        let result = guard.run(FrameStage::Capture, 1, async { Ok("frame") }).await;
        assert_eq!(result, Some("frame"));
    }
}
