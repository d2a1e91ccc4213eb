use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::{Detection, Frame};
use crate::engine::EdgeTrigger;

/// Source of debounced rising edges from the motion sensor
#[async_trait]
pub trait EdgeSource: Send {
    /// Begin delivering edges to the trigger
    async fn arm(&mut self, trigger: EdgeTrigger) -> Result<()>;

    /// Stop delivering edges and release the input line
    async fn disarm(&mut self) -> Result<()>;
}

/// Camera capability: one frame per call
#[async_trait]
pub trait FrameSource: Send {
    async fn start(&mut self) -> Result<()>;

    /// Capture a single frame, may block on hardware I/O
    async fn capture(&mut self) -> Result<Frame>;

    async fn stop(&mut self) -> Result<()>;

    /// Best-effort synchronous release, used when the source is dropped while running
    fn release(&mut self) {}
}

/// Object detection inference engine
#[async_trait]
pub trait Detector: Send {
    /// Load model resources before the first frame
    async fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }

    async fn infer(&mut self, frame: &Frame) -> Result<Vec<Detection>>;
}

/// Sink for frames that contained detections
pub trait AnnotationStore: Send {
    /// Persist a frame and its detections, returning the image path.
    /// `frame_number` is 1-based within the burst.
    fn persist(
        &mut self,
        frame: &Frame,
        frame_number: u32,
        detections: &[Detection],
    ) -> Result<PathBuf>;
}

/// Line-oriented link that carries encoded notification commands
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, command: &str) -> Result<()>;
}

/// Lists device paths matching a glob pattern
pub trait PortLister: Send + Sync {
    fn list(&self, pattern: &str) -> Result<Vec<PathBuf>>;
}
