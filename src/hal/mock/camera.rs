use crate::core::{Frame, PixelFormat};
use crate::hal::FrameSource;
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, Duration, Instant};

/// Camera stand-in producing blank frames of a fixed size
pub struct SimulatedCamera {
    width: u32,
    height: u32,
    capture_cost: Duration,
    failing_captures: HashSet<u64>,
    fail_start: bool,
    capture_count: u64,
    start_time: Option<Instant>,
    running: Arc<AtomicBool>,
}

impl SimulatedCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            capture_cost: Duration::ZERO,
            failing_captures: HashSet::new(),
            fail_start: false,
            capture_count: 0,
            start_time: None,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Time each capture takes
    pub fn with_capture_cost(mut self, cost: Duration) -> Self {
        self.capture_cost = cost;
        self
    }

    /// Make the given 1-based capture fail
    pub fn fail_capture(mut self, capture_number: u64) -> Self {
        self.failing_captures.insert(capture_number);
        self
    }

    pub fn fail_on_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Shared flag that reads true while the camera is started
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}

#[async_trait]
impl FrameSource for SimulatedCamera {
    async fn start(&mut self) -> Result<()> {
        if self.fail_start {
            bail!("Simulated camera failed to initialize");
        }
        self.start_time = Some(Instant::now());
        self.capture_count = 0;
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn capture(&mut self) -> Result<Frame> {
        let start_time = self
            .start_time
            .ok_or_else(|| anyhow!("Camera not started"))?;

        self.capture_count += 1;
        if !self.capture_cost.is_zero() {
            sleep(self.capture_cost).await;
        }
        if self.failing_captures.contains(&self.capture_count) {
            bail!("Simulated capture failure on capture {}", self.capture_count);
        }

        let timestamp = start_time.elapsed().as_micros() as u64;
        let size = (self.width * self.height * 3) as usize;
        Ok(Frame::new(timestamp, self.capture_count, self.width, self.height)
            .with_data(PixelFormat::Rgb888, vec![0u8; size]))
    }

    async fn stop(&mut self) -> Result<()> {
        self.release();
        Ok(())
    }

    fn release(&mut self) {
        self.start_time = None;
        self.running.store(false, Ordering::SeqCst);
    }
}
