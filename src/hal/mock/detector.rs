use crate::core::{Detection, Frame};
use crate::hal::Detector;
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::time::{sleep, Duration};

/// Detector stand-in that replays a per-frame script
#[derive(Debug, Clone, Default)]
pub struct ScriptedDetector {
    script: VecDeque<Result<Vec<Detection>, String>>,
    replay: Vec<Result<Vec<Detection>, String>>,
    repeat: bool,
    inference_cost: Duration,
    fail_warm_up: bool,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next frame yields these detections
    pub fn then_detect(mut self, detections: Vec<Detection>) -> Self {
        self.script.push_back(Ok(detections));
        self
    }

    /// Next frame yields no detections
    pub fn then_nothing(self) -> Self {
        self.then_detect(Vec::new())
    }

    /// Next inference fails
    pub fn then_fail(mut self, message: impl Into<String>) -> Self {
        self.script.push_back(Err(message.into()));
        self
    }

    /// Start the script over once it runs out
    pub fn repeating(mut self) -> Self {
        self.repeat = true;
        self.replay = self.script.iter().cloned().collect();
        self
    }

    pub fn with_inference_cost(mut self, cost: Duration) -> Self {
        self.inference_cost = cost;
        self
    }

    pub fn fail_warm_up(mut self) -> Self {
        self.fail_warm_up = true;
        self
    }
}

#[async_trait]
impl Detector for ScriptedDetector {
    async fn warm_up(&mut self) -> Result<()> {
        if self.fail_warm_up {
            bail!("Simulated model failed to load");
        }
        Ok(())
    }

    async fn infer(&mut self, _frame: &Frame) -> Result<Vec<Detection>> {
        if !self.inference_cost.is_zero() {
            sleep(self.inference_cost).await;
        }
        if self.script.is_empty() && self.repeat {
            self.script.extend(self.replay.iter().cloned());
        }

        match self.script.pop_front() {
            Some(Ok(detections)) => Ok(detections),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(Vec::new()),
        }
    }
}
