use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::hal::DEFAULT_PORT_PATTERNS;
use crate::notify::DEFAULT_CONFIDENCE_THRESHOLD;

/// Camera capture settings, fixed for the lifetime of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Motion sensor input settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Minimum spacing between accepted rising edges
    pub debounce_ms: u64,
}

impl EdgeConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self { debounce_ms: 3000 }
    }
}

/// Serial radio link settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path globs, earlier patterns win
    pub patterns: Vec<String>,
    /// Wait after opening the port before writing
    pub settle_ms: u64,
}

impl SerialConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PORT_PATTERNS.iter().map(|p| p.to_string()).collect(),
            settle_ms: 2000,
        }
    }
}

/// Pipeline configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Frames captured per motion event
    pub burst_count: u32,
    /// Target spacing between frame starts
    pub frame_interval_ms: u64,
    /// Mean confidence a burst must exceed (strictly) to notify
    pub confidence_threshold: f64,
    /// Upper bound on a single capture or inference call, unbounded when absent
    pub frame_timeout_ms: Option<u64>,
    pub capture: CaptureConfig,
    pub edge: EdgeConfig,
    pub detections_dir: PathBuf,
    pub persist_detections: bool,
    /// Notifications waiting for the radio before new ones are dropped
    pub notify_queue_capacity: usize,
    pub serial: SerialConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            burst_count: 5,
            frame_interval_ms: 200,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            frame_timeout_ms: None,
            capture: CaptureConfig::default(),
            edge: EdgeConfig::default(),
            detections_dir: PathBuf::from("detections"),
            persist_detections: true,
            notify_queue_capacity: 4,
            serial: SerialConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json(config: Value) -> Result<Self> {
        let config: PipelineConfig =
            serde_json::from_value(config).context("Invalid pipeline configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let value: Value = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Self::from_json(value)
    }

    pub fn validate(&self) -> Result<()> {
        if self.burst_count == 0 {
            bail!("burst_count must be at least 1");
        }
        if self.frame_interval_ms == 0 {
            bail!("frame_interval_ms must be positive");
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            bail!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            );
        }
        if self.frame_timeout_ms == Some(0) {
            bail!("frame_timeout_ms must be positive when set");
        }
        if self.capture.width == 0 || self.capture.height == 0 {
            bail!(
                "capture size must be non-zero, got {}x{}",
                self.capture.width,
                self.capture.height
            );
        }
        if self.notify_queue_capacity == 0 {
            bail!("notify_queue_capacity must be at least 1");
        }
        if self.serial.patterns.is_empty() {
            bail!("serial.patterns must list at least one device pattern");
        }
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn frame_timeout(&self) -> Option<Duration> {
        self.frame_timeout_ms.map(Duration::from_millis)
    }
}
