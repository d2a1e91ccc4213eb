use crate::engine::EdgeTrigger;
use crate::hal::{DeviceState, EdgeSource};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration, Instant};

#[derive(Debug, Clone)]
enum EdgeMode {
    Periodic { interval_ms: u64 },
    Manual,
}

/// Handle for raising edges on a manual-mode source
#[derive(Clone)]
pub struct ManualEdge {
    tx: mpsc::Sender<()>,
}

impl ManualEdge {
    /// Raise one rising edge, dropped if the line is already saturated
    pub fn pulse(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Motion sensor stand-in with software debounce
pub struct SimulatedEdgeSource {
    state: DeviceState,
    mode: EdgeMode,
    debounce: Duration,
    manual_tx: mpsc::Sender<()>,
    manual_rx: Option<mpsc::Receiver<()>>,
    task: Option<JoinHandle<()>>,
}

impl SimulatedEdgeSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(16);
        Self {
            state: DeviceState::Unopened,
            mode: EdgeMode::Periodic { interval_ms: 10_000 },
            debounce: Duration::ZERO,
            manual_tx: tx,
            manual_rx: Some(rx),
            task: None,
        }
    }

    pub fn periodic(interval: Duration) -> Self {
        let mut source = Self::new();
        source.mode = EdgeMode::Periodic {
            interval_ms: interval.as_millis() as u64,
        };
        source
    }

    pub fn manual() -> Self {
        let mut source = Self::new();
        source.mode = EdgeMode::Manual;
        source
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Configure from JSON: `{"mode": "periodic"|"manual", "interval_ms": .., "debounce_ms": ..}`
    pub fn configure(&mut self, config: Value) -> Result<()> {
        if self.state != DeviceState::Unopened {
            return Err(anyhow!("Cannot configure edge source in state {:?}", self.state));
        }

        let mode = config["mode"].as_str().unwrap_or("periodic");

        self.mode = match mode {
            "periodic" => {
                let interval_ms = config["interval_ms"].as_u64().unwrap_or(10_000);
                EdgeMode::Periodic { interval_ms }
            }
            "manual" => EdgeMode::Manual,
            _ => return Err(anyhow!("Unknown edge mode: {}", mode)),
        };

        if let Some(debounce_ms) = config["debounce_ms"].as_u64() {
            self.debounce = Duration::from_millis(debounce_ms);
        }

        Ok(())
    }

    pub fn manual_edge(&self) -> ManualEdge {
        ManualEdge {
            tx: self.manual_tx.clone(),
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state.clone()
    }
}

impl Default for SimulatedEdgeSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EdgeSource for SimulatedEdgeSource {
    async fn arm(&mut self, trigger: EdgeTrigger) -> Result<()> {
        if self.state != DeviceState::Unopened {
            return Err(anyhow!("Cannot arm edge source in state {:?}", self.state));
        }
        let mut rx = self
            .manual_rx
            .take()
            .ok_or_else(|| anyhow!("Edge line already claimed"))?;

        let mode = self.mode.clone();
        let debounce = self.debounce;

        self.task = Some(tokio::spawn(async move {
            let mut last_edge: Option<Instant> = None;

            loop {
                match mode {
                    EdgeMode::Periodic { interval_ms } => {
                        sleep(Duration::from_millis(interval_ms)).await;
                    }
                    EdgeMode::Manual => {
                        if rx.recv().await.is_none() {
                            break;
                        }
                    }
                }

                let now = Instant::now();
                if let Some(previous) = last_edge {
                    if now.duration_since(previous) < debounce {
                        continue;
                    }
                }
                last_edge = Some(now);

                trigger.on_edge();
            }
        }));

        self.state = DeviceState::Running;
        Ok(())
    }

    async fn disarm(&mut self) -> Result<()> {
        if self.state != DeviceState::Running {
            return Ok(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        self.state = DeviceState::Stopped;
        Ok(())
    }
}
