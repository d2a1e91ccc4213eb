use crate::hal::Transport;
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::time::{sleep, Duration};

/// Transport stand-in that records every command it is given
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<String>>>,
    failing: bool,
    delay: Duration,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send fails after being recorded
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Simulated link latency per send
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&mut self, command: &str) -> Result<()> {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.sent
            .lock()
            .map_err(|_| anyhow!("Transport log poisoned"))?
            .push(command.to_string());

        if self.failing {
            bail!("Simulated write failure");
        }
        Ok(())
    }
}
