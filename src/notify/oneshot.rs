use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use super::NotificationCommand;
use crate::hal::{GlobLister, PortLister, SerialTransport, Transport, DEFAULT_PORT_PATTERNS};

/// Sends one detection notification over the serial radio link
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "edgewatch-notify", version)]
pub struct NotifyArgs {
    /// Detected object label, e.g. "person"
    pub label: String,

    /// Mean confidence as a whole percentage
    #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
    pub confidence_percent: u8,

    #[arg(long, default_value_t = 2000, help = "Wait after opening the port, in milliseconds")]
    pub settle_ms: u64,
}

impl NotifyArgs {
    pub async fn run(self) -> Result<()> {
        let patterns = DEFAULT_PORT_PATTERNS.iter().map(|p| p.to_string()).collect();
        send_once(
            &self.label,
            self.confidence_percent,
            patterns,
            Duration::from_millis(self.settle_ms),
            GlobLister,
        )
        .await
    }
}

/// Encode one notification and write it to the first matching serial device
pub async fn send_once(
    label: &str,
    confidence_percent: u8,
    patterns: Vec<String>,
    settle: Duration,
    lister: impl PortLister + 'static,
) -> Result<()> {
    let command = NotificationCommand::new(label, confidence_percent);
    let mut transport = SerialTransport::new(patterns, settle).with_lister(lister);
    transport.send(&command.encode()).await
}
