use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::time::sleep;

use super::{PortLister, Transport};
use crate::config::SerialConfig;
use crate::notify::command::LINE_TERMINATOR;

/// Device name patterns scanned for the radio module, in preference order
pub const DEFAULT_PORT_PATTERNS: [&str; 2] = ["/dev/ttyACM*", "/dev/ttyUSB*"];

/// Lists ports from the real filesystem
pub struct GlobLister;

impl PortLister for GlobLister {
    fn list(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let mut paths: Vec<PathBuf> = glob::glob(pattern)
            .with_context(|| format!("Invalid device pattern {}", pattern))?
            .filter_map(|entry| entry.ok())
            .collect();
        paths.sort();
        Ok(paths)
    }
}

/// First match of the first pattern that matches anything
pub fn select_port(patterns: &[String], lister: &dyn PortLister) -> Result<PathBuf> {
    for pattern in patterns {
        if let Some(path) = lister.list(pattern)?.into_iter().next() {
            return Ok(path);
        }
    }
    bail!("No serial device found matching {}", patterns.join(" or "))
}

/// Writes each command as one newline-terminated line to the discovered serial device.
///
/// The device is looked up again on every send, so a radio plugged in after
/// startup is picked up without a restart.
pub struct SerialTransport {
    patterns: Vec<String>,
    lister: Box<dyn PortLister>,
    settle: Duration,
}

impl SerialTransport {
    pub fn new(patterns: Vec<String>, settle: Duration) -> Self {
        Self {
            patterns,
            lister: Box::new(GlobLister),
            settle,
        }
    }

    pub fn from_config(config: &SerialConfig) -> Self {
        Self::new(config.patterns.clone(), config.settle())
    }

    pub fn with_lister(mut self, lister: impl PortLister + 'static) -> Self {
        self.lister = Box::new(lister);
        self
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn send(&mut self, command: &str) -> Result<()> {
        let port = select_port(&self.patterns, self.lister.as_ref())?;
        info!("Found serial port: {}", port.display());

        let mut options = OpenOptions::new();
        options.write(true);
        // Do not wait for carrier detect or adopt the port as controlling terminal
        #[cfg(unix)]
        options.custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK);

        let mut device = options
            .open(&port)
            .await
            .with_context(|| format!("Could not open serial port {}", port.display()))?;

        // Adapters commonly reset when the port opens
        if !self.settle.is_zero() {
            sleep(self.settle).await;
        }

        let line = format!("{}{}", command, LINE_TERMINATOR);
        device
            .write_all(line.as_bytes())
            .await
            .with_context(|| format!("Could not write to serial port {}", port.display()))?;
        device.flush().await?;

        info!("Successfully sent to {}: '{}'", port.display(), command);
        debug!("Serial port {} closed", port.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoPorts;

    impl PortLister for NoPorts {
        fn list(&self, _pattern: &str) -> Result<Vec<PathBuf>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_send_without_device_fails() {
        let mut transport =
            SerialTransport::new(vec!["/dev/ttyACM*".to_string()], Duration::ZERO).with_lister(NoPorts);

        let err = transport.send("AT+DTRX=1,2,2,6161").await.unwrap_err();
        assert!(err.to_string().contains("No serial device found"));
    }
}
