use std::sync::Arc;

use log::{debug, error, info};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::NotificationCommand;
use crate::hal::Transport;
use crate::observability::PipelineMetrics;

/// Dedicated task owning the transport.
///
/// Each command is attempted once; failures are logged and never retried.
/// The task ends when every dispatcher sender has been dropped.
pub struct Notifier {
    transport: Box<dyn Transport>,
    rx: mpsc::Receiver<NotificationCommand>,
    metrics: Arc<PipelineMetrics>,
}

impl Notifier {
    pub fn new(
        transport: Box<dyn Transport>,
        rx: mpsc::Receiver<NotificationCommand>,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        Self {
            transport,
            rx,
            metrics,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            self.deliver(&command).await;
        }
        debug!("Notifier stopped");
    }

    async fn deliver(&mut self, command: &NotificationCommand) {
        let line = command.encode();
        match self.transport.send(&line).await {
            Ok(()) => {
                self.metrics.record_notification_sent();
                info!(
                    "Notification sent: {}, {}%",
                    command.label, command.confidence_percent
                );
            }
            Err(e) => {
                self.metrics.record_notification_failed();
                error!("Failed to send notification {}: {:#}", command.payload(), e);
            }
        }
    }
}
