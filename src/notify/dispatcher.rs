use std::sync::Arc;

use log::{error, info, warn};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::NotificationCommand;
use crate::engine::BurstSummary;
use crate::observability::PipelineMetrics;

/// Default mean confidence a burst must exceed to be reported
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.50;

/// What the dispatcher did with a burst summary
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    NoDetections,
    BelowThreshold { mean_confidence: f64 },
    /// Handed to the notifier task
    Queued(NotificationCommand),
    /// Notifier unavailable or busy; the notification is lost
    Dropped(NotificationCommand),
}

/// Applies the threshold policy and hands notifications to the notifier task.
///
/// `dispatch` never waits on the transport.
pub struct NotificationDispatcher {
    threshold: f64,
    tx: mpsc::Sender<NotificationCommand>,
    metrics: Arc<PipelineMetrics>,
}

impl NotificationDispatcher {
    pub fn new(
        threshold: f64,
        tx: mpsc::Sender<NotificationCommand>,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        Self {
            threshold,
            tx,
            metrics,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn dispatch(&self, summary: &BurstSummary) -> DispatchOutcome {
        if !summary.has_detections() {
            info!("No detections in this burst, nothing sent.");
            self.metrics.record_notification_suppressed();
            return DispatchOutcome::NoDetections;
        }

        let mean_confidence = summary.mean_confidence;
        if mean_confidence <= self.threshold {
            info!(
                "Average confidence {:.2} below threshold {:.2}, not sent.",
                mean_confidence, self.threshold
            );
            self.metrics.record_notification_suppressed();
            return DispatchOutcome::BelowThreshold { mean_confidence };
        }

        let command = NotificationCommand::from_summary(summary);
        info!(
            "Threshold ({:.0}%) exceeded. Sending notification: {}, {}%",
            self.threshold * 100.0,
            command.label,
            command.confidence_percent
        );

        match self.tx.try_send(command.clone()) {
            Ok(()) => {
                self.metrics.record_notification_queued();
                DispatchOutcome::Queued(command)
            }
            Err(TrySendError::Full(_)) => {
                warn!("Notifier busy, dropping notification {}", command.payload());
                self.metrics.record_notification_dropped();
                DispatchOutcome::Dropped(command)
            }
            Err(TrySendError::Closed(_)) => {
                error!("Notifier is not running, dropping notification {}", command.payload());
                self.metrics.record_notification_dropped();
                DispatchOutcome::Dropped(command)
            }
        }
    }
}
