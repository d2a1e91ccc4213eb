use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Local;
use log::{debug, info};
use tokio::sync::Notify;

use crate::observability::PipelineMetrics;

/// Single-slot pending flag shared between the edge callback and the burst worker.
///
/// `set` never blocks and is idempotent; only the worker calls `clear`.
pub struct TriggerSignal {
    pending: AtomicBool,
    notify: Notify,
}

impl TriggerSignal {
    pub fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Returns true if this call moved the signal from clear to set
    pub fn set(&self) -> bool {
        if self.pending.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.notify.notify_one();
        true
    }

    pub fn is_set(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Suspend until the signal is set
    pub async fn wait(&self) {
        loop {
            if self.pending.load(Ordering::Acquire) {
                return;
            }
            // A set() racing this check leaves a permit behind, so this cannot miss it
            self.notify.notified().await;
        }
    }

    pub fn clear(&self) {
        self.pending.store(false, Ordering::Release);
    }
}

impl Default for TriggerSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry point for the hardware edge callback
#[derive(Clone)]
pub struct EdgeTrigger {
    signal: Arc<TriggerSignal>,
    metrics: Arc<PipelineMetrics>,
}

impl EdgeTrigger {
    pub fn new(signal: Arc<TriggerSignal>, metrics: Arc<PipelineMetrics>) -> Self {
        Self { signal, metrics }
    }

    /// Called on each debounced rising edge. Never blocks and never fails.
    pub fn on_edge(&self) {
        self.metrics.record_edge();
        if self.signal.set() {
            info!(
                "Motion detected at {}! Triggering processor.",
                Local::now().format("%a %b %e %H:%M:%S %Y")
            );
        } else {
            self.metrics.record_edge_coalesced();
            debug!("Motion edge coalesced into pending burst");
        }
    }

    pub fn signal(&self) -> &Arc<TriggerSignal> {
        &self.signal
    }
}
