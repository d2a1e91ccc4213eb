use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters shared by the edge callback, the burst worker and the notifier
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    edges_seen: AtomicU64,
    edges_coalesced: AtomicU64,
    bursts_completed: AtomicU64,
    bursts_cancelled: AtomicU64,
    frames_processed: AtomicU64,
    frames_with_detection: AtomicU64,
    capture_errors: AtomicU64,
    inference_errors: AtomicU64,
    persist_errors: AtomicU64,
    notifications_queued: AtomicU64,
    notifications_sent: AtomicU64,
    notifications_failed: AtomicU64,
    notifications_dropped: AtomicU64,
    notifications_suppressed: AtomicU64,
    total_frame_latency_us: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_edge(&self) {
        self.edges_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_edge_coalesced(&self) {
        self.edges_coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_burst_completed(&self) {
        self.bursts_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_burst_cancelled(&self) {
        self.bursts_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// One frame slot finished, whatever its outcome
    pub fn record_frame(&self, latency: Duration) {
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        let _ = self.total_frame_latency_us.fetch_update(
            Ordering::Relaxed,
            Ordering::Relaxed,
            |total| Some(total.saturating_add(micros)),
        );
    }

    pub fn record_detection_frame(&self) {
        self.frames_with_detection.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_capture_error(&self) {
        self.capture_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_inference_error(&self) {
        self.inference_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persist_error(&self) {
        self.persist_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notification_queued(&self) {
        self.notifications_queued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notification_sent(&self) {
        self.notifications_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notification_failed(&self) {
        self.notifications_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notification_dropped(&self) {
        self.notifications_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notification_suppressed(&self) {
        self.notifications_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn edges_seen(&self) -> u64 {
        self.edges_seen.load(Ordering::Relaxed)
    }

    pub fn edges_coalesced(&self) -> u64 {
        self.edges_coalesced.load(Ordering::Relaxed)
    }

    pub fn bursts_completed(&self) -> u64 {
        self.bursts_completed.load(Ordering::Relaxed)
    }

    pub fn bursts_cancelled(&self) -> u64 {
        self.bursts_cancelled.load(Ordering::Relaxed)
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed.load(Ordering::Relaxed)
    }

    pub fn frames_with_detection(&self) -> u64 {
        self.frames_with_detection.load(Ordering::Relaxed)
    }

    pub fn capture_errors(&self) -> u64 {
        self.capture_errors.load(Ordering::Relaxed)
    }

    pub fn inference_errors(&self) -> u64 {
        self.inference_errors.load(Ordering::Relaxed)
    }

    pub fn persist_errors(&self) -> u64 {
        self.persist_errors.load(Ordering::Relaxed)
    }

    pub fn notifications_queued(&self) -> u64 {
        self.notifications_queued.load(Ordering::Relaxed)
    }

    pub fn notifications_sent(&self) -> u64 {
        self.notifications_sent.load(Ordering::Relaxed)
    }

    pub fn notifications_failed(&self) -> u64 {
        self.notifications_failed.load(Ordering::Relaxed)
    }

    pub fn notifications_dropped(&self) -> u64 {
        self.notifications_dropped.load(Ordering::Relaxed)
    }

    pub fn notifications_suppressed(&self) -> u64 {
        self.notifications_suppressed.load(Ordering::Relaxed)
    }

    pub fn avg_frame_latency_us(&self) -> u64 {
        let frames = self.frames_processed();
        if frames == 0 {
            return 0;
        }
        self.total_frame_latency_us.load(Ordering::Relaxed) / frames
    }
}
