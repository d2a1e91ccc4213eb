use std::sync::Arc;

use super::PipelineMetrics;

pub struct PipelineMonitor {
    metrics: Arc<PipelineMetrics>,
}

impl PipelineMonitor {
    pub fn new(metrics: Arc<PipelineMetrics>) -> Self {
        Self { metrics }
    }

    pub fn generate_report(&self) -> String {
        let m = &self.metrics;
        let errors = m.capture_errors() + m.inference_errors();

        let mut report = String::from("=== Pipeline Metrics ===\n");
        report.push_str(&format!(
            "\n[trigger]\n  Edges: {} seen, {} coalesced\n",
            m.edges_seen(),
            m.edges_coalesced()
        ));
        report.push_str(&format!(
            "\n[bursts]\n  Bursts: {} completed, {} cancelled\n  Frames: {} processed, {} with detection\n  Errors: {}\n  Avg Frame Latency: {}μs\n",
            m.bursts_completed(),
            m.bursts_cancelled(),
            m.frames_processed(),
            m.frames_with_detection(),
            if errors > 0 {
                format!(
                    "{} error{} ({} capture, {} inference)",
                    errors,
                    if errors == 1 { "" } else { "s" },
                    m.capture_errors(),
                    m.inference_errors()
                )
            } else {
                "0 errors".to_string()
            },
            m.avg_frame_latency_us()
        ));
        report.push_str(&format!(
            "\n[notifications]\n  Sent: {} of {} queued\n  Failed: {}\n  Dropped: {}\n  Suppressed: {}\n",
            m.notifications_sent(),
            m.notifications_queued(),
            m.notifications_failed(),
            m.notifications_dropped(),
            m.notifications_suppressed()
        ));
        if m.persist_errors() > 0 {
            report.push_str(&format!("\n[storage]\n  Persist failures: {}\n", m.persist_errors()));
        }

        report
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }
}
