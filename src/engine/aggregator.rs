use serde::{Deserialize, Serialize};

/// Label reported when a burst observed no labels
pub const UNKNOWN_LABEL: &str = "unknown";

/// Burst-level result handed to the dispatcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstSummary {
    pub frames_with_detection: u32,

    /// Zero when no frame had a detection
    pub mean_confidence: f64,

    pub dominant_label: String,
}

impl BurstSummary {
    pub fn has_detections(&self) -> bool {
        self.frames_with_detection > 0
    }
}

/// Running aggregation of the top detection of each frame in one burst
#[derive(Debug, Default)]
pub struct Aggregator {
    frames_with_detection: u32,
    confidence_sum: f64,
    /// Observed labels with counts, in first-seen order
    label_counts: Vec<(String, u32)>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the top detection of a frame
    pub fn record_hit(&mut self, label: &str, confidence: f64) {
        self.frames_with_detection += 1;
        self.confidence_sum += confidence;

        match self.label_counts.iter_mut().find(|(seen, _)| seen == label) {
            Some((_, count)) => *count += 1,
            None => self.label_counts.push((label.to_string(), 1)),
        }
    }

    pub fn frames_with_detection(&self) -> u32 {
        self.frames_with_detection
    }

    /// Close the burst. Ties on label count go to the label seen first.
    pub fn finalize(self) -> BurstSummary {
        let mean_confidence = if self.frames_with_detection == 0 {
            0.0
        } else {
            self.confidence_sum / f64::from(self.frames_with_detection)
        };

        let mut dominant: Option<&(String, u32)> = None;
        for entry in &self.label_counts {
            match dominant {
                Some((_, best)) if entry.1 <= *best => {}
                _ => dominant = Some(entry),
            }
        }

        BurstSummary {
            frames_with_detection: self.frames_with_detection,
            mean_confidence,
            dominant_label: dominant
                .map(|(label, _)| label.clone())
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
        }
    }
}
