use crate::core::{Detection, Frame};
use crate::hal::AnnotationStore;
use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// A frame recorded by `MemoryAnnotationStore`
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAnnotation {
    pub frame_number: u32,
    pub sequence_id: u64,
    pub detections: Vec<Detection>,
}

/// Keeps persisted annotations in memory
#[derive(Clone, Default)]
pub struct MemoryAnnotationStore {
    records: Arc<Mutex<Vec<StoredAnnotation>>>,
    failing: bool,
}

impl MemoryAnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every persist call fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn stored(&self) -> Vec<StoredAnnotation> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl AnnotationStore for MemoryAnnotationStore {
    fn persist(
        &mut self,
        frame: &Frame,
        frame_number: u32,
        detections: &[Detection],
    ) -> Result<PathBuf> {
        if self.failing {
            bail!("Simulated storage failure");
        }

        let mut records = self
            .records
            .lock()
            .map_err(|_| anyhow!("Annotation store lock poisoned"))?;
        records.push(StoredAnnotation {
            frame_number,
            sequence_id: frame.sequence_id,
            detections: detections.to_vec(),
        });

        Ok(PathBuf::from(format!("memory://frame_{}", frame_number)))
    }
}
