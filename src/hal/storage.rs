use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use super::AnnotationStore;
use crate::core::{Detection, Frame};

/// Sidecar written next to each saved frame
#[derive(Debug, Serialize)]
struct AnnotationRecord<'a> {
    sequence_id: u64,
    timestamp: u64,
    frame_number: u32,
    width: u32,
    height: u32,
    detections: &'a [Detection],
}

/// File name (without extension) for a saved detection frame
pub fn annotation_file_stem(at: &DateTime<Local>, frame_number: u32) -> String {
    format!(
        "detection_{}_frame_{}",
        at.format("%Y-%m-%d_%H-%M-%S"),
        frame_number
    )
}

/// Appends detection frames to a directory on disk
pub struct DirectoryStore {
    dir: PathBuf,
}

impl DirectoryStore {
    /// Creates the directory if it doesn't exist
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create detections directory {:?}", dir))?;

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

impl AnnotationStore for DirectoryStore {
    fn persist(
        &mut self,
        frame: &Frame,
        frame_number: u32,
        detections: &[Detection],
    ) -> Result<PathBuf> {
        let stem = annotation_file_stem(&Local::now(), frame_number);

        let image_path = self
            .dir
            .join(format!("{}.{}", stem, frame.format.extension()));
        fs::write(&image_path, &frame.data)
            .with_context(|| format!("Failed to write frame to {:?}", image_path))?;

        let record = AnnotationRecord {
            sequence_id: frame.sequence_id,
            timestamp: frame.timestamp,
            frame_number,
            width: frame.width,
            height: frame.height,
            detections,
        };
        let json = serde_json::to_string_pretty(&record)
            .context("Failed to serialize detection annotations")?;
        let sidecar_path = self.dir.join(format!("{}.json", stem));
        fs::write(&sidecar_path, json)
            .with_context(|| format!("Failed to write annotations to {:?}", sidecar_path))?;

        Ok(image_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_stem_encodes_time_and_frame() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            annotation_file_stem(&at, 3),
            "detection_2024-03-09_07-05-01_frame_3"
        );
    }
}
