use edgewatch::core::{BoundingBox, Detection, Frame, PixelFormat};
use edgewatch::hal::{AnnotationStore, DirectoryStore};
use std::fs;

#[test]
fn test_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested").join("detections");

    let store = DirectoryStore::new(target.clone()).unwrap();

    assert!(target.is_dir());
    assert_eq!(store.dir(), &target);
}

#[test]
fn test_persist_writes_image_and_annotations() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirectoryStore::new(dir.path().to_path_buf()).unwrap();

    let frame = Frame::new(1_500, 7, 4, 2).with_data(PixelFormat::Jpeg, vec![0xff, 0xd8, 0xff]);
    let detections = vec![
        Detection::new("person", 0.81).with_bbox(BoundingBox {
            x: 1.0,
            y: 0.0,
            width: 2.0,
            height: 2.0,
        }),
        Detection::new("dog", 0.2),
    ];

    let image_path = store.persist(&frame, 3, &detections).unwrap();

    let name = image_path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("detection_"));
    assert!(name.ends_with("_frame_3.jpg"));
    assert_eq!(fs::read(&image_path).unwrap(), vec![0xff, 0xd8, 0xff]);

    let sidecar = image_path.with_extension("json");
    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(sidecar).unwrap()).unwrap();
    assert_eq!(record["sequence_id"], 7);
    assert_eq!(record["frame_number"], 3);
    assert_eq!(record["detections"][0]["label"], "person");
    assert!(record["detections"][1].get("bbox").is_none());
}
