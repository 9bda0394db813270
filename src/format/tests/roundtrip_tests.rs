//! Save-then-load round trips through the file system.

use crate::calibration::CalibrationTransform;
use crate::format::{load_annotations, load_click_data, save_annotations};
use crate::model::{AnnotationStore, PixelPoint, RealPoint};

fn sample_store() -> AnnotationStore {
    let transform = CalibrationTransform {
        origin_pixel: PixelPoint::new(10.0, 10.0),
        origin_real: RealPoint::new(0.0, 0.0),
        scale_x: 0.25,
        scale_y: -0.5,
    };

    let mut store = AnnotationStore::with_frames(4);
    store.append(0, PixelPoint::new(12.0, 14.0), Some(&transform)).unwrap();
    store.append(0, PixelPoint::new(30.5, 7.25), Some(&transform)).unwrap();
    store.append(2, PixelPoint::new(1.0, 1.0), None).unwrap();
    store.append(3, PixelPoint::new(99.0, 0.0), Some(&transform)).unwrap();
    store
}

#[test]
fn test_save_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clicks.json");
    let store = sample_store();

    save_annotations(&path, &store).unwrap();
    let loaded = load_annotations(&path).unwrap();

    assert_eq!(loaded.frame_count(), 4);
    assert_eq!(loaded.all_pixel_points(), store.all_pixel_points());
    assert_eq!(loaded.all_real_points(), store.all_real_points());
    assert!(loaded.is_consistent());
    assert!(!loaded.is_dirty());
}

#[test]
fn test_roundtrip_preserves_order_and_empty_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clicks.json");
    save_annotations(&path, &sample_store()).unwrap();

    let data = load_click_data(&path).unwrap();
    assert_eq!(data.coords_raw.len(), 4);
    assert_eq!(data.coords_real.len(), 4);
    assert_eq!(data.coords_raw[0], vec![[12.0, 14.0], [30.5, 7.25]]);
    assert!(data.coords_raw[1].is_empty());
    assert_eq!(data.coords_real[2], vec![[None, None]]);
    assert_eq!(data.coords_real[0][0], [Some(0.5), Some(-2.0)]);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_annotations(&dir.path().join("absent.json"));
    assert!(matches!(result, Err(crate::format::FormatError::Io(_))));
}
