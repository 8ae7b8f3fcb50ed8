//! Estimation against real NIfTI headers on disk.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use cortex_estimate::{EstimatorPolicy, InputValue, Inputs, ResourceEstimator, DEFAULT_MIN_GB};

fn write_nifti1(path: &Path, dims: &[i16]) {
    let mut header = vec![0u8; 352];
    header[..4].copy_from_slice(&348i32.to_le_bytes());
    header[40..42].copy_from_slice(&(dims.len() as i16).to_le_bytes());
    for (i, d) in dims.iter().enumerate() {
        header[42 + 2 * i..44 + 2 * i].copy_from_slice(&d.to_le_bytes());
    }
    header[344..348].copy_from_slice(b"n+1\0");
    std::fs::write(path, header).unwrap();
}

fn single(name: &str, value: InputValue) -> Inputs {
    Inputs::from([(name.to_string(), value)])
}

#[test]
fn small_volume_is_raised_to_minimum() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("T1.nii");
    write_nifti1(&path, &[100, 100, 100]);

    let estimator = EstimatorPolicy::default()
        .weight("in_file", 4.0)
        .build()
        .unwrap();
    let estimate = estimator.estimate(&single(
        "in_file",
        InputValue::Text(path.to_string_lossy().into_owned()),
    ));

    assert_eq!(estimate.memory_gb, DEFAULT_MIN_GB);
    assert!(estimate.trail[0].starts_with("in_file: 1000000 voxels in 1 file(s)"));
    assert_eq!(estimate.trail.len(), 3);
}

#[test]
fn voxels_sum_across_list() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.nii");
    let b = dir.path().join("b.nii");
    write_nifti1(&a, &[1024, 1024, 256]);
    write_nifti1(&b, &[1024, 1024, 256, 10]);

    let estimator = EstimatorPolicy::default()
        .weight("in_files", 4.0)
        .overhead_gb(0.0)
        .bounds(None, None)
        .build()
        .unwrap();
    let estimate = estimator.estimate(&single("in_files", InputValue::paths([&a, &b])));

    // 2 * 2^28 voxels at 4 bytes each.
    assert!((estimate.memory_gb - 2.0).abs() < 1e-9);
}

#[test]
fn non_image_file_is_excluded() {
    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, b"hello").unwrap();

    let estimator = EstimatorPolicy::default()
        .weight("in_file", 4.0)
        .build()
        .unwrap();
    let estimate = estimator.estimate(&single("in_file", InputValue::paths([&notes])));
    assert_eq!(estimate.trail[0], "in_file: no readable image files");
    assert_eq!(estimate.memory_gb, DEFAULT_MIN_GB);
}

#[test]
fn estimator_is_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceEstimator>();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("T1.nii");
    write_nifti1(&path, &[512, 512, 512]);
    let path = path.to_string_lossy().into_owned();

    let estimator = Arc::new(
        EstimatorPolicy::default()
            .weight("in_file", 8.0)
            .bounds(None, None)
            .build()
            .unwrap(),
    );
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let estimator = Arc::clone(&estimator);
            let path = path.clone();
            thread::spawn(move || estimator.estimate(&single("in_file", path.into())).memory_gb)
        })
        .collect();

    for handle in handles {
        let memory = handle.join().unwrap();
        assert!((memory - 1.3).abs() < 1e-9);
    }
}

#[test]
fn inputs_from_json() {
    let estimator = EstimatorPolicy::default()
        .weight("iterations", 0.25)
        .weight("in_file", 4.0)
        .build()
        .unwrap();
    let inputs: Inputs = serde_json::from_str(r#"{"iterations": 10, "in_file": null}"#).unwrap();
    let estimate = estimator.estimate(&inputs);
    assert!((estimate.memory_gb - 2.8).abs() < 1e-9);
    assert_eq!(estimate.trail[1], "in_file: undefined");
}

#[test]
fn registration_volume_with_undefined_reference() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("T1.nii");
    write_nifti1(&path, &[100, 100, 100]);

    let estimator = EstimatorPolicy::default()
        .weight("in_file", 32.0)
        .weight("reference", 4.0)
        .build()
        .unwrap();
    let inputs = Inputs::from([
        (
            "in_file".to_string(),
            InputValue::Text(path.to_string_lossy().into_owned()),
        ),
        ("reference".to_string(), InputValue::Undefined),
    ]);
    let estimate = estimator.estimate(&inputs);

    assert_eq!(estimate.memory_gb, DEFAULT_MIN_GB);
    assert!(estimate.trail[0].ends_with("= 0.030 GB"));
    assert_eq!(estimate.trail[1], "reference: undefined");
    assert!(estimate.trail[2].contains("total estimated: 0.330 GB"));
    assert!(estimate.trail[3].starts_with("clamped to [0.5, 8]"));
}
