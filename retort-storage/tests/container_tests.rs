//! # Container Format Tests
//!
//! Verifies:
//! - Tree round trips through the binary file format
//! - Tolerant open of missing files
//! - Rejection of corrupted, truncated, and mismatched files

use std::fs;

use tempfile::TempDir;

use retort_core::path::TreePath;
use retort_storage::container::{Container, Payload, CONTAINER_VERSION, HEADER_SIZE};

fn p(s: &str) -> TreePath {
    TreePath::new(s)
}

fn sample_container() -> Container {
    let mut c = Container::new();
    c.put(&p("Exp/Name"), Payload::Str("Automatic MOF exploration".into()))
        .unwrap();
    c.put(&p("Exp/RunCount"), Payload::Int(42)).unwrap();
    c.put(&p("Exp/Converged"), Payload::Bool(true)).unwrap();
    c.put(
        &p("Exp/mixtures/Solution0/ComponentMasses"),
        Payload::FloatArray {
            shape: vec![2],
            data: vec![12.5, 7.3],
        },
    )
    .unwrap();
    c.put(
        &p("Exp/mixtures/Solution0/ComponentNames"),
        Payload::StrArray {
            shape: vec![2],
            data: vec!["Zn(NO₃)₂·6H₂O".into(), "2-methylimidazole".into()],
        },
    )
    .unwrap();
    c.put(
        &p("Exp/log/data"),
        Payload::FloatArray {
            shape: vec![2, 3],
            data: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        },
    )
    .unwrap();
    c.put(
        &p("Exp/log/indices"),
        Payload::IntArray {
            shape: vec![3],
            data: vec![0, 1, 2],
        },
    )
    .unwrap();
    c
}

#[test]
fn test_container_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("experiment.rta");

    let original = sample_container();
    original.save(&file, false).unwrap();

    let reloaded = Container::open(&file).unwrap();
    assert_eq!(reloaded, original);
    assert_eq!(reloaded.dataset_count(), 7);

    // Non-ASCII, variable-width strings survive intact.
    assert_eq!(
        reloaded.dataset(&p("Exp/mixtures/Solution0/ComponentNames")),
        Some(&Payload::StrArray {
            shape: vec![2],
            data: vec!["Zn(NO₃)₂·6H₂O".into(), "2-methylimidazole".into()],
        })
    );
}

#[test]
fn test_open_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let c = Container::open(dir.path().join("never_written.rta")).unwrap();
    assert!(c.is_empty());
}

#[test]
fn test_save_overwrites_previous_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("experiment.rta");

    sample_container().save(&file, false).unwrap();

    let mut small = Container::new();
    small.put(&p("Exp/Name"), Payload::Str("second run".into())).unwrap();
    small.save(&file, false).unwrap();

    let reloaded = Container::open(&file).unwrap();
    assert_eq!(reloaded.dataset_count(), 1);
    assert_eq!(
        reloaded.dataset(&p("Exp/Name")),
        Some(&Payload::Str("second run".into()))
    );
}

#[test]
fn test_invalid_magic_rejected() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("bogus.rta");
    fs::write(&file, b"NOTRETORTxxxxxxxxxxxxxxx").unwrap();

    let err = Container::open(&file).unwrap_err();
    assert_eq!(err.error_code(), "CONTAINER_ERROR");
    assert!(err.to_string().contains("magic"));
}

#[test]
fn test_unsupported_version_rejected() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("experiment.rta");
    sample_container().save(&file, false).unwrap();

    // The version field sits after the magic and is not checksummed.
    let mut bytes = fs::read(&file).unwrap();
    bytes[8] = (CONTAINER_VERSION + 1) as u8;
    fs::write(&file, &bytes).unwrap();

    let err = Container::open(&file).unwrap_err();
    assert!(err.to_string().contains("version"));
}

#[test]
fn test_corrupted_body_rejected() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("experiment.rta");
    sample_container().save(&file, false).unwrap();

    let mut bytes = fs::read(&file).unwrap();
    let mid = HEADER_SIZE + (bytes.len() - HEADER_SIZE) / 2;
    bytes[mid] ^= 0xFF;
    fs::write(&file, &bytes).unwrap();

    let err = Container::open(&file).unwrap_err();
    assert!(err.to_string().contains("checksum"));
}

#[test]
fn test_truncated_file_rejected() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("experiment.rta");
    sample_container().save(&file, false).unwrap();

    let bytes = fs::read(&file).unwrap();
    fs::write(&file, &bytes[..HEADER_SIZE + 2]).unwrap();

    assert!(Container::open(&file).is_err());
}

#[test]
fn test_empty_container_roundtrip() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("empty.rta");
    Container::new().save(&file, false).unwrap();
    let reloaded = Container::open(&file).unwrap();
    assert!(reloaded.is_empty());
}
