// Tests for the job registry surface of HashEngine
// Handle validity, count accounting, and structural operations

use hashmill::{EngineError, HashEngine, JobHandle, JobStatus};
use std::path::PathBuf;

#[test]
fn test_add_then_get_returns_same_path() {
    let engine = HashEngine::new();
    let handle = engine.add_file("some/dir/file.bin").unwrap();
    assert_eq!(engine.file_path(handle).unwrap(), PathBuf::from("some/dir/file.bin"));
}

#[test]
fn test_add_empty_path_rejected() {
    let engine = HashEngine::new();
    let result = engine.add_file("");
    assert!(matches!(result, Err(EngineError::InvalidPath { .. })));
    assert_eq!(engine.file_count(), 0);
}

#[test]
fn test_count_tracks_add_remove_clear() {
    let engine = HashEngine::new();
    assert_eq!(engine.file_count(), 0);

    let a = engine.add_file("a.txt").unwrap();
    let _b = engine.add_file("b.txt").unwrap();
    let _c = engine.add_file("c.txt").unwrap();
    assert_eq!(engine.file_count(), 3);

    engine.remove_file(a).unwrap();
    assert_eq!(engine.file_count(), 2);

    engine.clear_files().unwrap();
    assert_eq!(engine.file_count(), 0);
}

#[test]
fn test_removed_handle_is_stale() {
    let engine = HashEngine::new();
    let handle = engine.add_file("a.txt").unwrap();
    engine.remove_file(handle).unwrap();

    assert!(matches!(
        engine.file_path(handle),
        Err(EngineError::IndexOutOfRange { .. })
    ));
    assert!(matches!(
        engine.progress(handle),
        Err(EngineError::IndexOutOfRange { .. })
    ));
    assert!(matches!(
        engine.remove_file(handle),
        Err(EngineError::IndexOutOfRange { .. })
    ));
}

#[test]
fn test_slot_reuse_does_not_alias_old_handle() {
    let engine = HashEngine::new();
    let a = engine.add_file("a.txt").unwrap();
    engine.remove_file(a).unwrap();

    // The freed slot is reused, but under a fresh generation
    let c = engine.add_file("c.txt").unwrap();
    assert_eq!(c.index(), a.index());
    assert_ne!(c, a);

    assert!(engine.file_path(a).is_err());
    assert_eq!(engine.file_path(c).unwrap(), PathBuf::from("c.txt"));
}

#[test]
fn test_clear_invalidates_every_handle() {
    let engine = HashEngine::new();
    let a = engine.add_file("a.txt").unwrap();
    let b = engine.add_file("b.txt").unwrap();
    engine.clear_files().unwrap();

    assert!(engine.file_path(a).is_err());
    assert!(engine.file_path(b).is_err());
}

#[test]
fn test_new_job_starts_pending_with_zero_progress() {
    let engine = HashEngine::new();
    let handle = engine.add_file("never/hashed.bin").unwrap();

    let snap = engine.progress(handle).unwrap();
    assert_eq!(snap.status, JobStatus::Pending);
    assert_eq!(snap.status.status_code(), 0);
    assert_eq!(snap.bytes_processed, 0);
    assert_eq!(snap.bytes_total, 0);
    assert!(snap.digest.is_none());
    assert!(snap.failure_reason.is_none());
}

#[test]
fn test_handle_raw_round_trip_through_engine() {
    let engine = HashEngine::new();
    let handle = engine.add_file("a.txt").unwrap();

    let raw = handle.to_raw();
    let restored = JobHandle::from_raw(raw);
    assert_eq!(restored, handle);
    assert_eq!(engine.file_path(restored).unwrap(), PathBuf::from("a.txt"));
}

#[test]
fn test_unknown_raw_handle_rejected() {
    let engine = HashEngine::new();
    engine.add_file("a.txt").unwrap();

    let forged = JobHandle::from_raw(0xdead_beef_0000_0007);
    assert!(matches!(
        engine.file_path(forged),
        Err(EngineError::IndexOutOfRange { .. })
    ));
}

#[test]
fn test_with_algorithm_validates_name() {
    assert!(HashEngine::with_algorithm("sha3-256").is_ok());
    assert!(matches!(
        HashEngine::with_algorithm("rot13"),
        Err(EngineError::UnsupportedAlgorithm { .. })
    ));
}
