//! End-to-end ingestion scenarios over real region files

use maira_telemetry::{
    DecodeError, OverlaySettings, PropertyBag, SnapshotLayout, TelemetryError, TelemetrySession,
    TelemetryValue,
};
use std::os::unix::fs::FileExt;
use std::path::Path;
use std::time::{Duration, Instant};

fn blank_region(layout: &SnapshotLayout) -> Vec<u8> {
    let mut bytes = vec![0u8; layout.region_len()];
    bytes[0..4].copy_from_slice(&layout.version().to_le_bytes());
    bytes
}

fn put_i32(bytes: &mut [u8], offset: usize, value: i32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn v5_slot_offset(layout: &SnapshotLayout, slot: usize, name: &str) -> usize {
    layout.slot_base(slot).unwrap() + layout.record().offset_of(name).unwrap()
}

/// Patch bytes in place without truncating, so an existing mapping in the
/// session under test stays valid.
fn patch_region(path: &Path, offset: usize, bytes: &[u8]) {
    let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
    file.write_at(bytes, offset as u64).unwrap();
}

fn v5_session(path: &Path) -> TelemetrySession {
    TelemetrySession::new(
        SnapshotLayout::version_5(),
        path,
        OverlaySettings::default(),
    )
}

#[test]
fn scenario_missing_region_retries_with_backoff() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("region");
    let mut session = v5_session(&path);
    let t0 = Instant::now();

    // First poll: producer not running, benign, nothing latched
    session.poll(t0).unwrap();
    assert!(!session.is_attached());
    assert!(!session.is_faulted());
    assert!(!session.is_connected());

    // Producer comes up, but the next poll is still inside the backoff
    // window, so no new attach attempt happens
    let layout = SnapshotLayout::version_5();
    std::fs::write(&path, blank_region(&layout)).unwrap();
    session.poll(t0 + Duration::from_millis(4999)).unwrap();
    assert!(!session.is_attached());

    // Past the 5000 ms deadline the attach goes through
    session.poll(t0 + Duration::from_millis(5000)).unwrap();
    assert!(session.is_attached());
    assert!(!session.is_faulted());
}

#[test]
fn scenario_unopenable_region_latches_fault() {
    // The region path names a directory: the attach fails for a reason
    // other than "not found", which is fatal for the session
    let dir = tempfile::tempdir().unwrap();
    let mut session = v5_session(dir.path());
    let t0 = Instant::now();

    let err = session.poll(t0).unwrap_err();
    assert!(matches!(err, TelemetryError::Attach { .. }));
    assert!(session.is_faulted());
    assert!(!session.is_connected());

    // Terminal: later polls are no-ops and never retry the attach
    session.poll(t0 + Duration::from_secs(10)).unwrap();
    assert!(session.is_faulted());
    assert!(!session.is_attached());
}

#[test]
fn scenario_selected_slot_is_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("region");
    let layout = SnapshotLayout::version_5();

    let mut bytes = blank_region(&layout);
    put_i32(&mut bytes, 4, 1);
    put_i32(&mut bytes, v5_slot_offset(&layout, 0, "tickCount"), 7);
    put_i32(&mut bytes, v5_slot_offset(&layout, 1, "tickCount"), 42);
    put_i32(&mut bytes, v5_slot_offset(&layout, 2, "tickCount"), 9);
    std::fs::write(&path, &bytes).unwrap();

    let mut session = v5_session(&path);
    session.poll(Instant::now()).unwrap();

    assert_eq!(session.snapshot().tick_count(), 42);
    assert!(!session.is_faulted());
    assert_eq!(session.version_diagnostic(), "5,5");
}

#[test]
fn scenario_version_mismatch_latches_fault() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("region");
    let layout = SnapshotLayout::version_5();

    let mut bytes = blank_region(&layout);
    put_i32(&mut bytes, 0, 3);
    std::fs::write(&path, &bytes).unwrap();

    let mut session = v5_session(&path);
    let t0 = Instant::now();
    let err = session.poll(t0).unwrap_err();
    assert!(matches!(
        err,
        TelemetryError::Decode(DecodeError::VersionMismatch {
            expected: 5,
            found: 3,
        })
    ));
    assert!(session.is_faulted());
    assert_eq!(session.version_diagnostic(), "5,3");

    // Faulted is terminal: later polls are no-ops even after the
    // producer starts publishing the right version
    patch_region(&path, 0, &5i32.to_le_bytes());
    session.poll(t0 + Duration::from_secs(10)).unwrap();
    assert!(session.is_faulted());
    assert_eq!(session.version_diagnostic(), "5,3");
}

#[test]
fn scenario_trailing_layout_decodes_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("region");
    let layout = SnapshotLayout::version_3();

    let mut bytes = blank_region(&layout);
    let record_base = 4;
    put_i32(
        &mut bytes,
        record_base + layout.record().offset_of("tickCount").unwrap(),
        1,
    );
    // nameLength = 6, then 6 bytes of UTF-16LE "abc"; the calibration
    // file name declares length 0 and consumes no trailing bytes
    let name_utf16: Vec<u8> = "abc".encode_utf16().flat_map(u16::to_le_bytes).collect();
    assert_eq!(name_utf16.len(), 6);
    put_i32(
        &mut bytes,
        record_base
            + layout
                .record()
                .offset_of("racingWheelAlgorithmName")
                .unwrap(),
        6,
    );
    let trailing = record_base + layout.record().len();
    bytes[trailing..trailing + 6].copy_from_slice(&name_utf16);
    std::fs::write(&path, &bytes).unwrap();

    let mut session = TelemetrySession::new(layout, &path, OverlaySettings::default());
    session.poll(Instant::now()).unwrap();

    assert_eq!(
        session.snapshot().get("racingWheelAlgorithmName"),
        Some(&TelemetryValue::Text("abc".to_string()))
    );
    assert_eq!(
        session.snapshot().get("steeringEffectsCalibrationFileName"),
        Some(&TelemetryValue::Text(String::new()))
    );
}

#[test]
fn scenario_liveness_follows_tick_counter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("region");
    let layout = SnapshotLayout::version_5();

    let mut bytes = blank_region(&layout);
    let tick_offset = v5_slot_offset(&layout, 0, "tickCount");
    put_i32(&mut bytes, tick_offset, 1);
    std::fs::write(&path, &bytes).unwrap();

    let mut session = v5_session(&path);
    let t0 = Instant::now();
    session.poll(t0).unwrap();
    assert!(session.is_connected());

    // Producer keeps ticking: stays connected
    patch_region(&path, tick_offset, &2i32.to_le_bytes());
    session.poll(t0 + Duration::from_secs(1)).unwrap();
    assert!(session.is_connected());

    // Producer stalls: two checks a second apart see the same tick
    session.poll(t0 + Duration::from_secs(2)).unwrap();
    assert!(!session.is_connected());
    assert!(!session.is_faulted());
}

#[test]
fn published_values_freeze_after_fault() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("region");
    let layout = SnapshotLayout::version_5();

    let mut bytes = blank_region(&layout);
    put_i32(&mut bytes, v5_slot_offset(&layout, 0, "tickCount"), 42);
    std::fs::write(&path, &bytes).unwrap();

    let mut session = v5_session(&path);
    let t0 = Instant::now();
    session.poll(t0).unwrap();
    assert_eq!(session.snapshot().tick_count(), 42);

    // Producer restarts with an incompatible version
    patch_region(&path, 0, &7i32.to_le_bytes());
    assert!(session.poll(t0 + Duration::from_secs(1)).is_err());
    assert!(session.is_faulted());

    let mut bag = PropertyBag::new();
    session.publish(&mut bag);
    assert_eq!(bag.get("faulted"), Some(&TelemetryValue::Bool(true)));
    // Last good snapshot stays visible
    assert_eq!(bag.get("tickCount"), Some(&TelemetryValue::I32(42)));
    assert_eq!(bag.get("version"), Some(&TelemetryValue::Text("5,7".into())));
}

#[test]
fn publish_surfaces_overlay_preferences() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("region");
    let settings = OverlaySettings {
        show_in_test_drive: false,
        ..OverlaySettings::default()
    };
    let session = TelemetrySession::new(SnapshotLayout::version_5(), &path, settings);

    let mut bag = PropertyBag::new();
    session.publish(&mut bag);
    assert_eq!(
        bag.get("overlaysShowInTestDrive"),
        Some(&TelemetryValue::Bool(false))
    );
    assert_eq!(
        bag.get("overlaysShowInPractice"),
        Some(&TelemetryValue::Bool(true))
    );
}
