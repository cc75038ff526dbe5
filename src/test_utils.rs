/*
 * Test utilities for Yukon Detect
 *
 * Snapshot and profile builders shared by the unit tests.
 */

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use yk_core::{BoardSnapshot, SlotReading};

/// Big Motor in slot 2, Proto Potentiometer (pot middle) in slot 5, rest empty
pub fn create_test_snapshot() -> BoardSnapshot {
    BoardSnapshot::default()
        .with_slot(2, SlotReading { adc1_voltage: 0.05, slow: [0, 0, 1] })
        .with_slot(5, SlotReading { adc1_voltage: 1.2, slow: [1, 1, 0] })
}

/// Write a snapshot into a fresh temp dir; keep the dir alive while the file is used
pub fn write_snapshot_file(snapshot: &BoardSnapshot) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("board.json");
    fs::write(&path, yk_core::snapshot_to_json(snapshot).unwrap()).unwrap();
    (dir, path)
}

pub fn write_profile_file(json: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("profile.json");
    fs::write(&path, json).unwrap();
    (dir, path)
}
