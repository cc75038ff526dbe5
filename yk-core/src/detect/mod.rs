//! Module detection
//!
//! Turns the detection pins of a slot into a module identity.
//!
//! # Pipeline
//!
//! 1. **Sampling**: ADC1 is read repeatedly and averaged, the slow pins once.
//! 2. **Thresholding**: the averaged voltage becomes LOW, FLOAT or HIGH.
//! 3. **Classification**: the four signals index the static address table.

mod board;
mod capture;
mod detector;
mod levels;
mod module;
mod table;

pub use board::DetectionBoard;
pub use capture::{
    load_snapshot, parse_snapshot, snapshot_to_json, BoardSnapshot, SlotReading, SnapshotBoard,
};
pub use detector::{Detector, DetectorConfig, SlotDetection};
pub use levels::{AdcLevel, AdcThresholds, Bit};
pub use module::{Classification, ModuleIdentity, ModuleKind};
pub use table::{
    addresses_for, classify, classify_observation, classify_raw, AddressEntry, PinObservation,
    ADDRESS_TABLE,
};
