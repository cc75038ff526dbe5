//! Yukon Detect Core Library
//!
//! Identifies the modules plugged into a Yukon board from the detection
//! pins each slot exposes before power-up.
//!
//! # Features
//!
//! - **Address Table**: the static 24-row mapping from pin states to module types
//! - **Classification**: pure lookup with confirmed, proposed and reserved identities
//! - **Detection**: sample averaging and thresholding through a board abstraction
//! - **Verification**: registered-versus-detected checks with per-slot allowances
//! - **Settings**: persistent thresholds and timing
//!
//! # Module Structure
//!
//! - `detect/` - Levels, address table, board trait, detector, snapshots
//! - `slots/` - Slot numbering, registration, verification
//!
//! # Example
//!
//! ```
//! use yk_core::{classify, AdcLevel, Bit, ModuleIdentity, ModuleKind};
//!
//! let result = classify(AdcLevel::High, Bit::High, Bit::High, Bit::High);
//! assert_eq!(result.identity, ModuleIdentity::Confirmed(ModuleKind::DualMotor));
//! ```

// Grouped modules
pub mod detect;
pub mod slots;

// Standalone modules
pub mod constants;
pub mod display;
pub mod error;
pub mod session;
pub mod settings;

// Re-export error types
pub use error::{Result, YukonError};

// Re-export classification and detection
pub use detect::{
    addresses_for, classify, classify_observation, classify_raw, load_snapshot, parse_snapshot, snapshot_to_json, AdcLevel, AdcThresholds, AddressEntry, Bit,
    BoardSnapshot, Classification, DetectionBoard, Detector, DetectorConfig, ModuleIdentity,
    ModuleKind, PinObservation, SlotDetection, SlotReading, SnapshotBoard, ADDRESS_TABLE,
};

// Re-export slot management
pub use slots::{
    slot_outcome, verify, SlotAssignments, SlotId, SlotOutcome, SlotSelection,
    VerificationPolicy, VerificationReport,
};

pub use session::ModuleSession;

// Re-export settings functions
pub use settings::{
    get_cached_settings, get_settings_path, load_settings,
    load_settings_from, save_settings, save_settings_to, update_setting, AppSettings,
    DetectionSettings, GeneralSettings, OutputSettings,
};

// Re-export display formatting functions
pub use display::{
    format_classification, format_detection, format_identity, format_observation,
    format_outcome, format_voltage, render_address_table,
};
