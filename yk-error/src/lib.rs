//! Unified error handling for Yukon module detection
//!
//! This crate provides a single error type used across all yukon-detect components.
//! It uses thiserror for ergonomic error definitions with proper Display and Error trait impls.

use std::io;
use std::path::PathBuf;

/// Result type alias using YukonError
pub type Result<T> = std::result::Result<T, YukonError>;

/// Unified error type for all detection operations
#[derive(thiserror::Error, Debug)]
pub enum YukonError {
    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: io::Error,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("File too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    // ============================================================================
    // Input Validation Errors
    // ============================================================================
    #[error("Invalid {field} value '{value}' (expected {expected})")]
    InvalidInput {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Invalid ADC thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Slot index {0} out of range (expected 1 to 6)")]
    SlotOutOfRange(u8),

    #[error("Slot {0} is already populated")]
    SlotOccupied(u8),

    #[error("Unknown module: {0}")]
    UnknownModule(String),

    // ============================================================================
    // Board Access Errors
    // ============================================================================
    #[error("Cannot {operation} whilst the main output is active")]
    MainOutputActive {
        operation: String,
    },

    #[error("Output voltage of {voltage:.2}V did not dissipate within {timeout_secs}s")]
    OutputNotDissipated {
        voltage: f32,
        timeout_secs: u64,
    },

    #[error("Board read failed: {0}")]
    Board(String),

    // ============================================================================
    // Module Verification Errors
    // ============================================================================
    #[error("No modules have been registered. At least one module needs to be registered to enable the output")]
    NoModulesRegistered,

    #[error("Detected a different combination of modules than what was registered (slots {slots:?})")]
    ModuleDiscrepancy {
        slots: Vec<u8>,
    },

    #[error("Some or all registered modules have not been detected (slots {slots:?})")]
    ModulesUndetected {
        slots: Vec<u8>,
    },

    #[error("Detected modules that have not been registered (slots {slots:?})")]
    ModulesUnregistered {
        slots: Vec<u8>,
    },

    // ============================================================================
    // Configuration and Settings Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },
}

impl YukonError {
    /// Create a generic error from a string
    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a board read error from a string
    pub fn board(msg: impl Into<String>) -> Self {
        Self::Board(msg.into())
    }

    /// Create an out-of-domain input error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            field: field.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a main-output guard error for the named operation
    pub fn main_output_active(operation: impl Into<String>) -> Self {
        Self::MainOutputActive {
            operation: operation.into(),
        }
    }

    /// True for errors raised by module verification
    pub fn is_verification(&self) -> bool {
        matches!(
            self,
            Self::NoModulesRegistered
                | Self::ModuleDiscrepancy { .. }
                | Self::ModulesUndetected { .. }
                | Self::ModulesUnregistered { .. }
        )
    }
}
