//! Captured board readings
//!
//! A snapshot records what each slot's detection pins read at one moment.
//! `SnapshotBoard` replays a snapshot through [`DetectionBoard`], so the
//! detector, verification and CLI can run without hardware attached.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{board, limits};
use crate::error::{Result, YukonError};
use crate::slots::SlotId;

use super::board::DetectionBoard;
use super::levels::Bit;

/// Raw detection readings of one slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotReading {
    pub adc1_voltage: f32,
    /// SLOW1, SLOW2, SLOW3 as 0 or 1
    pub slow: [u8; 3],
}

impl SlotReading {
    /// What a slot with nothing attached reads: ADC1 floating, slow pins pulled up
    pub fn empty() -> Self {
        Self {
            adc1_voltage: board::FLOATING_ADC1_VOLTAGE,
            slow: [1, 1, 1],
        }
    }

    pub fn slow_bits(&self) -> Result<[Bit; 3]> {
        Ok([
            Bit::parse_pin("slow1", self.slow[0])?,
            Bit::parse_pin("slow2", self.slow[1])?,
            Bit::parse_pin("slow3", self.slow[2])?,
        ])
    }
}

/// Detection readings for a whole board
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoardSnapshot {
    #[serde(default)]
    pub main_output_enabled: bool,
    #[serde(default)]
    pub output_voltage: f32,
    /// Keyed by slot number; missing slots read as empty
    #[serde(default)]
    pub slots: BTreeMap<u8, SlotReading>,
}

impl BoardSnapshot {
    pub fn with_slot(mut self, slot: u8, reading: SlotReading) -> Self {
        self.slots.insert(slot, reading);
        self
    }

    pub fn reading(&self, slot: SlotId) -> SlotReading {
        self.slots
            .get(&slot.get())
            .copied()
            .unwrap_or_else(SlotReading::empty)
    }

    /// Reject slot keys outside the board and pin values other than 0/1
    pub fn validate(&self) -> Result<()> {
        for (number, reading) in &self.slots {
            SlotId::new(*number)?;
            reading.slow_bits()?;
            if !reading.adc1_voltage.is_finite() {
                return Err(YukonError::invalid_input(
                    format!("slot {} adc1_voltage", number),
                    reading.adc1_voltage,
                    "a finite voltage",
                ));
            }
        }
        Ok(())
    }
}

/// Parse a snapshot from JSON text
pub fn parse_snapshot(json: &str) -> Result<BoardSnapshot> {
    let snapshot: BoardSnapshot = serde_json::from_str(json)?;
    snapshot.validate()?;
    Ok(snapshot)
}

/// Load a snapshot file, refusing anything larger than the size limit
pub fn load_snapshot(path: &Path) -> Result<BoardSnapshot> {
    let metadata = fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            YukonError::FileNotFound(path.to_path_buf())
        } else {
            YukonError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    if metadata.len() > limits::MAX_SNAPSHOT_SIZE {
        return Err(YukonError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: limits::MAX_SNAPSHOT_SIZE,
        });
    }

    let content = fs::read_to_string(path).map_err(|e| YukonError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!("Loaded snapshot from {:?} ({} bytes)", path, content.len());
    parse_snapshot(&content)
}

/// Serialize a snapshot to pretty JSON
pub fn snapshot_to_json(snapshot: &BoardSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Board that replays a snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotBoard {
    snapshot: BoardSnapshot,
}

impl SnapshotBoard {
    pub fn new(snapshot: BoardSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn set_main_output(&mut self, enabled: bool) {
        self.snapshot.main_output_enabled = enabled;
    }
}

impl DetectionBoard for SnapshotBoard {
    fn read_adc1_voltage(&mut self, slot: SlotId) -> Result<f32> {
        Ok(self.snapshot.reading(slot).adc1_voltage)
    }

    fn read_slow_pins(&mut self, slot: SlotId) -> Result<[Bit; 3]> {
        self.snapshot.reading(slot).slow_bits()
    }

    fn is_main_output_enabled(&self) -> bool {
        self.snapshot.main_output_enabled
    }

    fn read_output_voltage(&mut self) -> Result<f32> {
        Ok(self.snapshot.output_voltage)
    }
}
