//! Module address table and classifier
//!
//! Each slot exposes four detection signals before power-up: the ADC1
//! level and three slow I/O pins. Together they form an address that
//! maps to a module type.
//!
//! | ADC1  | SLOW1 | SLOW2 | SLOW3 | Module               | Condition          |
//! |-------|-------|-------|-------|----------------------|--------------------|
//! | LOW   | 0     | 0     | 0     | Quad Servo Direct    | A1 near 0V         |
//! | FLOAT | 0     | 0     | 0     | Quad Servo Direct    | A1 between 0-3.3V  |
//! | HIGH  | 0     | 0     | 0     | Quad Servo Direct    | A1 near 3.3V       |
//! | LOW   | 0     | 0     | 1     | Big Motor            | Not in fault       |
//! | FLOAT | 0     | 0     | 1     |                      |                    |
//! | HIGH  | 0     | 0     | 1     |                      |                    |
//! | LOW   | 0     | 1     | 0     |                      |                    |
//! | FLOAT | 0     | 1     | 0     | Quad Servo Regulated |                    |
//! | HIGH  | 0     | 1     | 0     |                      |                    |
//! | LOW   | 0     | 1     | 1     | Big Motor            | In fault           |
//! | FLOAT | 0     | 1     | 1     | [Proposed] Audio Amp |                    |
//! | HIGH  | 0     | 1     | 1     |                      |                    |
//! | LOW   | 1     | 0     | 0     | Bench Power          |                    |
//! | FLOAT | 1     | 0     | 0     | Bench Power          | V+ discharging     |
//! | HIGH  | 1     | 0     | 0     |                      |                    |
//! | LOW   | 1     | 0     | 1     |                      |                    |
//! | FLOAT | 1     | 0     | 1     | Dual Switched Output |                    |
//! | HIGH  | 1     | 0     | 1     |                      |                    |
//! | LOW   | 1     | 1     | 0     | Proto Potentiometer  | Pot low            |
//! | FLOAT | 1     | 1     | 0     | Proto Potentiometer  | Pot middle         |
//! | HIGH  | 1     | 1     | 0     | Proto Potentiometer  | Pot high           |
//! | LOW   | 1     | 1     | 1     | LED Strip            |                    |
//! | FLOAT | 1     | 1     | 1     | [Reserved] Empty     |                    |
//! | HIGH  | 1     | 1     | 1     | Dual Motor           |                    |
//!
//! Addresses are only meaningful before a module is powered and
//! initialised. Classification cannot check that; [`crate::Detector`] does.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::levels::{AdcLevel, Bit};
use super::module::{Classification, ModuleIdentity, ModuleKind};
use crate::constants::detection::ADDRESS_COUNT;
use crate::error::Result;

/// The four detection signals of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinObservation {
    pub adc1: AdcLevel,
    pub slow1: Bit,
    pub slow2: Bit,
    pub slow3: Bit,
}

impl PinObservation {
    pub const fn new(adc1: AdcLevel, slow1: Bit, slow2: Bit, slow3: Bit) -> Self {
        Self { adc1, slow1, slow2, slow3 }
    }

    /// Build an observation from untyped text, e.g. `("FLOAT", "1", "1", "0")`
    pub fn parse(adc1: &str, slow1: &str, slow2: &str, slow3: &str) -> Result<Self> {
        Ok(Self {
            adc1: adc1.parse()?,
            slow1: Bit::parse_pin_str("slow1", slow1)?,
            slow2: Bit::parse_pin_str("slow2", slow2)?,
            slow3: Bit::parse_pin_str("slow3", slow3)?,
        })
    }

    /// Build an observation from raw firmware codes
    ///
    /// `adc1` uses 0 = LOW, 1 = HIGH, 2 = FLOAT; slow pins are 0 or 1.
    pub fn from_raw(adc1: u8, slow1: u8, slow2: u8, slow3: u8) -> Result<Self> {
        Ok(Self {
            adc1: AdcLevel::try_from(adc1)?,
            slow1: Bit::parse_pin("slow1", slow1)?,
            slow2: Bit::parse_pin("slow2", slow2)?,
            slow3: Bit::parse_pin("slow3", slow3)?,
        })
    }

    /// Row of this observation in [`ADDRESS_TABLE`]
    pub fn address_index(&self) -> usize {
        let slow = (self.slow1.as_u8() << 2) | (self.slow2.as_u8() << 1) | self.slow3.as_u8();
        slow as usize * AdcLevel::ALL.len() + self.adc1.table_order()
    }

    pub fn slow_pins(&self) -> [Bit; 3] {
        [self.slow1, self.slow2, self.slow3]
    }
}

impl fmt::Display for PinObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.adc1, self.slow1, self.slow2, self.slow3)
    }
}

/// One row of the address table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddressEntry {
    pub observation: PinObservation,
    pub identity: ModuleIdentity,
    pub condition: Option<&'static str>,
}

impl AddressEntry {
    pub fn classification(&self) -> Classification {
        Classification {
            identity: self.identity,
            condition: self.condition,
        }
    }
}

use AdcLevel::{Float, High, Low};
use Bit::{High as H, Low as L};
use ModuleIdentity::{Confirmed, Empty, Proposed, Unspecified};

const fn row(
    adc1: AdcLevel,
    slow1: Bit,
    slow2: Bit,
    slow3: Bit,
    identity: ModuleIdentity,
    condition: Option<&'static str>,
) -> AddressEntry {
    AddressEntry {
        observation: PinObservation::new(adc1, slow1, slow2, slow3),
        identity,
        condition,
    }
}

/// Every detection address, indexed by [`PinObservation::address_index`]
pub static ADDRESS_TABLE: [AddressEntry; ADDRESS_COUNT] = [
    row(Low, L, L, L, Confirmed(ModuleKind::QuadServoDirect), Some("A1 near 0V")),
    row(Float, L, L, L, Confirmed(ModuleKind::QuadServoDirect), Some("A1 between 0-3.3V")),
    row(High, L, L, L, Confirmed(ModuleKind::QuadServoDirect), Some("A1 near 3.3V")),
    row(Low, L, L, H, Confirmed(ModuleKind::BigMotor), Some("Not in fault")),
    row(Float, L, L, H, Unspecified, None),
    row(High, L, L, H, Unspecified, None),
    row(Low, L, H, L, Unspecified, None),
    row(Float, L, H, L, Confirmed(ModuleKind::QuadServoRegulated), None),
    row(High, L, H, L, Unspecified, None),
    row(Low, L, H, H, Confirmed(ModuleKind::BigMotor), Some("In fault")),
    row(Float, L, H, H, Proposed(ModuleKind::AudioAmp), None),
    row(High, L, H, H, Unspecified, None),
    row(Low, H, L, L, Confirmed(ModuleKind::BenchPower), None),
    row(Float, H, L, L, Confirmed(ModuleKind::BenchPower), Some("V+ discharging")),
    row(High, H, L, L, Unspecified, None),
    row(Low, H, L, H, Unspecified, None),
    row(Float, H, L, H, Confirmed(ModuleKind::DualSwitchedOutput), None),
    row(High, H, L, H, Unspecified, None),
    row(Low, H, H, L, Confirmed(ModuleKind::ProtoPotentiometer), Some("Pot low")),
    row(Float, H, H, L, Confirmed(ModuleKind::ProtoPotentiometer), Some("Pot middle")),
    row(High, H, H, L, Confirmed(ModuleKind::ProtoPotentiometer), Some("Pot high")),
    row(Low, H, H, H, Confirmed(ModuleKind::LedStrip), None),
    row(Float, H, H, H, Empty, None),
    row(High, H, H, H, Confirmed(ModuleKind::DualMotor), None),
];

/// Classify a detection address
pub fn classify(adc1: AdcLevel, slow1: Bit, slow2: Bit, slow3: Bit) -> Classification {
    classify_observation(&PinObservation::new(adc1, slow1, slow2, slow3))
}

pub fn classify_observation(observation: &PinObservation) -> Classification {
    ADDRESS_TABLE[observation.address_index()].classification()
}

/// Classify raw firmware codes, rejecting anything outside the address space
pub fn classify_raw(adc1: u8, slow1: u8, slow2: u8, slow3: u8) -> Result<Classification> {
    let observation = PinObservation::from_raw(adc1, slow1, slow2, slow3)?;
    Ok(classify_observation(&observation))
}

/// All addresses that identify the given module type
pub fn addresses_for(kind: ModuleKind) -> impl Iterator<Item = &'static AddressEntry> {
    ADDRESS_TABLE
        .iter()
        .filter(move |entry| entry.identity.kind() == Some(kind))
}
