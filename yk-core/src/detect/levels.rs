//! Detection pin levels
//!
//! ADC1 is read as an analog voltage and reduced to a tri-state level
//! against two calibrated thresholds. The three slow pins are plain
//! digital inputs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{board, detection};
use crate::error::{Result, YukonError};

/// Tri-state classification of the ADC1 reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdcLevel {
    Low,
    Float,
    High,
}

impl AdcLevel {
    /// All levels in address-table order
    pub const ALL: [AdcLevel; 3] = [AdcLevel::Low, AdcLevel::Float, AdcLevel::High];

    /// Position of this level within a group of three table rows
    pub fn table_order(self) -> usize {
        match self {
            AdcLevel::Low => 0,
            AdcLevel::Float => 1,
            AdcLevel::High => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AdcLevel::Low => "LOW",
            AdcLevel::Float => "FLOAT",
            AdcLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for AdcLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdcLevel {
    type Err = YukonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(AdcLevel::Low),
            "float" => Ok(AdcLevel::Float),
            "high" => Ok(AdcLevel::High),
            _ => Err(YukonError::invalid_input("adc1", s, "LOW, FLOAT or HIGH")),
        }
    }
}

/// Raw level codes as used by the board firmware: 0 = LOW, 1 = HIGH, 2 = FLOAT
impl TryFrom<u8> for AdcLevel {
    type Error = YukonError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(AdcLevel::Low),
            1 => Ok(AdcLevel::High),
            2 => Ok(AdcLevel::Float),
            _ => Err(YukonError::invalid_input(
                "adc1",
                code,
                "0 (LOW), 1 (HIGH) or 2 (FLOAT)",
            )),
        }
    }
}

/// Digital state of a slow I/O pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Bit {
    Low,
    High,
}

impl Bit {
    pub fn as_u8(self) -> u8 {
        match self {
            Bit::Low => 0,
            Bit::High => 1,
        }
    }

    /// Parse a raw pin value, naming the pin in any error
    pub fn parse_pin(field: &str, value: u8) -> Result<Self> {
        match value {
            0 => Ok(Bit::Low),
            1 => Ok(Bit::High),
            _ => Err(YukonError::invalid_input(field, value, "0 or 1")),
        }
    }

    /// Parse a textual pin value, naming the pin in any error
    pub fn parse_pin_str(field: &str, value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "0" | "low" => Ok(Bit::Low),
            "1" | "high" => Ok(Bit::High),
            _ => Err(YukonError::invalid_input(field, value, "0 or 1")),
        }
    }
}


impl TryFrom<u8> for Bit {
    type Error = YukonError;

    fn try_from(value: u8) -> Result<Self> {
        Bit::parse_pin("slow pin", value)
    }
}

impl From<Bit> for u8 {
    fn from(bit: Bit) -> Self {
        bit.as_u8()
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Voltage thresholds separating LOW, FLOAT and HIGH on ADC1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdcThresholds {
    pub low: f32,
    pub high: f32,
}

impl Default for AdcThresholds {
    fn default() -> Self {
        Self {
            low: detection::DEFAULT_ADC_LOW_THRESHOLD,
            high: detection::DEFAULT_ADC_HIGH_THRESHOLD,
        }
    }
}

impl AdcThresholds {
    /// Create thresholds, rejecting pairs that cannot separate three bands
    pub fn new(low: f32, high: f32) -> Result<Self> {
        let thresholds = Self { low, high };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.low.is_finite() || !self.high.is_finite() {
            return Err(YukonError::InvalidThresholds(format!(
                "thresholds must be finite (low {}, high {})",
                self.low, self.high
            )));
        }

        if self.low < 0.0 || self.high > board::ADC_REFERENCE_VOLTAGE {
            return Err(YukonError::InvalidThresholds(format!(
                "thresholds must lie within 0-{}V (low {}, high {})",
                board::ADC_REFERENCE_VOLTAGE,
                self.low,
                self.high
            )));
        }

        if self.low >= self.high {
            return Err(YukonError::InvalidThresholds(format!(
                "low threshold {}V must be below high threshold {}V",
                self.low, self.high
            )));
        }

        Ok(())
    }

    /// Reduce an averaged ADC1 voltage to a tri-state level
    pub fn classify_voltage(&self, voltage: f32) -> Result<AdcLevel> {
        if !voltage.is_finite() {
            return Err(YukonError::invalid_input(
                "adc1 voltage",
                voltage,
                "a finite voltage",
            ));
        }

        if voltage <= self.low {
            Ok(AdcLevel::Low)
        } else if voltage >= self.high {
            Ok(AdcLevel::High)
        } else {
            Ok(AdcLevel::Float)
        }
    }
}
