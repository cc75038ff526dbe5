//! Module identities produced by address classification

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, YukonError};

/// Known Yukon module types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleKind {
    QuadServoDirect,
    BigMotor,
    QuadServoRegulated,
    AudioAmp,
    BenchPower,
    DualSwitchedOutput,
    ProtoPotentiometer,
    LedStrip,
    DualMotor,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 9] = [
        ModuleKind::QuadServoDirect,
        ModuleKind::BigMotor,
        ModuleKind::QuadServoRegulated,
        ModuleKind::AudioAmp,
        ModuleKind::BenchPower,
        ModuleKind::DualSwitchedOutput,
        ModuleKind::ProtoPotentiometer,
        ModuleKind::LedStrip,
        ModuleKind::DualMotor,
    ];

    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            ModuleKind::QuadServoDirect => "Quad Servo Direct",
            ModuleKind::BigMotor => "Big Motor",
            ModuleKind::QuadServoRegulated => "Quad Servo Regulated",
            ModuleKind::AudioAmp => "Audio Amp",
            ModuleKind::BenchPower => "Bench Power",
            ModuleKind::DualSwitchedOutput => "Dual Switched Output",
            ModuleKind::ProtoPotentiometer => "Proto Potentiometer",
            ModuleKind::LedStrip => "LED Strip",
            ModuleKind::DualMotor => "Dual Motor",
        }
    }

    /// Kebab-case identifier used on the command line and in JSON
    pub fn slug(self) -> &'static str {
        match self {
            ModuleKind::QuadServoDirect => "quad-servo-direct",
            ModuleKind::BigMotor => "big-motor",
            ModuleKind::QuadServoRegulated => "quad-servo-regulated",
            ModuleKind::AudioAmp => "audio-amp",
            ModuleKind::BenchPower => "bench-power",
            ModuleKind::DualSwitchedOutput => "dual-switched-output",
            ModuleKind::ProtoPotentiometer => "proto-potentiometer",
            ModuleKind::LedStrip => "led-strip",
            ModuleKind::DualMotor => "dual-motor",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModuleKind {
    type Err = YukonError;

    /// Accepts the slug or the display name, ignoring case, spaces and underscores
    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize(s);
        ModuleKind::ALL
            .iter()
            .copied()
            .find(|kind| normalize(kind.slug()) == wanted || normalize(kind.name()) == wanted)
            .ok_or_else(|| YukonError::UnknownModule(s.trim().to_string()))
    }
}

fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// What an address maps to
///
/// Provisional and reserved addresses are kept apart from confirmed
/// mappings so callers can treat them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "module", rename_all = "lowercase")]
pub enum ModuleIdentity {
    /// Production mapping
    Confirmed(ModuleKind),
    /// Mapping documented as proposed, not yet production-confirmed
    Proposed(ModuleKind),
    /// Address reserved for a slot with nothing attached
    Empty,
    /// Address with no module assigned
    Unspecified,
}

impl ModuleIdentity {
    pub fn kind(&self) -> Option<ModuleKind> {
        match self {
            ModuleIdentity::Confirmed(kind) | ModuleIdentity::Proposed(kind) => Some(*kind),
            ModuleIdentity::Empty | ModuleIdentity::Unspecified => None,
        }
    }

    /// True when the address names a module, confirmed or proposed
    pub fn is_module(&self) -> bool {
        self.kind().is_some()
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, ModuleIdentity::Confirmed(_))
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleIdentity::Confirmed(kind) => write!(f, "{}", kind),
            ModuleIdentity::Proposed(kind) => write!(f, "{} [proposed]", kind),
            ModuleIdentity::Empty => f.write_str("Empty [reserved]"),
            ModuleIdentity::Unspecified => f.write_str("Unspecified"),
        }
    }
}

/// Result of classifying one address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub identity: ModuleIdentity,
    /// Physical condition the address implies, when the table gives one
    pub condition: Option<&'static str>,
}

impl Classification {
    pub fn is_detected(&self) -> bool {
        self.identity.is_module()
    }

    pub fn kind(&self) -> Option<ModuleKind> {
        self.identity.kind()
    }
}
