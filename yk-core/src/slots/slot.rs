//! Slot numbering
//!
//! Slots are numbered 1 to 6 as printed on the board; `SlotId` can only
//! hold a valid number.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::board::{FIRST_SLOT, NUM_SLOTS};
use crate::error::{Result, YukonError};

/// A module slot number, always within 1..=6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SlotId(u8);

impl SlotId {
    pub fn new(number: u8) -> Result<Self> {
        if (FIRST_SLOT..=NUM_SLOTS).contains(&number) {
            Ok(Self(number))
        } else {
            Err(YukonError::SlotOutOfRange(number))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based position, for indexing per-slot arrays
    pub fn index(self) -> usize {
        (self.0 - FIRST_SLOT) as usize
    }

    /// Every slot on the board in order
    pub fn all() -> impl Iterator<Item = SlotId> {
        (FIRST_SLOT..=NUM_SLOTS).map(SlotId)
    }
}

impl TryFrom<u8> for SlotId {
    type Error = YukonError;

    fn try_from(number: u8) -> Result<Self> {
        SlotId::new(number)
    }
}

impl From<SlotId> for u8 {
    fn from(slot: SlotId) -> Self {
        slot.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot{}", self.0)
    }
}

impl std::str::FromStr for SlotId {
    type Err = YukonError;

    /// Accepts `3` or `slot3` (any case)
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().to_ascii_lowercase();
        let digits = trimmed.strip_prefix("slot").unwrap_or(&trimmed);
        let number = digits
            .parse::<u8>()
            .map_err(|_| YukonError::invalid_input("slot", s, "a slot number from 1 to 6"))?;
        SlotId::new(number)
    }
}
