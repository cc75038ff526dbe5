/*
 * This file is part of Yukon Detect.
 *
 * Copyright (C) 2025 Yukon Detect contributors
 *
 * Yukon Detect is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Yukon Detect is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Yukon Detect. If not, see <https://www.gnu.org/licenses/>.
 */

//! Saved registration profiles
//!
//! A profile records which module is expected in which slot and which
//! verification failures to tolerate:
//!
//! ```json
//! {
//!   "modules": { "2": "big-motor", "5": "proto-potentiometer" },
//!   "allow_unregistered": [3],
//!   "allow_undetected": false,
//!   "allow_discrepancies": false,
//!   "allow_no_modules": false
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use yk_core::constants::limits::MAX_PROFILE_SIZE;
use yk_core::{ModuleKind, SlotAssignments, SlotId, SlotSelection, VerificationPolicy};
use yk_error::{Result, YukonError};

/// An allow rule: `true`/`false` for every slot, or a list of slot numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Allowance {
    Flag(bool),
    Slots(Vec<u8>),
}

impl Default for Allowance {
    fn default() -> Self {
        Allowance::Flag(false)
    }
}

impl Allowance {
    fn to_selection(&self, field: &str) -> Result<SlotSelection> {
        match self {
            Allowance::Flag(allowed) => Ok(SlotSelection::from_flag(*allowed)),
            Allowance::Slots(numbers) => {
                let slots = numbers
                    .iter()
                    .map(|&n| {
                        SlotId::new(n).map_err(|_| {
                            YukonError::invalid_config(field, format!("slot {} is not 1-6", n))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(SlotSelection::Slots(slots))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SavedProfile {
    /// Slot number to expected module
    #[serde(default)]
    pub modules: BTreeMap<u8, ModuleKind>,
    #[serde(default)]
    pub allow_unregistered: Allowance,
    #[serde(default)]
    pub allow_undetected: Allowance,
    #[serde(default)]
    pub allow_discrepancies: Allowance,
    #[serde(default)]
    pub allow_no_modules: bool,
}

impl SavedProfile {
    pub fn to_assignments(&self) -> Result<SlotAssignments> {
        let mut assignments = SlotAssignments::new();
        for (&number, &kind) in &self.modules {
            let slot = SlotId::new(number).map_err(|_| {
                YukonError::invalid_config("modules", format!("slot {} is not 1-6", number))
            })?;
            assignments.register(slot, kind)?;
        }
        Ok(assignments)
    }

    pub fn to_policy(&self) -> Result<VerificationPolicy> {
        Ok(VerificationPolicy {
            allow_unregistered: self.allow_unregistered.to_selection("allow_unregistered")?,
            allow_undetected: self.allow_undetected.to_selection("allow_undetected")?,
            allow_discrepancies: self.allow_discrepancies.to_selection("allow_discrepancies")?,
            allow_no_modules: self.allow_no_modules,
        })
    }
}

/// Check slot numbers before the profile is used
pub fn validate_saved_profile(profile: &SavedProfile) -> Result<()> {
    profile.to_assignments()?;
    profile.to_policy()?;
    Ok(())
}

pub fn parse_profile(json: &str) -> Result<SavedProfile> {
    let profile: SavedProfile = serde_json::from_str(json)?;
    validate_saved_profile(&profile)?;
    Ok(profile)
}

pub fn load_profile(path: &Path) -> Result<SavedProfile> {
    if !path.exists() {
        return Err(YukonError::FileNotFound(path.to_path_buf()));
    }

    let metadata = fs::metadata(path).map_err(|e| YukonError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    if metadata.len() > MAX_PROFILE_SIZE {
        return Err(YukonError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: MAX_PROFILE_SIZE,
        });
    }

    let content = fs::read_to_string(path).map_err(|e| YukonError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_profile(&content)
}

/// Parse a `SLOT=MODULE` registration, e.g. `3=big-motor` or `slot3=Big Motor`
pub fn parse_registration(arg: &str) -> Result<(SlotId, ModuleKind)> {
    let (slot, module) = arg.split_once('=').ok_or_else(|| {
        YukonError::invalid_input("registration", arg, "SLOT=MODULE, e.g. 3=big-motor")
    })?;
    Ok((slot.trim().parse()?, module.trim().parse()?))
}
