//! Registered-versus-detected module verification
//!
//! Before the main output is enabled, every slot's detected module is
//! compared with what the program registered. Anything unexpected is an
//! error unless the policy allows it for that slot.

use serde::Serialize;
use tracing::{info, warn};

use crate::constants::board::NUM_SLOTS;
use crate::detect::{ModuleIdentity, ModuleKind, SlotDetection};
use crate::error::{Result, YukonError};

use super::assignments::SlotAssignments;
use super::slot::SlotId;

/// A set of slots a policy rule applies to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SlotSelection {
    #[default]
    None,
    All,
    Slots(Vec<SlotId>),
}

impl SlotSelection {
    pub fn contains(&self, slot: SlotId) -> bool {
        match self {
            SlotSelection::None => false,
            SlotSelection::All => true,
            SlotSelection::Slots(slots) => slots.contains(&slot),
        }
    }

    pub fn from_flag(allowed: bool) -> Self {
        if allowed {
            SlotSelection::All
        } else {
            SlotSelection::None
        }
    }
}

/// Which verification failures to tolerate
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VerificationPolicy {
    /// Slots where a detected but unregistered module is accepted
    pub allow_unregistered: SlotSelection,
    /// Slots where a registered module may be missing
    pub allow_undetected: SlotSelection,
    /// Slots where a different module than registered is accepted
    pub allow_discrepancies: SlotSelection,
    /// Accept a board with no registered modules at all
    pub allow_no_modules: bool,
}

impl VerificationPolicy {
    /// Policy that tolerates everything
    pub fn permissive() -> Self {
        Self {
            allow_unregistered: SlotSelection::All,
            allow_undetected: SlotSelection::All,
            allow_discrepancies: SlotSelection::All,
            allow_no_modules: true,
        }
    }
}

/// Verification result for one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SlotOutcome {
    /// Nothing registered, nothing detected
    Empty,
    /// Registered module was detected
    Matched { module: ModuleKind },
    /// Registered module was not detected
    Undetected { expected: ModuleKind },
    /// A different module was detected
    Discrepancy { expected: ModuleKind, detected: ModuleIdentity },
    /// A module was detected but nothing was registered
    Unregistered { detected: ModuleIdentity },
}

impl SlotOutcome {
    pub fn is_problem(&self) -> bool {
        !matches!(self, SlotOutcome::Empty | SlotOutcome::Matched { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub outcomes: Vec<(SlotId, SlotOutcome)>,
}

impl VerificationReport {
    pub fn outcome(&self, slot: SlotId) -> Option<SlotOutcome> {
        self.outcomes
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, outcome)| *outcome)
    }

    pub fn matched_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, SlotOutcome::Matched { .. }))
            .count()
    }
}

/// Compare one slot's registration with its detection
pub fn slot_outcome(registered: Option<ModuleKind>, detected: ModuleIdentity) -> SlotOutcome {
    match (registered, detected.kind()) {
        (None, None) => SlotOutcome::Empty,
        (Some(expected), None) => SlotOutcome::Undetected { expected },
        (Some(expected), Some(kind)) if kind == expected => SlotOutcome::Matched { module: kind },
        (Some(expected), Some(_)) => SlotOutcome::Discrepancy { expected, detected },
        (None, Some(_)) => SlotOutcome::Unregistered { detected },
    }
}

/// Verify detections against registrations under a policy
///
/// `detections` may come in any order; slots without a detection are
/// treated as reading nothing.
pub fn verify(
    assignments: &SlotAssignments,
    detections: &[SlotDetection],
    policy: &VerificationPolicy,
) -> Result<VerificationReport> {
    let mut outcomes = Vec::with_capacity(NUM_SLOTS as usize);
    let mut discrepancies = Vec::new();
    let mut undetected = Vec::new();
    let mut unregistered = Vec::new();
    let mut unregistered_slots = 0;

    for (slot, registered) in assignments.iter() {
        let detected = detections
            .iter()
            .find(|d| d.slot == slot)
            .map(|d| d.classification.identity)
            .unwrap_or(ModuleIdentity::Unspecified);

        let outcome = slot_outcome(registered, detected);
        match outcome {
            SlotOutcome::Empty => {
                info!("[{}] Module slot is empty", slot);
                unregistered_slots += 1;
            }
            SlotOutcome::Matched { module } => {
                info!("[{}] '{}' module detected and registered", slot, module);
            }
            SlotOutcome::Undetected { expected } => {
                warn!("[{}] No module detected! Expected a '{}' module", slot, expected);
                if !policy.allow_undetected.contains(slot) {
                    undetected.push(slot.get());
                }
            }
            SlotOutcome::Discrepancy { expected, detected } => {
                warn!(
                    "[{}] Module discrepancy! Expected a '{}' module, but detected a '{}' module",
                    slot, expected, detected
                );
                if !policy.allow_discrepancies.contains(slot) {
                    discrepancies.push(slot.get());
                }
            }
            SlotOutcome::Unregistered { detected } => {
                warn!("[{}] '{}' module detected but not registered", slot, detected);
                if !policy.allow_unregistered.contains(slot) {
                    unregistered.push(slot.get());
                }
                unregistered_slots += 1;
            }
        }
        outcomes.push((slot, outcome));
    }

    if !policy.allow_no_modules && unregistered_slots == NUM_SLOTS as usize {
        return Err(YukonError::NoModulesRegistered);
    }
    if !discrepancies.is_empty() {
        return Err(YukonError::ModuleDiscrepancy { slots: discrepancies });
    }
    if !undetected.is_empty() {
        return Err(YukonError::ModulesUndetected { slots: undetected });
    }
    if !unregistered.is_empty() {
        return Err(YukonError::ModulesUnregistered { slots: unregistered });
    }

    Ok(VerificationReport { outcomes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{classify_observation, AdcLevel, Bit, PinObservation};

    fn slot(n: u8) -> SlotId {
        SlotId::new(n).unwrap()
    }

    fn detection(n: u8, observation: PinObservation) -> SlotDetection {
        SlotDetection {
            slot: slot(n),
            adc1_voltage: 0.0,
            observation,
            classification: classify_observation(&observation),
        }
    }

    fn empty_board() -> Vec<SlotDetection> {
        let empty = PinObservation::new(AdcLevel::Float, Bit::High, Bit::High, Bit::High);
        SlotId::all().map(|s| detection(s.get(), empty)).collect()
    }

    fn with(mut board: Vec<SlotDetection>, n: u8, observation: PinObservation) -> Vec<SlotDetection> {
        board[(n - 1) as usize] = detection(n, observation);
        board
    }

    fn big_motor() -> PinObservation {
        PinObservation::new(AdcLevel::Low, Bit::Low, Bit::Low, Bit::High)
    }

    fn dual_motor() -> PinObservation {
        PinObservation::new(AdcLevel::High, Bit::High, Bit::High, Bit::High)
    }

    #[test]
    fn test_slot_outcome_matrix() {
        let motor = ModuleIdentity::Confirmed(ModuleKind::BigMotor);
        assert_eq!(slot_outcome(None, ModuleIdentity::Empty), SlotOutcome::Empty);
        assert_eq!(slot_outcome(None, ModuleIdentity::Unspecified), SlotOutcome::Empty);
        assert_eq!(
            slot_outcome(Some(ModuleKind::BigMotor), motor),
            SlotOutcome::Matched { module: ModuleKind::BigMotor }
        );
        assert_eq!(
            slot_outcome(Some(ModuleKind::DualMotor), motor),
            SlotOutcome::Discrepancy { expected: ModuleKind::DualMotor, detected: motor }
        );
        assert_eq!(
            slot_outcome(Some(ModuleKind::DualMotor), ModuleIdentity::Empty),
            SlotOutcome::Undetected { expected: ModuleKind::DualMotor }
        );
        assert_eq!(slot_outcome(None, motor), SlotOutcome::Unregistered { detected: motor });
    }

    #[test]
    fn test_proposed_module_matches_registration() {
        let amp = ModuleIdentity::Proposed(ModuleKind::AudioAmp);
        assert_eq!(
            slot_outcome(Some(ModuleKind::AudioAmp), amp),
            SlotOutcome::Matched { module: ModuleKind::AudioAmp }
        );
    }

    #[test]
    fn test_verify_success() {
        let mut assignments = SlotAssignments::new();
        assignments.register(slot(2), ModuleKind::BigMotor).unwrap();
        let board = with(empty_board(), 2, big_motor());

        let report = verify(&assignments, &board, &VerificationPolicy::default()).unwrap();
        assert_eq!(report.matched_count(), 1);
        assert_eq!(report.outcome(slot(1)), Some(SlotOutcome::Empty));
        assert_eq!(report.outcomes.len(), 6);
    }

    #[test]
    fn test_no_modules_registered() {
        let assignments = SlotAssignments::new();
        let result = verify(&assignments, &empty_board(), &VerificationPolicy::default());
        assert!(matches!(result, Err(YukonError::NoModulesRegistered)));

        let policy = VerificationPolicy { allow_no_modules: true, ..Default::default() };
        assert!(verify(&assignments, &empty_board(), &policy).is_ok());
    }

    #[test]
    fn test_unregistered_module() {
        let mut assignments = SlotAssignments::new();
        assignments.register(slot(1), ModuleKind::BigMotor).unwrap();
        let board = with(with(empty_board(), 1, big_motor()), 3, dual_motor());

        let result = verify(&assignments, &board, &VerificationPolicy::default());
        match result {
            Err(YukonError::ModulesUnregistered { slots }) => assert_eq!(slots, vec![3]),
            other => panic!("unexpected result: {:?}", other),
        }

        let policy = VerificationPolicy {
            allow_unregistered: SlotSelection::Slots(vec![slot(3)]),
            ..Default::default()
        };
        let report = verify(&assignments, &board, &policy).unwrap();
        assert!(report.outcome(slot(3)).unwrap().is_problem());
    }

    #[test]
    fn test_discrepancy_takes_precedence() {
        let mut assignments = SlotAssignments::new();
        assignments.register(slot(1), ModuleKind::DualMotor).unwrap();
        assignments.register(slot(2), ModuleKind::LedStrip).unwrap();
        // Slot 1 holds the wrong module, slot 2 holds nothing
        let board = with(empty_board(), 1, big_motor());

        let result = verify(&assignments, &board, &VerificationPolicy::default());
        assert!(matches!(result, Err(YukonError::ModuleDiscrepancy { .. })));

        let policy = VerificationPolicy {
            allow_discrepancies: SlotSelection::All,
            ..Default::default()
        };
        let result = verify(&assignments, &board, &policy);
        match result {
            Err(YukonError::ModulesUndetected { slots }) => assert_eq!(slots, vec![2]),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_permissive_policy_accepts_everything() {
        let mut assignments = SlotAssignments::new();
        assignments.register(slot(4), ModuleKind::BenchPower).unwrap();
        let board = with(empty_board(), 5, dual_motor());
        assert!(verify(&assignments, &board, &VerificationPolicy::permissive()).is_ok());
    }

    #[test]
    fn test_slot_selection() {
        assert!(!SlotSelection::None.contains(slot(1)));
        assert!(SlotSelection::All.contains(slot(6)));
        assert!(SlotSelection::Slots(vec![slot(2)]).contains(slot(2)));
        assert!(!SlotSelection::Slots(vec![slot(2)]).contains(slot(3)));
        assert_eq!(SlotSelection::from_flag(true), SlotSelection::All);
    }
}
