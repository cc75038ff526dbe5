//! Slot numbering, module registration and verification

mod assignments;
mod slot;
mod verification;

pub use assignments::SlotAssignments;
pub use slot::SlotId;
pub use verification::{
    slot_outcome, verify, SlotOutcome, SlotSelection, VerificationPolicy, VerificationReport,
};
