//! Modules a program expects in each slot

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::board::NUM_SLOTS;
use crate::detect::ModuleKind;
use crate::error::{Result, YukonError};

use super::slot::SlotId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignments {
    slots: [Option<ModuleKind>; NUM_SLOTS as usize],
}

impl SlotAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module type with an unpopulated slot
    pub fn register(&mut self, slot: SlotId, kind: ModuleKind) -> Result<()> {
        let entry = &mut self.slots[slot.index()];
        if entry.is_some() {
            return Err(YukonError::SlotOccupied(slot.get()));
        }
        debug!("[{}] Registered '{}' module", slot, kind);
        *entry = Some(kind);
        Ok(())
    }

    /// Clear a slot, returning what was registered there
    pub fn deregister(&mut self, slot: SlotId) -> Option<ModuleKind> {
        let previous = self.slots[slot.index()].take();
        if let Some(kind) = previous {
            debug!("[{}] Deregistered '{}' module", slot, kind);
        }
        previous
    }

    pub fn get(&self, slot: SlotId) -> Option<ModuleKind> {
        self.slots[slot.index()]
    }

    /// Every slot in order with its registration, if any
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, Option<ModuleKind>)> + '_ {
        SlotId::all().map(move |slot| (slot, self.get(slot)))
    }

    pub fn registered_count(&self) -> usize {
        self.slots.iter().filter(|entry| entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.registered_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(n: u8) -> SlotId {
        SlotId::new(n).unwrap()
    }

    #[test]
    fn test_register_and_deregister() {
        let mut assignments = SlotAssignments::new();
        assert!(assignments.is_empty());

        assignments.register(slot(2), ModuleKind::BigMotor).unwrap();
        assert_eq!(assignments.get(slot(2)), Some(ModuleKind::BigMotor));
        assert_eq!(assignments.registered_count(), 1);

        assert_eq!(assignments.deregister(slot(2)), Some(ModuleKind::BigMotor));
        assert_eq!(assignments.deregister(slot(2)), None);
        assert!(assignments.is_empty());
    }

    #[test]
    fn test_register_occupied_slot() {
        let mut assignments = SlotAssignments::new();
        assignments.register(slot(1), ModuleKind::LedStrip).unwrap();
        let result = assignments.register(slot(1), ModuleKind::DualMotor);
        assert!(matches!(result, Err(YukonError::SlotOccupied(1))));
        assert_eq!(assignments.get(slot(1)), Some(ModuleKind::LedStrip));
    }

    #[test]
    fn test_iter_covers_all_slots() {
        let mut assignments = SlotAssignments::new();
        assignments.register(slot(6), ModuleKind::BenchPower).unwrap();
        let entries: Vec<_> = assignments.iter().collect();
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[5], (slot(6), Some(ModuleKind::BenchPower)));
        assert_eq!(entries[0].1, None);
    }
}
