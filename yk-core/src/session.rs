//! Registration and verification around a detector
//!
//! A session is what a control program holds while it sets a board up:
//! it registers the modules it expects, then verifies them against the
//! hardware before anything is powered.

use tracing::info;

use crate::detect::{DetectionBoard, Detector, DetectorConfig, ModuleKind, SlotDetection};
use crate::error::Result;
use crate::slots::{verify, SlotAssignments, SlotId, VerificationPolicy, VerificationReport};

pub struct ModuleSession<B: DetectionBoard> {
    detector: Detector<B>,
    assignments: SlotAssignments,
}

impl<B: DetectionBoard> ModuleSession<B> {
    pub fn new(board: B) -> Self {
        Self::with_config(board, DetectorConfig::default())
    }

    pub fn with_config(board: B, config: DetectorConfig) -> Self {
        Self {
            detector: Detector::with_config(board, config),
            assignments: SlotAssignments::new(),
        }
    }

    pub fn detector(&mut self) -> &mut Detector<B> {
        &mut self.detector
    }

    pub fn assignments(&self) -> &SlotAssignments {
        &self.assignments
    }

    pub fn register_with_slot(&mut self, slot: SlotId, kind: ModuleKind) -> Result<()> {
        self.detector
            .ensure_output_off("register modules with slots")?;
        self.assignments.register(slot, kind)
    }

    pub fn deregister_slot(&mut self, slot: SlotId) -> Result<Option<ModuleKind>> {
        self.detector.ensure_output_off("deregister module slots")?;
        Ok(self.assignments.deregister(slot))
    }

    pub fn detect_module(&mut self, slot: SlotId) -> Result<SlotDetection> {
        self.detector.detect_module(slot)
    }

    pub fn find_slots_with_module(&mut self, kind: ModuleKind) -> Result<Vec<SlotId>> {
        self.detector.find_slots_with_module(kind)
    }

    /// Detect every slot and compare against the registrations
    pub fn verify_modules(&mut self, policy: &VerificationPolicy) -> Result<VerificationReport> {
        self.detector.ensure_output_off("verify modules")?;
        info!("Verifying modules");
        let detections = self.detector.detect_all()?;
        verify(&self.assignments, &detections, policy)
    }

    /// Wait for the output rail to discharge, then verify
    ///
    /// Module power-up itself is left to the caller.
    pub fn prepare_modules(&mut self, policy: &VerificationPolicy) -> Result<VerificationReport> {
        self.detector.ensure_output_off("verify modules")?;
        info!("Checking output voltage");
        self.detector.wait_for_output_dissipation()?;
        self.verify_modules(policy)
    }
}
