//! Slot detection against a live or captured board
//!
//! Detection must happen before modules are powered: once the main output
//! is on, modules drive their own pins and the address is meaningless.
//! Every entry point here refuses to run while the output is enabled.

use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::constants::{detection, output};
use crate::error::{Result, YukonError};
use crate::slots::SlotId;

use super::board::DetectionBoard;
use super::levels::AdcThresholds;
use super::module::{Classification, ModuleKind};
use super::table::{classify_observation, PinObservation};

/// Tuning for detection and output dissipation
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    pub thresholds: AdcThresholds,
    /// ADC1 readings averaged per detection (at least 1)
    pub samples: u32,
    /// Output voltage below which addresses read reliably
    pub dissipate_level: f32,
    pub dissipate_timeout: Duration,
    pub dissipate_poll_interval: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            thresholds: AdcThresholds::default(),
            samples: detection::DEFAULT_SAMPLES,
            dissipate_level: output::DEFAULT_DISSIPATE_LEVEL,
            dissipate_timeout: output::DEFAULT_DISSIPATE_TIMEOUT,
            dissipate_poll_interval: output::DEFAULT_POLL_INTERVAL,
        }
    }
}

/// What was read from one slot and what it means
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlotDetection {
    pub slot: SlotId,
    /// Averaged ADC1 voltage
    pub adc1_voltage: f32,
    pub observation: PinObservation,
    pub classification: Classification,
}

pub struct Detector<B: DetectionBoard> {
    board: B,
    config: DetectorConfig,
}

impl<B: DetectionBoard> Detector<B> {
    pub fn new(board: B) -> Self {
        Self::with_config(board, DetectorConfig::default())
    }

    pub fn with_config(board: B, config: DetectorConfig) -> Self {
        Self { board, config }
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn is_main_output_enabled(&self) -> bool {
        self.board.is_main_output_enabled()
    }

    /// Fail with `MainOutputActive` when the output is on
    pub fn ensure_output_off(&self, operation: &str) -> Result<()> {
        if self.board.is_main_output_enabled() {
            return Err(YukonError::main_output_active(operation));
        }
        Ok(())
    }

    /// Read and classify one slot
    pub fn detect_module(&mut self, slot: SlotId) -> Result<SlotDetection> {
        self.ensure_output_off("detect modules")?;
        self.read_slot(slot)
    }

    /// Read and classify every slot in order
    pub fn detect_all(&mut self) -> Result<Vec<SlotDetection>> {
        self.ensure_output_off("detect modules")?;
        SlotId::all().map(|slot| self.read_slot(slot)).collect()
    }

    /// Slots whose detected module is of the given type
    pub fn find_slots_with_module(&mut self, kind: ModuleKind) -> Result<Vec<SlotId>> {
        self.ensure_output_off("find slots with modules")?;
        info!("Finding slots with '{}' module", kind);

        let mut slots = Vec::new();
        for slot in SlotId::all() {
            let detection = self.read_slot(slot)?;
            if detection.classification.kind() == Some(kind) {
                info!("[{}] Found '{}' module", slot, kind);
                slots.push(slot);
            } else {
                debug!("[{}] No '{}' module", slot, kind);
            }
        }
        Ok(slots)
    }

    /// Wait for the main output rail to fall below the dissipation level
    pub fn wait_for_output_dissipation(&mut self) -> Result<()> {
        let start = Instant::now();
        let mut voltage = self.board.read_output_voltage()?;
        if voltage < self.config.dissipate_level {
            return Ok(());
        }

        info!("Waiting for output voltage of {:.2}V to dissipate", voltage);
        loop {
            if start.elapsed() >= self.config.dissipate_timeout {
                warn!("Output voltage did not dissipate ({:.2}V)", voltage);
                return Err(YukonError::OutputNotDissipated {
                    voltage,
                    timeout_secs: self.config.dissipate_timeout.as_secs(),
                });
            }

            thread::sleep(self.config.dissipate_poll_interval);
            voltage = self.board.read_output_voltage()?;
            if voltage < self.config.dissipate_level {
                debug!("Output dissipated after {:?}", start.elapsed());
                return Ok(());
            }
        }
    }

    fn read_slot(&mut self, slot: SlotId) -> Result<SlotDetection> {
        let [slow1, slow2, slow3] = self.board.read_slow_pins(slot)?;

        let samples = self.config.samples.max(1);
        let mut total = 0.0f32;
        for _ in 0..samples {
            total += self.board.read_adc1_voltage(slot)?;
        }
        let adc1_voltage = total / samples as f32;

        let adc1 = self.config.thresholds.classify_voltage(adc1_voltage)?;
        let observation = PinObservation::new(adc1, slow1, slow2, slow3);
        let classification = classify_observation(&observation);

        debug!(
            "[{}] ADC1 = {:.3}V, SLOW1 = {}, SLOW2 = {}, SLOW3 = {} -> {}",
            slot, adc1_voltage, slow1, slow2, slow3, classification.identity
        );

        Ok(SlotDetection {
            slot,
            adc1_voltage,
            observation,
            classification,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{AdcLevel, Bit, ModuleIdentity};
    use std::collections::VecDeque;

    /// Board that alternates ADC1 readings and replays output voltages
    struct ScriptedBoard {
        adc1_pattern: Vec<f32>,
        slow: [Bit; 3],
        main_output: bool,
        output_voltages: VecDeque<f32>,
        adc_reads: usize,
    }

    impl ScriptedBoard {
        fn new(adc1_pattern: Vec<f32>, slow: [Bit; 3]) -> Self {
            Self {
                adc1_pattern,
                slow,
                main_output: false,
                output_voltages: VecDeque::new(),
                adc_reads: 0,
            }
        }
    }

    impl DetectionBoard for ScriptedBoard {
        fn read_adc1_voltage(&mut self, _slot: SlotId) -> Result<f32> {
            let value = self.adc1_pattern[self.adc_reads % self.adc1_pattern.len()];
            self.adc_reads += 1;
            Ok(value)
        }

        fn read_slow_pins(&mut self, _slot: SlotId) -> Result<[Bit; 3]> {
            Ok(self.slow)
        }

        fn is_main_output_enabled(&self) -> bool {
            self.main_output
        }

        fn read_output_voltage(&mut self) -> Result<f32> {
            if self.output_voltages.len() > 1 {
                Ok(self.output_voltages.pop_front().unwrap_or(0.0))
            } else {
                Ok(self.output_voltages.front().copied().unwrap_or(0.0))
            }
        }
    }

    fn slot(n: u8) -> SlotId {
        SlotId::new(n).unwrap()
    }

    #[test]
    fn test_detect_averages_samples() {
        // Alternating 0.0 / 0.3 averages to 0.15V, which is LOW
        let board = ScriptedBoard::new(vec![0.0, 0.3], [Bit::Low, Bit::Low, Bit::High]);
        let mut detector = Detector::new(board);

        let detection = detector.detect_module(slot(1)).unwrap();
        assert!((detection.adc1_voltage - 0.15).abs() < 1e-4);
        assert_eq!(detection.observation.adc1, AdcLevel::Low);
        assert_eq!(
            detection.classification.identity,
            ModuleIdentity::Confirmed(ModuleKind::BigMotor)
        );
        assert_eq!(detector.board.adc_reads, detection::DEFAULT_SAMPLES as usize);
    }

    #[test]
    fn test_zero_samples_still_reads_once() {
        let board = ScriptedBoard::new(vec![3.3], [Bit::High; 3]);
        let config = DetectorConfig { samples: 0, ..Default::default() };
        let mut detector = Detector::with_config(board, config);

        let detection = detector.detect_module(slot(2)).unwrap();
        assert_eq!(detection.classification.identity, ModuleIdentity::Confirmed(ModuleKind::DualMotor));
        assert_eq!(detector.board.adc_reads, 1);
    }

    #[test]
    fn test_refuses_while_output_enabled() {
        let mut board = ScriptedBoard::new(vec![1.65], [Bit::High; 3]);
        board.main_output = true;
        let mut detector = Detector::new(board);

        assert!(matches!(
            detector.detect_module(slot(1)),
            Err(YukonError::MainOutputActive { .. })
        ));
        assert!(detector.detect_all().is_err());
        assert!(detector.find_slots_with_module(ModuleKind::LedStrip).is_err());
        assert_eq!(detector.board.adc_reads, 0);
    }

    #[test]
    fn test_detect_all_and_find() {
        let board = ScriptedBoard::new(vec![1.65], [Bit::High, Bit::Low, Bit::High]);
        let mut detector = Detector::new(board);

        let detections = detector.detect_all().unwrap();
        assert_eq!(detections.len(), 6);
        assert!(detections
            .iter()
            .all(|d| d.classification.identity == ModuleIdentity::Confirmed(ModuleKind::DualSwitchedOutput)));

        let slots = detector.find_slots_with_module(ModuleKind::DualSwitchedOutput).unwrap();
        assert_eq!(slots.len(), 6);
        assert!(detector.find_slots_with_module(ModuleKind::BigMotor).unwrap().is_empty());
    }

    #[test]
    fn test_custom_thresholds() {
        let board = ScriptedBoard::new(vec![0.5], [Bit::High; 3]);
        let config = DetectorConfig {
            thresholds: AdcThresholds::new(0.6, 2.7).unwrap(),
            samples: 4,
            ..Default::default()
        };
        let mut detector = Detector::with_config(board, config);
        let detection = detector.detect_module(slot(3)).unwrap();
        assert_eq!(detection.classification.identity, ModuleIdentity::Confirmed(ModuleKind::LedStrip));
    }

    #[test]
    fn test_output_dissipates() {
        let mut board = ScriptedBoard::new(vec![1.65], [Bit::High; 3]);
        board.output_voltages = VecDeque::from(vec![5.0, 2.0, 0.1]);
        let config = DetectorConfig {
            dissipate_timeout: Duration::from_secs(5),
            dissipate_poll_interval: Duration::from_millis(1),
            ..Default::default()
        };
        let mut detector = Detector::with_config(board, config);
        assert!(detector.wait_for_output_dissipation().is_ok());
    }

    #[test]
    fn test_output_dissipation_timeout() {
        let mut board = ScriptedBoard::new(vec![1.65], [Bit::High; 3]);
        board.output_voltages = VecDeque::from(vec![12.0]);
        let config = DetectorConfig {
            dissipate_timeout: Duration::ZERO,
            dissipate_poll_interval: Duration::from_millis(1),
            ..Default::default()
        };
        let mut detector = Detector::with_config(board, config);
        match detector.wait_for_output_dissipation() {
            Err(YukonError::OutputNotDissipated { voltage, .. }) => assert_eq!(voltage, 12.0),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
