//! Display formatting for detection results
//!
//! Centralizes how identities, addresses and verification outcomes are
//! printed so the CLI and log lines stay consistent.

use crate::detect::{
    Classification, ModuleIdentity, PinObservation, SlotDetection, ADDRESS_TABLE,
};
use crate::slots::SlotOutcome;

/// Format a voltage with two decimals, e.g. "3.29V"
pub fn format_voltage(volts: f32) -> String {
    format!("{:.2}V", volts)
}

/// Identity with its status tag, e.g. "Audio Amp [proposed]"
pub fn format_identity(identity: &ModuleIdentity) -> String {
    identity.to_string()
}

/// Identity followed by its condition hint, if any
pub fn format_classification(classification: &Classification) -> String {
    match classification.condition {
        Some(condition) => format!(
            "{} ({})",
            format_identity(&classification.identity),
            condition
        ),
        None => format_identity(&classification.identity),
    }
}

/// Address as "ADC1=LOW SLOW1=0 SLOW2=0 SLOW3=1"
pub fn format_observation(observation: &PinObservation) -> String {
    format!(
        "ADC1={} SLOW1={} SLOW2={} SLOW3={}",
        observation.adc1, observation.slow1, observation.slow2, observation.slow3
    )
}

/// One line per slot: "Slot2  0.05V  ADC1=LOW ...  Big Motor (Not in fault)"
pub fn format_detection(detection: &SlotDetection) -> String {
    format!(
        "{:<6} {:>6}  {}  {}",
        detection.slot.to_string(),
        format_voltage(detection.adc1_voltage),
        format_observation(&detection.observation),
        format_classification(&detection.classification)
    )
}

pub fn format_outcome(outcome: &SlotOutcome) -> String {
    match outcome {
        SlotOutcome::Empty => "empty".to_string(),
        SlotOutcome::Matched { module } => format!("'{}' detected and registered", module),
        SlotOutcome::Undetected { expected } => {
            format!("no module detected, expected '{}'", expected)
        }
        SlotOutcome::Discrepancy { expected, detected } => format!(
            "expected '{}' but detected '{}'",
            expected,
            format_identity(detected)
        ),
        SlotOutcome::Unregistered { detected } => {
            format!("'{}' detected but not registered", format_identity(detected))
        }
    }
}

/// Render the full address table as aligned text
pub fn render_address_table() -> String {
    let mut out = format!(
        "{:<6} {:<5} {:<5} {:<5} {:<26} {}\n",
        "ADC1", "SLOW1", "SLOW2", "SLOW3", "Module", "Condition"
    );
    for entry in ADDRESS_TABLE.iter() {
        let observation = &entry.observation;
        out.push_str(&format!(
            "{:<6} {:<5} {:<5} {:<5} {:<26} {}\n",
            observation.adc1.as_str(),
            observation.slow1.as_u8(),
            observation.slow2.as_u8(),
            observation.slow3.as_u8(),
            format_identity(&entry.identity),
            entry.condition.unwrap_or("-")
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{classify, AdcLevel, Bit, ModuleKind};

    #[test]
    fn test_format_identity() {
        assert_eq!(format_identity(&ModuleIdentity::Confirmed(ModuleKind::LedStrip)), "LED Strip");
        assert_eq!(
            format_identity(&ModuleIdentity::Proposed(ModuleKind::AudioAmp)),
            "Audio Amp [proposed]"
        );
        assert_eq!(format_identity(&ModuleIdentity::Empty), "Empty [reserved]");
    }

    #[test]
    fn test_format_classification() {
        let pot = classify(AdcLevel::High, Bit::High, Bit::High, Bit::Low);
        assert_eq!(format_classification(&pot), "Proto Potentiometer (Pot high)");
    }

    #[test]
    fn test_render_address_table() {
        let table = render_address_table();
        assert_eq!(table.lines().count(), 25);
        assert!(table.lines().nth(1).unwrap().starts_with("LOW    0     0     0     Quad Servo Direct"));
        assert!(table.contains("Dual Motor"));
    }

    #[test]
    fn test_format_voltage() {
        assert_eq!(format_voltage(3.2949), "3.29V");
    }
}
