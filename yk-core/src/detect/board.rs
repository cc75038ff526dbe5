//! Board access used by detection
//!
//! Detection only needs four things from the hardware: the ADC1 voltage of
//! a slot, its three slow pins, whether the main output is on, and the
//! output rail voltage. Real GPIO drivers and captured snapshots both sit
//! behind this trait.

use crate::error::Result;
use crate::slots::SlotId;

use super::levels::Bit;

pub trait DetectionBoard {
    /// Read one ADC1 sample for the slot, in volts
    fn read_adc1_voltage(&mut self, slot: SlotId) -> Result<f32>;

    /// Read SLOW1, SLOW2 and SLOW3 of the slot with the pins configured as inputs
    fn read_slow_pins(&mut self, slot: SlotId) -> Result<[Bit; 3]>;

    fn is_main_output_enabled(&self) -> bool;

    /// Voltage currently on the main output rail
    fn read_output_voltage(&mut self) -> Result<f32>;
}

impl<B: DetectionBoard + ?Sized> DetectionBoard for &mut B {
    fn read_adc1_voltage(&mut self, slot: SlotId) -> Result<f32> {
        (**self).read_adc1_voltage(slot)
    }

    fn read_slow_pins(&mut self, slot: SlotId) -> Result<[Bit; 3]> {
        (**self).read_slow_pins(slot)
    }

    fn is_main_output_enabled(&self) -> bool {
        (**self).is_main_output_enabled()
    }

    fn read_output_voltage(&mut self) -> Result<f32> {
        (**self).read_output_voltage()
    }
}
