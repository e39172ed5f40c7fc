//! In-memory hardware simulation.
//!
//! Implements [`HardwarePort`] without touching any peripheral: pin levels
//! live in arrays and time only moves when the owner advances it (or a
//! diagnostic routine calls `delay_ms`).  Inputs idle HIGH, matching the
//! pull-ups on the real button lines.

use crate::app::ports::HardwarePort;

const PIN_COUNT: usize = 64;

pub struct SimHardware {
    now_ms: u32,
    inputs: [bool; PIN_COUNT],
    outputs: [bool; PIN_COUNT],
}

impl Default for SimHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHardware {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            inputs: [true; PIN_COUNT],
            outputs: [false; PIN_COUNT],
        }
    }

    /// Start the tick counter somewhere other than zero (wraparound tests).
    pub fn starting_at(now_ms: u32) -> Self {
        Self {
            now_ms,
            ..Self::new()
        }
    }

    pub fn set_input(&mut self, pin: i32, high: bool) {
        if let Some(level) = usize::try_from(pin).ok().and_then(|p| self.inputs.get_mut(p)) {
            *level = high;
        }
    }

    /// Hold an active-low button down.
    pub fn press(&mut self, pin: i32) {
        self.set_input(pin, false);
    }

    pub fn release(&mut self, pin: i32) {
        self.set_input(pin, true);
    }

    /// Last level written to an output pin.
    pub fn output(&self, pin: i32) -> bool {
        usize::try_from(pin)
            .ok()
            .and_then(|p| self.outputs.get(p))
            .copied()
            .unwrap_or(false)
    }

    pub fn advance(&mut self, ms: u32) {
        self.now_ms = self.now_ms.wrapping_add(ms);
    }
}

impl HardwarePort for SimHardware {
    fn read_pin(&mut self, pin: i32) -> bool {
        usize::try_from(pin)
            .ok()
            .and_then(|p| self.inputs.get(p))
            .copied()
            .unwrap_or(true)
    }

    fn write_pin(&mut self, pin: i32, high: bool) {
        if let Some(level) = usize::try_from(pin).ok().and_then(|p| self.outputs.get_mut(p)) {
            *level = high;
        }
    }

    fn now_ms(&self) -> u32 {
        self.now_ms
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(ms);
    }
}
