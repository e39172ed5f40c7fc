//! Feed actuator: four ganged relays plus the status LED.
//!
//! Closes the relays for the configured duration, then opens them.  The
//! [`FeedGuard`](crate::safety::FeedGuard) is consulted on every
//! [`update`](FeedActuator::update), so the 30 s ceiling holds even if the
//! duration is misconfigured.
//!
//! ## Safety contract
//!
//! `update()` must run every poll cycle while a feed is active.  Every stop
//! path (normal, user, ceiling) drives all four relays low, not only the
//! ones the feed closed.

use log::{info, warn};

use crate::app::ports::HardwarePort;
use crate::error::{Error, Result};
use crate::pins;
use crate::safety::{FeedGuard, FeedVerdict};

/// Mask selecting all four relays.
pub const ALL_RELAYS: u8 = 0b1111;

/// Why a feed ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStop {
    /// Configured duration elapsed.
    Completed,
    /// Stopped from the menu or console.
    Cancelled,
    /// Safety ceiling tripped.
    SafetyCeiling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveFeed {
    started_ms: u32,
    mask: u8,
}

pub struct FeedActuator {
    duration_secs: u8,
    guard: FeedGuard,
    default_mask: u8,
    active: Option<ActiveFeed>,
}

impl FeedActuator {
    pub fn new(duration_secs: u8, default_mask: u8) -> Self {
        Self {
            duration_secs,
            guard: FeedGuard::new(duration_secs),
            default_mask: default_mask & ALL_RELAYS,
            active: None,
        }
    }

    /// Drive every output to its safe level.  Call once at boot.
    pub fn init_outputs(&mut self, hw: &mut impl HardwarePort) {
        self.write_outputs(hw, 0);
    }

    /// Start a feed on the configured relays.
    pub fn start(&mut self, hw: &mut impl HardwarePort, now_ms: u32) -> Result<()> {
        self.start_subset(hw, now_ms, self.default_mask)
    }

    /// Start a feed on the relays selected by `mask` (bit n = relay n+1).
    ///
    /// Already feeding: returns `AlreadyFeeding` and leaves the running
    /// feed, including its start time, untouched.
    pub fn start_subset(
        &mut self,
        hw: &mut impl HardwarePort,
        now_ms: u32,
        mask: u8,
    ) -> Result<()> {
        if self.active.is_some() {
            return Err(Error::AlreadyFeeding);
        }
        let mask = mask & ALL_RELAYS;
        if mask == 0 {
            return Err(Error::Config("relay mask selects no relay"));
        }
        self.write_outputs(hw, mask);
        self.active = Some(ActiveFeed {
            started_ms: now_ms,
            mask,
        });
        info!(
            "Feeding started: relays=0b{:04b}, {} s",
            mask, self.duration_secs
        );
        Ok(())
    }

    /// Per-tick timer check.  Returns how the feed ended, if it ended now.
    pub fn update(&mut self, hw: &mut impl HardwarePort, now_ms: u32) -> Option<FeedStop> {
        let feed = self.active?;
        match self.guard.evaluate(feed.started_ms, now_ms) {
            FeedVerdict::Continue => None,
            FeedVerdict::Complete => {
                self.halt(hw);
                info!(
                    "Feeding complete after {} ms",
                    now_ms.wrapping_sub(feed.started_ms)
                );
                Some(FeedStop::Completed)
            }
            FeedVerdict::Ceiling => {
                self.emergency_stop(hw);
                Some(FeedStop::SafetyCeiling)
            }
        }
    }

    /// User stop.  `NotFeeding` if idle.
    pub fn stop(&mut self, hw: &mut impl HardwarePort) -> Result<()> {
        if self.active.is_none() {
            return Err(Error::NotFeeding);
        }
        self.halt(hw);
        info!("Feeding stopped by user");
        Ok(())
    }

    /// Unconditional all-off.  Returns whether a feed was running.
    pub fn emergency_stop(&mut self, hw: &mut impl HardwarePort) -> bool {
        let was_active = self.active.is_some();
        self.halt(hw);
        warn!("Emergency stop: all relays open");
        was_active
    }

    // ── Diagnostics (blocking) ────────────────────────────────

    /// Close every relay for `hold_ms`, then open them.  Refused while feeding.
    pub fn test_relays(&mut self, hw: &mut impl HardwarePort, hold_ms: u32) -> Result<()> {
        if self.active.is_some() {
            return Err(Error::AlreadyFeeding);
        }
        info!("Relay test: closing for {} ms", hold_ms);
        self.write_outputs(hw, ALL_RELAYS);
        hw.delay_ms(hold_ms);
        self.write_outputs(hw, 0);
        Ok(())
    }

    /// Blink the status LED `count` times with `period_ms` on and off.
    pub fn test_led(&mut self, hw: &mut impl HardwarePort, count: u8, period_ms: u32) {
        info!("LED test: {} blinks", count);
        for _ in 0..count {
            hw.write_pin(pins::STATUS_LED_GPIO, true);
            hw.delay_ms(period_ms);
            hw.write_pin(pins::STATUS_LED_GPIO, false);
            hw.delay_ms(period_ms);
        }
        // Restore the LED to the feed state.
        hw.write_pin(pins::STATUS_LED_GPIO, self.active.is_some());
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Relays currently closed by a feed.
    pub fn relay_mask(&self) -> u8 {
        self.active.map_or(0, |f| f.mask)
    }

    pub fn duration_secs(&self) -> u8 {
        self.duration_secs
    }

    /// Whole seconds left, floored at 0.  0 when idle.
    pub fn remaining_secs(&self, now_ms: u32) -> u8 {
        self.active.map_or(0, |f| {
            let elapsed_secs = now_ms.wrapping_sub(f.started_ms) / 1000;
            (self.duration_secs as u32).saturating_sub(elapsed_secs) as u8
        })
    }

    // ── Internal ──────────────────────────────────────────────

    fn halt(&mut self, hw: &mut impl HardwarePort) {
        self.write_outputs(hw, 0);
        self.active = None;
    }

    fn write_outputs(&self, hw: &mut impl HardwarePort, mask: u8) {
        for (bit, &pin) in pins::RELAY_GPIOS.iter().enumerate() {
            hw.write_pin(pin, mask & (1 << bit) != 0);
        }
        hw.write_pin(pins::STATUS_LED_GPIO, mask != 0);
    }
}
