//! System configuration parameters
//!
//! All tunable parameters for the feeder.  Schedules are not persisted;
//! `default_schedules` seeds the table at every boot.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::safety::FEED_CEILING_SECS;
use crate::scheduler::{ENTRY_COUNT, ScheduleEntry};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Feeding ---
    /// How long the relays stay closed per feed (seconds)
    pub feed_duration_secs: u8,
    /// Relays driven by a normal feed (bit n = relay n+1)
    pub relay_mask: u8,
    /// Schedule table loaded at boot
    pub default_schedules: [ScheduleEntry; ENTRY_COUNT],

    // --- Buttons ---
    /// Minimum time between accepted level changes (milliseconds)
    pub debounce_ms: u32,
    /// Hold time before a long press fires (milliseconds)
    pub long_press_ms: u32,
    /// Auto-repeat cadence after a long press (milliseconds)
    pub repeat_ms: u32,
    /// Buttons pull the pin LOW when pressed
    pub buttons_active_low: bool,

    // --- Menu / display ---
    /// Idle time before any menu screen falls back to the clock (milliseconds)
    pub menu_timeout_ms: u32,
    /// Repaint cadence for live screens (milliseconds)
    pub display_refresh_ms: u32,

    // --- Timing ---
    /// Poll loop interval (milliseconds)
    pub loop_interval_ms: u32,
    /// Periodic time log interval (milliseconds)
    pub time_log_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Feeding
            feed_duration_secs: 10,
            relay_mask: 0b1111,
            default_schedules: [
                ScheduleEntry::new(8, 0),
                ScheduleEntry::new(12, 55),
                ScheduleEntry::new(18, 0),
                ScheduleEntry::new(22, 0),
            ],

            // Buttons
            debounce_ms: 50,
            long_press_ms: 1000,
            repeat_ms: 200,
            buttons_active_low: true,

            // Menu / display
            menu_timeout_ms: 30_000,
            display_refresh_ms: 1000,

            // Timing
            loop_interval_ms: 100,        // 10 Hz
            time_log_interval_ms: 30_000, // 2/min
        }
    }
}

impl SystemConfig {
    /// Reject values that would make the controller unsafe or unusable.
    pub fn validate(&self) -> Result<()> {
        if self.feed_duration_secs == 0 || self.feed_duration_secs > FEED_CEILING_SECS {
            return Err(Error::Config("feed duration must be 1-30 s"));
        }
        if self.relay_mask & 0b1111 == 0 {
            return Err(Error::Config("relay mask selects no relay"));
        }
        if self.loop_interval_ms == 0 {
            return Err(Error::Config("loop interval must be non-zero"));
        }
        if self.long_press_ms <= self.debounce_ms {
            return Err(Error::Config("long press must exceed debounce"));
        }
        if self.repeat_ms == 0 {
            return Err(Error::Config("repeat interval must be non-zero"));
        }
        if self.default_schedules.iter().any(|e| !e.is_valid()) {
            return Err(Error::Config("default schedule out of range"));
        }
        Ok(())
    }
}
