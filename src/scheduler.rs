//! Daily feed schedule resolver.
//!
//! Owns the four `(hour, minute, enabled)` entries and answers two
//! questions every poll cycle:
//!
//! ```text
//!   now ──▶ resolve_feed_trigger ──▶ Some(entry)  → Actuator.start()
//!       └─▶ next_upcoming        ──▶ Some(next)   → clock / status screens
//! ```
//!
//! Firing is edge-triggered on the minute match: trigger memory holds
//! "this entry matched on the previous poll", so an entry fires once on
//! the first poll inside its minute no matter how fast the loop runs.

use log::info;
use serde::{Deserialize, Serialize};

use crate::clock::DateTime;
use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════
//  Schedule types
// ═══════════════════════════════════════════════════════════════

/// Number of schedule slots, numbered `1..=ENTRY_COUNT`.
pub const ENTRY_COUNT: usize = 4;

const MINUTES_PER_DAY: u16 = 24 * 60;

/// One daily feed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub hour: u8,
    pub minute: u8,
    pub enabled: bool,
}

impl ScheduleEntry {
    /// An enabled entry at `hour:minute`.
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self {
            hour,
            minute,
            enabled: true,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.hour < 24 && self.minute < 60
    }

    fn minute_of_day(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    fn matches(&self, now: &DateTime) -> bool {
        self.hour == now.hour && self.minute == now.minute
    }
}

/// The nearest enabled entry looking forward from some instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upcoming {
    /// Entry number, 1..=4.
    pub entry: u8,
    pub hour: u8,
    pub minute: u8,
    /// Forward distance in minutes, 1..=1440.
    pub minutes_away: u16,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

pub struct Scheduler {
    entries: [ScheduleEntry; ENTRY_COUNT],
    /// Per entry: matched the clock on the previous resolve call.
    trigger_memory: [bool; ENTRY_COUNT],
}

impl Scheduler {
    pub fn new(entries: [ScheduleEntry; ENTRY_COUNT]) -> Self {
        Self {
            entries,
            trigger_memory: [false; ENTRY_COUNT],
        }
    }

    /// Decide whether a feed fires now.  Call exactly once per poll.
    ///
    /// Compares against the previous poll's memory first, then refreshes
    /// all four bits unconditionally, so a later poll inside the same
    /// minute never refires and disabled entries still track the clock.
    pub fn resolve_feed_trigger(&mut self, now: &DateTime) -> Option<u8> {
        let matches: [bool; ENTRY_COUNT] = core::array::from_fn(|i| self.entries[i].matches(now));

        let fired = (0..ENTRY_COUNT)
            .find(|&i| self.entries[i].enabled && matches[i] && !self.trigger_memory[i])
            .map(|i| i as u8 + 1);

        self.trigger_memory = matches;

        if let Some(id) = fired {
            info!(
                "Schedule H{} fired at {:02}:{:02}",
                id, now.hour, now.minute
            );
        }
        fired
    }

    /// Chronologically nearest enabled entry, treating the day as circular.
    ///
    /// An entry at or before the current minute counts as tomorrow.  Ties
    /// go to the lowest entry number.
    pub fn next_upcoming(&self, now: &DateTime) -> Option<Upcoming> {
        let current = now.minute_of_day();
        let mut best: Option<Upcoming> = None;

        for (i, entry) in self.entries.iter().enumerate() {
            if !entry.enabled {
                continue;
            }
            let target = entry.minute_of_day();
            let minutes_away = if target > current {
                target - current
            } else {
                MINUTES_PER_DAY - current + target
            };
            if best.is_none_or(|b| minutes_away < b.minutes_away) {
                best = Some(Upcoming {
                    entry: i as u8 + 1,
                    hour: entry.hour,
                    minute: entry.minute,
                    minutes_away,
                });
            }
        }
        best
    }

    /// Set an entry's time.  Setting a time always re-enables the entry.
    pub fn set_entry(&mut self, id: u8, hour: u8, minute: u8) -> Result<()> {
        let idx = Self::index(id)?;
        let candidate = ScheduleEntry::new(hour, minute);
        if !candidate.is_valid() {
            return Err(Error::InvalidSchedule);
        }
        self.entries[idx] = candidate;
        info!("Schedule H{} set to {:02}:{:02}", id, hour, minute);
        Ok(())
    }

    /// Enable or disable an entry without touching its time.
    pub fn set_enabled(&mut self, id: u8, enabled: bool) -> Result<()> {
        let idx = Self::index(id)?;
        self.entries[idx].enabled = enabled;
        info!(
            "Schedule H{} {}",
            id,
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(())
    }

    pub fn enable_all(&mut self) {
        self.entries.iter_mut().for_each(|e| e.enabled = true);
        info!("All schedules enabled");
    }

    pub fn disable_all(&mut self) {
        self.entries.iter_mut().for_each(|e| e.enabled = false);
        info!("All schedules disabled");
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn entry(&self, id: u8) -> Option<ScheduleEntry> {
        Self::index(id).ok().map(|idx| self.entries[idx])
    }

    pub fn entries(&self) -> &[ScheduleEntry; ENTRY_COUNT] {
        &self.entries
    }

    pub fn enabled_count(&self) -> u8 {
        self.entries.iter().filter(|e| e.enabled).count() as u8
    }

    fn index(id: u8) -> Result<usize> {
        if (1..=ENTRY_COUNT as u8).contains(&id) {
            Ok(id as usize - 1)
        } else {
            Err(Error::InvalidSchedule)
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
