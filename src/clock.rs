//! Calendar date-time and the software fallback clock.
//!
//! [`DateTime`] is the value every clock source hands to the domain.
//! Calendar rules (leap years, month lengths) live here so the RTC driver,
//! the time-adjust editor and the console all validate the same way.

use serde::{Deserialize, Serialize};

use crate::app::ports::ClockPort;
use crate::error::{Error, Result};

/// First year the RTC's two-digit register can represent without the century bit.
pub const MIN_YEAR: u16 = 2000;
/// Last year accepted by the time-adjust screen and `adjust()`.
pub const MAX_YEAR: u16 = 2099;

/// Civil date and time, second resolution, no timezone.
///
/// Field order makes the derived `Ord` chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    /// Seed value used after RTC power loss and by the software clock.
    pub const DEFAULT: Self = Self {
        year: 2024,
        month: 1,
        day: 1,
        hour: 12,
        minute: 0,
        second: 0,
    };

    /// Build a validated date-time.
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Result<Self> {
        let dt = Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        };
        if dt.is_valid() {
            Ok(dt)
        } else {
            Err(Error::InvalidDate)
        }
    }

    pub fn is_valid(&self) -> bool {
        is_valid_date(self.year, self.month, self.day)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
    }

    /// Minutes elapsed since midnight (0..1440).
    pub fn minute_of_day(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    /// Day of week, 0 = Sunday.
    pub fn weekday(&self) -> u8 {
        // Sakamoto's method.
        const T: [u16; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
        let month = self.month.clamp(1, 12);
        let y = if month < 3 { self.year - 1 } else { self.year };
        let d = y + y / 4 - y / 100 + y / 400 + T[month as usize - 1] + self.day as u16;
        (d % 7) as u8
    }

    /// Advance by `secs`, carrying through minutes, hours, days, months and years.
    #[must_use]
    pub fn add_seconds(self, secs: u32) -> Self {
        let mut out = self;

        let total = out.second as u32 + secs;
        out.second = (total % 60) as u8;
        let total = out.minute as u32 + total / 60;
        out.minute = (total % 60) as u8;
        let total = out.hour as u32 + total / 60;
        out.hour = (total % 24) as u8;
        let mut days = total / 24;

        while days > 0 {
            // Saturating: a hand-built date may sit past its month's end.
            let left_in_month = days_in_month(out.year, out.month).saturating_sub(out.day) as u32;
            if days <= left_in_month {
                out.day += days as u8;
                break;
            }
            days -= left_in_month + 1;
            out.day = 1;
            if out.month >= 12 {
                out.month = 1;
                out.year += 1;
            } else {
                out.month += 1;
            }
        }
        out
    }
}

impl Default for DateTime {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl core::fmt::Display for DateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:02}/{:02}/{} {:02}:{:02}:{:02}",
            self.day, self.month, self.year, self.hour, self.minute, self.second
        )
    }
}

// ---------------------------------------------------------------------------
// Calendar rules
// ---------------------------------------------------------------------------

pub fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Length of `month` in `year`; 0 for a month outside 1..=12.
pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// True if the date exists and the year is within the supported range.
pub fn is_valid_date(year: u16, month: u8, day: u8) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&year)
        && (1..=12).contains(&month)
        && day >= 1
        && day <= days_in_month(year, month)
}

// ---------------------------------------------------------------------------
// Software clock
// ---------------------------------------------------------------------------

/// Rebase interval; keeps elapsed arithmetic far from `u32` wraparound.
const REBASE_MS: u32 = 3_600_000;

/// Clock driven by the monotonic millisecond tick.
///
/// Used when no RTC answers on the bus, and in host tests.  Loses time
/// on reset.  The owner calls [`SoftClock::sync`] once per loop.
#[derive(Debug, Clone)]
pub struct SoftClock {
    base: DateTime,
    base_ms: u32,
    now_ms: u32,
}

impl SoftClock {
    pub fn new(start: DateTime, now_ms: u32) -> Self {
        Self {
            base: start,
            base_ms: now_ms,
            now_ms,
        }
    }

    /// Feed the current monotonic tick.
    pub fn sync(&mut self, now_ms: u32) {
        self.now_ms = now_ms;
        let elapsed = now_ms.wrapping_sub(self.base_ms);
        if elapsed >= REBASE_MS {
            let secs = elapsed / 1000;
            self.base = self.base.add_seconds(secs);
            self.base_ms = self.base_ms.wrapping_add(secs * 1000);
        }
    }
}

impl ClockPort for SoftClock {
    fn now(&mut self) -> DateTime {
        let elapsed = self.now_ms.wrapping_sub(self.base_ms);
        self.base.add_seconds(elapsed / 1000)
    }

    fn adjust(&mut self, dt: DateTime) -> Result<()> {
        if !dt.is_valid() {
            return Err(Error::InvalidDate);
        }
        self.base = dt;
        self.base_ms = self.now_ms;
        Ok(())
    }
}
