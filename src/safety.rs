//! Feed safety guard.
//!
//! Runs **every tick** while the relays are closed and decides whether
//! actuation may continue.  Two independent stop paths:
//!
//! 1. **Complete**: elapsed reached the configured duration (normal stop).
//! 2. **Ceiling**: elapsed exceeded [`FEED_CEILING_SECS`] (hard bound).
//!
//! The ceiling is checked first and always wins, so a misconfigured
//! duration above 30 s can never keep the relays energised past it.

use log::error;

/// Absolute upper bound on one actuation, independent of configuration.
pub const FEED_CEILING_SECS: u8 = 30;

const FEED_CEILING_MS: u32 = FEED_CEILING_SECS as u32 * 1000;

/// What the guard decided for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedVerdict {
    Continue,
    /// Configured duration elapsed.
    Complete,
    /// Safety ceiling exceeded; emergency stop.
    Ceiling,
}

/// Stateless duration check for one feed.
#[derive(Debug, Clone, Copy)]
pub struct FeedGuard {
    duration_ms: u32,
}

impl FeedGuard {
    pub fn new(duration_secs: u8) -> Self {
        Self {
            duration_ms: duration_secs as u32 * 1000,
        }
    }

    /// Evaluate with wrap-safe elapsed time since the feed started.
    /// Only the ceiling is logged here; the actuator reports completion.
    pub fn evaluate(&self, started_ms: u32, now_ms: u32) -> FeedVerdict {
        let elapsed = now_ms.wrapping_sub(started_ms);
        if elapsed > FEED_CEILING_MS {
            error!(
                "SAFETY: feed ran {} ms, over {} s ceiling, forcing stop",
                elapsed, FEED_CEILING_SECS
            );
            FeedVerdict::Ceiling
        } else if elapsed >= self.duration_ms {
            FeedVerdict::Complete
        } else {
            FeedVerdict::Continue
        }
    }
}
